//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//! One repository per table; every trait has a SeaORM-backed `*Store`.

mod chat_repository;
mod checkin_repository;
pub(crate) mod entities;
mod membership_repository;
mod settings_repository;
mod stats_repository;
mod user_repository;

pub use chat_repository::{ChatRepository, ChatStore};
pub use checkin_repository::{CheckinRepository, CheckinStore};
pub use membership_repository::{MembershipRepository, MembershipStore};
pub use settings_repository::{SettingsRepository, SettingsStore};
pub use stats_repository::{StatsRepository, StatsStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use chat_repository::MockChatRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use checkin_repository::MockCheckinRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use membership_repository::MockMembershipRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use settings_repository::MockSettingsRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use stats_repository::MockStatsRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
