//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Redis cache and distributed locks
//! - Conversation state storage
//! - Unit of Work for repository access

pub mod cache;
pub mod db;
pub mod repositories;
pub mod state_store;
pub mod unit_of_work;

pub use cache::{Cache, LockGuard};
pub use db::{Database, Migrator};
pub use repositories::{
    ChatRepository, ChatStore, CheckinRepository, CheckinStore, MembershipRepository,
    MembershipStore, SettingsRepository, SettingsStore, StatsRepository, StatsStore,
    UserRepository, UserStore,
};
pub use state_store::{MemoryStateStore, RedisStateStore, StateStore};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockChatRepository, MockCheckinRepository, MockMembershipRepository, MockSettingsRepository,
    MockStatsRepository, MockUserRepository,
};
#[cfg(any(test, feature = "test-utils"))]
pub use state_store::MockStateStore;
