//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories so services depend on a single
//! abstraction. Every bot operation is a short sequence of idempotent
//! upserts, so repositories run on the shared connection pool without an
//! explicit transaction.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    ChatRepository, ChatStore, CheckinRepository, CheckinStore, MembershipRepository,
    MembershipStore, SettingsRepository, SettingsStore, StatsRepository, StatsStore,
    UserRepository, UserStore,
};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get chat repository
    fn chats(&self) -> Arc<dyn ChatRepository>;

    /// Get membership repository
    fn memberships(&self) -> Arc<dyn MembershipRepository>;

    /// Get check-in repository
    fn checkins(&self) -> Arc<dyn CheckinRepository>;

    /// Get settings repository
    fn settings(&self) -> Arc<dyn SettingsRepository>;

    /// Get daily statistics repository
    fn stats(&self) -> Arc<dyn StatsRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    chat_repo: Arc<ChatStore>,
    membership_repo: Arc<MembershipStore>,
    checkin_repo: Arc<CheckinStore>,
    settings_repo: Arc<SettingsStore>,
    stats_repo: Arc<StatsStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            chat_repo: Arc::new(ChatStore::new(db.clone())),
            membership_repo: Arc::new(MembershipStore::new(db.clone())),
            checkin_repo: Arc::new(CheckinStore::new(db.clone())),
            settings_repo: Arc::new(SettingsStore::new(db.clone())),
            stats_repo: Arc::new(StatsStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn chats(&self) -> Arc<dyn ChatRepository> {
        self.chat_repo.clone()
    }

    fn memberships(&self) -> Arc<dyn MembershipRepository> {
        self.membership_repo.clone()
    }

    fn checkins(&self) -> Arc<dyn CheckinRepository> {
        self.checkin_repo.clone()
    }

    fn settings(&self) -> Arc<dyn SettingsRepository> {
        self.settings_repo.clone()
    }

    fn stats(&self) -> Arc<dyn StatsRepository> {
        self.stats_repo.clone()
    }
}
