//! Mocked Unit of Work for service tests.

use std::sync::Arc;

use crate::infra::{
    ChatRepository, CheckinRepository, MembershipRepository, MockChatRepository,
    MockCheckinRepository, MockMembershipRepository, MockSettingsRepository,
    MockStatsRepository, MockUserRepository, SettingsRepository, StatsRepository, UnitOfWork,
    UserRepository,
};

/// Repository mocks collected before expectations are frozen behind `Arc`s.
#[derive(Default)]
pub struct Mocks {
    pub users: MockUserRepository,
    pub chats: MockChatRepository,
    pub memberships: MockMembershipRepository,
    pub checkins: MockCheckinRepository,
    pub settings: MockSettingsRepository,
    pub stats: MockStatsRepository,
}

impl Mocks {
    pub fn into_uow(self) -> Arc<TestUnitOfWork> {
        Arc::new(TestUnitOfWork {
            users: Arc::new(self.users),
            chats: Arc::new(self.chats),
            memberships: Arc::new(self.memberships),
            checkins: Arc::new(self.checkins),
            settings: Arc::new(self.settings),
            stats: Arc::new(self.stats),
        })
    }
}

/// Test mock for UnitOfWork that hands out the mocked repositories
pub struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    chats: Arc<MockChatRepository>,
    memberships: Arc<MockMembershipRepository>,
    checkins: Arc<MockCheckinRepository>,
    settings: Arc<MockSettingsRepository>,
    stats: Arc<MockStatsRepository>,
}

impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn chats(&self) -> Arc<dyn ChatRepository> {
        self.chats.clone()
    }

    fn memberships(&self) -> Arc<dyn MembershipRepository> {
        self.memberships.clone()
    }

    fn checkins(&self) -> Arc<dyn CheckinRepository> {
        self.checkins.clone()
    }

    fn settings(&self) -> Arc<dyn SettingsRepository> {
        self.settings.clone()
    }

    fn stats(&self) -> Arc<dyn StatsRepository> {
        self.stats.clone()
    }
}
