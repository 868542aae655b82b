//! Service Container - Centralized service access.
//!
//! Handlers, jobs and the health endpoint reach every use case through
//! `ServiceContainer`, so the bot can be driven by a container built on
//! any `UnitOfWork` and any `BotApi`.

use std::sync::Arc;

use super::{
    Aggregator, AuthService, Authenticator, CheckinRecorder, CheckinService, MembershipManager,
    MembershipService, NotificationService, Notifier, ReminderPlanner, ReminderService,
    ReportService, Reporter, SettingsManager, SettingsService, StatsService,
};
use crate::config::Config;
use crate::infra::UnitOfWork;
use crate::telegram::BotApi;
use crate::utils::ChartRenderer;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn memberships(&self) -> Arc<dyn MembershipService>;

    fn checkins(&self) -> Arc<dyn CheckinService>;

    fn reports(&self) -> Arc<dyn ReportService>;

    fn settings(&self) -> Arc<dyn SettingsService>;

    fn stats(&self) -> Arc<dyn StatsService>;

    fn reminders(&self) -> Arc<dyn ReminderService>;

    fn notifications(&self) -> Arc<dyn NotificationService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    membership_service: Arc<dyn MembershipService>,
    checkin_service: Arc<dyn CheckinService>,
    report_service: Arc<dyn ReportService>,
    settings_service: Arc<dyn SettingsService>,
    stats_service: Arc<dyn StatsService>,
    reminder_service: Arc<dyn ReminderService>,
    notification_service: Arc<dyn NotificationService>,
}

impl Services {
    /// Wire every service on top of one Unit of Work and one Bot API client.
    pub fn build<U: UnitOfWork + 'static>(
        uow: Arc<U>,
        bot: Arc<dyn BotApi>,
        config: Config,
    ) -> Self {
        let chart = ChartRenderer::new(config.chart_font_path.as_deref());

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config.clone())),
            membership_service: Arc::new(MembershipManager::new(uow.clone(), config.clone())),
            checkin_service: Arc::new(CheckinRecorder::new(uow.clone())),
            report_service: Arc::new(Reporter::new(uow.clone(), config.clone(), chart)),
            settings_service: Arc::new(SettingsManager::new(uow.clone(), config)),
            stats_service: Arc::new(Aggregator::new(uow.clone())),
            reminder_service: Arc::new(ReminderPlanner::new(uow)),
            notification_service: Arc::new(Notifier::new(bot)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn memberships(&self) -> Arc<dyn MembershipService> {
        self.membership_service.clone()
    }

    fn checkins(&self) -> Arc<dyn CheckinService> {
        self.checkin_service.clone()
    }

    fn reports(&self) -> Arc<dyn ReportService> {
        self.report_service.clone()
    }

    fn settings(&self) -> Arc<dyn SettingsService> {
        self.settings_service.clone()
    }

    fn stats(&self) -> Arc<dyn StatsService> {
        self.stats_service.clone()
    }

    fn reminders(&self) -> Arc<dyn ReminderService> {
        self.reminder_service.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.notification_service.clone()
    }
}
