//! Membership service - chats, roles and per-user preferences.

use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::{Chat, Membership, Role, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Who `/setrole` is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleTarget {
    Username(String),
    TelegramId(i64),
}

impl FromStr for RoleTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('@') {
            Some(username) => Ok(RoleTarget::Username(username.to_string())),
            None => s
                .parse()
                .map(RoleTarget::TelegramId)
                .map_err(|_| AppError::validation("Неверный идентификатор")),
        }
    }
}

/// Result of a role assignment
#[derive(Debug, Clone, PartialEq)]
pub enum RoleChange {
    /// No user with that @username
    UnknownUsername,
    /// The user never talked to the bot
    UnknownUser,
    Updated(Membership),
}

/// A user's first membership with its chat. Reports, exports and settings
/// all operate on it.
pub(crate) async fn first_membership<U: UnitOfWork>(
    uow: &U,
    telegram_id: i64,
) -> AppResult<Option<(User, Membership, Chat)>> {
    let Some(user) = uow.users().find_by_telegram_id(telegram_id).await? else {
        return Ok(None);
    };
    let Some(membership) = uow.memberships().list_for_user(user.id).await?.into_iter().next() else {
        return Ok(None);
    };
    let Some(chat) = uow.chats().find_by_id(membership.chat_id).await? else {
        return Ok(None);
    };
    Ok(Some((user, membership, chat)))
}

/// Membership service trait for dependency injection.
#[async_trait]
pub trait MembershipService: Send + Sync {
    /// Register a group (or refresh its title) when the bot joins it.
    async fn register_chat(&self, chat_id: i64, title: Option<String>) -> AppResult<Chat>;

    /// All memberships of a user with their chats.
    async fn roles(&self, telegram_id: i64) -> AppResult<Vec<(Chat, Membership)>>;

    /// Assign a role inside a group. A membership created here is not authorized.
    async fn set_role(
        &self,
        chat_id: i64,
        chat_title: Option<String>,
        target: RoleTarget,
        role: Role,
    ) -> AppResult<RoleChange>;

    /// Flip the stored locale, returning the new one. `None` for unknown users.
    async fn toggle_locale(&self, telegram_id: i64) -> AppResult<Option<String>>;
}

/// Concrete implementation of MembershipService using Unit of Work.
pub struct MembershipManager<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> MembershipManager<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    fn default_timezone(&self) -> String {
        self.config.timezone.name().to_string()
    }
}

#[async_trait]
impl<U: UnitOfWork> MembershipService for MembershipManager<U> {
    async fn register_chat(&self, chat_id: i64, title: Option<String>) -> AppResult<Chat> {
        self.uow
            .chats()
            .upsert_title(chat_id, title, self.default_timezone())
            .await
    }

    async fn roles(&self, telegram_id: i64) -> AppResult<Vec<(Chat, Membership)>> {
        let Some(user) = self.uow.users().find_by_telegram_id(telegram_id).await? else {
            return Ok(Vec::new());
        };

        let mut roles = Vec::new();
        for membership in self.uow.memberships().list_for_user(user.id).await? {
            if let Some(chat) = self.uow.chats().find_by_id(membership.chat_id).await? {
                roles.push((chat, membership));
            }
        }
        Ok(roles)
    }

    async fn set_role(
        &self,
        chat_id: i64,
        chat_title: Option<String>,
        target: RoleTarget,
        role: Role,
    ) -> AppResult<RoleChange> {
        let users = self.uow.users();
        let user = match target {
            RoleTarget::Username(username) => match users.find_by_username(&username).await? {
                Some(user) => user,
                None => return Ok(RoleChange::UnknownUsername),
            },
            RoleTarget::TelegramId(telegram_id) => {
                match users.find_by_telegram_id(telegram_id).await? {
                    Some(user) => user,
                    None => return Ok(RoleChange::UnknownUser),
                }
            }
        };

        let chat = self
            .uow
            .chats()
            .get_or_create(chat_id, chat_title, self.default_timezone())
            .await?;
        let membership = self
            .uow
            .memberships()
            .set_role(user.id, chat.id, role)
            .await?;

        tracing::info!(
            chat_id,
            telegram_id = user.telegram_id,
            role = %role,
            "Role updated"
        );

        Ok(RoleChange::Updated(membership))
    }

    async fn toggle_locale(&self, telegram_id: i64) -> AppResult<Option<String>> {
        let Some(user) = self.uow.users().find_by_telegram_id(telegram_id).await? else {
            return Ok(None);
        };
        let locale = user.toggled_locale().to_string();
        self.uow.users().set_locale(user.id, locale.clone()).await?;
        Ok(Some(locale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Mocks;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn user(id: i32, telegram_id: i64, locale: Option<&str>) -> User {
        User {
            id,
            telegram_id,
            username: None,
            full_name: None,
            phone_last4: None,
            phone_sha256: None,
            phone_verified_at: None,
            dm_blocked: false,
            locale: locale.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_target_parsing() {
        assert_eq!(
            "@ivan".parse::<RoleTarget>().unwrap(),
            RoleTarget::Username("ivan".to_string())
        );
        assert_eq!(
            "123".parse::<RoleTarget>().unwrap(),
            RoleTarget::TelegramId(123)
        );
        assert!(matches!(
            "abc".parse::<RoleTarget>(),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_set_role_for_unknown_username() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_username()
            .withf(|username| username == "ghost")
            .returning(|_| Ok(None));

        let service = MembershipManager::new(mocks.into_uow(), Config::default());
        let result = service
            .set_role(
                -100,
                None,
                RoleTarget::Username("ghost".to_string()),
                Role::Manager,
            )
            .await
            .unwrap();

        assert_eq!(result, RoleChange::UnknownUsername);
    }

    #[tokio::test]
    async fn test_set_role_for_user_without_profile() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_telegram_id()
            .with(eq(55_i64))
            .returning(|_| Ok(None));

        let service = MembershipManager::new(mocks.into_uow(), Config::default());
        let result = service
            .set_role(-100, None, RoleTarget::TelegramId(55), Role::Operator)
            .await
            .unwrap();

        assert_eq!(result, RoleChange::UnknownUser);
    }

    #[tokio::test]
    async fn test_toggle_locale() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_telegram_id()
            .returning(|id| Ok(Some(user(1, id, None))));
        mocks
            .users
            .expect_set_locale()
            .with(eq(1), eq("en".to_string()))
            .returning(|id, locale| Ok(user(id, 9, Some(&locale))));

        let service = MembershipManager::new(mocks.into_uow(), Config::default());
        assert_eq!(service.toggle_locale(9).await.unwrap().as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_toggle_locale_requires_known_user() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_telegram_id()
            .returning(|_| Ok(None));

        let service = MembershipManager::new(mocks.into_uow(), Config::default());
        assert_eq!(service.toggle_locale(9).await.unwrap(), None);
    }
}
