//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{PhoneVerification, User, UserProfile};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by Telegram id
    async fn find_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<User>>;

    /// Find user by username (without the leading `@`)
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Load users by database ids, ordered by id
    async fn find_by_ids(&self, ids: Vec<i32>) -> AppResult<Vec<User>>;

    /// Create the user or refresh its profile. A phone verification, when
    /// given, replaces the stored digest and verification time.
    async fn upsert_profile(
        &self,
        profile: UserProfile,
        phone: Option<PhoneVerification>,
    ) -> AppResult<User>;

    /// Store the preferred locale
    async fn set_locale(&self, id: i32, locale: String) -> AppResult<User>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::TelegramId.eq(telegram_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_ids(&self, ids: Vec<i32>) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn upsert_profile(
        &self,
        profile: UserProfile,
        phone: Option<PhoneVerification>,
    ) -> AppResult<User> {
        let now = chrono::Utc::now();
        let existing = UserEntity::find()
            .filter(user::Column::TelegramId.eq(profile.telegram_id))
            .one(&self.db)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active: ActiveModel = model.into();
                active.username = Set(profile.username);
                active.full_name = Set(profile.full_name);
                if let Some(phone) = phone {
                    active.phone_sha256 = Set(Some(phone.sha256));
                    active.phone_last4 = Set(Some(phone.last4));
                    active.phone_verified_at = Set(Some(now));
                }
                active.update(&self.db).await.map_err(AppError::from)?
            }
            None => {
                let verified_at = phone.as_ref().map(|_| now);
                let (sha256, last4) = match phone {
                    Some(phone) => (Some(phone.sha256), Some(phone.last4)),
                    None => (None, None),
                };
                let active = ActiveModel {
                    telegram_id: Set(profile.telegram_id),
                    username: Set(profile.username),
                    full_name: Set(profile.full_name),
                    phone_last4: Set(last4),
                    phone_sha256: Set(sha256),
                    phone_verified_at: Set(verified_at),
                    dm_blocked: Set(false),
                    locale: Set(None),
                    created_at: Set(now),
                    ..Default::default()
                };
                active.insert(&self.db).await.map_err(AppError::from)?
            }
        };

        Ok(User::from(model))
    }

    async fn set_locale(&self, id: i32, locale: String) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = user.into();
        active.locale = Set(Some(locale));

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }
}
