//! Membership repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::membership::{self, ActiveModel, Entity as MembershipEntity};
use crate::domain::{AuthMethod, Membership, Role};
use crate::errors::{is_unique_violation, AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Membership repository trait for dependency injection.
///
/// `user_id` and `chat_id` are database ids, not Telegram ids.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Find the membership of a user in a chat
    async fn find(&self, user_id: i32, chat_id: i32) -> AppResult<Option<Membership>>;

    /// All memberships of a user, oldest first
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Membership>>;

    /// Authorized memberships of a user, oldest first
    async fn list_authorized_for_user(&self, user_id: i32) -> AppResult<Vec<Membership>>;

    /// OPERATOR memberships of a chat, optionally only authorized ones
    async fn list_operators(&self, chat_id: i32, authorized_only: bool)
        -> AppResult<Vec<Membership>>;

    /// Create an authorized OPERATOR membership, or mark the existing one
    /// authorized with the given method.
    async fn authorize(&self, user_id: i32, chat_id: i32, method: AuthMethod)
        -> AppResult<Membership>;

    /// Change the role, creating an unauthorized membership when missing.
    async fn set_role(&self, user_id: i32, chat_id: i32, role: Role) -> AppResult<Membership>;

    /// Insert a membership as is. A duplicate (user, chat) pair is a `Conflict`.
    async fn create(
        &self,
        user_id: i32,
        chat_id: i32,
        role: Role,
        authorized: bool,
        authorized_via: Option<AuthMethod>,
    ) -> AppResult<Membership>;
}

enum Lookup {
    Found(membership::Model),
    Created(Membership),
}

/// Concrete implementation of MembershipRepository
pub struct MembershipStore {
    db: DatabaseConnection,
}

impl MembershipStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, user_id: i32, chat_id: i32) -> AppResult<Option<membership::Model>> {
        MembershipEntity::find()
            .filter(membership::Column::UserId.eq(user_id))
            .filter(membership::Column::ChatId.eq(chat_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)
    }

    /// Existing row, or a freshly inserted one. When a concurrent insert wins
    /// the unique key race the winner's row is re-read.
    async fn find_or_create(
        &self,
        user_id: i32,
        chat_id: i32,
        role: Role,
        authorized_via: Option<AuthMethod>,
    ) -> AppResult<Lookup> {
        if let Some(model) = self.find_model(user_id, chat_id).await? {
            return Ok(Lookup::Found(model));
        }
        match self
            .create(user_id, chat_id, role, authorized_via.is_some(), authorized_via)
            .await
        {
            Ok(created) => Ok(Lookup::Created(created)),
            Err(AppError::Conflict(_)) => {
                tracing::debug!(user_id, chat_id, "Membership created concurrently, re-reading");
                let model = self.find_model(user_id, chat_id).await?.ok_or_not_found()?;
                Ok(Lookup::Found(model))
            }
            Err(e) => Err(e),
        }
    }
}

fn into_domain(models: Vec<membership::Model>) -> AppResult<Vec<Membership>> {
    models.into_iter().map(Membership::try_from).collect()
}

#[async_trait]
impl MembershipRepository for MembershipStore {
    async fn find(&self, user_id: i32, chat_id: i32) -> AppResult<Option<Membership>> {
        self.find_model(user_id, chat_id)
            .await?
            .map(Membership::try_from)
            .transpose()
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Membership>> {
        let models = MembershipEntity::find()
            .filter(membership::Column::UserId.eq(user_id))
            .order_by_asc(membership::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        into_domain(models)
    }

    async fn list_authorized_for_user(&self, user_id: i32) -> AppResult<Vec<Membership>> {
        let models = MembershipEntity::find()
            .filter(membership::Column::UserId.eq(user_id))
            .filter(membership::Column::Authorized.eq(true))
            .order_by_asc(membership::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        into_domain(models)
    }

    async fn list_operators(
        &self,
        chat_id: i32,
        authorized_only: bool,
    ) -> AppResult<Vec<Membership>> {
        let mut query = MembershipEntity::find()
            .filter(membership::Column::ChatId.eq(chat_id))
            .filter(membership::Column::Role.eq(Role::Operator.as_str()));
        if authorized_only {
            query = query.filter(membership::Column::Authorized.eq(true));
        }

        let models = query
            .order_by_asc(membership::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        into_domain(models)
    }

    async fn authorize(
        &self,
        user_id: i32,
        chat_id: i32,
        method: AuthMethod,
    ) -> AppResult<Membership> {
        let model = match self
            .find_or_create(user_id, chat_id, Role::Operator, Some(method))
            .await?
        {
            Lookup::Found(model) => model,
            Lookup::Created(created) => return Ok(created),
        };

        let mut active: ActiveModel = model.into();
        active.authorized = Set(true);
        active.authorized_via = Set(Some(method.as_str().to_string()));
        active.updated_at = Set(chrono::Utc::now());
        let model = active.update(&self.db).await.map_err(AppError::from)?;

        Membership::try_from(model)
    }

    async fn set_role(&self, user_id: i32, chat_id: i32, role: Role) -> AppResult<Membership> {
        let model = match self.find_or_create(user_id, chat_id, role, None).await? {
            Lookup::Found(model) => model,
            Lookup::Created(created) => return Ok(created),
        };

        let mut active: ActiveModel = model.into();
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now());
        let model = active.update(&self.db).await.map_err(AppError::from)?;

        Membership::try_from(model)
    }

    async fn create(
        &self,
        user_id: i32,
        chat_id: i32,
        role: Role,
        authorized: bool,
        authorized_via: Option<AuthMethod>,
    ) -> AppResult<Membership> {
        let now = chrono::Utc::now();
        let active = ActiveModel {
            user_id: Set(user_id),
            chat_id: Set(chat_id),
            role: Set(role.as_str().to_string()),
            authorized: Set(authorized),
            authorized_via: Set(authorized_via.map(|m| m.as_str().to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("Membership")
            } else {
                AppError::from(e)
            }
        })?;
        Membership::try_from(model)
    }
}
