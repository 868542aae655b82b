//! Seed command - demo data for local development.

use std::sync::Arc;

use crate::config::{
    Config, SEED_CHAT_ID, SEED_CHAT_TITLE, SEED_OWNER_FULL_NAME, SEED_OWNER_TELEGRAM_ID,
    SEED_OWNER_USERNAME,
};
use crate::domain::{Role, UserProfile};
use crate::errors::AppResult;
use crate::infra::{Persistence, UnitOfWork};

use super::connect_database;

/// Execute the seed command
pub async fn execute(config: Config) -> AppResult<()> {
    let db = connect_database(&config).await?;
    let uow = Arc::new(Persistence::new(db.get_connection()));

    let created = seed_demo_data(uow.as_ref(), &config).await?;
    if !created {
        tracing::info!("Demo data already present");
    }
    println!("Seed completed");
    Ok(())
}

/// Owner user, demo chat and an authorized manager membership between them.
/// Returns false when the membership already existed.
pub async fn seed_demo_data<U: UnitOfWork>(uow: &U, config: &Config) -> AppResult<bool> {
    let user = uow
        .users()
        .upsert_profile(
            UserProfile {
                telegram_id: SEED_OWNER_TELEGRAM_ID,
                username: Some(SEED_OWNER_USERNAME.to_string()),
                full_name: Some(SEED_OWNER_FULL_NAME.to_string()),
            },
            None,
        )
        .await?;

    let chat = uow
        .chats()
        .get_or_create(
            SEED_CHAT_ID,
            Some(SEED_CHAT_TITLE.to_string()),
            config.timezone.name().to_string(),
        )
        .await?;

    let memberships = uow.memberships();
    if memberships.find(user.id, chat.id).await?.is_some() {
        return Ok(false);
    }
    memberships
        .create(user.id, chat.id, Role::Manager, true, None)
        .await?;

    tracing::info!(user_id = user.id, chat_id = chat.id, "Demo data inserted");
    Ok(true)
}
