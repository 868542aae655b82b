//! Jobs command - run a scheduled job once.
//!
//! ## Usage
//!
//! ```bash
//! # Send reminders due right now
//! shift-bot jobs remind
//!
//! # Aggregate a specific day
//! shift-bot jobs aggregate --date 2024-05-01
//! ```

use chrono::Utc;
use std::sync::Arc;

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Persistence;
use crate::jobs::{run_aggregation, run_reminders};
use crate::services::{ServiceContainer, Services};
use crate::telegram::{BotApi, HttpBotApi};

use super::{connect_database, connect_state};

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    let db = connect_database(&config).await?;
    let bot: Arc<dyn BotApi> = Arc::new(HttpBotApi::new(
        &config.telegram_api_url,
        config.bot_token()?,
    )?);
    let services = Services::build(
        Arc::new(Persistence::new(db.get_connection())),
        bot,
        config.clone(),
    );

    match args.action {
        JobsAction::Remind => {
            let sent = run_reminders(
                services.reminders().as_ref(),
                services.notifications().as_ref(),
                Utc::now(),
            )
            .await?;
            println!("Reminders sent: {}", sent);
        }
        JobsAction::Aggregate { date } => {
            let (cache, _) = connect_state(&config).await;
            match run_aggregation(services.stats().as_ref(), cache.as_ref(), date).await? {
                Some(rows) => println!("Daily stats rows written: {}", rows),
                None => println!("Aggregation is running elsewhere, skipped"),
            }
        }
    }

    Ok(())
}
