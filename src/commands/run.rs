//! Run command - starts the bot.

use std::sync::Arc;
use tokio::sync::watch;

use crate::api::{self, AppState};
use crate::bot::{run_polling, BotContext, Dispatcher};
use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Persistence;
use crate::jobs::Scheduler;
use crate::services::{ServiceContainer, Services};
use crate::telegram::{BotApi, HttpBotApi};

use super::{connect_database, connect_state};

/// Execute the run command
pub async fn execute(args: RunArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting bot...");

    let api: Arc<dyn BotApi> = Arc::new(HttpBotApi::new(
        &config.telegram_api_url,
        config.bot_token()?,
    )?);
    let me = api.get_me().await?;
    tracing::info!(bot = ?me.username, id = me.id, "Authorized with Telegram");

    let database = Arc::new(connect_database(&config).await?);
    let (cache, state_store) = connect_state(&config).await;
    tracing::info!(backend = state_store.backend(), "Conversation state ready");

    let services: Arc<dyn ServiceContainer> = Arc::new(Services::build(
        Arc::new(Persistence::new(database.get_connection())),
        api.clone(),
        config.clone(),
    ));
    services.settings().ensure_global_defaults().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler = Scheduler::new(services.clone(), cache, &config)?;
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx.clone()));

    let health_state = AppState::new(database, state_store.clone());
    let health_addr = args.health_addr(&config);
    let health_shutdown = shutdown_rx.clone();
    let health_task = tokio::spawn(async move {
        if let Err(e) = api::serve(&health_addr, health_state, health_shutdown).await {
            tracing::error!(error = %e, "Health endpoint stopped");
        }
    });

    let context = BotContext::new(api, services, state_store, config, &me);
    let dispatcher = Dispatcher::new(Arc::new(context));
    let polling_task = tokio::spawn(run_polling(dispatcher, shutdown_rx));

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Received shutdown signal, stopping...");
    // Receivers outlive the sender only if a task already exited.
    let _ = shutdown_tx.send(true);

    for (name, task) in [
        ("polling", polling_task),
        ("scheduler", scheduler_task),
        ("health", health_task),
    ] {
        if let Err(e) = task.await {
            tracing::error!(task = name, error = %e, "Task panicked");
        }
    }

    tracing::info!("Bot stopped");
    Ok(())
}
