//! Long polling loop.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};

use super::Dispatcher;
use crate::config::{POLL_ERROR_BACKOFF_SECONDS, POLL_TIMEOUT_SECONDS};
use crate::telegram::TelegramError;

/// Poll `getUpdates` until `shutdown` flips to true.
///
/// Each update runs in its own task so a slow handler (chart rendering,
/// uploads) does not hold back other users. Updates of one sender wait for
/// the previous one, and in-flight handlers finish before this returns.
pub async fn run_polling(dispatcher: Dispatcher, mut shutdown: watch::Receiver<bool>) {
    let api = dispatcher.context().api.clone();
    let mut offset: i64 = 0;
    let mut tasks = JoinSet::new();
    // Completion signal of the latest task per sender
    let mut tails: HashMap<i64, oneshot::Receiver<()>> = HashMap::new();

    tracing::info!(bot = %dispatcher.context().bot_username, "Polling started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let updates = tokio::select! {
            result = api.get_updates(offset, POLL_TIMEOUT_SECONDS) => result,
            _ = shutdown.changed() => break,
        };

        let delay = match updates {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let (done, tail) = oneshot::channel::<()>();
                    let previous = update.sender_id().and_then(|id| tails.insert(id, tail));
                    let dispatcher = dispatcher.clone();
                    tasks.spawn(async move {
                        if let Some(previous) = previous {
                            let _ = previous.await;
                        }
                        dispatcher.handle(update).await;
                        drop(done);
                    });
                }
                tails.retain(|_, tail| matches!(tail.try_recv(), Err(TryRecvError::Empty)));
                while let Some(result) = tasks.try_join_next() {
                    log_join(result);
                }
                continue;
            }
            Err(TelegramError::RetryAfter(seconds)) => {
                tracing::warn!(seconds, "getUpdates throttled");
                Duration::from_secs(seconds)
            }
            Err(e) => {
                tracing::error!(error = %e, "getUpdates failed");
                Duration::from_secs(POLL_ERROR_BACKOFF_SECONDS)
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
    }

    if !tasks.is_empty() {
        tracing::info!(pending = tasks.len(), "Waiting for in-flight updates");
    }
    while let Some(result) = tasks.join_next().await {
        log_join(result);
    }

    tracing::info!("Polling stopped");
}

fn log_join(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            tracing::error!(error = %e, "Update handler panicked");
        }
    }
}
