//! Telegram bot layer - routing updates to handlers.

pub mod command;
mod context;
mod dispatcher;
pub mod handlers;
pub mod keyboards;
mod polling;
pub mod texts;

pub use command::Command;
pub use context::BotContext;
pub use dispatcher::Dispatcher;
pub use polling::run_polling;
