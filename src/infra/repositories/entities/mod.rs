//! SeaORM entities, one module per table.

pub mod chat;
pub mod checkin;
pub mod daily_stat;
pub mod membership;
pub mod settings;
pub mod user;
