//! Update handlers, one module per feature area.

pub mod admin;
pub mod auth;
pub mod checkins;
pub mod group;
pub mod reports;
pub mod settings;
