//! linequiz — webhook-driven LINE quiz bot.

pub mod config;
pub mod error;
pub mod images;
pub mod line;
pub mod quiz;
pub mod server;
