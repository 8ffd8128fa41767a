//! Telegram bot that hands out catalog videos by numeric code to users
//! subscribed to every sponsor channel.

pub mod admin;
pub mod catalog;
pub mod config;
pub mod event;
pub mod gate;
pub mod handlers;
pub mod model;
pub mod platform;
pub mod store;
pub mod texts;
