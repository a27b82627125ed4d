//! Core domain + application logic for the link-shortening bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the Cuttly
//! HTTP API live behind ports (traits) implemented in adapter crates.

pub mod actions;
pub mod bot;
pub mod bulk;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod links;
pub mod logging;
pub mod messaging;
pub mod replies;
pub mod shortener;
pub mod usage;
pub mod validation;

pub use errors::{Error, Result};
