//! Guide bot
//!
//! A Telegram bot that serves a fixed catalog of articles through inline
//! menu navigation. Section bodies are stored as markup, rendered to plain
//! text and split into message-sized chunks on demand.

/// Telegram glue: handlers, transport and resilient sends
pub mod bot;
/// Section catalog
pub mod catalog;
/// Settings and Telegram constants
pub mod config;
/// Liveness HTTP endpoint
pub mod health;
/// Menu navigation state machine
pub mod navigation;
/// Markup to plain text and chunking
pub mod render;
/// Shared helpers
pub mod utils;
