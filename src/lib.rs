// src/lib.rs

pub mod api;
pub mod app;
pub mod chat;
pub mod chat_message;
pub mod config;
pub mod constants;
pub mod errors;
pub mod key_handlers;
pub mod log_view;
pub mod logging;
pub mod models;
pub mod orb;
pub mod status_line;
pub mod token_store;
pub mod ui;

pub use api::{ApiClient, ClientEvent};
pub use chat::{ChatPanel, ChatState};
pub use errors::{ApiError, ChatError, GltchError, GltchResult};
pub use orb::{OrbState, OrbVisual};
