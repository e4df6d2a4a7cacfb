pub mod config;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod fetcher;
pub mod models;
pub mod retry;
pub mod service;
pub mod transport;

pub use crate::config::Config;
pub use crate::error::{ChatError, FetchError, Result};
pub use crate::fallback::FallbackResponder;
pub use crate::fetcher::ResilientFetcher;
pub use crate::models::{BotReply, ChatMessage, MessageId, Source};
pub use crate::service::{ChatService, ChatUi};
