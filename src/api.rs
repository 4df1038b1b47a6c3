//! HTTP API for the chat page

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::chat::ChatService;
use crate::llm::LanguageModel;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            chat: Arc::new(ChatService::new(model)),
        }
    }
}
