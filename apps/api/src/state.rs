use std::sync::Arc;

use crate::config::Config;
use crate::emoji::store::EmojiStore;
use crate::errors::AppError;
use crate::render::FontLibrary;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable emoji backend. `None` when no Slack token is configured.
    pub emoji_store: Option<Arc<dyn EmojiStore>>,
    /// Font database cloned into a fresh canvas surface per render.
    pub fonts: FontLibrary,
}

impl AppState {
    pub fn emoji_store(&self) -> Result<&Arc<dyn EmojiStore>, AppError> {
        self.emoji_store.as_ref().ok_or(AppError::SlackNotConfigured)
    }
}
