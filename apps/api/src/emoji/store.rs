//! Emoji store: pluggable backend for reading and adding workspace emojis.
//!
//! Default: `SlackEmojiStore` over the Slack Web API.
//! `AppState` holds an `Option<Arc<dyn EmojiStore>>`; `None` when no token is configured.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::slack_client::SlackClient;

/// The emoji backend trait. Implement this to swap backends without touching
/// the handlers.
#[async_trait]
pub trait EmojiStore: Send + Sync {
    /// Every emoji in the workspace: name → image URL or `alias:<name>`.
    async fn list(&self) -> Result<HashMap<String, String>, AppError>;

    /// Adds a custom emoji. `name` is already normalised, `image` already validated.
    async fn add(&self, name: &str, image: Vec<u8>) -> Result<(), AppError>;
}

pub struct SlackEmojiStore(pub SlackClient);

#[async_trait]
impl EmojiStore for SlackEmojiStore {
    async fn list(&self) -> Result<HashMap<String, String>, AppError> {
        Ok(self.0.list_emoji().await?)
    }

    async fn add(&self, name: &str, image: Vec<u8>) -> Result<(), AppError> {
        Ok(self.0.add_emoji(name, &image).await?)
    }
}
