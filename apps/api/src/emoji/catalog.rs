//! Custom-emoji listing: filter, search, sort and paginate the workspace emoji map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_PER_PAGE: u32 = 25;
pub const MAX_PER_PAGE: u32 = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct EmojiListQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for EmojiListQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// One page of custom emojis. Each entry serialises as `[name, url]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmojiPage {
    pub emojis: Vec<(String, String)>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: usize,
}

/// Builds the requested page from the raw `name → url | alias:<name>` map.
///
/// Aliases are dropped; only entries whose value is an http(s) URL count as
/// custom emojis. The search is a case-insensitive substring match on the name.
/// A page past the end is returned empty.
pub fn build_page(
    emoji: HashMap<String, String>,
    query: &EmojiListQuery,
) -> Result<EmojiPage, AppError> {
    if query.page == 0 {
        return Err(AppError::Validation("page must be 1 or greater".to_string()));
    }
    if query.per_page == 0 || query.per_page > MAX_PER_PAGE {
        return Err(AppError::Validation(format!(
            "per_page must be between 1 and {MAX_PER_PAGE}"
        )));
    }

    let needle = query.query.trim().to_lowercase();
    let mut custom: Vec<(String, String)> = emoji
        .into_iter()
        .filter(|(_, url)| url.starts_with("http"))
        .filter(|(name, _)| needle.is_empty() || name.to_lowercase().contains(&needle))
        .collect();
    custom.sort();

    let total = custom.len();
    let per_page = query.per_page as usize;
    let start = (query.page as usize - 1).saturating_mul(per_page);
    let emojis = custom.into_iter().skip(start).take(per_page).collect();

    Ok(EmojiPage {
        emojis,
        total,
        page: query.page,
        per_page: query.per_page,
        total_pages: total.div_ceil(per_page),
    })
}
