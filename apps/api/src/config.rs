use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::layout::{MarginPolicy, SizeBounds};
use crate::slack_client::DEFAULT_API_BASE;

/// Application configuration loaded from environment variables.
/// Nothing is required: without a Slack token the Slack routes answer 503.
#[derive(Debug, Clone)]
pub struct Config {
    pub slack_token: Option<String>,
    pub slack_api_base: String,
    pub port: u16,
    pub rust_log: String,
    pub font_dir: Option<PathBuf>,
    pub load_system_fonts: bool,
    pub default_margin: MarginPolicy,
    pub default_max_font_px: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let default_margin = match optional_env("AUTOFIT_MARGIN") {
            Some(v) => v
                .parse::<MarginPolicy>()
                .map_err(|e| anyhow!("AUTOFIT_MARGIN: {e}"))?,
            None => MarginPolicy::default(),
        };

        let default_max_font_px = match optional_env("AUTOFIT_MAX_PX") {
            Some(v) => {
                let max = v
                    .parse::<u32>()
                    .context("AUTOFIT_MAX_PX must be a positive integer")?;
                SizeBounds::new(1, max).map_err(|e| anyhow!("AUTOFIT_MAX_PX: {e}"))?;
                max
            }
            None => SizeBounds::DEFAULT_MAX,
        };

        Ok(Config {
            // The front-end historically shared a VITE_-prefixed variable with the proxy.
            slack_token: optional_env("SLACK_TOKEN").or_else(|| optional_env("VITE_SLACK_TOKEN")),
            slack_api_base: optional_env("SLACK_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            font_dir: optional_env("FONT_DIR").map(PathBuf::from),
            load_system_fonts: parse_bool(optional_env("LOAD_SYSTEM_FONTS").as_deref(), true)
                .context("LOAD_SYSTEM_FONTS must be true or false")?,
            default_margin,
            default_max_font_px,
        })
    }
}

/// Reads a variable, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: Option<&str>, default: bool) -> Result<bool> {
    match value.map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(anyhow!("invalid boolean '{other}'")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(None, true).unwrap());
        assert!(!parse_bool(None, false).unwrap());
        assert!(parse_bool(Some("YES"), false).unwrap());
        assert!(!parse_bool(Some("0"), true).unwrap());
        assert!(parse_bool(Some("maybe"), true).is_err());
    }
}
