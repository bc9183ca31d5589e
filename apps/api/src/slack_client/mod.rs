/// Slack client: the single point of entry for Slack Web API calls.
///
/// Only two methods are used: `emoji.list` (read the workspace's emoji map) and
/// `emoji.add` (upload a custom emoji from image bytes, `mode=data`).
///
/// Slack reports most failures as HTTP 200 with `{"ok": false, "error": "..."}`;
/// those are classified into auth failures and other rejections here.
use std::collections::HashMap;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::emoji::upload::ImageKind;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";
const MAX_RETRIES: u32 = 3;
const MAX_RETRY_AFTER_SECS: u64 = 30;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack error codes that mean the token cannot be used for emoji calls.
const AUTH_ERROR_CODES: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "token_expired",
    "token_revoked",
    "account_inactive",
    "missing_scope",
    "not_allowed_token_type",
];

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Slack rejected the token: {0}")]
    Auth(String),

    #[error("Slack rejected the request: {0}")]
    Rejected(String),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

#[derive(Debug, Deserialize)]
struct EmojiListResponse {
    ok: bool,
    #[serde(default)]
    emoji: HashMap<String, String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Ack {
    ok: bool,
    error: Option<String>,
}

#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    token: String,
    api_base: String,
}

impl SlackClient {
    pub fn new(token: String, api_base: &str) -> Result<Self, SlackError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base)
    }

    /// Returns every emoji in the workspace: name → image URL or `alias:<name>`.
    pub async fn list_emoji(&self) -> Result<HashMap<String, String>, SlackError> {
        let response = self
            .send_with_retry(|| Ok(self.client.get(self.url("emoji.list")).bearer_auth(&self.token)))
            .await?;

        let body: EmojiListResponse = response.json().await?;
        check_ok(body.ok, body.error)?;
        debug!(count = body.emoji.len(), "Slack emoji.list succeeded");
        Ok(body.emoji)
    }

    /// Uploads `image` (PNG, GIF or JPEG bytes) as a custom emoji called `name`.
    pub async fn add_emoji(&self, name: &str, image: &[u8]) -> Result<(), SlackError> {
        let (mime, file_name) = image_part_meta(name, image);
        let response = self
            .send_with_retry(|| {
                let part = Part::bytes(image.to_vec())
                    .file_name(file_name.clone())
                    .mime_str(mime)?;
                let form = Form::new()
                    .text("mode", "data")
                    .text("name", name.to_string())
                    .part("image", part);
                Ok(self
                    .client
                    .post(self.url("emoji.add"))
                    .bearer_auth(&self.token)
                    .multipart(form))
            })
            .await?;

        let body: Ack = response.json().await?;
        check_ok(body.ok, body.error)?;
        debug!(name, "Slack emoji.add succeeded");
        Ok(())
    }

    /// Sends a request, retrying 429 and 5xx with backoff.
    ///
    /// `build` is called once per attempt because multipart bodies cannot be cloned.
    async fn send_with_retry<F>(&self, build: F) -> Result<Response, SlackError>
    where
        F: Fn() -> Result<RequestBuilder, SlackError>,
    {
        let mut last_error: Option<SlackError> = None;
        let mut retry_after: Option<u64> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = retry_delay(attempt, retry_after.take());
                warn!(
                    "Slack call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build()?.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(SlackError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok());
                warn!(?retry_after, "Slack API rate limited");
                last_error = Some(SlackError::RateLimited { retries: attempt + 1 });
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Slack API returned {}: {}", status, body);
                last_error = Some(SlackError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SlackError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(SlackError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Backoff before retry `attempt` (1-based): `Retry-After` if Slack sent one,
/// otherwise doubling from 1s. With three attempts only the 1s and 2s waits occur.
fn retry_delay(attempt: u32, retry_after_secs: Option<u64>) -> Duration {
    match retry_after_secs {
        Some(secs) => Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS)),
        None => Duration::from_millis(1000 * (1 << (attempt.saturating_sub(1)))),
    }
}

/// Mime type and file name for the uploaded image part. Unknown bytes go out as PNG.
fn image_part_meta(name: &str, image: &[u8]) -> (&'static str, String) {
    let kind = ImageKind::detect(image).unwrap_or(ImageKind::Png);
    (kind.mime(), format!("{name}.{}", kind.extension()))
}

/// Turns Slack's `ok`/`error` envelope into a result.
fn check_ok(ok: bool, error: Option<String>) -> Result<(), SlackError> {
    if ok {
        return Ok(());
    }
    let code = error.unwrap_or_else(|| "unknown_error".to_string());
    if AUTH_ERROR_CODES.contains(&code.as_str()) {
        Err(SlackError::Auth(code))
    } else {
        Err(SlackError::Rejected(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_ok_passes_success() {
        assert!(check_ok(true, None).is_ok());
    }

    #[test]
    fn test_check_ok_classifies_auth_errors() {
        for code in ["invalid_auth", "not_authed", "token_expired", "missing_scope"] {
            assert!(
                matches!(check_ok(false, Some(code.to_string())), Err(SlackError::Auth(c)) if c == code),
                "{code}"
            );
        }
    }

    #[test]
    fn test_check_ok_other_errors_are_rejections() {
        assert!(matches!(
            check_ok(false, Some("error_name_taken".to_string())),
            Err(SlackError::Rejected(c)) if c == "error_name_taken"
        ));
        assert!(matches!(
            check_ok(false, None),
            Err(SlackError::Rejected(c)) if c == "unknown_error"
        ));
    }

    #[test]
    fn test_retry_delay_backoff() {
        assert_eq!(retry_delay(1, None), Duration::from_secs(1));
        assert_eq!(retry_delay(2, None), Duration::from_secs(2));
        assert_eq!(retry_delay(3, None), Duration::from_secs(4));
    }

    #[test]
    fn test_retry_schedule_within_attempt_budget() {
        let waits: Vec<Duration> = (1..MAX_RETRIES).map(|a| retry_delay(a, None)).collect();
        assert_eq!(waits, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[test]
    fn test_image_part_meta_follows_magic_bytes() {
        assert_eq!(
            image_part_meta("party", b"GIF89a...."),
            ("image/gif", "party.gif".to_string())
        );
        assert_eq!(
            image_part_meta("lgtm", &[0xFF, 0xD8, 0xFF, 0xE0]),
            ("image/jpeg", "lgtm.jpg".to_string())
        );
        assert_eq!(
            image_part_meta("ship", b"\x89PNG\r\n\x1a\n"),
            ("image/png", "ship.png".to_string())
        );
    }

    #[test]
    fn test_retry_delay_honours_retry_after_with_cap() {
        assert_eq!(retry_delay(1, Some(5)), Duration::from_secs(5));
        assert_eq!(retry_delay(1, Some(600)), Duration::from_secs(MAX_RETRY_AFTER_SECS));
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = SlackClient::new("xoxb-test".to_string(), "http://localhost:9999/api/").unwrap();
        assert_eq!(client.url("emoji.list"), "http://localhost:9999/api/emoji.list");
    }

    #[test]
    fn test_emoji_list_response_parses() {
        let body = r#"{"ok":true,"emoji":{"parrot":"https://emoji.slack-edge.com/T1/parrot/abc.gif","pp":"alias:parrot"}}"#;
        let parsed: EmojiListResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.ok);
        assert_eq!(parsed.emoji.len(), 2);

        let failed: EmojiListResponse =
            serde_json::from_str(r#"{"ok":false,"error":"invalid_auth"}"#).unwrap();
        assert!(!failed.ok && failed.emoji.is_empty());
    }
}
