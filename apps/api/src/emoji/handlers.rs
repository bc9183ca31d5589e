use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::emoji::catalog::{build_page, EmojiListQuery, EmojiPage};
use crate::emoji::upload::{decode_image, normalize_name, validate_image};
use crate::errors::AppError;
use crate::layout::{
    fit, BoxConstraint, MarginPolicy, MetricsSurface, SizeBounds, StyleSpec, WrapMode,
};
use crate::render::{render_emoji, ExportOptions, RenderJob, RenderedEmoji};
use crate::state::AppState;

/// Shown in the preview while the text field is empty.
pub const PLACEHOLDER_TEXT: &str = "ABC";

/// Which surface measures the text during a fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Real glyph shaping against the loaded fonts.
    #[default]
    Canvas,
    /// Built-in per-character width tables. Always available.
    Metrics,
}

#[derive(Debug, Deserialize)]
pub struct FitRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: StyleSpec,
    #[serde(rename = "box")]
    pub fit_box: Option<BoxConstraint>,
    pub min_px: Option<u32>,
    pub max_px: Option<u32>,
    pub margin: Option<MarginPolicy>,
    #[serde(default)]
    pub measure: Measure,
}

#[derive(Debug, Serialize)]
pub struct FitResponse {
    pub font_size_px: u32,
    pub overflows: bool,
    pub wrap_mode: WrapMode,
    #[serde(rename = "box")]
    pub fit_box: BoxConstraint,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: StyleSpec,
    pub min_px: Option<u32>,
    pub max_px: Option<u32>,
    pub margin: Option<MarginPolicy>,
    #[serde(default)]
    pub export: ExportOptions,
}

/// Fields of `/emoji/add`, read from the JSON body or the query string.
#[derive(Debug, Default, Deserialize)]
pub struct AddEmojiRequest {
    pub name: Option<String>,
    /// Base64 image, optionally as a `data:` URL.
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadRenderedRequest {
    pub name: String,
    #[serde(flatten)]
    pub render: RenderRequest,
}

fn size_bounds(
    state: &AppState,
    min_px: Option<u32>,
    max_px: Option<u32>,
) -> Result<SizeBounds, AppError> {
    Ok(SizeBounds::new(
        min_px.unwrap_or(1),
        max_px.unwrap_or(state.config.default_max_font_px),
    )?)
}

/// POST /api/v1/emoji/fit
pub async fn handle_fit(
    State(state): State<AppState>,
    Json(req): Json<FitRequest>,
) -> Result<Json<FitResponse>, AppError> {
    let text = if req.text.is_empty() {
        PLACEHOLDER_TEXT.to_string()
    } else {
        req.text
    };
    let bounds = size_bounds(&state, req.min_px, req.max_px)?;
    let margin = req.margin.unwrap_or(state.config.default_margin);
    let fit_box = match req.fit_box {
        Some(b) => BoxConstraint::new(b.width, b.height)?,
        None => BoxConstraint::default(),
    };
    let style = req.style;

    let result = match req.measure {
        Measure::Metrics => {
            let mut surface = MetricsSurface::new();
            fit(&mut surface, &text, &style, fit_box, bounds, margin)?
        }
        Measure::Canvas => {
            let fonts = state.fonts.clone();
            tokio::task::spawn_blocking(move || {
                let mut surface = fonts.surface();
                fit(&mut surface, &text, &style, fit_box, bounds, margin)
            })
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("fit task panicked: {e}")))??
        }
    };

    Ok(Json(FitResponse {
        font_size_px: result.font_size_px,
        overflows: result.overflows,
        wrap_mode: result.wrap_mode,
        fit_box,
    }))
}

async fn render_request(state: &AppState, req: RenderRequest) -> Result<(String, RenderedEmoji), AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    let job = RenderJob {
        bounds: size_bounds(state, req.min_px, req.max_px)?,
        margin: req.margin.unwrap_or(state.config.default_margin),
        text: req.text,
        style: req.style,
        export: req.export,
    };

    let fonts = state.fonts.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        render_emoji(&fonts, &job).map(|r| (job.text, r))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("render task panicked: {e}")))??;
    Ok(rendered)
}

/// POST /api/v1/emoji/render
pub async fn handle_render(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Response, AppError> {
    let (text, rendered) = render_request(&state, req).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&text)),
        ],
        rendered.png,
    )
        .into_response())
}

/// GET /emoji/list
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<EmojiListQuery>,
) -> Result<Json<EmojiPage>, AppError> {
    let emoji = state.emoji_store()?.list().await?;
    Ok(Json(build_page(emoji, &query)?))
}

/// POST /emoji/add
/// Older clients send `name` and `image` as query parameters; body fields win.
pub async fn handle_add(
    State(state): State<AppState>,
    Query(params): Query<AddEmojiRequest>,
    body: Option<Json<AddEmojiRequest>>,
) -> Result<Json<Value>, AppError> {
    let store = state.emoji_store()?;
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let name = body
        .name
        .or(params.name)
        .ok_or_else(|| AppError::Validation("missing 'name'".to_string()))?;
    let image = body
        .image
        .or(params.image)
        .ok_or_else(|| AppError::Validation("missing 'image'".to_string()))?;
    let name = normalize_name(&name)?;
    let image = decode_image(&image)?;
    store.add(&name, image).await?;
    info!(name = %name, "Added emoji");
    Ok(Json(json!({ "ok": true, "name": name })))
}

/// POST /api/emojis/add (multipart: `name`, `image`)
pub async fn handle_add_multipart(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let store = state.emoji_store()?;
    let mut name = None;
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("name") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable name field: {e}")))?;
                name = Some(value);
            }
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable image field: {e}")))?;
                image = Some(bytes);
            }
            _ => {}
        }
    }

    let name = normalize_name(
        &name.ok_or_else(|| AppError::Validation("missing 'name' field".to_string()))?,
    )?;
    let image = image.ok_or_else(|| AppError::Validation("missing 'image' field".to_string()))?;
    validate_image(&image)?;

    store.add(&name, image.to_vec()).await?;
    info!(name = %name, "Added emoji from upload");
    Ok(Json(json!({ "ok": true, "name": name })))
}

/// POST /api/v1/emoji/upload
/// Renders the emoji and adds it to the workspace in one call.
pub async fn handle_upload_rendered(
    State(state): State<AppState>,
    Json(req): Json<UploadRenderedRequest>,
) -> Result<Json<Value>, AppError> {
    let store = state.emoji_store()?.clone();
    let name = normalize_name(&req.name)?;
    let (_, rendered) = render_request(&state, req.render).await?;
    validate_image(&rendered.png)?;

    store.add(&name, rendered.png).await?;
    info!(name = %name, font_size_px = rendered.size.font_size_px, "Uploaded rendered emoji");
    Ok(Json(json!({
        "ok": true,
        "name": name,
        "font_size_px": rendered.size.font_size_px,
        "overflows": rendered.size.overflows,
    })))
}

/// `attachment` header naming the file after the emoji text.
///
/// Header values must be visible ASCII, so the plain `filename` is an ASCII
/// fallback and the real name travels percent-encoded in `filename*`.
fn content_disposition(text: &str) -> String {
    let file_name = format!("{}.png", text.replace('\n', " ").trim());
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-' | b'_' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("LGTM"),
            "attachment; filename=\"LGTM.png\"; filename*=UTF-8''LGTM.png"
        );
    }

    #[test]
    fn test_content_disposition_encodes_non_ascii() {
        let value = content_disposition("배포\n완료");
        assert!(value.is_ascii());
        assert!(value.contains("filename=\"_____.png\""));
        // "배" is EB B0 B0 in UTF-8; the newline becomes an encoded space.
        assert!(value.contains("filename*=UTF-8''%EB%B0%B0"));
        assert!(value.contains("%20"));
    }

    #[test]
    fn test_fit_request_defaults() {
        let req: FitRequest = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(req.measure, Measure::Canvas);
        assert_eq!(req.style, StyleSpec::default());
        assert!(req.fit_box.is_none());
        assert!(req.margin.is_none());
    }

    #[test]
    fn test_upload_request_flattens_render_fields() {
        let req: UploadRenderedRequest = serde_json::from_str(
            r#"{"name":"ship it","text":"SHIP","style":{"bold":true},"margin":"none"}"#,
        )
        .unwrap();
        assert_eq!(req.render.text, "SHIP");
        assert!(req.render.style.bold);
        assert_eq!(req.render.style.font_family, "sans-serif");
        assert_eq!(req.render.margin, Some(MarginPolicy::None));
        assert_eq!(req.render.export, ExportOptions::default());
    }
}
