//! Upload input handling: emoji name normalisation and image payload decoding.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::errors::AppError;

/// Slack's size limit for custom emoji images.
pub const MAX_IMAGE_BYTES: usize = 128 * 1024;
pub const MAX_NAME_CHARS: usize = 100;

/// Lower-cases the name and replaces spaces with underscores.
///
/// Surrounding colons (`:name:`) are stripped. Names that are empty afterwards,
/// too long, or still contain whitespace or colons are rejected.
pub fn normalize_name(raw: &str) -> Result<String, AppError> {
    let name = raw
        .trim()
        .trim_matches(':')
        .to_lowercase()
        .replace(' ', "_");

    if name.is_empty() {
        return Err(AppError::Validation("emoji name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "emoji name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    if name.chars().any(|c| c.is_whitespace() || c == ':') {
        return Err(AppError::Validation(format!(
            "emoji name '{name}' contains whitespace or ':'"
        )));
    }
    Ok(name)
}

/// Decodes a base64 image, with or without a `data:<mime>;base64,` prefix.
pub fn decode_image(payload: &str) -> Result<Vec<u8>, AppError> {
    let encoded = match payload.split_once("base64,") {
        Some((_, data)) => data,
        None => payload,
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::Validation(format!("image is not valid base64: {e}")))?;
    validate_image(&bytes)?;
    Ok(bytes)
}

/// Image formats Slack accepts for custom emojis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Gif,
    Jpeg,
}

impl ImageKind {
    /// Identifies the format from its magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else {
            None
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
            ImageKind::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Jpeg => "jpg",
        }
    }
}

/// Checks size and that the bytes are PNG, GIF or JPEG.
pub fn validate_image(bytes: &[u8]) -> Result<(), AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("image is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Validation(format!(
            "image is {} bytes; the limit is {MAX_IMAGE_BYTES}",
            bytes.len()
        )));
    }
    if ImageKind::detect(bytes).is_none() {
        return Err(AppError::Validation(
            "image must be a PNG, GIF or JPEG".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_normalize_lowercases_and_underscores() {
        assert_eq!(normalize_name("Party Parrot").unwrap(), "party_parrot");
        assert_eq!(normalize_name("  :LGTM:  ").unwrap(), "lgtm");
        assert_eq!(normalize_name("배포 완료").unwrap(), "배포_완료");
    }

    #[test]
    fn test_normalize_rejects_empty_and_bad_chars() {
        assert!(normalize_name("   ").is_err());
        assert!(normalize_name("::").is_err());
        assert!(normalize_name("a\tb").is_err());
        assert!(normalize_name("a:b").is_err());
        assert!(normalize_name(&"x".repeat(MAX_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_decode_plain_and_data_url() {
        let encoded = STANDARD.encode(PNG_HEADER);
        assert_eq!(decode_image(&encoded).unwrap(), PNG_HEADER);
        let data_url = format!("data:image/png;base64,{encoded}");
        assert_eq!(decode_image(&data_url).unwrap(), PNG_HEADER);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image("not base64 at all!").is_err());
        let text = STANDARD.encode(b"hello world");
        assert!(decode_image(&text).is_err(), "non-image bytes must be rejected");
    }

    #[test]
    fn test_detect_image_kind() {
        assert_eq!(ImageKind::detect(PNG_HEADER), Some(ImageKind::Png));
        assert_eq!(ImageKind::detect(b"GIF87a...."), Some(ImageKind::Gif));
        assert_eq!(ImageKind::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::detect(b"hello"), None);
        assert_eq!(ImageKind::Jpeg.mime(), "image/jpeg");
        assert_eq!(ImageKind::Gif.extension(), "gif");
    }

    #[test]
    fn test_validate_size_limit() {
        let mut big = PNG_HEADER.to_vec();
        big.resize(MAX_IMAGE_BYTES + 1, 0);
        assert!(validate_image(&big).is_err());
        assert!(validate_image(&[]).is_err());
        assert!(validate_image(b"GIF89a....").is_ok());
    }
}
