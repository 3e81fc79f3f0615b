//! Request metadata carried by an image upload.
//!
//! Uploads describe themselves entirely through two headers:
//!
//! - `Content-Type` must name an image type (`image/...`)
//! - `Content-Disposition` must be `attachment; filename="<name>"`, and `<name>` becomes the
//!   destination object key exactly as sent
//!
//! The body is never inspected.

use axum::http::{HeaderMap, header};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Error, Result};

const IMAGE_MEDIA_PREFIX: &str = "image/";

// Greedy capture: `filename="a"b"` yields `a"b`. No escape handling.
static ATTACHMENT_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^attachment;\s+filename="(.*)"$"#).expect("attachment filename pattern is valid"));

/// Validated metadata for an image upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Object key taken verbatim from the Content-Disposition filename
    pub filename: String,
}

impl ImageUpload {
    /// Validate upload headers in order, stopping at the first failure.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let content_type = headers.get(header::CONTENT_TYPE).map(|v| v.as_bytes());
        if !content_type.is_some_and(is_image_media_type) {
            return Err(Error::UnsupportedMediaType {
                content_type: content_type.map(|v| String::from_utf8_lossy(v).into_owned()),
            });
        }

        let disposition = headers.get(header::CONTENT_DISPOSITION).ok_or_else(|| Error::BadRequest {
            message: "Missing Content-Disposition header".to_string(),
        })?;

        let disposition = std::str::from_utf8(disposition.as_bytes()).map_err(|_| Error::BadRequest {
            message: "Content-Disposition header is not valid UTF-8".to_string(),
        })?;

        let filename = attachment_filename(disposition).ok_or_else(|| Error::BadRequest {
            message: format!("Malformed Content-Disposition header: {disposition:?}"),
        })?;

        Ok(Self {
            filename: filename.to_string(),
        })
    }
}

/// Byte prefix match against `image/`; the comparison is case-sensitive.
pub fn is_image_media_type(content_type: &[u8]) -> bool {
    content_type.starts_with(IMAGE_MEDIA_PREFIX.as_bytes())
}

/// Extract a non-empty filename from an `attachment; filename="..."` disposition.
pub fn attachment_filename(disposition: &str) -> Option<&str> {
    ATTACHMENT_FILENAME
        .captures(disposition)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: Option<&str>, disposition: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        }
        if let Some(cd) = disposition {
            headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_str(cd).unwrap());
        }
        headers
    }

    #[test]
    fn test_image_media_type_prefix() {
        assert!(is_image_media_type(b"image/png"));
        assert!(is_image_media_type(b"image/svg+xml"));
        assert!(is_image_media_type(b"image/"));
        assert!(is_image_media_type(b"image/x-anything; charset=binary"));

        assert!(!is_image_media_type(b"Image/png"));
        assert!(!is_image_media_type(b"IMAGE/PNG"));
        assert!(!is_image_media_type(b" image/png"));
        assert!(!is_image_media_type(b"application/octet-stream"));
        assert!(!is_image_media_type(b"image"));
        assert!(!is_image_media_type(b""));
    }

    #[test]
    fn test_attachment_filename_accepts() {
        assert_eq!(attachment_filename(r#"attachment; filename="cat.png""#), Some("cat.png"));
        assert_eq!(attachment_filename("attachment;\tfilename=\"tab.png\""), Some("tab.png"));
        assert_eq!(attachment_filename(r#"attachment;   filename="spaced.png""#), Some("spaced.png"));
        assert_eq!(attachment_filename(r#"attachment; filename="a"b.png""#), Some(r#"a"b.png"#));
        assert_eq!(
            attachment_filename(r#"attachment; filename="cat.png"; creation-date="today""#),
            Some(r#"cat.png"; creation-date="today"#)
        );
        assert_eq!(attachment_filename(r#"attachment; filename="dir/../cat.png""#), Some("dir/../cat.png"));
        assert_eq!(attachment_filename(r#"attachment; filename="  ""#), Some("  "));
    }

    #[test]
    fn test_attachment_filename_rejects() {
        // empty name counts as no name
        assert_eq!(attachment_filename(r#"attachment; filename="""#), None);
        // no whitespace after the semicolon
        assert_eq!(attachment_filename(r#"attachment;filename="cat.png""#), None);
        // space before the semicolon
        assert_eq!(attachment_filename(r#"attachment ; filename="cat.png""#), None);
        // unquoted
        assert_eq!(attachment_filename("attachment; filename=cat.png"), None);
        // missing closing quote
        assert_eq!(attachment_filename(r#"attachment; filename="cat.png"#), None);
        // trailing parameters
        assert_eq!(attachment_filename(r#"attachment; filename="cat.png"; size=10"#), None);
        assert_eq!(attachment_filename(r#"attachment; filename="cat.png" "#), None);
        // wrong disposition type or case
        assert_eq!(attachment_filename(r#"inline; filename="cat.png""#), None);
        assert_eq!(attachment_filename(r#"Attachment; filename="cat.png""#), None);
        // extended parameter form is not understood
        assert_eq!(attachment_filename("attachment; filename*=UTF-8''cat.png"), None);
        assert_eq!(attachment_filename(""), None);
    }

    #[test]
    fn test_from_headers_valid() {
        let upload = ImageUpload::from_headers(&headers(Some("image/png"), Some(r#"attachment; filename="cat.png""#))).unwrap();
        assert_eq!(upload.filename, "cat.png");
    }

    #[test]
    fn test_from_headers_media_type_checked_first() {
        let err = ImageUpload::from_headers(&headers(None, None)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMediaType { content_type: None }));

        let err = ImageUpload::from_headers(&headers(Some("text/plain"), Some("garbage"))).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMediaType { .. }));
    }

    #[test]
    fn test_from_headers_missing_or_malformed_disposition() {
        let err = ImageUpload::from_headers(&headers(Some("image/jpeg"), None)).unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));

        let err = ImageUpload::from_headers(&headers(Some("image/jpeg"), Some(r#"attachment; filename="""#))).unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
    }

    #[test]
    fn test_from_headers_utf8_filename() {
        let mut headers = headers(Some("image/png"), None);
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_bytes("attachment; filename=\"kissa-ä.png\"".as_bytes()).unwrap(),
        );

        let upload = ImageUpload::from_headers(&headers).unwrap();
        assert_eq!(upload.filename, "kissa-ä.png");
    }

    #[test]
    fn test_from_headers_invalid_utf8_disposition() {
        let mut headers = headers(Some("image/png"), None);
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_bytes(b"attachment; filename=\"\xff.png\"").unwrap(),
        );

        let err = ImageUpload::from_headers(&headers).unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
    }
}
