//! Photo upload validation.
//!
//! Uploads are capped at 5 MB and restricted to JPEG, PNG, and WebP. The
//! declared content type must agree with the payload's magic bytes so a
//! mislabelled file cannot slip through.

use std::fmt;

use serde_json::json;

use crate::domain::error::Error;

/// Maximum accepted upload size in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/webp`
    Webp,
}

impl ImageFormat {
    /// The MIME type for this format.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Conventional file extension for stored objects.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Look up a format from a declared MIME type.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Detect a format from the payload's leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if bytes.len() >= 12
            && bytes.starts_with(b"RIFF")
            && bytes.get(8..12) == Some(b"WEBP".as_slice())
        {
            return Some(Self::Webp);
        }
        None
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

/// Validate an upload's declared type, size, and magic bytes.
///
/// # Errors
/// Returns an `invalid_request` error naming the offending aspect: unknown
/// or disallowed content type, payload over the size cap, or magic bytes
/// disagreeing with the declared type.
pub fn validate_upload(content_type: &str, bytes: &[u8]) -> Result<ImageFormat, Error> {
    let declared = ImageFormat::from_content_type(content_type).ok_or_else(|| {
        Error::invalid_request("content type must be image/jpeg, image/png, or image/webp")
            .with_details(json!({ "contentType": content_type }))
    })?;

    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(Error::invalid_request("upload exceeds the 5 MB limit")
            .with_details(json!({ "size": bytes.len(), "max": MAX_UPLOAD_BYTES })));
    }
    if bytes.is_empty() {
        return Err(Error::invalid_request("upload body must not be empty"));
    }

    match ImageFormat::sniff(bytes) {
        Some(actual) if actual == declared => Ok(declared),
        Some(actual) => Err(Error::invalid_request(
            "upload content does not match its declared type",
        )
        .with_details(json!({
            "declared": declared.content_type(),
            "detected": actual.content_type(),
        }))),
        None => Err(Error::invalid_request(
            "upload content is not a recognised image format",
        )),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn jpeg_bytes() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend_from_slice(&[0u8; 16]);
        bytes
    }

    fn png_bytes() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0u8; 16]);
        bytes
    }

    fn webp_bytes() -> Vec<u8> {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&[0u8; 4]);
        bytes.extend_from_slice(b"WEBP");
        bytes.extend_from_slice(&[0u8; 16]);
        bytes
    }

    #[rstest]
    #[case("image/jpeg", ImageFormat::Jpeg)]
    #[case("image/png", ImageFormat::Png)]
    #[case("image/webp", ImageFormat::Webp)]
    fn allowed_types_validate_with_matching_bytes(
        #[case] content_type: &str,
        #[case] expected: ImageFormat,
    ) {
        let bytes = match expected {
            ImageFormat::Jpeg => jpeg_bytes(),
            ImageFormat::Png => png_bytes(),
            ImageFormat::Webp => webp_bytes(),
        };
        let format = validate_upload(content_type, &bytes).expect("valid upload");
        assert_eq!(format, expected);
    }

    #[rstest]
    #[case("image/gif")]
    #[case("application/octet-stream")]
    #[case("")]
    fn disallowed_types_are_rejected(#[case] content_type: &str) {
        let err = validate_upload(content_type, &jpeg_bytes()).expect_err("type rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn mismatched_magic_bytes_are_rejected() {
        let err = validate_upload("image/png", &jpeg_bytes()).expect_err("mismatch rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details present");
        assert_eq!(details["declared"], "image/png");
        assert_eq!(details["detected"], "image/jpeg");
    }

    #[test]
    fn oversized_uploads_are_rejected() {
        let mut bytes = jpeg_bytes();
        bytes.resize(MAX_UPLOAD_BYTES + 1, 0);
        let err = validate_upload("image/jpeg", &bytes).expect_err("size rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn empty_uploads_are_rejected() {
        let err = validate_upload("image/jpeg", &[]).expect_err("empty rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn unrecognisable_content_is_rejected() {
        let err =
            validate_upload("image/jpeg", &[0u8; 32]).expect_err("unrecognised content rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
