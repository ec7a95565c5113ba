//! Data URI parsing and formatting: `data:<mediatype>;base64,<data>`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^data:(?P<media>[^;]+);base64,(?P<data>[A-Za-z0-9+/=]+)$").expect("static pattern"))
}

#[derive(Debug, Error)]
pub enum DataUriError {
    #[error("malformed data URI: {0:?}")]
    Malformed(String),
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Format `bytes` as a `data:<media_type>;base64,<b64>` URI.
pub fn format(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

/// Parse a data URI back into `(media_type, bytes)`. Inverse of [`format`]
/// for any well-formed input: `parse(format(m, b)) == (m, b)`.
pub fn parse(uri: &str) -> Result<(String, Vec<u8>), DataUriError> {
    let caps = pattern()
        .captures(uri)
        .ok_or_else(|| DataUriError::Malformed(uri.to_string()))?;
    let media = caps["media"].to_string();
    let bytes = STANDARD.decode(&caps["data"])?;
    Ok((media, bytes))
}

/// The default MIME allowlist. Extensible: callers needing a broader set
/// build their own `HashSet` and call [`is_known_media_type`] with it, or
/// extend this list at their call site via `DEFAULT_MEDIA_TYPES.iter()`.
pub const DEFAULT_MEDIA_TYPES: &[&str] = &[
    "text/plain",
    "text/html",
    "text/markdown",
    "application/json",
    "application/pdf",
    "application/octet-stream",
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "audio/mpeg",
    "audio/wav",
];

/// True if `media_type` is in the given allowlist (case-sensitive, matching
/// the exact strings a client would send).
pub fn is_known_media_type(media_type: &str, allowlist: &[&str]) -> bool {
    allowlist.contains(&media_type)
}
