//! Blob bucket for evaluation photos.
//!
//! # Responsibility
//! - Define the bucket contract (`BlobStore`) and object path rules.
//! - Decode base64 / data-URL uploads and render download URLs.
//!
//! # Invariants
//! - Every stored object carries a content type and a download token.
//! - Re-uploading an object rotates its download token.

use crate::tree::{StoreError, StoreResult};
use base64::engine::general_purpose;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

mod sqlite_blob_store;

pub use sqlite_blob_store::SqliteBlobStore;

/// Content type used when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

static DATA_URL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:([A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+);base64,").expect("valid data url regex")
});

/// Object location inside the bucket.
///
/// Unlike tree keys, object names may contain dots (`foto.jpg`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath {
    segments: Vec<String>,
}

impl StoragePath {
    /// Parses a slash-separated object path, ignoring empty segments.
    ///
    /// # Errors
    /// - Rejects paths without segments, `.`/`..` segments and control characters.
    pub fn parse(raw: &str) -> StoreResult<Self> {
        let segments: Vec<String> = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            return Err(StoreError::InvalidPath("object path is empty".to_string()));
        }
        for segment in &segments {
            validate_object_segment(segment)?;
        }
        Ok(Self { segments })
    }

    /// Builds a path from already separated segments.
    pub fn from_segments<I, S>(segments: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .map(|segment| segment.as_ref().to_string())
            .collect();
        if segments.is_empty() {
            return Err(StoreError::InvalidPath("object path is empty".to_string()));
        }
        for segment in &segments {
            if segment.is_empty() || segment.contains('/') {
                return Err(StoreError::InvalidPath(format!(
                    "invalid object segment `{}`",
                    segment.escape_debug()
                )));
            }
            validate_object_segment(segment)?;
        }
        Ok(Self { segments })
    }

    pub fn file_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Canonical object name (`a/b/c.jpg`).
    pub fn object_name(&self) -> String {
        self.segments.join("/")
    }
}

impl Display for StoragePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.object_name())
    }
}

fn validate_object_segment(segment: &str) -> StoreResult<()> {
    if segment == "." || segment == ".." {
        return Err(StoreError::InvalidPath(
            "relative object segments are not allowed".to_string(),
        ));
    }
    if segment.chars().any(char::is_control) {
        return Err(StoreError::InvalidPath(
            "object segment contains control characters".to_string(),
        ));
    }
    Ok(())
}

/// Stored object metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMetadata {
    /// Canonical object name without leading slash.
    pub path: String,
    pub content_type: String,
    pub size_bytes: u64,
    /// Random token embedded in download URLs.
    pub download_token: String,
    /// Upload time in epoch milliseconds.
    pub created_at: i64,
}

/// Bucket contract for photo attachments.
pub trait BlobStore {
    /// Stores or replaces an object.
    fn put(&self, path: &StoragePath, data: &[u8], content_type: &str)
        -> StoreResult<BlobMetadata>;
    /// Reads an object and its metadata.
    fn get(&self, path: &StoragePath) -> StoreResult<Option<(BlobMetadata, Vec<u8>)>>;
    /// Deletes one object, returning whether it existed.
    fn delete(&self, path: &StoragePath) -> StoreResult<bool>;
    /// Lists objects below `prefix`, ordered by object name.
    fn list(&self, prefix: &StoragePath) -> StoreResult<Vec<BlobMetadata>>;
    /// Renders the public download URL of an object; `None` when absent.
    fn download_url(&self, path: &StoragePath) -> StoreResult<Option<String>>;
}

/// Decoded upload payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Decodes a raw base64 string or a `data:<mime>;base64,` URL.
///
/// The declared mime type wins; plain base64 falls back to
/// [`DEFAULT_CONTENT_TYPE`].
pub fn decode_base64_upload(input: &str) -> StoreResult<DecodedUpload> {
    let trimmed = input.trim();
    let (payload, content_type) = match DATA_URL_PREFIX_RE.captures(trimmed) {
        Some(captures) => {
            let prefix_len = captures.get(0).map_or(0, |m| m.end());
            let mime = captures
                .get(1)
                .map_or(DEFAULT_CONTENT_TYPE, |m| m.as_str())
                .to_ascii_lowercase();
            (&trimmed[prefix_len..], mime)
        }
        None => (trimmed, DEFAULT_CONTENT_TYPE.to_string()),
    };

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|err| StoreError::InvalidData(format!("invalid base64 upload: {err}")))?;
    Ok(DecodedUpload {
        bytes,
        content_type,
    })
}

/// Renders `<base>/v0/b/<bucket>/o/<encoded object>?alt=media&token=<token>`.
pub fn render_download_url(base_url: &str, bucket: &str, object_name: &str, token: &str) -> String {
    format!(
        "{}/v0/b/{}/o/{}?alt=media&token={}",
        base_url.trim_end_matches('/'),
        encode_component(bucket),
        encode_component(object_name),
        encode_component(token)
    )
}

/// Percent-encodes everything except RFC 3986 unreserved characters.
fn encode_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(byte));
            }
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::{decode_base64_upload, render_download_url, StoragePath, DEFAULT_CONTENT_TYPE};

    #[test]
    fn decode_strips_data_url_prefix_and_keeps_mime() {
        let decoded =
            decode_base64_upload("data:image/png;base64,aGVsbG8=").expect("should decode");
        assert_eq!(decoded.bytes, b"hello");
        assert_eq!(decoded.content_type, "image/png");
    }

    #[test]
    fn decode_plain_base64_uses_default_content_type() {
        let decoded = decode_base64_upload("aGVsbG8=").expect("should decode");
        assert_eq!(decoded.bytes, b"hello");
        assert_eq!(decoded.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_base64_upload("not base64 !!").is_err());
    }

    #[test]
    fn download_url_encodes_object_name() {
        let url = render_download_url(
            "https://files.example.com/",
            "clinic.appspot.com",
            "avaliacoes/3/1/foto 1.jpg",
            "abc",
        );
        assert_eq!(
            url,
            "https://files.example.com/v0/b/clinic.appspot.com/o/avaliacoes%2F3%2F1%2Ffoto%201.jpg?alt=media&token=abc"
        );
    }

    #[test]
    fn storage_path_rejects_relative_segments() {
        assert!(StoragePath::parse("avaliacoes/../x").is_err());
        assert!(StoragePath::parse("///").is_err());
        let path = StoragePath::parse("/avaliacoes/3/1/foto.jpg").expect("path should parse");
        assert_eq!(path.file_name(), "foto.jpg");
        assert_eq!(path.object_name(), "avaliacoes/3/1/foto.jpg");
    }
}
