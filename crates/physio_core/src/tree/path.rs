//! Validated slash-separated locations inside the record tree.

use super::{StoreError, StoreResult};
use std::fmt::{Display, Formatter};

const MAX_SEGMENT_BYTES: usize = 768;
const FORBIDDEN_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// Location of a node in the record tree.
///
/// Empty segments are dropped while parsing, so `"pacientes/"` and
/// `"/pacientes"` address the same node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a raw slash-separated path.
    ///
    /// # Errors
    /// - Returns `StoreError::InvalidPath` when a segment is too long or holds
    ///   a forbidden character.
    pub fn parse(raw: &str) -> StoreResult<Self> {
        let mut segments = Vec::new();
        for segment in raw.split('/').filter(|segment| !segment.is_empty()) {
            validate_segment(segment)?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Returns the path of the direct child named `key`.
    pub fn child(&self, key: &str) -> StoreResult<Self> {
        validate_segment(key)?;
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Ok(Self { segments })
    }

    /// Appends a relative, possibly multi-segment, path.
    pub fn join(&self, relative: &str) -> StoreResult<Self> {
        let tail = Self::parse(relative)?;
        if tail.is_root() {
            return Err(StoreError::InvalidPath(
                "relative path must name at least one child".to_string(),
            ));
        }
        let mut segments = self.segments.clone();
        segments.extend(tail.segments);
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, `None` at the root.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Proper ancestors from the top-level node down, excluding the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (1..self.segments.len()).map(move |len| Self {
            segments: self.segments[..len].to_vec(),
        })
    }

    /// Top-level segment, used as a non-identifying log label.
    pub fn top_level(&self) -> &str {
        self.segments.first().map_or("<root>", String::as_str)
    }

    /// Canonical storage key (`a/b/c`, empty for the root).
    pub fn storage_key(&self) -> String {
        self.segments.join("/")
    }
}

impl Display for TreePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

pub(crate) fn validate_segment(segment: &str) -> StoreResult<()> {
    if segment.is_empty() {
        return Err(StoreError::InvalidPath("empty key".to_string()));
    }
    if segment.len() > MAX_SEGMENT_BYTES {
        return Err(StoreError::InvalidPath(format!(
            "key longer than {MAX_SEGMENT_BYTES} bytes"
        )));
    }
    if let Some(bad) = segment
        .chars()
        .find(|ch| FORBIDDEN_CHARS.contains(ch) || ch.is_control())
    {
        return Err(StoreError::InvalidPath(format!(
            "key `{}` contains forbidden character {bad:?}",
            segment.escape_debug()
        )));
    }
    Ok(())
}
