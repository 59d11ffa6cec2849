//! Path and status algebra for object keys.
//!
//! All keys are `/`-separated and live under a single namespace root
//! (e.g. `app/pending/events/img.jpg`). The lifecycle status is always
//! the second segment and is derived from the path, never stored as
//! independent state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MediaTreeError, Result};

/// Lifecycle status of a path, encoded as its second segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Freshly uploaded, not yet published.
    Pending,
    /// Visible to consumers.
    Published,
    /// Soft-deleted, restorable.
    Bin,
}

impl Status {
    /// All statuses, in display order.
    pub const ALL: [Status; 3] = [Status::Pending, Status::Published, Status::Bin];

    /// String form used inside object keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Published => "published",
            Status::Bin => "bin",
        }
    }

    /// Parse a status segment.
    pub fn parse(s: &str) -> Option<Status> {
        match s {
            "pending" => Some(Status::Pending),
            "published" => Some(Status::Published),
            "bin" => Some(Status::Bin),
            _ => None,
        }
    }

    /// Derive the status of a path from its second segment.
    ///
    /// Returns `None` when the path has no second segment or the segment
    /// is not a known status.
    pub fn of(path: &str) -> Option<Status> {
        path.split('/').nth(1).and_then(Status::parse)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The last segment of a path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// The parent path, or `None` for a single-segment path.
pub fn parent(path: &str) -> Option<&str> {
    path.rfind('/').map(|i| &path[..i])
}

/// Join a folder path and a child name.
pub fn join(prefix: &str, name: &str) -> String {
    format!("{prefix}/{name}")
}

/// Whether `path` equals `prefix` or is nested anywhere beneath it.
pub fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix || (path.len() > prefix.len() && path.starts_with(prefix) && path.as_bytes()[prefix.len()] == b'/')
}

/// The part of `path` below `prefix`, without the leading slash.
pub fn relative_suffix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if path.len() > prefix.len() && is_under(path, prefix) {
        Some(&path[prefix.len() + 1..])
    } else {
        None
    }
}

/// Every proper ancestor of `path` strictly below `namespace_root`.
///
/// For `app/pending/a/b/img.jpg` under root `app` this yields
/// `app/pending`, `app/pending/a` and `app/pending/a/b`.
pub fn ancestors(path: &str, namespace_root: &str) -> Vec<String> {
    let mut out = Vec::new();
    if !is_under(path, namespace_root) || path == namespace_root {
        return out;
    }
    let mut end = namespace_root.len();
    while let Some(i) = path[end + 1..].find('/') {
        end = end + 1 + i;
        out.push(path[..end].to_string());
    }
    out
}

/// Rewrite the status segment of a path.
///
/// Fails when the path has no second segment to rewrite.
pub fn with_status(path: &str, status: Status) -> Result<String> {
    let mut segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 {
        return Err(MediaTreeError::Validation(format!(
            "path has no status segment: {path}"
        )));
    }
    segments[1] = status.as_str();
    Ok(segments.join("/"))
}

/// Validate that a path is well-formed and confined to the namespace.
///
/// Rejects empty paths, empty segments (`a//b`, trailing `/`) and paths
/// outside the namespace root.
pub fn validate(path: &str, namespace_root: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MediaTreeError::Validation("empty path".to_string()));
    }
    if path.split('/').any(str::is_empty) {
        return Err(MediaTreeError::Validation(format!(
            "path contains an empty segment: {path}"
        )));
    }
    if !is_under(path, namespace_root) {
        return Err(MediaTreeError::Validation(format!(
            "path escapes namespace {namespace_root}: {path}"
        )));
    }
    Ok(())
}
