//! Object store contract for mediatree.
//!
//! The remote store is flat: it knows keys and prefixes, not folders.
//! Every object is partitioned by a coarse [`ResourceKind`] that must be
//! known to address it; [`probe_kind`] recovers the kind for a bare key.

mod http;
mod memory;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{MediaTreeError, Result};

pub use http::HttpObjectStore;
pub use memory::MemoryObjectStore;

/// Coarse object category required by the store to address an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Still images.
    Image,
    /// Video files.
    Video,
    /// Anything else.
    Raw,
}

impl ResourceKind {
    /// All kinds, in probing priority order (images first).
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Image, ResourceKind::Video, ResourceKind::Raw];

    /// String form used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Video => "video",
            ResourceKind::Raw => "raw",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live object as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
    /// Full key of the object.
    pub key: String,
    /// Delivery URL.
    pub url: String,
}

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPage {
    /// Objects on this page.
    pub objects: Vec<RemoteObject>,
    /// Cursor for the next page, `None` on the last page.
    pub next_cursor: Option<String>,
}

/// Per-object metadata map.
pub type Metadata = BTreeMap<String, String>;

/// Flat key-value object store with prefix listing.
///
/// All operations are per-object or per-prefix; there is no multi-object
/// atomicity. Callers synthesize folder semantics on top of this.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects under a prefix for one resource kind, paginated.
    async fn list(&self, prefix: &str, kind: ResourceKind, cursor: Option<&str>)
        -> Result<ListPage>;

    /// Rename a single object. Fails if `from` does not exist under `kind`
    /// or the destination is occupied.
    async fn rename(&self, from: &str, to: &str, kind: ResourceKind) -> Result<()>;

    /// Delete objects by key. Missing keys are ignored.
    async fn delete_keys(&self, keys: &[String], kind: ResourceKind) -> Result<()>;

    /// Delete every object under a prefix.
    async fn delete_prefix(&self, prefix: &str, kind: ResourceKind) -> Result<()>;

    /// Read the metadata map of an object.
    async fn get_metadata(&self, key: &str, kind: ResourceKind) -> Result<Metadata>;

    /// Replace the metadata map of an object.
    async fn set_metadata(&self, key: &str, kind: ResourceKind, metadata: &Metadata) -> Result<()>;

    /// Whether an object exists under the given kind.
    async fn exists(&self, key: &str, kind: ResourceKind) -> Result<bool>;
}

/// Resolve the resource kind of a key by probing kinds in priority order.
///
/// The first kind under which the store confirms existence wins;
/// exhausting all kinds is an [`MediaTreeError::ObjectNotFound`].
pub async fn probe_kind(store: &dyn ObjectStore, key: &str) -> Result<ResourceKind> {
    for kind in ResourceKind::ALL {
        if store.exists(key, kind).await? {
            return Ok(kind);
        }
    }
    Err(MediaTreeError::ObjectNotFound(key.to_string()))
}
