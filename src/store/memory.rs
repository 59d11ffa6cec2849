//! In-memory object store backend.
//!
//! Used by the test suites and local development, the same way an
//! in-memory SQLite database backs the registry tests. Pagination is
//! real (configurable page size) so cursor handling gets exercised.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::path;
use crate::{MediaTreeError, Result};

use super::{ListPage, Metadata, ObjectStore, RemoteObject, ResourceKind};

#[derive(Debug, Clone, Default)]
struct StoredObject {
    metadata: Metadata,
}

/// In-process [`ObjectStore`] implementation.
#[derive(Debug)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<(ResourceKind, String), StoredObject>>,
    page_size: usize,
}

impl MemoryObjectStore {
    /// Create an empty store with the default page size.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            page_size: 100,
        }
    }

    /// Set the listing page size (for exercising pagination).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Insert an object.
    pub async fn put(&self, key: &str, kind: ResourceKind) {
        self.objects
            .write()
            .await
            .insert((kind, key.to_string()), StoredObject::default());
    }

    /// Whether any object exists under the given kind (test helper).
    pub async fn contains(&self, key: &str, kind: ResourceKind) -> bool {
        self.objects
            .read()
            .await
            .contains_key(&(kind, key.to_string()))
    }

    /// All keys of one kind, sorted (test helper).
    pub async fn keys(&self, kind: ResourceKind) -> Vec<String> {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, key)| key.clone())
            .collect()
    }

    fn url_for(key: &str, kind: ResourceKind) -> String {
        format!("memory://{kind}/{key}")
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(
        &self,
        prefix: &str,
        kind: ResourceKind,
        cursor: Option<&str>,
    ) -> Result<ListPage> {
        let objects = self.objects.read().await;
        let mut matched: Vec<&String> = objects
            .keys()
            .filter(|(k, key)| *k == kind && path::is_under(key, prefix))
            .map(|(_, key)| key)
            .collect();
        matched.sort();

        let start = match cursor {
            Some(c) => matched.partition_point(|key| key.as_str() <= c),
            None => 0,
        };
        let page: Vec<RemoteObject> = matched
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|key| RemoteObject {
                key: (*key).clone(),
                url: Self::url_for(key, kind),
            })
            .collect();

        let next_cursor = if start + page.len() < matched.len() {
            page.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ListPage {
            objects: page,
            next_cursor,
        })
    }

    async fn rename(&self, from: &str, to: &str, kind: ResourceKind) -> Result<()> {
        let mut objects = self.objects.write().await;
        if objects.contains_key(&(kind, to.to_string())) {
            return Err(MediaTreeError::RenameCollision(to.to_string()));
        }
        let stored = objects
            .remove(&(kind, from.to_string()))
            .ok_or_else(|| MediaTreeError::ObjectNotFound(from.to_string()))?;
        objects.insert((kind, to.to_string()), stored);
        Ok(())
    }

    async fn delete_keys(&self, keys: &[String], kind: ResourceKind) -> Result<()> {
        let mut objects = self.objects.write().await;
        for key in keys {
            objects.remove(&(kind, key.clone()));
        }
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str, kind: ResourceKind) -> Result<()> {
        let mut objects = self.objects.write().await;
        objects.retain(|(k, key), _| *k != kind || !path::is_under(key, prefix));
        Ok(())
    }

    async fn get_metadata(&self, key: &str, kind: ResourceKind) -> Result<Metadata> {
        let objects = self.objects.read().await;
        objects
            .get(&(kind, key.to_string()))
            .map(|o| o.metadata.clone())
            .ok_or_else(|| MediaTreeError::ObjectNotFound(key.to_string()))
    }

    async fn set_metadata(&self, key: &str, kind: ResourceKind, metadata: &Metadata) -> Result<()> {
        let mut objects = self.objects.write().await;
        let stored = objects
            .get_mut(&(kind, key.to_string()))
            .ok_or_else(|| MediaTreeError::ObjectNotFound(key.to_string()))?;
        stored.metadata = metadata.clone();
        Ok(())
    }

    async fn exists(&self, key: &str, kind: ResourceKind) -> Result<bool> {
        Ok(self
            .objects
            .read()
            .await
            .contains_key(&(kind, key.to_string())))
    }
}
