//! Soft-delete, restore and purge.
//!
//! Soft-delete is a move to the `bin` status root plus a back-reference
//! recorded in object metadata; restore follows the back-reference home.
//! Purge is permanent and never touches folder records beyond leaving
//! them registered-and-empty.

use std::sync::Arc;

use tracing::warn;

use crate::engine::{status_intent, FailedObject, MoveEngine, MoveReport, MovedObject, NodeRef};
use crate::path::{self, Status};
use crate::registry::FolderRegistry;
use crate::store::{probe_kind, ObjectStore, ResourceKind};
use crate::{MediaTreeError, Result};

/// Metadata field holding the pre-delete key of a binned object.
const BACK_FIELD: &str = "back";

/// Outcome of restoring one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The object is back at its pre-delete key.
    Restored {
        /// The key it was restored to.
        to: String,
    },
    /// No back-reference was recorded; the object stays in the bin.
    SkippedNoBackRef,
}

/// Outcome of a batch restore. Skips and failures never abort siblings.
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    /// `(bin key, restored key)` pairs.
    pub restored: Vec<(String, String)>,
    /// Keys skipped for lack of a back-reference.
    pub skipped: Vec<String>,
    /// Keys that failed outright.
    pub failed: Vec<FailedObject>,
}

/// Outcome of emptying the bin.
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    /// Number of objects permanently deleted.
    pub purged: usize,
    /// Objects whose deletion failed.
    pub failed: Vec<FailedObject>,
}

/// Reversible deletion and irreversible purging, built on the move engine.
pub struct LifecycleEngine {
    store: Arc<dyn ObjectStore>,
    registry: FolderRegistry,
    engine: MoveEngine,
    namespace_root: String,
}

impl LifecycleEngine {
    /// Create a lifecycle engine over the given store and registry.
    pub fn new(store: Arc<dyn ObjectStore>, registry: FolderRegistry) -> Self {
        let namespace_root = registry.namespace_root().to_string();
        let engine = MoveEngine::new(store.clone(), registry.clone());
        Self {
            store,
            registry,
            engine,
            namespace_root,
        }
    }

    /// Move a file or folder into the bin and record back-references.
    ///
    /// A path already under `bin` is a no-op. For folders, every object
    /// under the prefix gets its own back-reference.
    pub async fn soft_delete(&self, target: &str) -> Result<MoveReport> {
        path::validate(target, &self.namespace_root)?;
        if Status::of(target) == Some(Status::Bin) {
            return Ok(MoveReport::default());
        }

        let source = match probe_kind(self.store.as_ref(), target).await {
            Ok(_) => NodeRef::File(target.to_string()),
            Err(MediaTreeError::ObjectNotFound(_)) => NodeRef::Folder(target.to_string()),
            Err(e) => return Err(e),
        };

        let intent = status_intent(source, Status::Bin);
        let mut report = self.engine.execute(&intent).await?;

        let moved: Vec<MovedObject> = report.moved.clone();
        for object in &moved {
            if let Err(e) = self.write_back_reference(object).await {
                warn!("failed to record back-reference for {}: {}", object.to, e);
                report.failed.push(FailedObject {
                    key: object.to.clone(),
                    error: e.to_string(),
                });
            }
        }

        Ok(report)
    }

    async fn write_back_reference(&self, object: &MovedObject) -> Result<()> {
        let mut metadata = self.store.get_metadata(&object.to, object.kind).await?;
        metadata.insert(BACK_FIELD.to_string(), object.from.clone());
        self.store
            .set_metadata(&object.to, object.kind, &metadata)
            .await
    }

    /// Restore a binned object to its pre-delete key.
    ///
    /// Only legal for keys under `bin`. A missing back-reference is a
    /// skip, not an error, so batches can make partial progress. A
    /// back-reference pointing outside the namespace is corrupt and
    /// rejected. The back-reference field is cleared after the rename.
    pub async fn restore(&self, key: &str) -> Result<RestoreOutcome> {
        path::validate(key, &self.namespace_root)?;
        if Status::of(key) != Some(Status::Bin) {
            return Err(MediaTreeError::Validation(format!(
                "only objects in the bin can be restored: {key}"
            )));
        }

        let kind = probe_kind(self.store.as_ref(), key).await?;
        let mut metadata = self.store.get_metadata(key, kind).await?;
        let back = match metadata.remove(BACK_FIELD) {
            Some(back) => back,
            None => {
                warn!("no back-reference on {}, skipping restore", key);
                return Ok(RestoreOutcome::SkippedNoBackRef);
            }
        };
        if !path::is_under(&back, &self.namespace_root) {
            return Err(MediaTreeError::Validation(format!(
                "back-reference escapes namespace: {back}"
            )));
        }

        self.store.rename(key, &back, kind).await?;
        self.store.set_metadata(&back, kind, &metadata).await?;

        // The restore may recreate folders that were only ever implicit.
        for ancestor in path::ancestors(&back, &self.namespace_root) {
            self.registry.upsert(&ancestor).await?;
        }

        Ok(RestoreOutcome::Restored { to: back })
    }

    /// Restore a batch of binned objects, tolerating per-item skips and
    /// failures.
    pub async fn restore_many(&self, keys: &[String]) -> RestoreReport {
        let mut report = RestoreReport::default();
        for key in keys {
            match self.restore(key).await {
                Ok(RestoreOutcome::Restored { to }) => report.restored.push((key.clone(), to)),
                Ok(RestoreOutcome::SkippedNoBackRef) => report.skipped.push(key.clone()),
                Err(e) => report.failed.push(FailedObject {
                    key: key.clone(),
                    error: e.to_string(),
                }),
            }
        }
        report
    }

    /// Permanently delete one object. Irreversible.
    ///
    /// The folder record above the object stays registered even when this
    /// empties the folder.
    pub async fn purge(&self, key: &str) -> Result<()> {
        path::validate(key, &self.namespace_root)?;
        let kind = probe_kind(self.store.as_ref(), key).await?;
        self.store.delete_keys(&[key.to_string()], kind).await
    }

    /// Permanently delete every object under the bin root, all kinds,
    /// paginated. Per-batch failures are recorded and do not stop the
    /// sweep.
    pub async fn empty_bin(&self) -> Result<PurgeReport> {
        let bin_root = path::join(&self.namespace_root, Status::Bin.as_str());
        let mut report = PurgeReport::default();

        for kind in ResourceKind::ALL {
            let mut cursor: Option<String> = None;
            loop {
                let page = self.store.list(&bin_root, kind, cursor.as_deref()).await?;
                if !page.objects.is_empty() {
                    let keys: Vec<String> =
                        page.objects.into_iter().map(|o| o.key).collect();
                    match self.store.delete_keys(&keys, kind).await {
                        Ok(()) => report.purged += keys.len(),
                        Err(e) => {
                            for key in keys {
                                report.failed.push(FailedObject {
                                    key,
                                    error: e.to_string(),
                                });
                            }
                        }
                    }
                }
                match page.next_cursor {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }
        }

        Ok(report)
    }
}
