//! Library service for mediatree.
//!
//! The facade the transport layer talks to: tree reads, validated moves,
//! folder creation and the soft-delete lifecycle. Authorization happens
//! upstream; this layer validates shape and namespace confinement.

use std::sync::Arc;

use tracing::info;

use crate::engine::{MoveEngine, MoveIntent, MoveReport};
use crate::lifecycle::{LifecycleEngine, PurgeReport, RestoreOutcome, RestoreReport};
use crate::path;
use crate::registry::{Database, FolderRecord, FolderRegistry};
use crate::store::ObjectStore;
use crate::tree::{TreeBuilder, TreeNode};
use crate::Result;

/// High-level entry point wiring the store, registry and engines.
pub struct LibraryService {
    registry: FolderRegistry,
    builder: TreeBuilder,
    engine: MoveEngine,
    lifecycle: LifecycleEngine,
    namespace_root: String,
}

impl LibraryService {
    /// Create a service over the given store and database, scoped to one
    /// namespace root.
    pub fn new(store: Arc<dyn ObjectStore>, db: &Database, namespace_root: &str) -> Self {
        let registry = FolderRegistry::new(db.pool().clone(), namespace_root);
        let builder = TreeBuilder::new(store.clone(), registry.clone());
        let engine = MoveEngine::new(store.clone(), registry.clone());
        let lifecycle = LifecycleEngine::new(store, registry.clone());
        Self {
            registry,
            builder,
            engine,
            lifecycle,
            namespace_root: namespace_root.to_string(),
        }
    }

    /// The namespace root this service is scoped to.
    pub fn namespace_root(&self) -> &str {
        &self.namespace_root
    }

    /// Build the folder tree rooted at `prefix`.
    pub async fn tree(&self, prefix: &str) -> Result<TreeNode> {
        path::validate(prefix, &self.namespace_root)?;
        self.builder.build(prefix).await
    }

    /// Build the namespace root with its three status roots, synthesizing
    /// virtual folders for statuses that do not physically exist yet.
    pub async fn root_tree(&self) -> Result<TreeNode> {
        self.builder.build_root().await
    }

    /// Execute a move intent. The caller should re-fetch the tree
    /// afterwards regardless of the report, to reconcile its view.
    pub async fn apply_move(&self, intent: &MoveIntent) -> Result<MoveReport> {
        let report = self.engine.execute(intent).await?;
        info!(
            "move executed: {} objects moved, {} failed",
            report.moved.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Materialize an empty folder.
    ///
    /// The registry is what makes this possible at all: the object store
    /// forgets prefixes with no objects under them.
    pub async fn create_folder(&self, full_path: &str) -> Result<FolderRecord> {
        path::validate(full_path, &self.namespace_root)?;
        self.registry.upsert_with_ancestors(full_path).await?;
        self.registry.get(full_path).await?.ok_or_else(|| {
            crate::MediaTreeError::Database(format!("created folder vanished: {full_path}"))
        })
    }

    /// Rename a folder prefix, moving every object and record under it.
    pub async fn rename_folder(&self, from: &str, to: &str) -> Result<MoveReport> {
        self.engine.rename_folder(from, to).await
    }

    /// Rename a single file to an explicit destination key.
    pub async fn rename_file(&self, from: &str, to: &str) -> Result<MoveReport> {
        self.engine.rename_file(from, to).await
    }

    /// Permanently delete a single file.
    pub async fn delete_file(&self, key: &str) -> Result<()> {
        self.lifecycle.purge(key).await
    }

    /// Move a file or folder into the bin, reversibly.
    pub async fn soft_delete(&self, target: &str) -> Result<MoveReport> {
        self.lifecycle.soft_delete(target).await
    }

    /// Restore one binned object to its pre-delete location.
    pub async fn restore(&self, key: &str) -> Result<RestoreOutcome> {
        self.lifecycle.restore(key).await
    }

    /// Restore a batch of binned objects with partial progress.
    pub async fn restore_many(&self, keys: &[String]) -> RestoreReport {
        self.lifecycle.restore_many(keys).await
    }

    /// Permanently delete everything in the bin.
    pub async fn empty_bin(&self) -> Result<PurgeReport> {
        let report = self.lifecycle.empty_bin().await?;
        info!("bin emptied: {} objects purged", report.purged);
        Ok(report)
    }
}
