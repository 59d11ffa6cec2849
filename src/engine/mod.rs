//! Move execution.
//!
//! "Move" is not a primitive of the remote store: it is synthesized from
//! per-object renames, repeated over every descendant for folder moves,
//! with no cross-object atomicity. The engine validates the intent,
//! performs the renames sequentially, and keeps the folder registry
//! consistent with the result.

mod guard;
mod intent;

pub use guard::can_move;
pub use intent::{FailedObject, MoveIntent, MoveReport, MovedObject, NodeRef};

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::path::{self, Status};
use crate::registry::FolderRegistry;
use crate::selection::SelectionModel;
use crate::store::{probe_kind, ObjectStore, ResourceKind};
use crate::{MediaTreeError, Result};

/// Cooperative cancellation signal.
///
/// A long prefix rename has no native cancellation; the engine polls
/// this flag between individual renames and stops with a well-defined
/// partial state. An in-flight single rename is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a fresh, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }
}

/// Executes validated move intents against the store and the registry.
pub struct MoveEngine {
    store: Arc<dyn ObjectStore>,
    registry: FolderRegistry,
    namespace_root: String,
}

impl MoveEngine {
    /// Create an engine over the given store and registry.
    pub fn new(store: Arc<dyn ObjectStore>, registry: FolderRegistry) -> Self {
        let namespace_root = registry.namespace_root().to_string();
        Self {
            store,
            registry,
            namespace_root,
        }
    }

    /// Execute a move intent to completion.
    pub async fn execute(&self, intent: &MoveIntent) -> Result<MoveReport> {
        self.execute_with_cancel(intent, &CancelFlag::new()).await
    }

    /// Execute a move intent, polling the cancellation flag between
    /// individual object renames.
    ///
    /// The guard is re-checked here regardless of any earlier UI-side
    /// check. Per-object failures inside a batch are recorded in the
    /// report; structural failures abort before any mutation.
    pub async fn execute_with_cancel(
        &self,
        intent: &MoveIntent,
        cancel: &CancelFlag,
    ) -> Result<MoveReport> {
        if !can_move(&intent.source, &intent.target) {
            return Err(MediaTreeError::InvalidIntent(format!(
                "{} cannot be dropped on {}",
                source_kind(&intent.source),
                target_kind(&intent.target)
            )));
        }

        match (&intent.source, &intent.target) {
            (NodeRef::File(source), target) => {
                path::validate(source, &self.namespace_root)?;
                let dest = self.destination_for(source, target)?;
                let mut report = MoveReport::default();
                self.move_file(source, &dest, &mut report).await?;
                Ok(report)
            }
            (NodeRef::Folder(source), target) => {
                path::validate(source, &self.namespace_root)?;
                let dest = self.destination_for(source, target)?;
                self.move_folder(source, &dest, cancel, &BTreeSet::new())
                    .await
            }
            (NodeRef::Selection(selection), target) => {
                self.move_selection(selection, target, cancel).await
            }
            // Everything else was rejected by the guard.
            _ => Err(MediaTreeError::InvalidIntent(
                "unsupported source node".to_string(),
            )),
        }
    }

    /// Rename a single object to an explicit destination key.
    pub async fn rename_file(&self, from: &str, to: &str) -> Result<MoveReport> {
        path::validate(from, &self.namespace_root)?;
        path::validate(to, &self.namespace_root)?;

        let mut report = MoveReport::default();
        self.move_file(from, to, &mut report).await?;
        Ok(report)
    }

    /// Rename a folder prefix to an explicit destination prefix.
    pub async fn rename_folder(&self, from: &str, to: &str) -> Result<MoveReport> {
        self.move_folder(from, to, &CancelFlag::new(), &BTreeSet::new())
            .await
    }

    /// Destination key or prefix for a source dropped on a target.
    fn destination_for(&self, source: &str, target: &NodeRef) -> Result<String> {
        match target {
            NodeRef::Folder(folder) => {
                path::validate(folder, &self.namespace_root)?;
                Ok(path::join(folder, path::basename(source)))
            }
            NodeRef::Virtual(status) => path::with_status(source, *status),
            _ => Err(MediaTreeError::InvalidIntent(
                "target must be a folder or a status root".to_string(),
            )),
        }
    }

    /// Move one object, probing its resource kind first.
    ///
    /// On success the destination's ancestor folders are registered; the
    /// move may have created folders the registry has never seen.
    async fn move_file(&self, from: &str, to: &str, report: &mut MoveReport) -> Result<()> {
        let kind = probe_kind(self.store.as_ref(), from).await?;
        self.store.rename(from, to, kind).await?;
        debug!("renamed {} -> {} ({})", from, to, kind);

        for ancestor in path::ancestors(to, &self.namespace_root) {
            self.registry.upsert(&ancestor).await?;
        }

        report.moved.push(MovedObject {
            from: from.to_string(),
            to: to.to_string(),
            kind,
        });
        Ok(())
    }

    /// Move every object under a prefix to the same suffix under another.
    ///
    /// There is no bulk-rename primitive: this is a sequential loop per
    /// object, per kind. Registry collisions are detected before any
    /// mutation; per-object rename failures are recorded and do not stop
    /// the walk. On cancellation the registry is left untouched, since
    /// objects remain on both sides of the rename.
    async fn move_folder(
        &self,
        from: &str,
        to: &str,
        cancel: &CancelFlag,
        excluded: &BTreeSet<String>,
    ) -> Result<MoveReport> {
        path::validate(from, &self.namespace_root)?;
        path::validate(to, &self.namespace_root)?;
        if from == to {
            return Err(MediaTreeError::InvalidIntent(format!(
                "folder {from} dropped on itself"
            )));
        }
        if path::is_under(to, from) {
            return Err(MediaTreeError::InvalidIntent(format!(
                "cannot move {from} beneath itself"
            )));
        }

        // Pre-flight: any unrelated record already at a destination path
        // aborts the whole folder move before anything is renamed.
        let moved_records = self.registry.list_by_prefix(from).await?;
        let mut destinations: BTreeSet<String> = BTreeSet::from([to.to_string()]);
        for record in &moved_records {
            let dest = match path::relative_suffix(&record.full_path, from) {
                Some(suffix) => path::join(to, suffix),
                None => to.to_string(),
            };
            destinations.insert(dest);
        }
        for dest in &destinations {
            if self.registry.exists(dest).await? {
                return Err(MediaTreeError::RenameCollision(dest.clone()));
            }
        }

        let mut report = MoveReport::default();

        'kinds: for kind in ResourceKind::ALL {
            let mut cursor: Option<String> = None;
            loop {
                let page = self.store.list(from, kind, cursor.as_deref()).await?;
                for object in page.objects {
                    if cancel.is_cancelled() {
                        report.cancelled = true;
                        break 'kinds;
                    }
                    if excluded.contains(&object.key) {
                        continue;
                    }
                    let dest = match path::relative_suffix(&object.key, from) {
                        Some(suffix) => path::join(to, suffix),
                        None => to.to_string(),
                    };
                    match self.store.rename(&object.key, &dest, kind).await {
                        Ok(()) => report.moved.push(MovedObject {
                            from: object.key,
                            to: dest,
                            kind,
                        }),
                        Err(e) => report.failed.push(FailedObject {
                            key: object.key,
                            error: e.to_string(),
                        }),
                    }
                }
                match page.next_cursor {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }
        }

        if report.cancelled {
            info!(
                "folder move {} -> {} cancelled after {} objects",
                from,
                to,
                report.moved.len()
            );
            return Ok(report);
        }

        self.registry.rewrite_prefix(from, to).await?;
        self.registry.upsert_with_ancestors(to).await?;

        info!(
            "moved folder {} -> {} ({} objects, {} failed)",
            from,
            to,
            report.moved.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Expand a selection and move each root independently.
    ///
    /// Per-root failures (including a collision on one folder root) are
    /// recorded and do not undo or block sibling roots.
    async fn move_selection(
        &self,
        selection: &SelectionModel,
        target: &NodeRef,
        cancel: &CancelFlag,
    ) -> Result<MoveReport> {
        let excluded: BTreeSet<String> =
            selection.excluded().map(str::to_string).collect();
        let mut report = MoveReport::default();

        for root in selection.effective_roots() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            if let Err(e) = path::validate(root, &self.namespace_root) {
                report.failed.push(FailedObject {
                    key: root.to_string(),
                    error: e.to_string(),
                });
                continue;
            }

            // Each root is either a single object or a folder prefix,
            // decided by probing.
            match probe_kind(self.store.as_ref(), root).await {
                Ok(_) => {
                    if selection.is_excluded(root) {
                        continue;
                    }
                    let outcome = match self.destination_for(root, target) {
                        Ok(dest) => self.move_file(root, &dest, &mut report).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = outcome {
                        report.failed.push(FailedObject {
                            key: root.to_string(),
                            error: e.to_string(),
                        });
                    }
                }
                Err(MediaTreeError::ObjectNotFound(_)) => {
                    let outcome = match self.destination_for(root, target) {
                        Ok(dest) => self.move_folder(root, &dest, cancel, &excluded).await,
                        Err(e) => Err(e),
                    };
                    match outcome {
                        Ok(sub) => report.merge(sub),
                        Err(e) => report.failed.push(FailedObject {
                            key: root.to_string(),
                            error: e.to_string(),
                        }),
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }
}

fn source_kind(node: &NodeRef) -> &'static str {
    match node {
        NodeRef::File(_) => "file",
        NodeRef::Folder(_) => "folder",
        NodeRef::Virtual(_) => "status root",
        NodeRef::Selection(_) => "selection",
    }
}

fn target_kind(node: &NodeRef) -> &'static str {
    source_kind(node)
}

/// Build a file-to-status intent, the common soft-delete shape.
pub fn status_intent(source: NodeRef, status: Status) -> MoveIntent {
    MoveIntent::new(source, NodeRef::Virtual(status))
}
