//! Move intents and their execution reports.

use crate::path::Status;
use crate::selection::SelectionModel;
use crate::store::ResourceKind;

/// A node reference as the UI hands it over.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRef {
    /// A single file by full key.
    File(String),
    /// A folder by full path.
    Folder(String),
    /// A status root with no backing folder yet.
    Virtual(Status),
    /// A multi-selection.
    Selection(SelectionModel),
}

/// A proposed move: drag source and drop target.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveIntent {
    /// What is being moved.
    pub source: NodeRef,
    /// Where it should land.
    pub target: NodeRef,
}

impl MoveIntent {
    /// Convenience constructor.
    pub fn new(source: NodeRef, target: NodeRef) -> Self {
        Self { source, target }
    }
}

/// One successfully renamed object.
#[derive(Debug, Clone, PartialEq)]
pub struct MovedObject {
    /// Key before the move.
    pub from: String,
    /// Key after the move.
    pub to: String,
    /// Resource kind the object was addressed under.
    pub kind: ResourceKind,
}

/// One object that failed mid-batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedObject {
    /// Key of the failed object.
    pub key: String,
    /// What went wrong.
    pub error: String,
}

/// Outcome of a move execution.
///
/// A batch of N renames is not atomic: this report says which objects
/// made it, which did not, and whether the run was cancelled part-way.
/// The caller re-derives the tree afterwards either way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveReport {
    /// Objects renamed successfully, in execution order.
    pub moved: Vec<MovedObject>,
    /// Objects that failed; siblings kept going.
    pub failed: Vec<FailedObject>,
    /// Whether a cancellation signal stopped the run early.
    pub cancelled: bool,
}

impl MoveReport {
    /// Whether every touched object succeeded and the run completed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: MoveReport) {
        self.moved.extend(other.moved);
        self.failed.extend(other.failed);
        self.cancelled |= other.cancelled;
    }
}
