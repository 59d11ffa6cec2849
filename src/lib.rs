//! mediatree - virtual folder tree and move engine over a flat object store.
//!
//! Presents a hierarchical file-manager abstraction (folders, moves,
//! multi-select, soft-delete/restore) over a remote object store that
//! only understands flat key prefixes, reconciled with a local SQLite
//! registry that remembers empty folders.

pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod path;
pub mod registry;
pub mod selection;
pub mod service;
pub mod store;
pub mod tree;

pub use config::Config;
pub use engine::{
    can_move, CancelFlag, FailedObject, MoveEngine, MoveIntent, MoveReport, MovedObject, NodeRef,
};
pub use error::{MediaTreeError, Result};
pub use lifecycle::{LifecycleEngine, PurgeReport, RestoreOutcome, RestoreReport};
pub use path::Status;
pub use registry::{Database, FolderRecord, FolderRegistry};
pub use selection::SelectionModel;
pub use service::LibraryService;
pub use store::{
    HttpObjectStore, ListPage, MemoryObjectStore, Metadata, ObjectStore, RemoteObject,
    ResourceKind,
};
pub use tree::{AssetLister, TreeBuilder, TreeNode};
