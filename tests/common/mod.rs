//! Shared harness for integration tests.

use std::sync::Arc;

use mediatree::{Database, FolderRegistry, LibraryService, MemoryObjectStore};

/// Namespace root used by every integration test.
pub const NS: &str = "app";

/// An in-memory store, its registry and a service wired over both.
pub struct Harness {
    pub store: Arc<MemoryObjectStore>,
    pub registry: FolderRegistry,
    pub service: LibraryService,
}

/// Build a fresh harness over in-memory backends.
pub async fn setup() -> Harness {
    setup_with_page_size(100).await
}

/// Build a harness whose store paginates with the given page size.
pub async fn setup_with_page_size(page_size: usize) -> Harness {
    let db = Database::open_in_memory().await.unwrap();
    let registry = FolderRegistry::new(db.pool().clone(), NS);
    let store = Arc::new(MemoryObjectStore::new().with_page_size(page_size));
    let service = LibraryService::new(store.clone(), &db, NS);
    Harness {
        store,
        registry,
        service,
    }
}
