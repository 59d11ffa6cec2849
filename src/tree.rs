//! Tree synthesis: merging the folder registry with the live listing.
//!
//! The registry is the skeleton (it remembers empty folders), the remote
//! listing is the leaf layer (files, plus folders that exist only because
//! they contain files). The merge never blocks on write-back: ancestor
//! folders discovered from assets are registered best-effort.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::path::{self, Status};
use crate::registry::FolderRegistry;
use crate::store::{ObjectStore, RemoteObject, ResourceKind};
use crate::Result;

/// A node of the synthesized tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    /// A file backed by a live object.
    File {
        /// Full object key.
        full_path: String,
        /// Delivery URL.
        url: String,
    },
    /// A folder, real (registered or containing objects).
    Folder {
        /// Full folder path.
        full_path: String,
        /// Child nodes: folders first, then files, each sorted by path.
        children: Vec<TreeNode>,
    },
    /// A status root with no backing folder yet. A valid drop target,
    /// not expandable.
    VirtualFolder {
        /// The status this root stands for.
        status: Status,
    },
}

impl TreeNode {
    /// Full path of a file or folder node.
    pub fn full_path(&self) -> Option<&str> {
        match self {
            TreeNode::File { full_path, .. } | TreeNode::Folder { full_path, .. } => {
                Some(full_path)
            }
            TreeNode::VirtualFolder { .. } => None,
        }
    }

    /// Display name: the last path segment, or the status for virtual roots.
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { full_path, .. } | TreeNode::Folder { full_path, .. } => {
                path::basename(full_path)
            }
            TreeNode::VirtualFolder { status } => status.as_str(),
        }
    }

    /// Find a descendant node by full path.
    pub fn find(&self, target: &str) -> Option<&TreeNode> {
        match self.full_path() {
            Some(p) if p == target => return Some(self),
            _ => {}
        }
        if let TreeNode::Folder { children, .. } = self {
            for child in children {
                if let Some(found) = child.find(target) {
                    return Some(found);
                }
            }
        }
        None
    }
}

/// Lists every object under a prefix, across all resource kinds.
pub struct AssetLister {
    store: Arc<dyn ObjectStore>,
}

impl AssetLister {
    /// Create a lister over the given store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// All objects under `prefix`, every kind, following pagination.
    /// Deduplicated by key.
    pub async fn list_all(&self, prefix: &str) -> Result<Vec<RemoteObject>> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();

        for kind in ResourceKind::ALL {
            let mut cursor: Option<String> = None;
            loop {
                let page = self.store.list(prefix, kind, cursor.as_deref()).await?;
                for object in page.objects {
                    if seen.insert(object.key.clone()) {
                        out.push(object);
                    }
                }
                match page.next_cursor {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }
        }

        Ok(out)
    }
}

/// Builds the folder tree for a prefix.
pub struct TreeBuilder {
    lister: AssetLister,
    registry: FolderRegistry,
    namespace_root: String,
}

impl TreeBuilder {
    /// Create a builder over the given store and registry.
    pub fn new(store: Arc<dyn ObjectStore>, registry: FolderRegistry) -> Self {
        let namespace_root = registry.namespace_root().to_string();
        Self {
            lister: AssetLister::new(store),
            registry,
            namespace_root,
        }
    }

    /// Build the folder tree rooted at `prefix`.
    ///
    /// Registry records are walked first so empty folders appear; assets
    /// second, creating any intermediate folders the registry missed.
    /// Ancestors discovered only through assets are written back to the
    /// registry best-effort; a write-back failure never fails the read.
    pub async fn build(&self, prefix: &str) -> Result<TreeNode> {
        let records = self.registry.list_by_prefix(prefix).await?;
        let assets = self.lister.list_all(prefix).await?;

        let registered: BTreeSet<String> =
            records.iter().map(|r| r.full_path.clone()).collect();

        // Folder skeleton: the prefix itself, every registered path, and
        // every intermediate segment on the way down.
        let mut folders: BTreeSet<String> = BTreeSet::new();
        folders.insert(prefix.to_string());
        for record in &records {
            self.insert_chain(&mut folders, prefix, &record.full_path);
        }

        // Asset layer: parent folders plus the file leaves themselves.
        let mut files: BTreeMap<String, Vec<RemoteObject>> = BTreeMap::new();
        let mut discovered: BTreeSet<String> = BTreeSet::new();
        for asset in assets {
            let folder = match path::parent(&asset.key) {
                Some(parent) if path::is_under(parent, prefix) => parent.to_string(),
                _ => prefix.to_string(),
            };
            self.insert_chain(&mut folders, prefix, &folder);

            // Remember folders the registry did not know about yet. Only
            // paths inside the queried subtree are written back; folders
            // above `prefix` are not this read's business.
            for ancestor in path::ancestors(&asset.key, &self.namespace_root) {
                if path::is_under(&ancestor, prefix) && !registered.contains(&ancestor) {
                    discovered.insert(ancestor);
                }
            }

            files.entry(folder).or_default().push(asset);
        }

        // Opportunistic sync: the registry must remember these folders even
        // after the files that revealed them are gone.
        for folder in &discovered {
            if let Err(e) = self.registry.upsert(folder).await {
                warn!("failed to register discovered folder {}: {}", folder, e);
            }
        }

        Ok(self.assemble(prefix, &folders, &files))
    }

    /// Build the namespace root with its three status roots.
    ///
    /// A status that exists as a real folder (registered or populated) is
    /// returned as such; otherwise a virtual folder stands in as a drop
    /// target.
    pub async fn build_root(&self) -> Result<TreeNode> {
        let full = self.build(&self.namespace_root).await?;

        let mut children = Vec::new();
        for status in Status::ALL {
            let status_path = path::join(&self.namespace_root, status.as_str());
            match full.find(&status_path) {
                Some(node) => children.push(node.clone()),
                None => children.push(TreeNode::VirtualFolder { status }),
            }
        }

        Ok(TreeNode::Folder {
            full_path: self.namespace_root.clone(),
            children,
        })
    }

    /// Insert `folder` and every segment between `prefix` and it.
    fn insert_chain(&self, folders: &mut BTreeSet<String>, prefix: &str, folder: &str) {
        if !path::is_under(folder, prefix) {
            return;
        }
        let mut current = folder;
        while path::is_under(current, prefix) && current != prefix {
            if !folders.insert(current.to_string()) {
                break;
            }
            match path::parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    fn assemble(
        &self,
        folder_path: &str,
        folders: &BTreeSet<String>,
        files: &BTreeMap<String, Vec<RemoteObject>>,
    ) -> TreeNode {
        let mut children: Vec<TreeNode> = folders
            .iter()
            .filter(|f| path::parent(f) == Some(folder_path))
            .map(|f| self.assemble(f, folders, files))
            .collect();

        if let Some(leaf_files) = files.get(folder_path) {
            let mut leaves: Vec<&RemoteObject> = leaf_files.iter().collect();
            leaves.sort_by(|a, b| a.key.cmp(&b.key));
            children.extend(leaves.into_iter().map(|o| TreeNode::File {
                full_path: o.key.clone(),
                url: o.url.clone(),
            }));
        }

        TreeNode::Folder {
            full_path: folder_path.to_string(),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Database;
    use crate::store::MemoryObjectStore;

    async fn setup() -> (Arc<MemoryObjectStore>, FolderRegistry, TreeBuilder) {
        let db = Database::open_in_memory().await.unwrap();
        let registry = FolderRegistry::new(db.pool().clone(), "app");
        let store = Arc::new(MemoryObjectStore::new());
        let builder = TreeBuilder::new(store.clone(), registry.clone());
        (store, registry, builder)
    }

    fn child_paths(node: &TreeNode) -> Vec<&str> {
        match node {
            TreeNode::Folder { children, .. } => children
                .iter()
                .filter_map(|c| c.full_path())
                .collect(),
            _ => Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_folder_appears_from_registry() {
        let (_store, registry, builder) = setup().await;
        registry.upsert("app/pending/empty").await.unwrap();

        let tree = builder.build("app/pending").await.unwrap();

        assert_eq!(child_paths(&tree), vec!["app/pending/empty"]);
    }

    #[tokio::test]
    async fn test_assets_create_missing_folders_and_sync_registry() {
        // The registry knows nothing, an asset exists deep down.
        let (store, registry, builder) = setup().await;
        store.put("app/pending/a/img.jpg", ResourceKind::Image).await;

        let tree = builder.build("app").await.unwrap();

        let pending = tree.find("app/pending").expect("pending folder");
        let a = pending.find("app/pending/a").expect("folder a");
        let img = a.find("app/pending/a/img.jpg").expect("file leaf");
        assert!(matches!(img, TreeNode::File { .. }));

        // The registry now remembers both folders.
        assert!(registry.exists("app/pending").await.unwrap());
        assert!(registry.exists("app/pending/a").await.unwrap());
    }

    #[tokio::test]
    async fn test_subtree_build_leaves_folders_above_prefix_alone() {
        let (store, registry, builder) = setup().await;
        store.put("app/pending/a/img.jpg", ResourceKind::Image).await;

        builder.build("app/pending/a").await.unwrap();

        // The queried folder is registered, its parent is not touched.
        assert!(registry.exists("app/pending/a").await.unwrap());
        assert!(!registry.exists("app/pending").await.unwrap());
    }

    #[tokio::test]
    async fn test_build_is_stable_across_reads() {
        let (store, registry, builder) = setup().await;
        registry.upsert("app/published/kept").await.unwrap();
        store.put("app/pending/a/img.jpg", ResourceKind::Image).await;
        store.put("app/pending/a/clip.mp4", ResourceKind::Video).await;

        let first = builder.build("app").await.unwrap();
        let second = builder.build("app").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_folders_sort_before_files() {
        let (store, registry, builder) = setup().await;
        store.put("app/pending/zzz.jpg", ResourceKind::Image).await;
        registry.upsert("app/pending/aaa").await.unwrap();

        let tree = builder.build("app/pending").await.unwrap();
        let TreeNode::Folder { children, .. } = &tree else {
            panic!("expected folder");
        };

        assert!(matches!(children[0], TreeNode::Folder { .. }));
        assert!(matches!(children[1], TreeNode::File { .. }));
    }

    #[tokio::test]
    async fn test_build_root_synthesizes_virtual_folders() {
        let (store, _registry, builder) = setup().await;
        store.put("app/pending/img.jpg", ResourceKind::Image).await;

        let root = builder.build_root().await.unwrap();
        let TreeNode::Folder { children, .. } = &root else {
            panic!("expected folder");
        };

        assert_eq!(children.len(), 3);
        assert!(matches!(&children[0], TreeNode::Folder { full_path, .. } if full_path == "app/pending"));
        assert!(matches!(children[1], TreeNode::VirtualFolder { status: Status::Published }));
        assert!(matches!(children[2], TreeNode::VirtualFolder { status: Status::Bin }));
    }

    #[tokio::test]
    async fn test_build_root_prefers_real_folder() {
        let (_store, registry, builder) = setup().await;
        registry.upsert("app/published").await.unwrap();

        let root = builder.build_root().await.unwrap();
        let TreeNode::Folder { children, .. } = &root else {
            panic!("expected folder");
        };

        assert!(matches!(&children[1], TreeNode::Folder { full_path, .. } if full_path == "app/published"));
    }

    #[tokio::test]
    async fn test_dedup_across_kinds() {
        let (store, _registry, builder) = setup().await;
        // Same key visible under two kinds; the tree shows it once.
        store.put("app/pending/thing", ResourceKind::Image).await;
        store.put("app/pending/thing", ResourceKind::Raw).await;

        let tree = builder.build("app/pending").await.unwrap();
        let TreeNode::Folder { children, .. } = &tree else {
            panic!("expected folder");
        };
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn test_node_serialization_is_tagged() {
        let node = TreeNode::Folder {
            full_path: "app/pending/a".to_string(),
            children: vec![TreeNode::VirtualFolder {
                status: Status::Bin,
            }],
        };

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "folder");
        assert_eq!(json["children"][0]["type"], "virtualfolder");
        assert_eq!(json["children"][0]["status"], "bin");
    }

    #[test]
    fn test_node_name() {
        let file = TreeNode::File {
            full_path: "app/pending/a/img.jpg".to_string(),
            url: String::new(),
        };
        assert_eq!(file.name(), "img.jpg");

        let virt = TreeNode::VirtualFolder {
            status: Status::Bin,
        };
        assert_eq!(virt.name(), "bin");
    }
}
