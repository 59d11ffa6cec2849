//! Tree synthesis integration tests.

mod common;

use common::setup;
use mediatree::{ObjectStore, ResourceKind, Status, TreeNode};

#[tokio::test]
async fn discovered_folders_survive_without_their_files() {
    // The registry knows nothing about app/pending; an asset exists at
    // app/pending/a/img.jpg.
    let h = setup().await;
    h.store.put("app/pending/a/img.jpg", ResourceKind::Image).await;

    let tree = h.service.tree("app").await.unwrap();

    let pending = tree.find("app/pending").expect("pending folder");
    assert!(matches!(pending, TreeNode::Folder { .. }));
    let a = tree.find("app/pending/a").expect("folder a");
    assert!(a.find("app/pending/a/img.jpg").is_some());

    // Both folders are now registered, so they survive the file's removal.
    assert!(h.registry.exists("app/pending").await.unwrap());
    assert!(h.registry.exists("app/pending/a").await.unwrap());

    h.store
        .delete_keys(&["app/pending/a/img.jpg".to_string()], ResourceKind::Image)
        .await
        .unwrap();
    let tree = h.service.tree("app").await.unwrap();
    assert!(tree.find("app/pending/a").is_some());
}

#[tokio::test]
async fn repeated_reads_yield_identical_trees() {
    let h = setup().await;
    h.service.create_folder("app/published/kept").await.unwrap();
    h.store.put("app/pending/a/img.jpg", ResourceKind::Image).await;
    h.store.put("app/pending/a/clip.mp4", ResourceKind::Video).await;
    h.store.put("app/pending/b/blob.zip", ResourceKind::Raw).await;

    let first = h.service.tree("app").await.unwrap();
    let second = h.service.tree("app").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn root_tree_mixes_real_and_virtual_status_roots() {
    let h = setup().await;
    h.store.put("app/pending/img.jpg", ResourceKind::Image).await;

    let root = h.service.root_tree().await.unwrap();
    let TreeNode::Folder { children, .. } = &root else {
        panic!("expected folder root");
    };

    assert_eq!(children.len(), 3);
    assert!(
        matches!(&children[0], TreeNode::Folder { full_path, .. } if full_path == "app/pending")
    );
    assert_eq!(
        children[1],
        TreeNode::VirtualFolder {
            status: Status::Published
        }
    );
    assert_eq!(
        children[2],
        TreeNode::VirtualFolder {
            status: Status::Bin
        }
    );
}

#[tokio::test]
async fn tree_listing_follows_pagination() {
    let h = common::setup_with_page_size(3).await;
    for i in 0..10 {
        h.store
            .put(&format!("app/pending/batch/img{i:02}.jpg"), ResourceKind::Image)
            .await;
    }

    let tree = h.service.tree("app/pending/batch").await.unwrap();
    let TreeNode::Folder { children, .. } = &tree else {
        panic!("expected folder");
    };

    assert_eq!(children.len(), 10);
}

#[tokio::test]
async fn empty_folder_from_registry_appears_in_tree() {
    let h = setup().await;
    h.service.create_folder("app/pending/empty").await.unwrap();

    let tree = h.service.tree("app/pending").await.unwrap();
    let node = tree.find("app/pending/empty").expect("empty folder");
    assert!(matches!(node, TreeNode::Folder { children, .. } if children.is_empty()));
}
