//! Move engine integration tests.

mod common;

use common::setup;
use mediatree::{
    MediaTreeError, MoveIntent, NodeRef, ResourceKind, SelectionModel, Status,
};

#[tokio::test]
async fn folder_to_status_root_rewrites_every_key() {
    let h = setup().await;
    h.store.put("app/pending/a/img.jpg", ResourceKind::Image).await;
    h.store.put("app/pending/a/deep/clip.mp4", ResourceKind::Video).await;
    h.store.put("app/pending/a/blob.zip", ResourceKind::Raw).await;
    h.service.create_folder("app/pending/a/deep").await.unwrap();

    let intent = MoveIntent::new(
        NodeRef::Folder("app/pending/a".to_string()),
        NodeRef::Virtual(Status::Published),
    );
    let report = h.service.apply_move(&intent).await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.moved.len(), 3);

    for kind in ResourceKind::ALL {
        for key in h.store.keys(kind).await {
            assert!(
                key.starts_with("app/published/a/"),
                "stale key survived: {key}"
            );
        }
    }

    // Registry records followed, with recomputed statuses.
    let record = h.registry.get("app/published/a/deep").await.unwrap().unwrap();
    assert_eq!(record.status(), Some(Status::Published));
    assert!(!h.registry.exists("app/pending/a/deep").await.unwrap());
}

#[tokio::test]
async fn folder_to_folder_nests_under_target() {
    let h = setup().await;
    h.store.put("app/pending/a/img.jpg", ResourceKind::Image).await;

    let intent = MoveIntent::new(
        NodeRef::Folder("app/pending/a".to_string()),
        NodeRef::Folder("app/pending/b".to_string()),
    );
    let report = h.service.apply_move(&intent).await.unwrap();

    assert!(report.is_clean());
    assert!(h.store.contains("app/pending/b/a/img.jpg", ResourceKind::Image).await);
    assert!(h.registry.exists("app/pending/b/a").await.unwrap());
}

#[tokio::test]
async fn same_folder_move_is_rejected_without_mutation() {
    let h = setup().await;
    h.store.put("app/pending/a/img.jpg", ResourceKind::Image).await;

    let intent = MoveIntent::new(
        NodeRef::Folder("app/pending/a".to_string()),
        NodeRef::Folder("app/pending/a".to_string()),
    );
    let result = h.service.apply_move(&intent).await;

    assert!(matches!(result, Err(MediaTreeError::InvalidIntent(_))));
    assert!(h.store.contains("app/pending/a/img.jpg", ResourceKind::Image).await);
}

#[tokio::test]
async fn folder_rename_collision_leaves_registry_untouched() {
    // A record for the destination already exists and is unrelated to
    // the moved subtree.
    let h = setup().await;
    h.service.create_folder("app/pending/a/inner").await.unwrap();
    h.service.create_folder("app/pending/b").await.unwrap();
    h.store.put("app/pending/a/img.jpg", ResourceKind::Image).await;

    let result = h.service.rename_folder("app/pending/a", "app/pending/b").await;

    assert!(matches!(result, Err(MediaTreeError::RenameCollision(_))));
    // The collision pre-flight runs before any mutation: subtree records
    // and objects are unchanged.
    assert!(h.registry.exists("app/pending/a").await.unwrap());
    assert!(h.registry.exists("app/pending/a/inner").await.unwrap());
    assert!(h.store.contains("app/pending/a/img.jpg", ResourceKind::Image).await);
}

#[tokio::test]
async fn file_rename_collision_reported_against_live_object() {
    let h = setup().await;
    h.store.put("app/pending/a.jpg", ResourceKind::Image).await;
    h.store.put("app/published/a.jpg", ResourceKind::Image).await;

    let intent = MoveIntent::new(
        NodeRef::File("app/pending/a.jpg".to_string()),
        NodeRef::Virtual(Status::Published),
    );
    let result = h.service.apply_move(&intent).await;

    assert!(matches!(result, Err(MediaTreeError::RenameCollision(_))));
}

#[tokio::test]
async fn selection_move_respects_exclusions() {
    // The excluded descendant of a selected folder root is skipped
    // during the prefix walk.
    let h = setup().await;
    h.store.put("app/pending/a/img.jpg", ResourceKind::Image).await;
    h.store.put("app/pending/a/other.jpg", ResourceKind::Image).await;

    let mut selection = SelectionModel::new();
    selection.start_selection("app/pending/a");
    selection.toggle("app/pending/a/img.jpg");
    assert!(!selection.is_selected("app/pending/a/img.jpg"));
    assert!(selection.is_selected("app/pending/a/other.jpg"));

    let intent = MoveIntent::new(
        NodeRef::Selection(selection),
        NodeRef::Virtual(Status::Published),
    );
    let report = h.service.apply_move(&intent).await.unwrap();

    assert_eq!(report.moved.len(), 1);
    assert!(h.store.contains("app/published/a/other.jpg", ResourceKind::Image).await);
    assert!(h.store.contains("app/pending/a/img.jpg", ResourceKind::Image).await);
}

#[tokio::test]
async fn selection_mixes_file_and_folder_roots() {
    let h = setup().await;
    h.store.put("app/pending/solo.jpg", ResourceKind::Image).await;
    h.store.put("app/pending/batch/one.jpg", ResourceKind::Image).await;
    h.store.put("app/pending/batch/two.mp4", ResourceKind::Video).await;

    let mut selection = SelectionModel::new();
    selection.start_selection("app/pending/solo.jpg");
    selection.toggle("app/pending/batch");

    let intent = MoveIntent::new(
        NodeRef::Selection(selection),
        NodeRef::Folder("app/published/incoming".to_string()),
    );
    let report = h.service.apply_move(&intent).await.unwrap();

    assert!(report.is_clean());
    assert!(h.store.contains("app/published/incoming/solo.jpg", ResourceKind::Image).await);
    assert!(h.store.contains("app/published/incoming/batch/one.jpg", ResourceKind::Image).await);
    assert!(h.store.contains("app/published/incoming/batch/two.mp4", ResourceKind::Video).await);
}

#[tokio::test]
async fn selection_missing_root_fails_that_root_only() {
    let h = setup().await;
    h.store.put("app/pending/real.jpg", ResourceKind::Image).await;

    let mut selection = SelectionModel::new();
    selection.start_selection("app/pending/real.jpg");
    // A folder root with nothing under it: the prefix walk finds no
    // objects, which is fine, not a failure.
    selection.toggle("app/pending/nothing-here");

    let intent = MoveIntent::new(
        NodeRef::Selection(selection),
        NodeRef::Virtual(Status::Bin),
    );
    let report = h.service.apply_move(&intent).await.unwrap();

    assert_eq!(report.moved.len(), 1);
    assert!(h.store.contains("app/bin/real.jpg", ResourceKind::Image).await);
}

#[tokio::test]
async fn partial_failure_reports_both_sides() {
    let h = setup().await;
    h.store.put("app/pending/a/one.jpg", ResourceKind::Image).await;
    h.store.put("app/pending/a/two.jpg", ResourceKind::Image).await;
    // Occupy one destination so that rename fails mid-batch.
    h.store.put("app/published/a/two.jpg", ResourceKind::Image).await;

    let intent = MoveIntent::new(
        NodeRef::Folder("app/pending/a".to_string()),
        NodeRef::Virtual(Status::Published),
    );
    let report = h.service.apply_move(&intent).await.unwrap();

    assert_eq!(report.moved.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].key, "app/pending/a/two.jpg");
    // The failed object stays put; the sibling made it.
    assert!(h.store.contains("app/pending/a/two.jpg", ResourceKind::Image).await);
    assert!(h.store.contains("app/published/a/one.jpg", ResourceKind::Image).await);
}

#[tokio::test]
async fn underscore_folder_renames_without_dragging_lookalikes() {
    // "a_b" must match only itself, not siblings like "axb".
    let h = setup().await;
    h.service.create_folder("app/pending/a_b").await.unwrap();
    h.service.create_folder("app/pending/axb/keep").await.unwrap();
    h.store.put("app/pending/a_b/img.jpg", ResourceKind::Image).await;

    let report = h
        .service
        .rename_folder("app/pending/a_b", "app/published/c")
        .await
        .unwrap();

    assert!(report.is_clean());
    assert!(h.store.contains("app/published/c/img.jpg", ResourceKind::Image).await);
    assert!(h.registry.exists("app/published/c").await.unwrap());
    // The lookalike folder is untouched.
    assert!(h.registry.exists("app/pending/axb/keep").await.unwrap());
    assert!(!h.registry.exists("app/published/c/keep").await.unwrap());
}

#[tokio::test]
async fn prefix_walk_spans_pages() {
    let h = common::setup_with_page_size(2).await;
    for i in 0..7 {
        h.store
            .put(&format!("app/pending/a/img{i}.jpg"), ResourceKind::Image)
            .await;
    }

    let report = h
        .service
        .rename_folder("app/pending/a", "app/published/a")
        .await
        .unwrap();

    assert_eq!(report.moved.len(), 7);
    assert!(h.store.keys(ResourceKind::Image).await.iter().all(|k| k.starts_with("app/published/a/")));
}

#[tokio::test]
async fn moved_out_folder_stays_registered() {
    let h = setup().await;
    h.service.create_folder("app/pending/a").await.unwrap();
    h.store.put("app/pending/a/img.jpg", ResourceKind::Image).await;
    // Register the parent before moving its only child out.
    h.service.tree("app").await.unwrap();

    let intent = MoveIntent::new(
        NodeRef::File("app/pending/a/img.jpg".to_string()),
        NodeRef::Folder("app/published/b".to_string()),
    );
    h.service.apply_move(&intent).await.unwrap();

    // A move never deletes a folder record.
    assert!(h.registry.exists("app/pending/a").await.unwrap());
}
