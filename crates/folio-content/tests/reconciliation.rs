//! Save-time reconciliation against in-memory storage.
//!
//! These tests verify:
//! - Uploads move from temporary to permanent storage
//! - Committed parameters never keep `#tmp` markers
//! - Unreferenced files are removed on update
//! - Pasted files are copied under fresh names
//! - External URLs are never blanked

mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{Fixture, OWNER, marker_count};
use folio_content::{ContentError, FileOutcome};
use folio_storage::{FileContentStorage, MemoryTemporaryStorage};
use folio_types::{ContentId, ContentStorage, TemporaryFileStorage};
use serde_json::json;

// ─────────────────────────────────────────────────────────────────────────────
// Uploads
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_moves_upload_into_content() -> Result<()> {
    let fx = Fixture::new();
    let id = fx.save(None, json!({"title": "draft"})).await?.content_id;
    fx.upload("photo.jpg", b"jpeg bytes").await?;

    let report = fx
        .save(Some(&id), json!({"title": "draft", "image": {"path": "photo.jpg#tmp"}}))
        .await?;

    assert_eq!(report.content_id, id);
    assert!(report.updated);
    assert_eq!(report.params["image"]["path"], "photo.jpg");
    assert_eq!(fx.committed(&id).await?["image"]["path"], "photo.jpg");
    assert_eq!(
        fx.content.file_bytes(&id, "photo.jpg").as_deref(),
        Some(&b"jpeg bytes"[..])
    );
    assert!(!fx.has_upload("photo.jpg").await?);
    assert_eq!(report.outcome("photo.jpg"), Some(&FileOutcome::Copied));
    Ok(())
}

#[tokio::test]
async fn test_fresh_save_leaves_upload_for_expiry() -> Result<()> {
    let fx = Fixture::new();
    fx.upload("photo.jpg", b"jpeg").await?;

    let report = fx.save(None, json!({"image": {"path": "photo.jpg#tmp"}})).await?;

    assert!(!report.updated);
    assert_eq!(report.params["image"]["path"], "photo.jpg");
    assert!(fx.has_file(&report.content_id, "photo.jpg").await?);
    assert!(fx.has_upload("photo.jpg").await?);
    Ok(())
}

#[tokio::test]
async fn test_double_save_creates_independent_copies() -> Result<()> {
    let fx = Fixture::new();
    fx.upload("photo.jpg", b"jpeg").await?;
    let params = json!({"image": {"path": "photo.jpg#tmp"}});

    let first = fx.save(None, params.clone()).await?.content_id;
    let second = fx.save(None, params).await?.content_id;

    assert_ne!(first, second);
    assert!(fx.has_file(&first, "photo.jpg").await?);
    assert!(fx.has_file(&second, "photo.jpg").await?);

    fx.content.delete_file(&first, "photo.jpg").await?;
    assert!(fx.has_file(&second, "photo.jpg").await?);
    Ok(())
}

#[tokio::test]
async fn test_uploads_inside_embedded_libraries_are_copied() -> Result<()> {
    let fx = Fixture::new();
    fx.upload("images/inner.png", b"png").await?;

    let report = fx
        .save(
            None,
            json!({"embedded": {"library": "H5P.Image 1.1", "params": {
                "file": {"path": "images/inner.png#tmp"}, "alt": "inner"
            }}}),
        )
        .await?;

    assert_eq!(
        report.params["embedded"]["params"]["file"]["path"],
        "images/inner.png"
    );
    assert!(fx.has_file(&report.content_id, "images/inner.png").await?);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_upload_references_copy_once() -> Result<()> {
    let fx = Fixture::new();
    fx.upload("a.png", b"a").await?;

    let report = fx
        .save(
            None,
            json!({
                "image": {"path": "a.png#tmp"},
                "images": [{"path": "a.png#tmp"}, {"path": "a.png#tmp"}]
            }),
        )
        .await?;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.params["image"]["path"], "a.png");
    assert_eq!(report.params["images"][1]["path"], "a.png");
    assert!(fx.has_file(&report.content_id, "a.png").await?);
    Ok(())
}

#[tokio::test]
async fn test_marker_on_committed_path_is_only_stripped() -> Result<()> {
    let fx = Fixture::new();
    fx.upload("a.png", b"a").await?;
    let id = fx
        .save(None, json!({"image": {"path": "a.png#tmp"}}))
        .await?
        .content_id;
    fx.temporary.delete_file("a.png", OWNER).await?;

    let report = fx
        .save(Some(&id), json!({"image": {"path": "a.png#tmp"}}))
        .await?;

    assert!(report.outcomes.is_empty());
    assert_eq!(report.params["image"]["path"], "a.png");
    assert!(fx.has_file(&id, "a.png").await?);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Markers and blanking
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_no_marker_leakage_even_when_copies_fail() -> Result<()> {
    let fx = Fixture::new();
    fx.upload("present.png", b"p").await?;

    let report = fx
        .save(
            None,
            json!({
                "image": {"path": "missing.png#tmp"},
                "images": [{"path": "present.png#tmp"}, {"path": "also-missing.png#tmp"}],
                "video": [{"path": "youtu.be/abc123#tmp"}]
            }),
        )
        .await?;

    assert_eq!(marker_count(&report.params), 0);
    assert_eq!(marker_count(&fx.committed(&report.content_id).await?), 0);
    Ok(())
}

#[tokio::test]
async fn test_markers_stripped_inside_uninstalled_library() -> Result<()> {
    let fx = Fixture::new();
    fx.upload("x.png", b"x").await?;

    let report = fx
        .save(
            None,
            json!({"embedded": {"library": "H5P.Image 9.9", "params": {
                "file": {"path": "x.png#tmp"},
                "gallery": [{"path": "y.png#tmp"}, {"caption": "path#tmp"}]
            }}}),
        )
        .await?;

    let committed = fx.committed(&report.content_id).await?;
    assert_eq!(marker_count(&committed), 1);
    assert_eq!(committed["embedded"]["params"]["file"]["path"], "x.png");
    assert_eq!(committed["embedded"]["params"]["gallery"][0]["path"], "y.png");
    assert_eq!(committed["embedded"]["params"]["gallery"][1]["caption"], "path#tmp");

    // Opaque parameters are never copied
    assert!(report.outcomes.is_empty());
    assert!(!fx.has_file(&report.content_id, "x.png").await?);
    assert!(fx.has_upload("x.png").await?);
    Ok(())
}

#[tokio::test]
async fn test_missing_upload_is_blanked_and_recommitted() -> Result<()> {
    let fx = Fixture::new();

    let report = fx
        .save(None, json!({"image": {"path": "ghost.png#tmp", "mime": "image/png"}}))
        .await?;

    assert_eq!(report.params["image"]["path"], "");
    assert_eq!(fx.committed(&report.content_id).await?["image"]["path"], "");
    assert!(matches!(
        report.outcome("ghost.png"),
        Some(FileOutcome::Blanked { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_url_is_never_blanked() -> Result<()> {
    let fx = Fixture::new();

    let report = fx
        .save(
            None,
            json!({
                "video": [
                    {"path": "youtu.be/abc123#tmp"},
                    {"path": "watch-me#tmp", "mime": "video/YouTube"}
                ],
                "image": {"path": "youtu.be/abc123"}
            }),
        )
        .await?;

    assert_eq!(report.params["video"][0]["path"], "youtu.be/abc123");
    assert_eq!(report.params["video"][1]["path"], "watch-me");
    assert_eq!(report.params["image"]["path"], "youtu.be/abc123");
    assert!(matches!(
        report.outcome("youtu.be/abc123"),
        Some(FileOutcome::Skipped { .. })
    ));
    assert!(matches!(
        report.outcome("watch-me"),
        Some(FileOutcome::Skipped { .. })
    ));
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Orphans
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_deletes_unreferenced_files() -> Result<()> {
    let fx = Fixture::new();
    for name in ["a.png", "b.png", "c.png", "d.png"] {
        fx.upload(name, name.as_bytes()).await?;
    }
    let id = fx
        .save(
            None,
            json!({"images": [
                {"path": "a.png#tmp"}, {"path": "b.png#tmp"}, {"path": "c.png#tmp"}
            ]}),
        )
        .await?
        .content_id;

    let report = fx
        .save(
            Some(&id),
            json!({"images": [{"path": "b.png"}, {"path": "d.png#tmp"}]}),
        )
        .await?;

    assert!(!fx.has_file(&id, "a.png").await?);
    assert!(!fx.has_file(&id, "c.png").await?);
    assert!(fx.has_file(&id, "b.png").await?);
    assert!(fx.has_file(&id, "d.png").await?);

    assert_eq!(report.outcome("a.png"), Some(&FileOutcome::OrphanDeleted));
    assert_eq!(report.outcome("c.png"), Some(&FileOutcome::OrphanDeleted));
    assert_eq!(report.outcome("d.png"), Some(&FileOutcome::Copied));
    assert_eq!(report.outcome("b.png"), None);
    Ok(())
}

#[tokio::test]
async fn test_blanked_reference_is_not_an_orphan() -> Result<()> {
    let fx = Fixture::new();
    let report = fx
        .save(None, json!({"images": [{"path": "ghost.png#tmp"}]}))
        .await?;
    assert_eq!(report.params["images"][0]["path"], "");

    let report = fx.save(Some(&report.content_id), json!({"images": []})).await?;
    assert!(report.outcomes.is_empty(), "unexpected outcomes: {:?}", report.outcomes);
    Ok(())
}

#[tokio::test]
async fn test_fresh_save_deletes_nothing() -> Result<()> {
    let fx = Fixture::new();
    let report = fx.save(None, json!({"images": []})).await?;
    assert!(report.outcomes.is_empty());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Pastes
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_paste_never_overwrites_existing_file() -> Result<()> {
    let fx = Fixture::new();

    fx.upload("x.png", b"from A").await?;
    let a = fx
        .save(None, json!({"image": {"path": "x.png#tmp"}}))
        .await?
        .content_id;
    fx.temporary.delete_file("x.png", OWNER).await?;

    fx.upload("x.png", b"from B").await?;
    let b = fx
        .save(None, json!({"image": {"path": "x.png#tmp"}}))
        .await?
        .content_id;

    let pasted = format!("../{a}/x.png");
    let report = fx
        .save(
            Some(&b),
            json!({"image": {"path": "x.png"}, "images": [{"path": pasted}]}),
        )
        .await?;

    let Some(FileOutcome::Pasted { new_path }) = report.outcome(&pasted) else {
        panic!("expected a paste outcome, got {:?}", report.outcomes);
    };
    assert_ne!(new_path, "x.png");
    assert!(new_path.starts_with("x-") && new_path.ends_with(".png"));
    assert_eq!(report.params["images"][0]["path"], new_path.as_str());
    assert_eq!(
        fx.committed(&b).await?["images"][0]["path"],
        new_path.as_str()
    );

    assert_eq!(fx.content.file_bytes(&b, "x.png").as_deref(), Some(&b"from B"[..]));
    assert_eq!(fx.content.file_bytes(&b, new_path).as_deref(), Some(&b"from A"[..]));
    assert_eq!(fx.content.file_bytes(&a, "x.png").as_deref(), Some(&b"from A"[..]));
    Ok(())
}

#[tokio::test]
async fn test_paste_with_content_prefix_into_new_content() -> Result<()> {
    let fx = Fixture::new();
    fx.upload("images/pic.jpg", b"pic").await?;
    let source = fx
        .save(None, json!({"image": {"path": "images/pic.jpg#tmp"}}))
        .await?
        .content_id;

    let report = fx
        .save(
            None,
            json!({"image": {"path": format!("../content/{source}/images/pic.jpg")}}),
        )
        .await?;

    let path = report.params["image"]["path"].as_str().unwrap_or_default().to_string();
    assert!(path.starts_with("images/pic-"));
    assert!(fx.has_file(&report.content_id, &path).await?);
    Ok(())
}

#[tokio::test]
async fn test_paste_from_missing_source_is_blanked() -> Result<()> {
    let fx = Fixture::new();

    let report = fx
        .save(None, json!({"image": {"path": "../nowhere/x.png"}}))
        .await?;

    assert_eq!(report.params["image"]["path"], "");
    assert!(matches!(
        report.outcome("../nowhere/x.png"),
        Some(FileOutcome::Blanked { .. })
    ));
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_of_unknown_content_fails() -> Result<()> {
    let fx = Fixture::new();
    let err = fx
        .storer
        .add_or_update_content(
            Some(&ContentId::from("missing")),
            json!({}),
            &common::metadata(),
            &common::gallery(),
            OWNER,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::ContentNotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_unknown_main_library_fails() -> Result<()> {
    let fx = Fixture::new();
    let err = fx
        .storer
        .add_or_update_content(
            None,
            json!({}),
            &common::metadata(),
            &"H5P.Unknown 1.0".parse::<folio_types::LibraryName>()?,
            OWNER,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::Scan(_)));
    assert!(fx.content.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_copy_and_delete_content() -> Result<()> {
    let fx = Fixture::new();
    fx.upload("a.png", b"a").await?;
    let id = fx
        .save(None, json!({"title": "orig", "image": {"path": "a.png#tmp"}}))
        .await?
        .content_id;

    let copy = fx.storer.copy_content(&id, OWNER).await?;
    assert_ne!(copy, id);
    assert_eq!(fx.committed(&copy).await?, fx.committed(&id).await?);
    assert_eq!(fx.content.file_bytes(&copy, "a.png").as_deref(), Some(&b"a"[..]));

    fx.storer.delete_content(&id, OWNER).await?;
    assert!(!fx.content.content_exists(&id).await?);
    assert!(fx.has_file(&copy, "a.png").await?);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Filesystem storage
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_paste_applies_backend_filename_rules() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let fx = Fixture::with_storage(
        Arc::new(FileContentStorage::new(dir.path())),
        Arc::new(MemoryTemporaryStorage::new()),
    );

    fx.upload("my photo.png", b"pixels").await?;
    let source = fx
        .save(None, json!({"image": {"path": "my photo.png#tmp"}}))
        .await?
        .content_id;
    assert!(fx.has_file(&source, "my photo.png").await?);

    let pasted = format!("../{source}/my photo.png");
    let report = fx.save(None, json!({"image": {"path": pasted}})).await?;

    let Some(FileOutcome::Pasted { new_path }) = report.outcome(&pasted) else {
        panic!("expected a paste outcome, got {:?}", report.outcomes);
    };
    assert!(new_path.starts_with("my_photo-") && new_path.ends_with(".png"));
    assert!(fx.has_file(&report.content_id, new_path).await?);
    Ok(())
}
