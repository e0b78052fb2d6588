//! End-to-end folder imports into a real `SQLite` library


use shelf_core::{CreateCollection, CreateLibrary, LinkMode};
use shelf_importer::{BulkChoice, DuplicateKind, FolderImport, ImportSettings, ImportTarget};
use shelf_storage::LocalLibraryStore;
use std::time::Duration;
use tempfile::TempDir;
use test_helpers::{init_tracing, write_file, Harness, ScriptedPrompt, ScriptedReviewer};

fn fast() -> ImportSettings {
    ImportSettings {
        throttle: Duration::ZERO,
        settle_delay: Duration::ZERO,
        ..ImportSettings::default()
    }
}

#[tokio::test]
async fn test_copy_import_then_reimport() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}", temp.path().join("shelf.db").display());
    let pool = shelf_storage::open(&db_url).await.unwrap();
    let store = LocalLibraryStore::new(pool.clone(), temp.path().join("storage"));

    let library = shelf_storage::libraries::create(
        &pool,
        CreateLibrary {
            name: "Papers".to_string(),
        },
    )
    .await
    .unwrap();
    let inbox = shelf_storage::collections::create(&pool, CreateCollection::top_level(library.id, "Inbox"))
        .await
        .unwrap();

    let root = temp.path().join("in");
    write_file(&root, "a.pdf", b"alpha");
    write_file(&root, "b.TXT", b"bravo");
    write_file(&root, "note", b"no extension");
    write_file(&root, "Sub/c.pdf", b"charlie");

    let target = ImportTarget::new(library.id, Some(inbox.clone())).with_link_default(false);

    // First run: copy PDFs
    let harness = Harness::new(
        Some(root.clone()),
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering("pdf", false),
    );
    let report = FolderImport::new(&store, harness.surfaces())
        .with_settings(fast())
        .run(&target)
        .await
        .unwrap()
        .report
        .unwrap();

    assert_eq!(report.summary.imported, 2);
    assert_eq!(report.summary.collections_created, 1);
    assert_eq!(report.recognized_pdfs, 2);

    let in_inbox = shelf_storage::items::get_by_collection(&pool, inbox.id).await.unwrap();
    assert_eq!(in_inbox.len(), 1);
    let copy = in_inbox[0].path.clone().unwrap();
    assert!(copy.starts_with(temp.path().join("storage")));
    assert_eq!(std::fs::read(&copy).unwrap(), b"alpha");
    assert_eq!(in_inbox[0].link_mode, Some(LinkMode::ImportedFile));

    let children = shelf_storage::collections::get_children(&pool, library.id, Some(inbox.id))
        .await
        .unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "Sub");

    // Second run: the copies share names with the folder's files
    let harness = Harness::new(
        Some(root.clone()),
        ScriptedReviewer::new(BulkChoice::SkipAll),
        ScriptedPrompt::answering("pdf", false),
    );
    let report = FolderImport::new(&store, harness.surfaces())
        .with_settings(fast())
        .run(&target)
        .await
        .unwrap()
        .report
        .unwrap();

    assert_eq!(report.duplicates.len(), 2);
    assert!(report
        .duplicates
        .iter()
        .all(|d| d.kind == DuplicateKind::NameMatch));
    assert_eq!(report.summary.imported, 0);
    assert_eq!(report.summary.skipped_duplicates, 2);
    assert_eq!(report.summary.collections_created, 0);
    assert_eq!(report.progress.done(), report.progress.total());

    let all = shelf_storage::items::get_by_library(&pool, library.id).await.unwrap();
    assert_eq!(all.len(), 2);
    let collections = shelf_storage::collections::get_by_library(&pool, library.id)
        .await
        .unwrap();
    assert_eq!(collections.len(), 2);
}

#[tokio::test]
async fn test_linked_files_are_exact_matches_next_time() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}", temp.path().join("shelf.db").display());
    let pool = shelf_storage::open(&db_url).await.unwrap();
    let store = LocalLibraryStore::new(pool.clone(), temp.path().join("storage"));

    let library = shelf_storage::libraries::create(
        &pool,
        CreateLibrary {
            name: "Papers".to_string(),
        },
    )
    .await
    .unwrap();
    let inbox = shelf_storage::collections::create(&pool, CreateCollection::top_level(library.id, "Inbox"))
        .await
        .unwrap();

    let root = temp.path().join("in");
    let paper = write_file(&root, "paper.pdf", b"paper");
    let target = ImportTarget::new(library.id, Some(inbox));

    let harness = Harness::new(
        Some(root.clone()),
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering("pdf", true),
    );
    FolderImport::new(&store, harness.surfaces())
        .with_settings(fast())
        .run(&target)
        .await
        .unwrap();

    let items = shelf_storage::items::get_by_library(&pool, library.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].path.as_deref(), Some(paper.as_path()));
    assert_eq!(items[0].link_mode, Some(LinkMode::LinkedFile));

    let harness = Harness::new(
        Some(root),
        ScriptedReviewer::new(BulkChoice::SkipAll),
        ScriptedPrompt::answering("pdf", true),
    );
    let report = FolderImport::new(&store, harness.surfaces())
        .with_settings(fast())
        .run(&target)
        .await
        .unwrap()
        .report
        .unwrap();

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].kind, DuplicateKind::ExactMatch);
    assert_eq!(report.duplicates[0].message, "Already in library: paper.pdf");
    assert_eq!(report.summary.linked, 0);
}
