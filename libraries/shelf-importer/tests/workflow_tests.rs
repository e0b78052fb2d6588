//! Folder import workflow tests with scripted surfaces


use shelf_importer::{
    BulkChoice, ContentDuplicateFinder, DuplicateKind, ExtensionChoice, FolderImport,
    ImportError, ImportSettings, ImportTarget, ReviewOutcome,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use test_helpers::{
    init_tracing, write_file, Harness, MemoryStore, MeterEvent, ScriptedPrompt, ScriptedReviewer,
    StoreCall,
};

const LIBRARY: i64 = 1;

fn fast() -> ImportSettings {
    ImportSettings {
        throttle: Duration::ZERO,
        settle_delay: Duration::ZERO,
        ..ImportSettings::default()
    }
}

struct Fixture {
    temp: TempDir,
    root: PathBuf,
    store: MemoryStore,
    target: ImportTarget,
}

impl Fixture {
    fn new() -> Self {
        init_tracing();
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("in");
        std::fs::create_dir_all(&root).unwrap();
        let store = MemoryStore::new(temp.path().join("storage"));
        let inbox = store.add_collection(LIBRARY, "Inbox", None);
        let target = ImportTarget::new(LIBRARY, Some(inbox));
        Self {
            temp,
            root,
            store,
            target,
        }
    }

    fn write(&self, relative: &str) -> PathBuf {
        write_file(&self.root, relative, relative.as_bytes())
    }

    fn harness(&self, reviewer: ScriptedReviewer, prompt: ScriptedPrompt) -> Harness {
        Harness::new(Some(self.root.clone()), reviewer, prompt)
    }
}

#[tokio::test]
async fn test_imports_pdfs_into_mirrored_collections() {
    let fx = Fixture::new();
    let a = fx.write("a.pdf");
    fx.write("b.TXT");
    fx.write("note");
    let c = fx.write("Sub/c.pdf");

    let harness = fx.harness(
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering("pdf", false),
    );

    let outcome = FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await
        .unwrap();

    let report = outcome.report.expect("import ran");
    assert_eq!(report.progress.total(), 2);
    assert_eq!(report.progress.done(), 2);
    assert_eq!(report.summary.imported, 2);
    assert_eq!(report.recognized_pdfs, 2);
    assert_eq!(fx.store.attached_files(), vec![a, c]);

    let inbox = fx.target.collection.as_ref().unwrap();
    let sub = fx.store.collection_named("Sub").unwrap();
    assert_eq!(sub.parent_id, Some(inbox.id));

    let defaults = harness.prompt.defaults_seen.lock().unwrap()[0].clone();
    assert_eq!(defaults, ExtensionChoice::new("pdf, txt", true));
    assert_eq!(harness.recognizer.received.lock().unwrap().len(), 2);
    assert!(harness.reviewer.shown_files().is_empty());
}

#[tokio::test]
async fn test_meter_sequence() {
    let fx = Fixture::new();
    fx.write("a.pdf");

    let harness = fx.harness(
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering("pdf", true),
    );

    FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await
        .unwrap();

    assert_eq!(
        harness.meter.events(),
        vec![
            MeterEvent::Show("Scanning for attachments...".to_string(), false),
            MeterEvent::Hide,
            MeterEvent::Show("Checking for duplicates...".to_string(), false),
            MeterEvent::Hide,
            MeterEvent::Show("Importing attachments...".to_string(), true),
            MeterEvent::Update(0, 1),
            MeterEvent::Update(1, 1),
            MeterEvent::Hide,
            MeterEvent::Show("Fetching metadata for attachments...".to_string(), false),
            MeterEvent::Hide,
        ]
    );
}

#[tokio::test]
async fn test_existing_attachment_is_reviewed_and_skipped() {
    let fx = Fixture::new();
    let x = fx.write("x.pdf");
    let y = fx.write("y.pdf");
    fx.store.add_attachment(LIBRARY, &x, "Paper X");

    let other = write_file(fx.temp.path(), "elsewhere/y.pdf", b"old");
    fx.store.add_attachment(LIBRARY, &other, "");

    let harness = fx.harness(
        ScriptedReviewer::new(BulkChoice::SkipAll),
        ScriptedPrompt::answering("pdf", true),
    );

    let outcome = FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await
        .unwrap();

    let report = outcome.report.unwrap();
    let kinds: Vec<_> = report.duplicates.iter().map(|d| (d.file.clone(), d.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            (x.clone(), DuplicateKind::ExactMatch),
            (y.clone(), DuplicateKind::NameMatch),
        ]
    );
    assert_eq!(report.duplicates[0].message, "Already in library: Paper X");

    assert!(fx.store.attached_files().is_empty());
    assert_eq!(report.summary.skipped_duplicates, 2);
    assert_eq!(report.progress.total(), 2);
    assert_eq!(report.progress.done(), 2);
    assert_eq!(report.recognized_pdfs, 0);
}

#[tokio::test]
async fn test_review_keeps_only_checked_files_out() {
    let fx = Fixture::new();
    let x = fx.write("x.pdf");
    let y = fx.write("y.pdf");
    fx.store
        .add_attachment(LIBRARY, &write_file(fx.temp.path(), "old/x.pdf", b"x"), "");
    fx.store
        .add_attachment(LIBRARY, &write_file(fx.temp.path(), "old/y.pdf", b"y"), "");

    let checked: HashSet<PathBuf> = [x.clone()].into_iter().collect();
    let harness = fx.harness(
        ScriptedReviewer::reviewing(ReviewOutcome::Accepted(checked)),
        ScriptedPrompt::answering("pdf", true),
    );

    FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await
        .unwrap();

    assert_eq!(harness.reviewer.shown_files(), vec![x, y.clone()]);
    assert_eq!(fx.store.attached_files(), vec![y]);
}

#[tokio::test]
async fn test_dismissed_review_imports_everything() {
    let fx = Fixture::new();
    let x = fx.write("x.pdf");
    fx.store
        .add_attachment(LIBRARY, &write_file(fx.temp.path(), "old/x.pdf", b"x"), "");

    let harness = fx.harness(
        ScriptedReviewer::reviewing(ReviewOutcome::Dismissed),
        ScriptedPrompt::answering("pdf", true),
    );

    FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await
        .unwrap();

    assert_eq!(fx.store.attached_files(), vec![x]);
}

#[tokio::test]
async fn test_abort_at_bulk_choice_cancels() {
    let fx = Fixture::new();
    let x = fx.write("x.pdf");
    fx.store.add_attachment(LIBRARY, &x, "");

    let harness = fx.harness(
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering("pdf", true),
    );

    let result = FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await;

    assert!(matches!(result, Err(ImportError::Cancelled)));
    assert_eq!(harness.prompt.times_asked(), 0);
    assert!(fx.store.calls().is_empty());
}

#[tokio::test]
async fn test_prompt_repeats_until_extensions_are_known() {
    let fx = Fixture::new();
    fx.write("a.pdf");
    fx.write("b.epub");

    let harness = fx.harness(
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::new(vec![
            Some(ExtensionChoice::new("pdf, docx", false)),
            Some(ExtensionChoice::new(" EPUB ,", false)),
        ]),
    );

    let outcome = FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await
        .unwrap();

    assert_eq!(harness.prompt.times_asked(), 2);
    let seen = harness.prompt.defaults_seen.lock().unwrap().clone();
    assert_eq!(seen[1], ExtensionChoice::new("pdf, docx", false));

    let report = outcome.report.unwrap();
    assert_eq!(report.parameters.selected_extensions.len(), 1);
    assert!(report.parameters.selected_extensions.contains("epub"));
    assert_eq!(report.summary.imported, 1);
    assert_eq!(report.recognized_pdfs, 0);
}

#[tokio::test]
async fn test_cancelled_prompt_and_empty_selection() {
    let fx = Fixture::new();
    fx.write("a.pdf");

    let harness = fx.harness(ScriptedReviewer::new(BulkChoice::Abort), ScriptedPrompt::new(vec![None]));
    let result = FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await;
    assert!(matches!(result, Err(ImportError::Cancelled)));

    let harness = fx.harness(
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering(" , ", false),
    );
    let outcome = FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await
        .unwrap();
    assert!(outcome.is_nothing_to_import());
    assert!(fx.store.calls().is_empty());
}

#[tokio::test]
async fn test_folder_without_extensions_is_nothing_to_import() {
    let fx = Fixture::new();
    fx.write("README");
    fx.write(".hidden");
    fx.write("Sub/desktop.lnk");

    let harness = fx.harness(
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering("pdf", false),
    );

    let outcome = FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await
        .unwrap();

    assert!(outcome.is_nothing_to_import());
    assert_eq!(outcome.root.file_count(), 3);
    assert_eq!(harness.prompt.times_asked(), 0);
}

#[tokio::test]
async fn test_target_preconditions() {
    let fx = Fixture::new();
    fx.write("a.pdf");
    let harness = fx.harness(
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering("pdf", false),
    );
    let import = FolderImport::new(&fx.store, harness.surfaces()).with_settings(fast());

    let read_only = fx.target.clone().read_only();
    assert!(matches!(
        import.run(&read_only).await,
        Err(ImportError::ReadOnlyLibrary)
    ));

    let mut locked = fx.target.clone();
    locked.files_editable = false;
    assert!(matches!(
        import.run(&locked).await,
        Err(ImportError::FilesNotEditable)
    ));

    let no_collection = ImportTarget::new(LIBRARY, None);
    assert!(matches!(
        import.run(&no_collection).await,
        Err(ImportError::NoCollectionSelected)
    ));

    assert!(harness.meter.events().is_empty());
}

#[tokio::test]
async fn test_no_folder_picked_cancels() {
    let fx = Fixture::new();
    let harness = Harness::new(
        None,
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering("pdf", false),
    );

    let result = FolderImport::new(&fx.store, harness.surfaces())
        .run(&fx.target)
        .await;
    assert!(matches!(result, Err(ImportError::Cancelled)));
}

#[tokio::test]
async fn test_scan_failure_hides_meter() {
    let fx = Fixture::new();
    let harness = Harness::new(
        Some(fx.temp.path().join("missing")),
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering("pdf", false),
    );

    let result = FolderImport::new(&fx.store, harness.surfaces())
        .run(&fx.target)
        .await;

    assert!(matches!(result, Err(ImportError::FolderNotFound(_))));
    assert_eq!(
        harness.meter.events(),
        vec![
            MeterEvent::Show("Scanning for attachments...".to_string(), false),
            MeterEvent::Hide,
        ]
    );
}

#[tokio::test]
async fn test_recognizer_failure_is_not_fatal() {
    let fx = Fixture::new();
    fx.write("a.pdf");

    let mut harness = fx.harness(
        ScriptedReviewer::new(BulkChoice::Abort),
        ScriptedPrompt::answering("pdf", true),
    );
    harness.recognizer.fail = true;

    let outcome = FolderImport::new(&fx.store, harness.surfaces())
        .with_settings(fast())
        .run(&fx.target)
        .await
        .unwrap();

    assert_eq!(outcome.report.unwrap().recognized_pdfs, 1);
}

#[tokio::test]
async fn test_missing_finder_still_checks_library() {
    let fx = Fixture::new();
    let x = fx.write("x.pdf");
    fx.store.add_attachment(LIBRARY, &x, "");

    let harness = fx.harness(
        ScriptedReviewer::new(BulkChoice::SkipAll),
        ScriptedPrompt::answering("pdf", true),
    );

    let outcome = FolderImport::new(&fx.store, harness.surfaces())
        .with_finder(ContentDuplicateFinder::new(Some(
            fx.temp.path().join("no-such-rmlint"),
        )))
        .with_settings(fast())
        .run(&fx.target)
        .await
        .unwrap();

    let report = outcome.report.unwrap();
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].kind, DuplicateKind::ExactMatch);
    assert!(!fx
        .store
        .calls()
        .iter()
        .any(|call| matches!(call, StoreCall::Link(_) | StoreCall::Import(_))));
}
