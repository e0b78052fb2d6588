/// Shelf - attachment library command line
use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_cli::{
    config::ShelfConfig,
    terminal::{LoggingRecognizer, TerminalExtensionPrompt, TerminalPicker, TerminalReviewer},
    TerminalMeter,
};
use shelf_core::{Collection, CollectionId, CreateCollection, CreateLibrary, LibraryId};
use shelf_importer::{FolderImport, FolderImportOutcome, ImportTarget, Surfaces};
use shelf_storage::LocalLibraryStore;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Attachment library with folder import", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new library
    AddLibrary {
        /// Library name
        name: String,
    },
    /// List all libraries
    Libraries,
    /// Create a collection
    AddCollection {
        /// Library to create the collection in
        #[arg(short, long)]
        library: LibraryId,
        /// Parent collection (top level if omitted)
        #[arg(short, long)]
        parent: Option<CollectionId>,
        /// Collection name
        name: String,
    },
    /// Show the collection tree of a library
    Collections {
        #[arg(short, long)]
        library: LibraryId,
    },
    /// Import a folder tree of attachments into a collection
    Import {
        #[arg(short, long)]
        library: LibraryId,
        /// Collection the folder is imported under
        #[arg(short, long)]
        collection: CollectionId,
        /// Pre-select linking files instead of copying them
        #[arg(long)]
        link: bool,
        /// Treat the library as read-only
        #[arg(long)]
        read_only: bool,
        /// Folder to import (prompted for if omitted)
        folder: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf=info,shelf_importer=warn,shelf_storage=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = ShelfConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let pool = open_database(&config).await?;

    match cli.command {
        Commands::AddLibrary { name } => add_library(&pool, name).await?,
        Commands::Libraries => list_libraries(&pool).await?,
        Commands::AddCollection {
            library,
            parent,
            name,
        } => add_collection(&pool, library, parent, name).await?,
        Commands::Collections { library } => list_collections(&pool, library).await?,
        Commands::Import {
            library,
            collection,
            link,
            read_only,
            folder,
        } => {
            import_folder(
                &config,
                pool,
                library,
                collection,
                link,
                read_only,
                folder,
            )
            .await?;
        }
    }

    Ok(())
}

async fn open_database(config: &ShelfConfig) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = config.database_file().as_deref().and_then(|f| f.parent()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }

    let pool = shelf_storage::open(&config.storage.database_url)
        .await
        .context("opening database")?;
    tracing::debug!("Database ready at {}", config.storage.database_url);
    Ok(pool)
}

async fn add_library(pool: &SqlitePool, name: String) -> anyhow::Result<()> {
    let library = shelf_storage::libraries::create(pool, CreateLibrary { name }).await?;
    println!("Created library {} (id {})", library.name, library.id);
    Ok(())
}

async fn list_libraries(pool: &SqlitePool) -> anyhow::Result<()> {
    let libraries = shelf_storage::libraries::get_all(pool).await?;
    if libraries.is_empty() {
        println!("No libraries");
    }
    for library in libraries {
        println!("{:>4}  {}", library.id, library.name);
    }
    Ok(())
}

async fn add_collection(
    pool: &SqlitePool,
    library_id: LibraryId,
    parent_id: Option<CollectionId>,
    name: String,
) -> anyhow::Result<()> {
    let collection = shelf_storage::collections::create(
        pool,
        CreateCollection {
            library_id,
            name,
            parent_id,
        },
    )
    .await?;
    println!("Created collection {} (id {})", collection.name, collection.id);
    Ok(())
}

async fn list_collections(pool: &SqlitePool, library_id: LibraryId) -> anyhow::Result<()> {
    let collections = shelf_storage::collections::get_by_library(pool, library_id).await?;
    if collections.is_empty() {
        println!("No collections");
    }
    print_tree(&collections, None, 0);
    Ok(())
}

fn print_tree(collections: &[Collection], parent: Option<CollectionId>, depth: usize) {
    let mut children: Vec<&Collection> = collections
        .iter()
        .filter(|c| c.parent_id == parent)
        .collect();
    children.sort_by(|a, b| a.name.cmp(&b.name));

    for child in children {
        println!("{:>4}  {}{}", child.id, "  ".repeat(depth), child.name);
        print_tree(collections, Some(child.id), depth + 1);
    }
}

async fn import_folder(
    config: &ShelfConfig,
    pool: SqlitePool,
    library_id: LibraryId,
    collection_id: CollectionId,
    link: bool,
    read_only: bool,
    folder: Option<PathBuf>,
) -> anyhow::Result<()> {
    let collection = shelf_storage::collections::get_by_id(&pool, collection_id)
        .await?
        .filter(|c| c.library_id == library_id);
    if collection.is_none() {
        tracing::warn!(
            "Collection {} not found in library {}",
            collection_id,
            library_id
        );
    }

    let mut target = ImportTarget::new(library_id, collection).with_link_default(link);
    if read_only {
        target = target.read_only();
    }

    let storage_dir = config.storage_dir()?;
    tokio::fs::create_dir_all(&storage_dir)
        .await
        .with_context(|| format!("creating storage directory {}", storage_dir.display()))?;
    let store = LocalLibraryStore::new(pool, storage_dir);

    let picker = TerminalPicker::new(folder);
    let meter = TerminalMeter::new();
    let surfaces = Surfaces {
        picker: &picker,
        reviewer: &TerminalReviewer,
        prompt: &TerminalExtensionPrompt,
        meter: &meter,
        recognizer: &LoggingRecognizer,
    };

    let result = FolderImport::new(&store, surfaces)
        .with_finder(config.duplicate_finder())
        .with_settings(config.import_settings())
        .run(&target)
        .await;

    match result {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) if e.is_cancelled() => println!("Import cancelled"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn print_outcome(outcome: &FolderImportOutcome) {
    let Some(report) = &outcome.report else {
        println!("Nothing to import in {}", outcome.root.path().display());
        return;
    };

    let summary = &report.summary;
    println!(
        "Imported {}, linked {}, skipped {} duplicates and {} shortcuts ({} collections created)",
        summary.imported,
        summary.linked,
        summary.skipped_duplicates,
        summary.skipped_shortcuts,
        summary.collections_created
    );
    if summary.has_failures() {
        println!(
            "{} of {} files attached, {} failed:",
            summary.attached(),
            report.progress.total(),
            summary.failed.len()
        );
        for (file, reason) in &summary.failed {
            println!("  failed: {} ({})", file.display(), reason);
        }
    }
    if report.recognized_pdfs > 0 {
        println!("{} PDFs queued for metadata", report.recognized_pdfs);
    }
}
