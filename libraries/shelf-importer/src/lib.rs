//! Shelf Folder Importer
//!
//! Imports a folder tree of attachment files into a library, mirroring the
//! folder hierarchy as nested collections.
//!
//! # Features
//!
//! - Recursive folder scanning with per-subtree extension sets
//! - Duplicate detection against the library (by path and by file name) and
//!   within the folder (by content, through an external `rmlint`-like tool)
//! - User adjudication of flagged duplicates
//! - Copy or link import with per-file failure isolation
//! - Progress reporting
//!
//! # Architecture
//!
//! - `scanner`: Builds the folder tree
//! - `duplicates` / `finder`: Duplicate checks
//! - `adjudicator`: Turns duplicate records into a skip set
//! - `importer`: Walks the tree and attaches files
//! - `workflow`: The interactive folder import command
//! - `surfaces` / `progress`: Collaborators the host provides

mod error;

pub mod adjudicator;
pub mod duplicates;
pub mod finder;
pub mod importer;
pub mod progress;
pub mod scanner;
pub mod surfaces;
pub mod workflow;

pub use adjudicator::{BulkChoice, ReviewOutcome, SkipCandidate};
pub use duplicates::{
    AttachmentIndex, DuplicateDetector, DuplicateEvidence, DuplicateKind, DuplicateRecord,
};
pub use error::ImportError;
pub use finder::ContentDuplicateFinder;
pub use importer::{ImportEngine, ImportParameters, ImportSummary};
pub use progress::{ImportProgress, NoopMeter, ProgressMeter};
pub use scanner::{FileScanner, FolderNode};
pub use surfaces::{
    DuplicateReviewer, ExtensionChoice, ExtensionPrompt, FolderPicker, MetadataRecognizer,
};
pub use workflow::{
    FolderImport, FolderImportOutcome, FolderImportReport, ImportSettings, ImportTarget, Surfaces,
};

/// Result type for import operations
pub type Result<T> = std::result::Result<T, ImportError>;
