//! Turning duplicate records into the set of files to skip

use crate::duplicates::DuplicateRecord;
use crate::surfaces::DuplicateReviewer;
use crate::{ImportError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One flagged file with every reason it was flagged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipCandidate {
    pub file: PathBuf,
    pub records: Vec<DuplicateRecord>,
}

impl SkipCandidate {
    /// All reasons, joined for display
    pub fn message(&self) -> String {
        self.records
            .iter()
            .map(|record| record.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Group records by file, in order of each file's first record
pub fn skip_candidates(records: &[DuplicateRecord]) -> Vec<SkipCandidate> {
    let mut candidates: Vec<SkipCandidate> = Vec::new();

    for record in records {
        match candidates.iter_mut().find(|c| c.file == record.file) {
            Some(candidate) => candidate.records.push(record.clone()),
            None => candidates.push(SkipCandidate {
                file: record.file.clone(),
                records: vec![record.clone()],
            }),
        }
    }

    candidates
}

/// First answer to "duplicates found"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkChoice {
    /// Go through the candidates one by one
    Review,
    /// Skip every candidate
    SkipAll,
    /// Stop the whole import
    Abort,
}

/// Result of the per-file review
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Files the user left checked
    Accepted(HashSet<PathBuf>),
    /// Review closed without accepting
    Dismissed,
}

/// Ask the reviewer which flagged files to skip
///
/// No records means no questions and nothing skipped. Aborting fails with
/// [`ImportError::Cancelled`]; dismissing the review skips nothing.
pub async fn adjudicate(
    reviewer: &dyn DuplicateReviewer,
    records: &[DuplicateRecord],
) -> Result<HashSet<PathBuf>> {
    if records.is_empty() {
        return Ok(HashSet::new());
    }

    let candidates = skip_candidates(records);
    tracing::info!(
        "{} duplicate records across {} files",
        records.len(),
        candidates.len()
    );

    match reviewer.bulk_choice(&candidates).await? {
        BulkChoice::Abort => Err(ImportError::Cancelled),
        BulkChoice::SkipAll => Ok(candidates.into_iter().map(|c| c.file).collect()),
        BulkChoice::Review => match reviewer.review(&candidates).await? {
            ReviewOutcome::Dismissed => {
                tracing::debug!("Duplicate review dismissed, skipping nothing");
                Ok(HashSet::new())
            }
            ReviewOutcome::Accepted(checked) => {
                let known: HashSet<&Path> = candidates.iter().map(|c| c.file.as_path()).collect();
                Ok(checked
                    .into_iter()
                    .filter(|file| {
                        let listed = known.contains(file.as_path());
                        if !listed {
                            tracing::debug!("Ignoring unlisted review answer {}", file.display());
                        }
                        listed
                    })
                    .collect())
            }
        },
    }
}

/// Adjudicated files plus whatever the last content check flagged
pub fn final_skip_set(adjudicated: &HashSet<PathBuf>, recheck: &[PathBuf]) -> HashSet<PathBuf> {
    adjudicated
        .iter()
        .cloned()
        .chain(recheck.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Scripted {
        choice: BulkChoice,
        outcome: Mutex<Option<ReviewOutcome>>,
        reviewed: Mutex<usize>,
    }

    impl Scripted {
        fn new(choice: BulkChoice, outcome: Option<ReviewOutcome>) -> Self {
            Self {
                choice,
                outcome: Mutex::new(outcome),
                reviewed: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl DuplicateReviewer for Scripted {
        async fn bulk_choice(&self, _candidates: &[SkipCandidate]) -> Result<BulkChoice> {
            Ok(self.choice)
        }

        async fn review(&self, candidates: &[SkipCandidate]) -> Result<ReviewOutcome> {
            *self.reviewed.lock().unwrap() += candidates.len();
            Ok(self
                .outcome
                .lock()
                .unwrap()
                .take()
                .unwrap_or(ReviewOutcome::Dismissed))
        }
    }

    fn records() -> Vec<DuplicateRecord> {
        vec![
            DuplicateRecord::content_duplicate(PathBuf::from("/in/a.pdf")),
            DuplicateRecord::content_duplicate(PathBuf::from("/in/b.pdf")),
            DuplicateRecord::content_duplicate(PathBuf::from("/in/a.pdf")),
        ]
    }

    #[test]
    fn test_candidates_merge_records_per_file() {
        let candidates = skip_candidates(&records());
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].file, PathBuf::from("/in/a.pdf"));
        assert_eq!(candidates[0].records.len(), 2);
        assert_eq!(
            candidates[0].message(),
            "Duplicate within import folder; Duplicate within import folder"
        );
    }

    #[tokio::test]
    async fn test_no_records_asks_nothing() {
        let reviewer = Scripted::new(BulkChoice::Abort, None);
        let skip = adjudicate(&reviewer, &[]).await.unwrap();
        assert!(skip.is_empty());
    }

    #[tokio::test]
    async fn test_skip_all() {
        let reviewer = Scripted::new(BulkChoice::SkipAll, None);
        let skip = adjudicate(&reviewer, &records()).await.unwrap();
        assert_eq!(skip.len(), 2);
        assert_eq!(*reviewer.reviewed.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_abort_cancels() {
        let reviewer = Scripted::new(BulkChoice::Abort, None);
        let result = adjudicate(&reviewer, &records()).await;
        assert!(matches!(result, Err(ImportError::Cancelled)));
        assert!(result.is_err_and(|e| e.is_cancelled()));
    }

    #[tokio::test]
    async fn test_review_keeps_checked_files() {
        let checked: HashSet<PathBuf> = [PathBuf::from("/in/b.pdf"), PathBuf::from("/elsewhere")]
            .into_iter()
            .collect();
        let reviewer = Scripted::new(BulkChoice::Review, Some(ReviewOutcome::Accepted(checked)));

        let skip = adjudicate(&reviewer, &records()).await.unwrap();
        assert_eq!(skip, [PathBuf::from("/in/b.pdf")].into_iter().collect());
        assert_eq!(*reviewer.reviewed.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_dismissed_review_skips_nothing() {
        let reviewer = Scripted::new(BulkChoice::Review, Some(ReviewOutcome::Dismissed));
        let skip = adjudicate(&reviewer, &records()).await.unwrap();
        assert!(skip.is_empty());
    }

    #[test]
    fn test_final_skip_set_is_union() {
        let adjudicated: HashSet<PathBuf> = [PathBuf::from("/in/a.pdf")].into_iter().collect();
        let recheck = vec![PathBuf::from("/in/b.pdf"), PathBuf::from("/in/a.pdf")];

        let skip = final_skip_set(&adjudicated, &recheck);
        assert_eq!(skip.len(), 2);
        assert!(skip.is_superset(&recheck.into_iter().collect()));
    }
}
