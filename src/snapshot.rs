use crate::catalog::BranchCatalog;
use crate::error::Result;
use crate::ingestion::{normalize_with_report, NormalizationReport};
use crate::schema::{NormalizedRecord, RawRecord};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

/// One immutable, fully normalized copy of the dataset. Replaced wholesale on
/// every successful load and never mutated in place.
#[derive(Debug, Clone, Serialize)]
pub struct SalesSnapshot {
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
    pub records: Vec<NormalizedRecord>,
    pub catalog: BranchCatalog,
    pub report: NormalizationReport,
}

impl SalesSnapshot {
    pub fn empty() -> Self {
        Self {
            version: 0,
            loaded_at: Utc::now(),
            records: Vec::new(),
            catalog: BranchCatalog::default(),
            report: NormalizationReport::default(),
        }
    }

    pub fn from_raw(rows: &[RawRecord], version: u64) -> Self {
        let (records, report) = normalize_with_report(rows);
        let catalog = BranchCatalog::from_records(&records);

        Self {
            version,
            loaded_at: Utc::now(),
            records,
            catalog,
            report,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Replaced { version: u64 },
    /// The load failed; the previous snapshot is still current.
    KeptPrevious { version: u64 },
}

/// Holds the current snapshot and swaps it on each load attempt.
#[derive(Debug)]
pub struct SnapshotLoader {
    current: Arc<SalesSnapshot>,
}

impl Default for SnapshotLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotLoader {
    pub fn new() -> Self {
        Self {
            current: Arc::new(SalesSnapshot::empty()),
        }
    }

    pub fn current(&self) -> Arc<SalesSnapshot> {
        Arc::clone(&self.current)
    }

    /// Applies the result of a fetch or upload. A failure is logged and leaves
    /// the last good snapshot in place.
    pub fn apply(&mut self, loaded: Result<Vec<RawRecord>>) -> RefreshOutcome {
        match loaded {
            Ok(rows) => {
                let version = self.current.version + 1;
                let snapshot = SalesSnapshot::from_raw(&rows, version);
                info!(
                    "Snapshot {} loaded: {} records, {} branches",
                    version,
                    snapshot.records.len(),
                    snapshot.catalog.len()
                );
                self.current = Arc::new(snapshot);
                RefreshOutcome::Replaced { version }
            }
            Err(e) => {
                warn!(
                    "Refresh failed, keeping snapshot {}: {}",
                    self.current.version, e
                );
                RefreshOutcome::KeptPrevious {
                    version: self.current.version,
                }
            }
        }
    }
}
