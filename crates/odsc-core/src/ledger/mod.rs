//! Append-only evaluation ledger.
//!
//! The ledger is a sequential store of encoded records behind a fixed
//! header. Backends only need to provide text-level access; decoding into
//! rows is shared.
//!
//! # Invariants
//!
//! 1. **Header iff exists**: the header line is written exactly once, by
//!    initialization, and never by append.
//! 2. **Single writer**: ensure-header-then-append and reset run under one
//!    lock per backend, so lines never interleave and append order equals
//!    lock acquisition order.
//! 3. **Append only**: records are never mutated; only `reset` removes them.

pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::codec::{decode_line, encode_row, split_records};
use crate::errors::EvalResult;
use crate::model::{ArtifactStatus, EvaluationRecord};

pub use file::FileLedger;
pub use memory::MemoryLedger;

/// Ledger columns, in on-disk order.
pub const LEDGER_COLUMNS: [&str; 9] = [
    "timestamp_utc",
    "rater_first_name",
    "report_internal_id",
    "odsc_score",
    "dimension_localfit_yes",
    "dimension_minimal_followups_yes",
    "failure_retrieval_miss",
    "failure_overconfident_or_drift",
    "comment",
];

/// The header line including its line feed.
pub fn header_line() -> String {
    format!("{}\n", LEDGER_COLUMNS.join(","))
}

/// One encoded record including its line feed.
pub fn record_line(record: &EvaluationRecord) -> String {
    let mut line = encode_row(record.to_fields());
    line.push('\n');
    line
}

/// Decoded ledger content: the header row kept apart from data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRows {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LedgerRows {
    /// Decodes artifact text. Blank records are discarded; the first
    /// remaining record is the header.
    pub fn parse(text: &str) -> Self {
        let mut records = split_records(text)
            .into_iter()
            .filter(|r| !r.trim().is_empty())
            .map(decode_line);

        let header = records.next().unwrap_or_default();
        Self {
            header,
            rows: records.collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Sequential store of evaluation records.
///
/// Implementations handle the actual I/O. Validation and aggregation only
/// ever see this trait, so a different backing store can be substituted
/// without touching them.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Creates the artifact with only the header when it does not exist.
    ///
    /// Idempotent: a no-op when the artifact exists, with or without data.
    async fn ensure_initialized(&self) -> EvalResult<()>;

    /// Initializes if needed, then appends one record as a single write.
    async fn append(&self, record: &EvaluationRecord) -> EvalResult<()>;

    /// Raw artifact text.
    ///
    /// # Returns
    ///
    /// - `Err(EvalError::NotFound)` if the artifact does not exist
    async fn read_text(&self) -> EvalResult<String>;

    async fn exists(&self) -> EvalResult<bool>;

    /// Metadata-only check. Absence is `{exists: false, bytes: 0}`.
    async fn stat(&self) -> ArtifactStatus;

    /// Deletes the artifact (absence tolerated) and re-initializes it,
    /// atomically with respect to `append`.
    async fn reset(&self) -> EvalResult<()>;

    /// Human-readable location for logs and status output.
    fn location(&self) -> String;

    /// Header and data rows, decoded.
    async fn read_all(&self) -> EvalResult<LedgerRows> {
        let text = self.read_text().await?;
        Ok(LedgerRows::parse(&text))
    }
}
