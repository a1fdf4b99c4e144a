//! Summary aggregation: ledger rows in, per-report / per-rater / overall
//! means out.
//!
//! Columns are located by name through a map built from the header row on
//! every run, never by position. A row whose score is missing or does not
//! parse is skipped and counted; it never aborts the run.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::codec::encode_row;
use crate::errors::{Artifact, EvalError, EvalResult};
use crate::ledger::file::{remove_if_present, stat_path};
use crate::ledger::{LedgerRows, LedgerStore};
use crate::model::{ArtifactStatus, Section, Summary, SummaryRow};
use crate::validate::number_from_text;

pub const SUMMARY_COLUMNS: [&str; 4] = ["section", "key", "count", "avg_odsc"];
pub const OVERALL_KEY: &str = "ALL";

const COL_RATER: &str = "rater_first_name";
const COL_REPORT: &str = "report_internal_id";
const COL_SCORE: &str = "odsc_score";

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: u64,
}

impl Accumulator {
    fn add(&mut self, score: f64) {
        self.sum += score;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Name to column index, first occurrence wins.
fn column_index(header: &[String]) -> HashMap<&str, usize> {
    let mut index = HashMap::with_capacity(header.len());
    for (i, name) in header.iter().enumerate() {
        index.entry(name.as_str()).or_insert(i);
    }
    index
}

fn cell(row: &[String], col: Option<usize>) -> Option<&str> {
    col.and_then(|i| row.get(i)).map(String::as_str)
}

/// A blank cell reads as `0`; a missing cell has no score.
fn parse_score(raw: Option<&str>) -> Option<f64> {
    raw.and_then(number_from_text).filter(|s| s.is_finite())
}

/// Groups rows by report id and by rater id.
///
/// # Returns
///
/// - `Err(EvalError::NoData)` if the ledger has no data rows
pub fn aggregate(ledger: &LedgerRows) -> EvalResult<Summary> {
    if ledger.is_empty() {
        return Err(EvalError::NoData);
    }

    let index = column_index(&ledger.header);
    let col = |name: &str| {
        let found = index.get(name).copied();
        if found.is_none() {
            tracing::warn!(column = name, "ledger header is missing a column");
        }
        found
    };
    let i_rater = col(COL_RATER);
    let i_report = col(COL_REPORT);
    let i_score = col(COL_SCORE);

    let mut per_report: BTreeMap<&str, Accumulator> = BTreeMap::new();
    let mut per_rater: BTreeMap<&str, Accumulator> = BTreeMap::new();
    let mut overall = Accumulator::default();
    let mut skipped_rows = 0;

    for (n, row) in ledger.rows.iter().enumerate() {
        let Some(score) = parse_score(cell(row, i_score)) else {
            skipped_rows += 1;
            tracing::warn!(
                event = "odsc.summary.row_skipped",
                row = n + 1,
                score = cell(row, i_score).unwrap_or_default(),
                "skipping ledger row with non-numeric score"
            );
            continue;
        };

        overall.add(score);
        per_report
            .entry(cell(row, i_report).unwrap_or_default())
            .or_default()
            .add(score);
        per_rater
            .entry(cell(row, i_rater).unwrap_or_default())
            .or_default()
            .add(score);
    }

    let mut rows = group_rows(Section::PerReport, per_report);
    rows.extend(group_rows(Section::PerRater, per_rater));
    if overall.count > 0 {
        rows.push(SummaryRow {
            section: Section::Overall,
            key: OVERALL_KEY.to_string(),
            count: overall.count,
            avg: overall.mean(),
        });
    }

    Ok(Summary { rows, skipped_rows })
}

/// One row per key, in ascending byte order of the key.
fn group_rows(section: Section, groups: BTreeMap<&str, Accumulator>) -> Vec<SummaryRow> {
    groups
        .into_iter()
        .map(|(key, acc)| SummaryRow {
            section,
            key: key.to_string(),
            count: acc.count,
            avg: acc.mean(),
        })
        .collect()
}

/// Summary artifact text: header plus one line per row, LF-terminated.
pub fn render(summary: &Summary) -> String {
    let mut out = encode_row(SUMMARY_COLUMNS);
    out.push('\n');
    for row in &summary.rows {
        out.push_str(&encode_row([
            row.section.as_str(),
            row.key.as_str(),
            row.count.to_string().as_str(),
            row.avg_display().as_str(),
        ]));
        out.push('\n');
    }
    out
}

/// The derived summary file. The aggregator is its only writer.
#[derive(Debug, Clone)]
pub struct SummaryArtifact {
    path: PathBuf,
}

impl SummaryArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the artifact in full. Readers see either the old or the new
    /// content, never a prefix.
    ///
    /// Each call stages into its own uniquely named sibling file, so
    /// overlapping regenerations never share a staging path. The staging
    /// file is removed if anything fails before the rename.
    pub async fn write(&self, text: &str) -> EvalResult<()> {
        let path = self.path.clone();
        let text = text.to_owned();
        let result = tokio::task::spawn_blocking(move || write_replacing(&path, &text))
            .await
            .map_err(std::io::Error::other)
            .and_then(|r| r);
        result.map_err(|e| {
            EvalError::storage(format!("failed to write summary {}", self.path.display()), e)
        })
    }

    pub async fn read_text(&self) -> EvalResult<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            EvalError::from_io(
                e,
                Artifact::Summary,
                format!("failed to read summary {}", self.path.display()),
            )
        })
    }

    pub async fn stat(&self) -> ArtifactStatus {
        stat_path(&self.path).await
    }

    pub async fn remove(&self) -> EvalResult<()> {
        remove_if_present(&self.path).await
    }
}

fn write_replacing(path: &Path, text: &str) -> std::io::Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(p) => p,
        None => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "summary.csv".to_string());
    let mut staged = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(parent)?;
    staged.write_all(text.as_bytes())?;
    staged.flush()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Reads the whole ledger, aggregates it and overwrites the summary.
pub async fn regenerate(ledger: &dyn LedgerStore, artifact: &SummaryArtifact) -> EvalResult<Summary> {
    let rows = ledger.read_all().await?;
    let summary = aggregate(&rows)?;
    artifact.write(&render(&summary)).await?;

    tracing::info!(
        event = "odsc.summary.regenerated",
        ledger = %ledger.location(),
        rows = rows.len(),
        skipped = summary.skipped_rows,
        groups = summary.rows.len(),
        "summary regenerated"
    );
    Ok(summary)
}
