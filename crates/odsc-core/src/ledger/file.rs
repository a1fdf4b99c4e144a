//! Text-file implementation of [`LedgerStore`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{header_line, record_line, LedgerStore};
use crate::errors::{Artifact, EvalError, EvalResult};
use crate::model::{ArtifactStatus, EvaluationRecord};

/// Ledger backed by a single UTF-8, LF-terminated text file.
///
/// All mutations go through `write_lock`. Header creation uses create-new
/// semantics, so an existing file is never truncated or re-headed even if
/// something outside this process created it.
pub struct FileLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Caller must hold `write_lock`. Returns true when the file was created.
    async fn create_with_header(&self) -> EvalResult<bool> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                EvalError::storage(format!("failed to create {}", parent.display()), e)
            })?;
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => {
                return Err(EvalError::storage(
                    format!("failed to create ledger {}", self.path.display()),
                    e,
                ))
            }
        };

        file.write_all(header_line().as_bytes())
            .await
            .map_err(|e| self.write_error(e))?;
        file.flush().await.map_err(|e| self.write_error(e))?;
        tracing::info!(
            event = "odsc.ledger.initialized",
            path = %self.path.display(),
            "ledger created with header"
        );
        Ok(true)
    }

    fn write_error(&self, e: std::io::Error) -> EvalError {
        EvalError::storage(format!("failed to write ledger {}", self.path.display()), e)
    }
}

#[async_trait]
impl LedgerStore for FileLedger {
    async fn ensure_initialized(&self) -> EvalResult<()> {
        let _guard = self.write_lock.lock().await;
        if !self.create_with_header().await? {
            tracing::debug!(path = %self.path.display(), "ledger already initialized");
        }
        Ok(())
    }

    async fn append(&self, record: &EvaluationRecord) -> EvalResult<()> {
        // Encode before taking the lock; the critical section is I/O only.
        let line = record_line(record);

        let _guard = self.write_lock.lock().await;
        self.create_with_header().await?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.write_error(e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.write_error(e))?;
        file.flush().await.map_err(|e| self.write_error(e))?;
        Ok(())
    }

    async fn read_text(&self) -> EvalResult<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            EvalError::from_io(
                e,
                Artifact::Ledger,
                format!("failed to read ledger {}", self.path.display()),
            )
        })
    }

    async fn exists(&self) -> EvalResult<bool> {
        tokio::fs::try_exists(&self.path).await.map_err(|e| {
            EvalError::storage(format!("failed to check ledger {}", self.path.display()), e)
        })
    }

    async fn stat(&self) -> ArtifactStatus {
        stat_path(&self.path).await
    }

    async fn reset(&self) -> EvalResult<()> {
        let _guard = self.write_lock.lock().await;
        remove_if_present(&self.path).await?;
        self.create_with_header().await?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Metadata lookup shared by both artifacts. Never reads content.
pub(crate) async fn stat_path(path: &Path) -> ArtifactStatus {
    match tokio::fs::metadata(path).await {
        Ok(meta) => ArtifactStatus::present(meta.len()),
        Err(e) if e.kind() == ErrorKind::NotFound => ArtifactStatus::absent(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "status check failed");
            ArtifactStatus::absent()
        }
    }
}

/// Deletes a file; a missing file is not an error.
pub(crate) async fn remove_if_present(path: &Path) -> EvalResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(EvalError::storage(
            format!("failed to delete {}", path.display()),
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LEDGER_COLUMNS;
    use chrono::Utc;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn record(rater: &str, report: &str, score: f64, comment: &str) -> EvaluationRecord {
        EvaluationRecord {
            timestamp: Utc::now(),
            rater_id: rater.into(),
            report_id: report.into(),
            odsc_score: score,
            dimension_localfit: false,
            dimension_minimal_followups: true,
            failure_retrieval_miss: false,
            failure_overconfident_or_drift: false,
            comment: comment.into(),
        }
    }

    fn header_count(text: &str) -> usize {
        text.lines().filter(|l| *l == LEDGER_COLUMNS.join(",")).count()
    }

    #[tokio::test]
    async fn ensure_initialized_twice_writes_one_header() {
        let dir = tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("evaluations.csv"));

        ledger.ensure_initialized().await.unwrap();
        ledger.ensure_initialized().await.unwrap();

        let text = ledger.read_text().await.unwrap();
        assert_eq!(text, header_line());
    }

    #[tokio::test]
    async fn ensure_initialized_never_truncates_existing_data() {
        let dir = tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("evaluations.csv"));
        ledger.append(&record("Ana", "r1", 2.0, "")).await.unwrap();
        let before = ledger.read_text().await.unwrap();

        ledger.ensure_initialized().await.unwrap();
        assert_eq!(ledger.read_text().await.unwrap(), before);
    }

    #[tokio::test]
    async fn append_creates_parent_dir_and_header() {
        let dir = tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("nested/odsc-eval/evaluations.csv"));
        ledger
            .append(&record("Ana", "r1", 3.0, "multi\r\nline, \"quoted\""))
            .await
            .unwrap();

        let rows = ledger.read_all().await.unwrap();
        assert_eq!(rows.header, LEDGER_COLUMNS.map(String::from).to_vec());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.rows[0][1], "Ana");
        assert_eq!(rows.rows[0][3], "3");
        assert_eq!(rows.rows[0][8], "multi\nline, \"quoted\"");
    }

    #[tokio::test]
    async fn concurrent_appends_keep_one_header_and_whole_lines() {
        let dir = tempdir().unwrap();
        let ledger = Arc::new(FileLedger::new(dir.path().join("evaluations.csv")));

        let mut handles = Vec::new();
        for i in 0..40 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                let comment = format!("comment {i}, with \"quotes\"\nand a break");
                ledger
                    .append(&record(&format!("rater{}", i % 4), "r1", 1.0, &comment))
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let text = ledger.read_text().await.unwrap();
        assert_eq!(header_count(&text), 1);
        let rows = ledger.read_all().await.unwrap();
        assert_eq!(rows.len(), 40);
        assert!(rows.rows.iter().all(|r| r.len() == LEDGER_COLUMNS.len()));
    }

    #[tokio::test]
    async fn read_before_init_is_not_found() {
        let dir = tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("evaluations.csv"));
        assert!(ledger.read_text().await.unwrap_err().is_not_found());
        assert!(ledger.read_all().await.unwrap_err().is_not_found());
        assert!(!ledger.exists().await.unwrap());
        assert_eq!(ledger.stat().await, ArtifactStatus::absent());
    }

    #[tokio::test]
    async fn reset_leaves_header_only() {
        let dir = tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("evaluations.csv"));
        ledger.append(&record("Ana", "r1", 2.0, "x")).await.unwrap();

        ledger.reset().await.unwrap();
        ledger.reset().await.unwrap();

        assert_eq!(ledger.read_text().await.unwrap(), header_line());
        assert_eq!(
            ledger.stat().await,
            ArtifactStatus::present(header_line().len() as u64)
        );
    }
}
