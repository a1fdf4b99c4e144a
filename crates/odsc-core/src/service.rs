//! The operations a transport layer calls.
//!
//! Every method converts failures into an explicit `EvalError`; nothing
//! panics and nothing is retried. Regeneration and reset exclude each other
//! through `maintenance`, so an aggregation run never reads a ledger that
//! is halfway through being reset. Appends are serialized by the ledger.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::admin;
use crate::config::StorageConfig;
use crate::errors::{EvalError, EvalResult};
use crate::ledger::{FileLedger, LedgerStore};
use crate::model::{EvaluationRecord, StorageStatus, Summary};
use crate::summary::{self, SummaryArtifact};
use crate::validate::validate_submission;

struct Inner {
    ledger: Arc<dyn LedgerStore>,
    summary: SummaryArtifact,
    write_dir: Option<PathBuf>,
    maintenance: RwLock<()>,
}

#[derive(Clone)]
pub struct EvalService {
    inner: Arc<Inner>,
}

impl EvalService {
    /// File-backed service. Creates the write directory up front; the
    /// ledger itself is created on first append or reset.
    pub fn open(cfg: &StorageConfig) -> EvalResult<Self> {
        cfg.validate()?;
        std::fs::create_dir_all(&cfg.write_dir).map_err(|e| {
            EvalError::storage(format!("failed to create {}", cfg.write_dir.display()), e)
        })?;

        Ok(Self::build(
            Arc::new(FileLedger::new(cfg.ledger_path())),
            SummaryArtifact::new(cfg.summary_path()),
            Some(cfg.write_dir.clone()),
        ))
    }

    /// Service over any ledger backend.
    pub fn with_ledger(ledger: Arc<dyn LedgerStore>, summary: SummaryArtifact) -> Self {
        Self::build(ledger, summary, None)
    }

    fn build(
        ledger: Arc<dyn LedgerStore>,
        summary: SummaryArtifact,
        write_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                ledger,
                summary,
                write_dir,
                maintenance: RwLock::new(()),
            }),
        }
    }

    pub fn ledger(&self) -> &dyn LedgerStore {
        self.inner.ledger.as_ref()
    }

    pub fn summary_artifact(&self) -> &SummaryArtifact {
        &self.inner.summary
    }

    /// Validates and appends one submission. Nothing is written on
    /// validation failure.
    pub async fn submit_evaluation(&self, raw: &Value) -> EvalResult<EvaluationRecord> {
        let record = match validate_submission(raw) {
            Ok(r) => r,
            Err(e) => {
                tracing::info!(event = "odsc.submit.rejected", reason = %e, "submission rejected");
                return Err(e);
            }
        };

        self.inner.ledger.append(&record).await?;
        tracing::info!(
            event = "odsc.ledger.append",
            rater_id = %record.rater_id,
            report_id = %record.report_id,
            score = record.odsc_score,
            "evaluation recorded"
        );
        Ok(record)
    }

    pub async fn regenerate_summary(&self) -> EvalResult<Summary> {
        let _shared = self.inner.maintenance.read().await;
        summary::regenerate(self.inner.ledger.as_ref(), &self.inner.summary).await
    }

    pub async fn read_ledger_text(&self) -> EvalResult<String> {
        self.inner.ledger.read_text().await
    }

    pub async fn read_summary_text(&self) -> EvalResult<String> {
        self.inner.summary.read_text().await
    }

    pub async fn storage_status(&self) -> StorageStatus {
        admin::status(
            self.inner.ledger.as_ref(),
            &self.inner.summary,
            self.inner.write_dir.clone(),
        )
        .await
    }

    pub async fn reset_storage(&self) -> EvalResult<()> {
        let _exclusive = self.inner.maintenance.write().await;
        admin::reset(self.inner.ledger.as_ref(), &self.inner.summary).await
    }
}
