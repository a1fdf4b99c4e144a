use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{header_line, record_line, LedgerStore};
use crate::errors::{Artifact, EvalError, EvalResult};
use crate::model::{ArtifactStatus, EvaluationRecord};

/// In-memory ledger with the same observable semantics as [`super::FileLedger`].
///
/// `None` models an absent artifact.
#[derive(Default)]
pub struct MemoryLedger {
    text: Mutex<Option<String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing artifact text, e.g. a hand-written fixture.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(Some(text.into())),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn ensure_initialized(&self) -> EvalResult<()> {
        let mut text = self.text.lock().await;
        text.get_or_insert_with(header_line);
        Ok(())
    }

    async fn append(&self, record: &EvaluationRecord) -> EvalResult<()> {
        let line = record_line(record);
        let mut text = self.text.lock().await;
        text.get_or_insert_with(header_line).push_str(&line);
        Ok(())
    }

    async fn read_text(&self) -> EvalResult<String> {
        self.text
            .lock()
            .await
            .clone()
            .ok_or_else(|| EvalError::not_found(Artifact::Ledger))
    }

    async fn exists(&self) -> EvalResult<bool> {
        Ok(self.text.lock().await.is_some())
    }

    async fn stat(&self) -> ArtifactStatus {
        match self.text.lock().await.as_ref() {
            Some(t) => ArtifactStatus::present(t.len() as u64),
            None => ArtifactStatus::absent(),
        }
    }

    async fn reset(&self) -> EvalResult<()> {
        *self.text.lock().await = Some(header_line());
        Ok(())
    }

    fn location(&self) -> String {
        "memory://ledger".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn absent_until_initialized() {
        let ledger = MemoryLedger::new();
        assert!(!ledger.exists().await.unwrap());
        assert!(ledger.read_all().await.unwrap_err().is_not_found());

        ledger.ensure_initialized().await.unwrap();
        ledger.ensure_initialized().await.unwrap();
        assert_eq!(ledger.read_text().await.unwrap(), header_line());
    }

    #[tokio::test]
    async fn append_initializes_once() {
        let ledger = MemoryLedger::new();
        let rec = EvaluationRecord {
            timestamp: Utc::now(),
            rater_id: "Ana".into(),
            report_id: "r,1".into(),
            odsc_score: 1.0,
            dimension_localfit: true,
            dimension_minimal_followups: false,
            failure_retrieval_miss: true,
            failure_overconfident_or_drift: false,
            comment: String::new(),
        };
        ledger.append(&rec).await.unwrap();
        ledger.append(&rec).await.unwrap();

        let rows = ledger.read_all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[1][2], "r,1");
        assert_eq!(rows.rows[1][4], "1");
        assert_eq!(rows.rows[1][6], "1");
    }
}
