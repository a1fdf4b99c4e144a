//! Non-semantic storage operations: inspection and destructive reset.

use std::path::PathBuf;

use crate::errors::EvalResult;
use crate::ledger::LedgerStore;
use crate::model::StorageStatus;
use crate::summary::SummaryArtifact;

/// Metadata-only status of both artifacts. Absence is a normal result.
pub async fn status(
    ledger: &dyn LedgerStore,
    summary: &SummaryArtifact,
    write_dir: Option<PathBuf>,
) -> StorageStatus {
    StorageStatus {
        write_dir,
        ledger: ledger.stat().await,
        summary: summary.stat().await,
    }
}

/// Deletes both artifacts if present and re-creates the header-only ledger.
///
/// Safe to call repeatedly, including before anything was ever written.
pub async fn reset(ledger: &dyn LedgerStore, summary: &SummaryArtifact) -> EvalResult<()> {
    summary.remove().await?;
    ledger.reset().await?;
    tracing::info!(
        event = "odsc.storage.reset",
        ledger = %ledger.location(),
        summary = %summary.path().display(),
        "storage reset"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{header_line, FileLedger};
    use crate::model::ArtifactStatus;
    use tempfile::tempdir;

    #[tokio::test]
    async fn status_on_fresh_dir_reports_absence() {
        let dir = tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("evaluations.csv"));
        let summary = SummaryArtifact::new(dir.path().join("summary.csv"));

        let st = status(&ledger, &summary, None).await;
        assert_eq!(st.ledger, ArtifactStatus::absent());
        assert_eq!(st.summary, ArtifactStatus::absent());
    }

    #[tokio::test]
    async fn reset_is_idempotent_on_fresh_environment() {
        let dir = tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("fresh/evaluations.csv"));
        let summary = SummaryArtifact::new(dir.path().join("fresh/summary.csv"));

        reset(&ledger, &summary).await.unwrap();
        reset(&ledger, &summary).await.unwrap();

        let st = status(&ledger, &summary, None).await;
        assert_eq!(st.ledger, ArtifactStatus::present(header_line().len() as u64));
        assert!(!st.summary.exists);
    }

    #[tokio::test]
    async fn reset_removes_existing_summary() {
        let dir = tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("evaluations.csv"));
        let summary = SummaryArtifact::new(dir.path().join("summary.csv"));
        summary.write("section,key,count,avg_odsc\n").await.unwrap();
        assert!(summary.stat().await.exists);

        reset(&ledger, &summary).await.unwrap();
        assert!(summary.read_text().await.unwrap_err().is_not_found());
    }
}
