use odsc_core::EvalService;

use super::super::args::{ArtifactKind, ShowArgs};
use super::report_error;
use crate::exit_codes::SUCCESS;

pub(crate) async fn run(svc: &EvalService, args: ShowArgs) -> anyhow::Result<i32> {
    let text = match args.artifact {
        ArtifactKind::Ledger => svc.read_ledger_text().await,
        ArtifactKind::Summary => svc.read_summary_text().await,
    };
    match text {
        Ok(t) => {
            print!("{t}");
            Ok(SUCCESS)
        }
        Err(e) => Ok(report_error(&e)),
    }
}
