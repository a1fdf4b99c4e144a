use odsc_core::summary::render;
use odsc_core::EvalService;

use super::super::args::SummaryArgs;
use super::report_error;
use crate::exit_codes::SUCCESS;

pub(crate) async fn run(svc: &EvalService, args: SummaryArgs) -> anyhow::Result<i32> {
    let summary = match svc.regenerate_summary().await {
        Ok(s) => s,
        Err(e) => return Ok(report_error(&e)),
    };

    if !args.quiet {
        print!("{}", render(&summary));
    }
    if summary.skipped_rows > 0 {
        eprintln!(
            "warning: {} ledger row(s) skipped (unparseable score)",
            summary.skipped_rows
        );
    }
    Ok(SUCCESS)
}
