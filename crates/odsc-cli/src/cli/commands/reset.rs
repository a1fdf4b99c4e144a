use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use odsc_core::EvalService;

use super::super::args::ResetArgs;
use super::report_error;
use crate::exit_codes::SUCCESS;

pub(crate) async fn run(svc: &EvalService, args: ResetArgs) -> anyhow::Result<i32> {
    if !args.yes && !confirm(svc) {
        eprintln!("reset cancelled");
        return Ok(SUCCESS);
    }

    match svc.reset_storage().await {
        Ok(()) => {
            eprintln!("storage reset: ledger re-created with header only");
            Ok(SUCCESS)
        }
        Err(e) => Ok(report_error(&e)),
    }
}

fn confirm(svc: &EvalService) -> bool {
    let theme = ColorfulTheme::default();
    Confirm::with_theme(&theme)
        .with_prompt(format!(
            "Delete all evaluations in {}?",
            svc.ledger().location()
        ))
        .default(false)
        .interact()
        .unwrap_or(false)
}
