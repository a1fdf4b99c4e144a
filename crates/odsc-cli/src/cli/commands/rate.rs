use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, MultiSelect, Select};
use odsc_core::EvalService;

use super::super::args::RateArgs;
use crate::exit_codes::{NOT_FOUND, SUCCESS, VALIDATION_FAILED};
use crate::reports::discover_reports;
use crate::session::{Rating, RatingSession};

const SCORE_CHOICES: [&str; 4] = [
    "0 - unusable",
    "1 - weak",
    "2 - acceptable",
    "3 - strong",
];

const FLAG_CHOICES: [&str; 4] = [
    "fits the local context",
    "needs only minimal follow-ups",
    "retrieval miss",
    "overconfident or drifting",
];

pub(crate) async fn run(svc: &EvalService, args: RateArgs) -> anyhow::Result<i32> {
    let reports = match discover_reports(&args.reports_dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Ok(NOT_FOUND);
        }
    };
    let mut session = match RatingSession::new(&args.rater, reports, args.seed) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(VALIDATION_FAILED);
        }
    };

    let theme = ColorfulTheme::default();
    while let Some(report) = session.current() {
        let (idx, total) = session.progress();
        let body = std::fs::read_to_string(&report.path).unwrap_or_else(|e| {
            tracing::warn!(path = %report.path.display(), error = %e, "failed to read report");
            String::new()
        });
        eprintln!("\n[{idx}/{total}] {}\n", report.id);
        println!("{body}");

        let Some(rating) = prompt_rating(&theme)? else {
            eprintln!("stopped after {} of {total} report(s)", idx - 1);
            return Ok(SUCCESS);
        };
        let Some(payload) = session.payload(&rating) else {
            break;
        };

        // Stay on the same report until the append succeeds.
        match svc.submit_evaluation(&payload).await {
            Ok(_) => session.advance(),
            Err(e) => eprintln!("error: {e}; please try again"),
        }
    }

    if session.is_done() {
        eprintln!("all reports rated, thank you {}", session.rater());
    }
    Ok(SUCCESS)
}

/// `None` when the rater quits with Esc at the score prompt.
fn prompt_rating(theme: &ColorfulTheme) -> anyhow::Result<Option<Rating>> {
    let Some(score) = Select::with_theme(theme)
        .with_prompt("ODSC score (Esc to stop)")
        .items(&SCORE_CHOICES)
        .default(2)
        .interact_opt()?
    else {
        return Ok(None);
    };

    let flags = MultiSelect::with_theme(theme)
        .with_prompt("Dimensions and failure modes (space to toggle)")
        .items(&FLAG_CHOICES)
        .interact()?;

    let comment: String = Input::with_theme(theme)
        .with_prompt("Comment")
        .allow_empty(true)
        .interact_text()?;

    Ok(Some(Rating {
        score: score as u8,
        localfit: flags.contains(&0),
        minimal_followups: flags.contains(&1),
        retrieval_miss: flags.contains(&2),
        overconfident: flags.contains(&3),
        comment,
    }))
}
