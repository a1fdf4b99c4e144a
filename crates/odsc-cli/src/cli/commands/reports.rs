use super::super::args::ReportsArgs;
use crate::exit_codes::{NOT_FOUND, SUCCESS};
use crate::reports::discover_reports;

pub(crate) fn run(args: &ReportsArgs) -> anyhow::Result<i32> {
    let reports = match discover_reports(&args.reports_dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Ok(NOT_FOUND);
        }
    };
    if reports.is_empty() {
        eprintln!("no reports found in {}", args.reports_dir.display());
    }
    for report in &reports {
        println!("{}", report.id);
    }
    Ok(SUCCESS)
}
