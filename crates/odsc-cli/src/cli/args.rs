use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "odsc",
    version,
    about = "Human ODSC ratings for generated reports: append-only ledger and summary statistics"
)]
pub struct Cli {
    /// YAML storage config (write_dir, ledger_file, summary_file)
    #[arg(long, global = true, env = "ODSC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reject unknown keys in the config file
    #[arg(long, global = true)]
    pub strict_config: bool,

    /// Directory holding the ledger and summary (overrides config and ODSC_WRITE_DIR)
    #[arg(long, global = true)]
    pub write_dir: Option<PathBuf>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate and append one evaluation to the ledger
    Submit(SubmitArgs),
    /// Regenerate the summary from the full ledger
    Summary(SummaryArgs),
    /// Print the ledger or summary text
    Show(ShowArgs),
    /// Existence and size of both artifacts
    Status,
    /// Delete both artifacts and re-create the header-only ledger
    Reset(ResetArgs),
    /// List report ids available for rating
    Reports(ReportsArgs),
    /// Interactive rating pass over a shuffled set of reports
    Rate(RateArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Raw JSON submission ('-' reads stdin); passed to validation as-is
    #[arg(long, conflicts_with_all = ["rater", "report", "score"])]
    pub payload: Option<PathBuf>,

    #[arg(long)]
    pub rater: Option<String>,

    #[arg(long)]
    pub report: Option<String>,

    /// ODSC score, 0..=3
    #[arg(long, allow_hyphen_values = true)]
    pub score: Option<String>,

    #[arg(long)]
    pub localfit: bool,

    #[arg(long)]
    pub minimal_followups: bool,

    #[arg(long)]
    pub retrieval_miss: bool,

    #[arg(long)]
    pub overconfident: bool,

    #[arg(long, default_value = "")]
    pub comment: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SummaryArgs {
    /// Do not print the regenerated summary
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ArtifactKind {
    Ledger,
    Summary,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(value_enum)]
    pub artifact: ArtifactKind,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportsArgs {
    /// Directory of markdown reports (<internal_id>.md)
    #[arg(long, default_value = "data")]
    pub reports_dir: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RateArgs {
    #[arg(long, default_value = "data")]
    pub reports_dir: PathBuf,

    /// Rater first name
    #[arg(long)]
    pub rater: String,

    /// Fixed shuffle seed (reproducible order)
    #[arg(long)]
    pub seed: Option<u64>,
}
