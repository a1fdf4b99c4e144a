pub mod dispatch;
pub mod rate;
pub mod reports;
pub mod reset;
pub mod show;
pub mod status;
pub mod submit;
pub mod summary;

pub use dispatch::dispatch;

use super::args::Cli;
use crate::exit_codes;
use odsc_core::config::{load_config, StorageConfig};
use odsc_core::{EvalError, EvalService};

/// Config file first, then environment, then `--write-dir`.
pub(crate) fn resolve_config(cli: &Cli) -> Result<StorageConfig, EvalError> {
    let mut cfg = match &cli.config {
        Some(path) => load_config(path, cli.strict_config)?,
        None => StorageConfig::from_env(),
    };
    if let Some(dir) = &cli.write_dir {
        cfg.write_dir = dir.clone();
    }
    Ok(cfg)
}

pub(crate) fn open_service(cli: &Cli) -> Result<EvalService, EvalError> {
    let cfg = resolve_config(cli)?;
    tracing::debug!(write_dir = %cfg.write_dir.display(), "opening evaluation store");
    EvalService::open(&cfg)
}

/// Prints a library error and returns its exit code.
pub(crate) fn report_error(err: &EvalError) -> i32 {
    eprintln!("error: {err}");
    exit_codes::for_error(err)
}
