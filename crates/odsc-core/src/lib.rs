pub mod admin;
pub mod codec;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod model;
pub mod service;
pub mod summary;
pub mod validate;

pub use errors::{Artifact, EvalError, EvalResult};
pub use ledger::{FileLedger, LedgerRows, LedgerStore, MemoryLedger, LEDGER_COLUMNS};
pub use model::{ArtifactStatus, EvaluationRecord, Section, StorageStatus, Summary, SummaryRow};
pub use service::EvalService;
