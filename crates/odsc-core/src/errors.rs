//! Error types for ledger, summary and configuration operations.

use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Result type for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// The two persisted artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Ledger,
    Summary,
}

impl Display for Artifact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Artifact::Ledger => write!(f, "ledger"),
            Artifact::Summary => write!(f, "summary"),
        }
    }
}

/// Errors surfaced at the operation boundary.
///
/// None of these are retried; every failure is reported to the immediate
/// caller and leaves the service able to serve the next request.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Submission rejected before anything was written.
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O failure on create, read, write or delete.
    #[error("storage error: {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Aggregation requested on a ledger that has a header but no data rows.
    #[error("no evaluation rows yet")]
    NoData,

    /// Read requested before the artifact exists.
    #[error("{artifact} not found")]
    NotFound { artifact: Artifact },

    /// Configuration could not be loaded or is invalid.
    #[error("config error: {0}")]
    Config(String),
}

impl EvalError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    pub fn not_found(artifact: Artifact) -> Self {
        Self::NotFound { artifact }
    }

    /// Maps an I/O error to `NotFound` when the file is simply absent.
    pub fn from_io(err: std::io::Error, artifact: Artifact, context: impl Into<String>) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(artifact)
        } else {
            Self::storage(context, err)
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }

    /// Suggested exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 1,
            Self::Storage { .. } => 2,
            Self::NotFound { .. } => 3,
            Self::NoData => 4,
            Self::Config(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_artifact_absence() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let mapped = EvalError::from_io(err, Artifact::Summary, "read summary");
        assert!(mapped.is_not_found());
        assert_eq!(mapped.to_string(), "summary not found");
    }

    #[test]
    fn other_io_errors_stay_storage_errors() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let mapped = EvalError::from_io(err, Artifact::Ledger, "append ledger");
        assert!(mapped.is_storage());
        assert!(mapped.to_string().contains("append ledger"));
        assert_eq!(mapped.exit_code(), 2);
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            EvalError::validation("x").exit_code(),
            EvalError::storage("x", std::io::Error::other("y")).exit_code(),
            EvalError::not_found(Artifact::Ledger).exit_code(),
            EvalError::NoData.exit_code(),
            EvalError::Config("x".into()).exit_code(),
        ];
        let unique: std::collections::BTreeSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
