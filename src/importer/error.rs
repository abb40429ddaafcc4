// ==========================================
// Darpan Portal - import error types
// ==========================================
// Two hard tiers live here. File-tier errors abort before anything is
// written; persistence-tier errors abort after the row loop with a full
// rollback. Row-tier faults never become an ImportError: they are
// aggregated as warnings by the row processor.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File tier =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .csv/.xlsx/.xls)")]
    UnsupportedFormat(String),

    #[error("failed to read file: {0}")]
    FileReadError(String),

    #[error("CSV parse failure: {0}")]
    CsvParseError(String),

    #[error("spreadsheet parse failure: {0}")]
    ExcelParseError(String),

    #[error("file is empty")]
    EmptyFile,

    #[error("no valid company available for import")]
    MissingTenant,

    // ===== Persistence tier =====
    #[error("database error: {0}")]
    Persistence(#[from] RepositoryError),

    // ===== Catch-all =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// True for commit-stage failures, false for file-tier ones.
    ///
    /// Operators use this split to tell "bad input" from "infrastructure
    /// problem".
    pub fn is_persistence(&self) -> bool {
        matches!(self, ImportError::Persistence(_))
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result alias for the import pipeline
pub type ImportResult<T> = Result<T, ImportError>;
