// ==========================================
// Darpan Portal - API error types
// ==========================================

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum ApiError {
    #[error("import failed: {0}")]
    ImportError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
