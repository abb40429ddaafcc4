// ==========================================
// Darpan Portal - import ledger entry
// ==========================================
// One row per import attempt that reaches the persistence stage. The
// entry is the durable record of what the pipeline understood about the
// file's schema, independent of whether the data itself was usable.
// Never mutated after creation.
// ==========================================

use crate::domain::types::RecordType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportLogEntry {
    pub entry_id: String,
    pub company_id: String,
    pub record_type: RecordType,
    pub file_name: String,

    pub rows_imported: usize,
    pub rows_skipped: usize,
    pub rows_ignored: usize,

    // Truncated to the configured ledger bounds before insertion
    pub columns_mapped: Vec<String>,
    pub columns_unmapped: Vec<String>,
    pub errors: Vec<String>,

    pub imported_by: Option<String>,
    pub imported_at: DateTime<Utc>,
}
