// ==========================================
// Import API
// ==========================================
// Responsibility: expose the import pipeline to the web form handlers.
// The service's Result is flattened here into a response the form layer
// can render without touching error internals: the caller always gets a
// definitive outcome, never a hang or a silent partial state.
// ==========================================

use crate::api::error::ApiError;
use crate::domain::ledger::ImportLogEntry;
use crate::importer::{ImportReport, ImportRequest, ImportService};
use crate::repository::ImportRepository;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Import response as the web layer consumes it.
///
/// On failure the counts are zero, the lists empty and `error` carries
/// the tier-specific message; on success `error` is None and the counts
/// are authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub success: bool,
    pub rows_imported: usize,
    pub rows_skipped: usize,
    pub rows_ignored: usize,
    pub columns_mapped: Vec<String>,
    pub columns_unmapped: Vec<String>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl ImportResponse {
    fn from_report(report: ImportReport) -> Self {
        Self {
            success: true,
            rows_imported: report.rows_imported,
            rows_skipped: report.rows_skipped,
            rows_ignored: report.rows_ignored,
            columns_mapped: report.columns_mapped,
            columns_unmapped: report.columns_unmapped,
            warnings: report.warnings,
            error: None,
        }
    }

    fn from_error(message: String) -> Self {
        Self {
            success: false,
            rows_imported: 0,
            rows_skipped: 0,
            rows_ignored: 0,
            columns_mapped: Vec::new(),
            columns_unmapped: Vec::new(),
            warnings: Vec::new(),
            error: Some(message),
        }
    }
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi<R>
where
    R: ImportRepository,
{
    service: ImportService<R>,
}

impl<R> ImportApi<R>
where
    R: ImportRepository,
{
    pub fn new(service: ImportService<R>) -> Self {
        Self { service }
    }

    /// Run one import and flatten the outcome
    pub async fn import(&self, request: &ImportRequest) -> ImportResponse {
        match self.service.import_file(request).await {
            Ok(report) => ImportResponse::from_report(report),
            Err(e) => {
                error!(error = %e, "import failed");
                ImportResponse::from_error(e.to_string())
            }
        }
    }

    /// Recent import ledger entries for a tenant, newest first
    pub async fn recent_imports(
        &self,
        company_id: &str,
        limit: usize,
    ) -> Result<Vec<ImportLogEntry>, ApiError> {
        if company_id.trim().is_empty() {
            return Err(ApiError::InvalidRequest("company_id is required".to_string()));
        }
        self.service
            .repository()
            .recent_import_logs(company_id, limit)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }
}
