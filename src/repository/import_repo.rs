// ==========================================
// Darpan Portal - import repository trait
// ==========================================
// Responsibility: data access for the import pipeline, no business rules.
// Each insert_* call is the whole commit for one import: a single
// all-or-nothing transaction, chunked internally for write efficiency
// only.
// ==========================================

use crate::domain::ledger::ImportLogEntry;
use crate::domain::records::{CrmContact, SalesRecord, StockSnapshot};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

#[async_trait]
pub trait ImportRepository: Send + Sync {
    // ===== Batch writes (transactional) =====

    /// Persist all sales records of one import in one transaction.
    ///
    /// # Returns
    /// - Ok(usize): number of records written
    /// - Err: database error; the entire transaction is rolled back
    async fn insert_sales_records(&self, records: Vec<SalesRecord>) -> RepositoryResult<usize>;

    /// Persist all stock snapshots of one import in one transaction.
    async fn insert_stock_snapshots(&self, records: Vec<StockSnapshot>)
        -> RepositoryResult<usize>;

    /// Persist all CRM contacts of one import in one transaction.
    async fn insert_crm_contacts(&self, records: Vec<CrmContact>) -> RepositoryResult<usize>;

    // ===== Import ledger =====

    /// Write one immutable ledger entry for an import attempt
    async fn insert_import_log(&self, entry: ImportLogEntry) -> RepositoryResult<()>;

    /// Most recent ledger entries for a tenant, newest first
    async fn recent_import_logs(
        &self,
        company_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<ImportLogEntry>>;

    // ===== Counts (dashboards, retry checks) =====

    async fn count_sales_records(&self, company_id: &str) -> RepositoryResult<i64>;

    async fn count_stock_snapshots(&self, company_id: &str) -> RepositoryResult<i64>;

    async fn count_crm_contacts(&self, company_id: &str) -> RepositoryResult<i64>;
}
