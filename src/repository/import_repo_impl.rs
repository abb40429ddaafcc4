// ==========================================
// Darpan Portal - import repository (rusqlite)
// ==========================================
// One transaction per import. Inserts run in fixed-size chunks inside
// that transaction; chunking is a write-efficiency detail and never
// creates partial-commit semantics.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::ledger::ImportLogEntry;
use crate::domain::records::{CrmContact, SalesRecord, StockSnapshot};
use crate::domain::types::RecordType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_repo::ImportRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Default physical chunk size inside the commit transaction
pub const DEFAULT_COMMIT_CHUNK_SIZE: usize = 500;

// ==========================================
// ImportRepositoryImpl
// ==========================================
pub struct ImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
    chunk_size: usize,
}

impl ImportRepositoryImpl {
    /// Open a repository on the given database file
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            chunk_size: DEFAULT_COMMIT_CHUNK_SIZE,
        })
    }

    /// Override the physical chunk size (writes stay all-or-nothing)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn insert_sales_chunk(tx: &Transaction, chunk: &[SalesRecord]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO sales_record (
                company_id, transaction_no, transaction_date, transaction_type,
                client_name, client_mobile, pan_no, gst_no,
                jewel_code, style_code, product_category, product_subcategory,
                collection, base_metal,
                gross_weight, net_weight, free_gold_weight,
                solitaire_pieces, solitaire_weight,
                total_diamond_pieces, total_diamond_weight,
                color_stone_pieces, color_stone_weight,
                quantity, gross_amount, discount_amount, discount_percentage,
                gst_amount, final_amount, gross_margin,
                region, sales_person, entry_type,
                created_by, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24,
                ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32, ?33, ?34, ?35
            )
            "#,
        )?;

        let mut count = 0;
        for record in chunk {
            stmt.execute(params![
                record.company_id,
                record.transaction_no,
                record.transaction_date,
                record.transaction_type.as_str(),
                record.client_name,
                record.client_mobile,
                record.pan_no,
                record.gst_no,
                record.jewel_code,
                record.style_code,
                record.product_category,
                record.product_subcategory,
                record.collection,
                record.base_metal,
                record.gross_weight.to_string(),
                record.net_weight.to_string(),
                record.free_gold_weight.to_string(),
                record.solitaire_pieces,
                record.solitaire_weight.to_string(),
                record.total_diamond_pieces,
                record.total_diamond_weight.to_string(),
                record.color_stone_pieces,
                record.color_stone_weight.to_string(),
                record.quantity,
                record.gross_amount.to_string(),
                record.discount_amount.to_string(),
                record.discount_percentage.to_string(),
                record.gst_amount.to_string(),
                record.final_amount.to_string(),
                record.gross_margin.to_string(),
                record.region,
                record.sales_person,
                record.entry_type,
                record.created_by,
                record.created_at,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    fn insert_stock_chunk(tx: &Transaction, chunk: &[StockSnapshot]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO stock_snapshot (
                company_id, jewel_code, style_code, location,
                category, sub_category, base_metal, item_size, certificate_no,
                stock_month, stock_year, quantity,
                gross_weight, net_weight, pure_weight,
                diamond_pieces, diamond_weight,
                color_stone_pieces, color_stone_weight,
                sale_price, snapshot_date, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22
            )
            "#,
        )?;

        let mut count = 0;
        for record in chunk {
            stmt.execute(params![
                record.company_id,
                record.jewel_code,
                record.style_code,
                record.location,
                record.category,
                record.sub_category,
                record.base_metal,
                record.item_size,
                record.certificate_no,
                record.stock_month,
                record.stock_year,
                record.quantity,
                record.gross_weight.to_string(),
                record.net_weight.to_string(),
                record.pure_weight.to_string(),
                record.diamond_pieces,
                record.diamond_weight.to_string(),
                record.color_stone_pieces,
                record.color_stone_weight.to_string(),
                record.sale_price.to_string(),
                record.snapshot_date,
                record.created_at,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    fn insert_contact_chunk(tx: &Transaction, chunk: &[CrmContact]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO crm_contact (
                company_id, record_id, full_name, first_name, last_name,
                mobile, phone, email, dob, anniversary,
                store_name, location, city, state,
                lead_source, lead_status, original_lead_source,
                gender, marital_status, budget_range, interest_category,
                loyalty_points, loyalty_redeemed, loyalty_earned,
                last_engagement_date, total_signal_score,
                sales_person, original_sales_person, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24,
                ?25, ?26, ?27, ?28, ?29
            )
            "#,
        )?;

        let mut count = 0;
        for record in chunk {
            stmt.execute(params![
                record.company_id,
                record.record_id,
                record.full_name,
                record.first_name,
                record.last_name,
                record.mobile,
                record.phone,
                record.email,
                record.dob,
                record.anniversary,
                record.store_name,
                record.location,
                record.city,
                record.state,
                record.lead_source,
                record.lead_status,
                record.original_lead_source,
                record.gender,
                record.marital_status,
                record.budget_range,
                record.interest_category,
                record.loyalty_points,
                record.loyalty_redeemed,
                record.loyalty_earned,
                record.last_engagement_date,
                record.total_signal_score.to_string(),
                record.sales_person,
                record.original_sales_person,
                record.created_at,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    /// Run chunked inserts inside one transaction and commit
    fn commit_chunked<T>(
        &self,
        records: &[T],
        label: &str,
        insert_chunk: impl Fn(&Transaction, &[T]) -> RepositoryResult<usize>,
    ) -> RepositoryResult<usize> {
        let mut guard = self.lock()?;
        let tx = guard
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        for chunk in records.chunks(self.chunk_size) {
            count += insert_chunk(&tx, chunk)?;
            debug!(table = label, chunk = chunk.len(), total = count, "chunk written");
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(count)
    }
}

#[async_trait]
impl ImportRepository for ImportRepositoryImpl {
    async fn insert_sales_records(&self, records: Vec<SalesRecord>) -> RepositoryResult<usize> {
        self.commit_chunked(&records, "sales_record", Self::insert_sales_chunk)
    }

    async fn insert_stock_snapshots(
        &self,
        records: Vec<StockSnapshot>,
    ) -> RepositoryResult<usize> {
        self.commit_chunked(&records, "stock_snapshot", Self::insert_stock_chunk)
    }

    async fn insert_crm_contacts(&self, records: Vec<CrmContact>) -> RepositoryResult<usize> {
        self.commit_chunked(&records, "crm_contact", Self::insert_contact_chunk)
    }

    async fn insert_import_log(&self, entry: ImportLogEntry) -> RepositoryResult<()> {
        let columns_mapped = serde_json::to_string(&entry.columns_mapped)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        let columns_unmapped = serde_json::to_string(&entry.columns_unmapped)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        let errors = serde_json::to_string(&entry.errors)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;

        let guard = self.lock()?;
        guard.execute(
            r#"
            INSERT INTO import_log (
                entry_id, company_id, record_type, file_name,
                rows_imported, rows_skipped, rows_ignored,
                columns_mapped, columns_unmapped, errors,
                imported_by, imported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                entry.entry_id,
                entry.company_id,
                entry.record_type.as_str(),
                entry.file_name,
                entry.rows_imported as i64,
                entry.rows_skipped as i64,
                entry.rows_ignored as i64,
                columns_mapped,
                columns_unmapped,
                errors,
                entry.imported_by,
                entry.imported_at,
            ],
        )?;

        Ok(())
    }

    async fn recent_import_logs(
        &self,
        company_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<ImportLogEntry>> {
        let guard = self.lock()?;
        let mut stmt = guard.prepare(
            r#"
            SELECT entry_id, company_id, record_type, file_name,
                   rows_imported, rows_skipped, rows_ignored,
                   columns_mapped, columns_unmapped, errors,
                   imported_by, imported_at
            FROM import_log
            WHERE company_id = ?1
            ORDER BY imported_at DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![company_id, limit as i64], |row| {
            let record_type_raw: String = row.get(2)?;
            let columns_mapped_raw: String = row.get(7)?;
            let columns_unmapped_raw: String = row.get(8)?;
            let errors_raw: String = row.get(9)?;
            let imported_at: DateTime<Utc> = row.get(11)?;

            Ok(ImportLogEntry {
                entry_id: row.get(0)?,
                company_id: row.get(1)?,
                record_type: RecordType::parse(&record_type_raw)
                    .unwrap_or(RecordType::Sales),
                file_name: row.get(3)?,
                rows_imported: row.get::<_, i64>(4)? as usize,
                rows_skipped: row.get::<_, i64>(5)? as usize,
                rows_ignored: row.get::<_, i64>(6)? as usize,
                columns_mapped: serde_json::from_str(&columns_mapped_raw)
                    .unwrap_or_default(),
                columns_unmapped: serde_json::from_str(&columns_unmapped_raw)
                    .unwrap_or_default(),
                errors: serde_json::from_str(&errors_raw).unwrap_or_default(),
                imported_by: row.get(10)?,
                imported_at,
            })
        })?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }

    async fn count_sales_records(&self, company_id: &str) -> RepositoryResult<i64> {
        let guard = self.lock()?;
        let count = guard.query_row(
            "SELECT COUNT(*) FROM sales_record WHERE company_id = ?1",
            params![company_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    async fn count_stock_snapshots(&self, company_id: &str) -> RepositoryResult<i64> {
        let guard = self.lock()?;
        let count = guard.query_row(
            "SELECT COUNT(*) FROM stock_snapshot WHERE company_id = ?1",
            params![company_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    async fn count_crm_contacts(&self, company_id: &str) -> RepositoryResult<i64> {
        let guard = self.lock()?;
        let count = guard.query_row(
            "SELECT COUNT(*) FROM crm_contact WHERE company_id = ?1",
            params![company_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
