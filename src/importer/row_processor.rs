// ==========================================
// Darpan Portal - row processing
// ==========================================
// Responsibility: one pass over the parsed rows, building canonical
// records from the rename plan + classifier + coercer.
//
// Row faults are soft by contract: every row yields an explicit outcome
// (record / ignored / skipped-with-reason) and the loop always runs to
// the end of the file. Nothing a single row contains can abort the pass.
// ==========================================

use crate::config::ImportConfig;
use crate::domain::records::{CrmContact, SalesRecord, StockSnapshot};
use crate::domain::types::TransactionType;
use crate::importer::classifier::TransactionClassifier;
use crate::importer::file_parser::ParsedTable;
use crate::importer::schema_mapper::ColumnMapping;
use crate::importer::value_coercer::{clip, ValueCoercer};
use chrono::{Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

/// Tenant and actor an import runs under. Every record built in the pass
/// is scoped to this company.
#[derive(Debug, Clone)]
pub struct ImportContext {
    pub company_id: String,
    pub actor: String,
}

/// Explicit per-row result, aggregated by the processor instead of being
/// swallowed at the point of failure.
pub enum RowOutcome<T> {
    Record(T),
    Ignored,
    Skipped(String),
}

/// What one pass produced: the records to commit plus the soft-failure
/// tallies. Warnings are unbounded here; callers truncate for the ledger
/// and the response.
pub struct RowBatch<T> {
    pub records: Vec<T>,
    pub skipped: usize,
    pub ignored: usize,
    pub warnings: Vec<String>,
}

/// Canonical-field view of one raw row after the rename plan is applied.
struct FieldView<'r> {
    values: HashMap<&'r str, &'r str>,
}

impl<'r> FieldView<'r> {
    fn new(row: &'r HashMap<String, String>, mapping: &'r ColumnMapping) -> Self {
        let mut values = HashMap::new();
        for (source, canonical) in &mapping.rename_plan {
            if let Some(cell) = row.get(source) {
                values.insert(canonical.as_str(), cell.as_str());
            }
        }
        Self { values }
    }

    fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).copied()
    }
}

pub struct RowProcessor<'a> {
    config: &'a ImportConfig,
    coercer: ValueCoercer,
}

impl<'a> RowProcessor<'a> {
    pub fn new(config: &'a ImportConfig) -> Self {
        Self {
            config,
            coercer: ValueCoercer::new(&config.date_formats),
        }
    }

    /// Drive one pass. Row numbers in warnings are spreadsheet-style:
    /// the header is line 1, the first data row line 2.
    fn drive<T>(
        &self,
        table: &ParsedTable,
        mapping: &ColumnMapping,
        mut build: impl FnMut(&FieldView) -> RowOutcome<T>,
    ) -> RowBatch<T> {
        let mut batch = RowBatch {
            records: Vec::new(),
            skipped: 0,
            ignored: 0,
            warnings: Vec::new(),
        };

        for (idx, row) in table.rows.iter().enumerate() {
            let line = idx + 2;
            let view = FieldView::new(row, mapping);

            match build(&view) {
                RowOutcome::Record(record) => batch.records.push(record),
                RowOutcome::Ignored => batch.ignored += 1,
                RowOutcome::Skipped(reason) => {
                    warn!(row = line, reason = %reason, "row skipped");
                    batch.warnings.push(format!("Row {}: {}", line, reason));
                    batch.skipped += 1;
                }
            }
        }

        batch
    }

    fn text(&self, view: &FieldView, field: &str, max_chars: usize) -> String {
        clip(self.coercer.clean_text(view.get(field)), max_chars)
    }

    fn opt_text(&self, view: &FieldView, field: &str, max_chars: usize) -> Option<String> {
        let value = self.text(view, field, max_chars);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    // ==========================================
    // Sales
    // ==========================================
    pub fn process_sales(
        &self,
        ctx: &ImportContext,
        table: &ParsedTable,
        mapping: &ColumnMapping,
    ) -> RowBatch<SalesRecord> {
        let classifier = TransactionClassifier::new(&self.config.transaction_codes);
        self.drive(table, mapping, |view| {
            self.build_sales(ctx, &classifier, view)
        })
    }

    fn build_sales(
        &self,
        ctx: &ImportContext,
        classifier: &TransactionClassifier,
        view: &FieldView,
    ) -> RowOutcome<SalesRecord> {
        let transaction_no = self.text(view, "transaction_no", 100);
        let transaction_type = classifier.classify(&transaction_no);

        // Internal reconciliation entries never become records; tallied
        // apart from skips so operators can tell "intentionally excluded"
        // from "could not be processed".
        if transaction_type == TransactionType::Ignore {
            return RowOutcome::Ignored;
        }

        // A row that cannot be safely dated must not be persisted with a
        // fabricated date, return rows included.
        let Some(transaction_date) = self.coercer.coerce_date(view.get("transaction_date"))
        else {
            return RowOutcome::Skipped("invalid date, skipping".to_string());
        };

        let final_amount = classifier.signed_amount(
            transaction_type,
            self.coercer
                .coerce_decimal(view.get("final_amount"), Decimal::ZERO),
        );
        let gross_margin = classifier.signed_amount(
            transaction_type,
            self.coercer
                .coerce_decimal(view.get("gross_margin"), Decimal::ZERO),
        );

        let quantity = match self.coercer.coerce_int(view.get("quantity"), 1) {
            0 => 1,
            q => q,
        };

        RowOutcome::Record(SalesRecord {
            company_id: ctx.company_id.clone(),
            transaction_no,
            transaction_date,
            transaction_type,
            client_name: self.text(view, "client_name", 255),
            client_mobile: self.text(view, "client_mobile", 20),
            pan_no: self.opt_text(view, "pan_no", 20),
            gst_no: self.opt_text(view, "gst_no", 50),
            jewel_code: self.text(view, "jewel_code", 100),
            style_code: self.text(view, "style_code", 100),
            product_category: self.text(view, "product_category", 100),
            product_subcategory: self.text(view, "product_subcategory", 100),
            collection: self.text(view, "collection", 100),
            base_metal: self.text(view, "base_metal", 50),
            gross_weight: self
                .coercer
                .coerce_decimal(view.get("gross_weight"), Decimal::ZERO),
            net_weight: self
                .coercer
                .coerce_decimal(view.get("net_weight"), Decimal::ZERO),
            free_gold_weight: self
                .coercer
                .coerce_decimal(view.get("free_gold_weight"), Decimal::ZERO),
            solitaire_pieces: self.coercer.coerce_int(view.get("solitaire_pieces"), 0),
            solitaire_weight: self
                .coercer
                .coerce_decimal(view.get("solitaire_weight"), Decimal::ZERO),
            total_diamond_pieces: self
                .coercer
                .coerce_int(view.get("total_diamond_pieces"), 0),
            total_diamond_weight: self
                .coercer
                .coerce_decimal(view.get("total_diamond_weight"), Decimal::ZERO),
            color_stone_pieces: self.coercer.coerce_int(view.get("color_stone_pieces"), 0),
            color_stone_weight: self
                .coercer
                .coerce_decimal(view.get("color_stone_weight"), Decimal::ZERO),
            quantity,
            gross_amount: self
                .coercer
                .coerce_decimal(view.get("gross_amount"), Decimal::ZERO),
            discount_amount: self
                .coercer
                .coerce_decimal(view.get("discount_amount"), Decimal::ZERO),
            discount_percentage: self
                .coercer
                .coerce_decimal(view.get("discount_percentage"), Decimal::ZERO),
            gst_amount: self
                .coercer
                .coerce_decimal(view.get("gst_amount"), Decimal::ZERO),
            final_amount,
            gross_margin,
            region: self.text(view, "region", 100),
            sales_person: self.text(view, "sales_person", 100),
            entry_type: self.text(view, "entry_type", 20),
            created_by: if ctx.actor.trim().is_empty() {
                None
            } else {
                Some(ctx.actor.clone())
            },
            created_at: Utc::now(),
        })
    }

    // ==========================================
    // Stock
    // ==========================================
    pub fn process_stock(
        &self,
        ctx: &ImportContext,
        table: &ParsedTable,
        mapping: &ColumnMapping,
    ) -> RowBatch<StockSnapshot> {
        // The snapshot date defaults to today and is carried forward from
        // the most recent row whose date column parsed. Exports often fill
        // the date on the first row of a location block only.
        let mut snapshot_date = Local::now().date_naive();
        self.drive(table, mapping, |view| {
            self.build_stock(ctx, view, &mut snapshot_date)
        })
    }

    fn build_stock(
        &self,
        ctx: &ImportContext,
        view: &FieldView,
        snapshot_date: &mut NaiveDate,
    ) -> RowOutcome<StockSnapshot> {
        if let Some(parsed) = self.coercer.coerce_date(view.get("snapshot_date")) {
            *snapshot_date = parsed;
        }

        let style_code = self.text(view, "style_code", 100);
        if style_code.is_empty() {
            return RowOutcome::Skipped("missing style code, skipping".to_string());
        }

        let stock_year = match self.coercer.coerce_int(view.get("stock_year"), 0) {
            0 => None,
            year => Some(year),
        };

        RowOutcome::Record(StockSnapshot {
            company_id: ctx.company_id.clone(),
            jewel_code: self.text(view, "jewel_code", 100),
            style_code,
            location: self.text(view, "location", 100),
            category: self.text(view, "category", 100),
            sub_category: self.text(view, "sub_category", 100),
            base_metal: self.text(view, "base_metal", 50),
            item_size: self.text(view, "item_size", 20),
            certificate_no: self.text(view, "certificate_no", 100),
            stock_month: self.text(view, "stock_month", 20),
            stock_year,
            quantity: self.coercer.coerce_int(view.get("quantity"), 0),
            gross_weight: self
                .coercer
                .coerce_decimal(view.get("gross_weight"), Decimal::ZERO),
            net_weight: self
                .coercer
                .coerce_decimal(view.get("net_weight"), Decimal::ZERO),
            pure_weight: self
                .coercer
                .coerce_decimal(view.get("pure_weight"), Decimal::ZERO),
            diamond_pieces: self.coercer.coerce_int(view.get("diamond_pieces"), 0),
            diamond_weight: self
                .coercer
                .coerce_decimal(view.get("diamond_weight"), Decimal::ZERO),
            color_stone_pieces: self.coercer.coerce_int(view.get("color_stone_pieces"), 0),
            color_stone_weight: self
                .coercer
                .coerce_decimal(view.get("color_stone_weight"), Decimal::ZERO),
            sale_price: self
                .coercer
                .coerce_decimal(view.get("sale_price"), Decimal::ZERO),
            snapshot_date: *snapshot_date,
            created_at: Utc::now(),
        })
    }

    // ==========================================
    // Contacts
    // ==========================================
    pub fn process_contacts(
        &self,
        ctx: &ImportContext,
        table: &ParsedTable,
        mapping: &ColumnMapping,
    ) -> RowBatch<CrmContact> {
        self.drive(table, mapping, |view| self.build_contact(ctx, view))
    }

    fn build_contact(&self, ctx: &ImportContext, view: &FieldView) -> RowOutcome<CrmContact> {
        let mut full_name = self.text(view, "full_name", 255);
        if full_name.is_empty() {
            let first = self.coercer.clean_text(view.get("first_name"));
            let last = self.coercer.clean_text(view.get("last_name"));
            full_name = clip(format!("{} {}", first, last).trim().to_string(), 255);
        }

        RowOutcome::Record(CrmContact {
            company_id: ctx.company_id.clone(),
            record_id: self.text(view, "record_id", 100),
            full_name,
            first_name: self.text(view, "first_name", 100),
            last_name: self.text(view, "last_name", 100),
            mobile: self.text(view, "mobile", 20),
            phone: self.text(view, "phone", 20),
            email: self.text(view, "email", 254),
            dob: self.coercer.coerce_date(view.get("dob")),
            anniversary: self.coercer.coerce_date(view.get("anniversary")),
            store_name: self.text(view, "store_name", 255),
            location: self.text(view, "location", 255),
            city: self.text(view, "city", 100),
            state: self.text(view, "state", 100),
            lead_source: self.text(view, "lead_source", 100),
            lead_status: self.text(view, "lead_status", 50),
            original_lead_source: self.text(view, "original_lead_source", 100),
            gender: self.text(view, "gender", 20),
            marital_status: self.text(view, "marital_status", 50),
            budget_range: self.text(view, "budget_range", 100),
            interest_category: self.text(view, "interest_category", 255),
            loyalty_points: self.coercer.coerce_int(view.get("loyalty_points"), 0),
            loyalty_redeemed: self.coercer.coerce_int(view.get("loyalty_redeemed"), 0),
            loyalty_earned: self.coercer.coerce_int(view.get("loyalty_earned"), 0),
            last_engagement_date: self.coercer.coerce_date(view.get("last_engagement_date")),
            total_signal_score: self
                .coercer
                .coerce_decimal(view.get("total_signal_score"), Decimal::ZERO),
            sales_person: self.text(view, "sales_person", 100),
            original_sales_person: self.text(view, "original_sales_person", 100),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::schema_mapper::SchemaMapper;
    use std::str::FromStr;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    fn ctx() -> ImportContext {
        ImportContext {
            company_id: "company-1".to_string(),
            actor: "tester".to_string(),
        }
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> ParsedTable {
        let headers: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
        let rows = rows
            .iter()
            .map(|cells| {
                headers
                    .iter()
                    .cloned()
                    .zip(cells.iter().map(|c| (*c).to_string()))
                    .collect::<HashMap<String, String>>()
            })
            .collect();
        ParsedTable { headers, rows }
    }

    fn mapped(config: &ImportConfig, t: &ParsedTable) -> ColumnMapping {
        SchemaMapper::new(&config.sales_aliases).map_columns(&t.headers)
    }

    #[test]
    fn test_sales_return_rows_are_sign_corrected() {
        let config = ImportConfig::default();
        let processor = RowProcessor::new(&config);

        let t = table(
            &["TransactionNo", "Transaction Date", "Final Amount (with GST)", "Gross Margin"],
            &[
                &["7DE/123", "15-01-2024", "1,000.50", "200"],
                &["7DR/124", "16-01-2024", "-750.00", "-50"],
            ],
        );
        let m = mapped(&config, &t);
        let batch = processor.process_sales(&ctx(), &t, &m);

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped, 0);
        // positive source value forced negative
        assert_eq!(batch.records[0].transaction_type, TransactionType::Return);
        assert_eq!(batch.records[0].final_amount, dec("-1000.50"));
        assert_eq!(batch.records[0].gross_margin, dec("-200"));
        // already-negative source value not double-negated
        assert_eq!(batch.records[1].final_amount, dec("-750.00"));
        assert_eq!(batch.records[1].gross_margin, dec("-50"));
    }

    #[test]
    fn test_sales_ignore_rows_are_tallied_separately() {
        let config = ImportConfig::default();
        let processor = RowProcessor::new(&config);

        let t = table(
            &["TransactionNo", "Transaction Date", "Final Amount (with GST)"],
            &[
                &["RI/1", "15-01-2024", "100"],
                &["RR/2", "15-01-2024", "200"],
                &["FF/3", "15-01-2024", "300"],
            ],
        );
        let m = mapped(&config, &t);
        let batch = processor.process_sales(&ctx(), &t, &m);

        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.ignored, 2);
        assert_eq!(batch.skipped, 0);
        assert!(batch.warnings.is_empty());
    }

    #[test]
    fn test_sales_bad_date_skips_row_with_line_number() {
        let config = ImportConfig::default();
        let processor = RowProcessor::new(&config);

        let t = table(
            &["TransactionNo", "Transaction Date", "Final Amount (with GST)"],
            &[
                &["FF/1", "15-01-2024", "100"],
                &["FF/2", "not-a-date", "200"],
                &["FF/3", "", "300"],
            ],
        );
        let m = mapped(&config, &t);
        let batch = processor.process_sales(&ctx(), &t, &m);

        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped, 2);
        // header is line 1, so the bad rows are lines 3 and 4
        assert!(batch.warnings[0].starts_with("Row 3:"));
        assert!(batch.warnings[1].starts_with("Row 4:"));
    }

    #[test]
    fn test_return_row_still_needs_a_valid_date() {
        // a return-classified row without a parseable date is skipped,
        // never persisted with a fabricated date
        let config = ImportConfig::default();
        let processor = RowProcessor::new(&config);

        let t = table(
            &["TransactionNo", "Transaction Date", "Final Amount (with GST)"],
            &[&["7DE/123", "bad-date", "1,000.50"]],
        );
        let m = mapped(&config, &t);
        let batch = processor.process_sales(&ctx(), &t, &m);

        assert!(batch.records.is_empty());
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.ignored, 0);
    }

    #[test]
    fn test_sales_quantity_zero_or_missing_becomes_one() {
        let config = ImportConfig::default();
        let processor = RowProcessor::new(&config);

        let t = table(
            &["TransactionNo", "Transaction Date", "Quantity"],
            &[
                &["FF/1", "15-01-2024", "0"],
                &["FF/2", "15-01-2024", ""],
                &["FF/3", "15-01-2024", "4"],
            ],
        );
        let m = mapped(&config, &t);
        let batch = processor.process_sales(&ctx(), &t, &m);

        assert_eq!(batch.records[0].quantity, 1);
        assert_eq!(batch.records[1].quantity, 1);
        assert_eq!(batch.records[2].quantity, 4);
    }

    #[test]
    fn test_sales_records_carry_tenant_and_actor() {
        let config = ImportConfig::default();
        let processor = RowProcessor::new(&config);

        let t = table(
            &["TransactionNo", "Transaction Date"],
            &[&["FF/1", "15-01-2024"]],
        );
        let m = mapped(&config, &t);
        let batch = processor.process_sales(&ctx(), &t, &m);

        assert_eq!(batch.records[0].company_id, "company-1");
        assert_eq!(batch.records[0].created_by.as_deref(), Some("tester"));
    }

    #[test]
    fn test_stock_snapshot_date_carries_forward() {
        let config = ImportConfig::default();
        let processor = RowProcessor::new(&config);

        let t = table(
            &["Style Code", "Date", "Qty"],
            &[
                &["ST001", "10-03-2024", "1"],
                &["ST002", "", "2"],
                &["ST003", "11-03-2024", "3"],
            ],
        );
        let m = SchemaMapper::new(&config.stock_aliases).map_columns(&t.headers);
        let batch = processor.process_stock(&ctx(), &t, &m);

        let d1 = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(batch.records[0].snapshot_date, d1);
        // dateless row inherits the previous row's date
        assert_eq!(batch.records[1].snapshot_date, d1);
        assert_eq!(batch.records[2].snapshot_date, d2);
    }

    #[test]
    fn test_stock_missing_style_code_is_skipped() {
        let config = ImportConfig::default();
        let processor = RowProcessor::new(&config);

        let t = table(
            &["Style Code", "Qty"],
            &[&["", "1"], &["nan", "2"], &["ST001", "3"]],
        );
        let m = SchemaMapper::new(&config.stock_aliases).map_columns(&t.headers);
        let batch = processor.process_stock(&ctx(), &t, &m);

        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped, 2);
        assert_eq!(batch.records[0].style_code, "ST001");
    }

    #[test]
    fn test_stock_year_zero_becomes_none() {
        let config = ImportConfig::default();
        let processor = RowProcessor::new(&config);

        let t = table(
            &["Style Code", "Year"],
            &[&["ST001", "2024"], &["ST002", ""]],
        );
        let m = SchemaMapper::new(&config.stock_aliases).map_columns(&t.headers);
        let batch = processor.process_stock(&ctx(), &t, &m);

        assert_eq!(batch.records[0].stock_year, Some(2024));
        assert_eq!(batch.records[1].stock_year, None);
    }

    #[test]
    fn test_contact_full_name_falls_back_to_first_last() {
        let config = ImportConfig::default();
        let processor = RowProcessor::new(&config);

        let t = table(
            &["Contact Name", "First Name", "Last Name", "Mobile"],
            &[
                &["Asha Patel", "Asha", "Patel", "9876500001"],
                &["", "Ravi", "Shah", "9876500002"],
                &["nan", "Meera", "", "9876500003"],
            ],
        );
        let m = SchemaMapper::new(&config.contact_aliases).map_columns(&t.headers);
        let batch = processor.process_contacts(&ctx(), &t, &m);

        assert_eq!(batch.records[0].full_name, "Asha Patel");
        assert_eq!(batch.records[1].full_name, "Ravi Shah");
        assert_eq!(batch.records[2].full_name, "Meera");
        assert_eq!(batch.skipped, 0);
    }
}
