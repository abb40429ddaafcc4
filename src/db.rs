// ==========================================
// Darpan Portal - SQLite connection setup
// ==========================================
// Goals:
// - unify PRAGMA behavior across every Connection::open so no module runs
//   with foreign keys off while another has them on
// - unify busy_timeout to cut down on spurious busy errors when several
//   imports land on the same store
// - keep the schema DDL next to the connection helpers so the CLI and the
//   test helpers build identical databases
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configure the unified PRAGMAs for a SQLite connection
///
/// foreign_keys and busy_timeout are per-connection settings and must be
/// applied on every open, not once per database file.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the import-engine tables if they do not exist yet
///
/// Monetary and weight columns are stored as TEXT: they are fixed-precision
/// decimals on the Rust side and REAL would round-trip through binary
/// floats.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS sales_record (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id TEXT NOT NULL,
            transaction_no TEXT,
            transaction_date TEXT NOT NULL,
            transaction_type TEXT NOT NULL,
            client_name TEXT NOT NULL DEFAULT '',
            client_mobile TEXT NOT NULL DEFAULT '',
            pan_no TEXT,
            gst_no TEXT,
            jewel_code TEXT NOT NULL DEFAULT '',
            style_code TEXT NOT NULL DEFAULT '',
            product_category TEXT NOT NULL DEFAULT '',
            product_subcategory TEXT NOT NULL DEFAULT '',
            collection TEXT NOT NULL DEFAULT '',
            base_metal TEXT NOT NULL DEFAULT '',
            gross_weight TEXT NOT NULL,
            net_weight TEXT NOT NULL,
            free_gold_weight TEXT NOT NULL,
            solitaire_pieces INTEGER NOT NULL DEFAULT 0,
            solitaire_weight TEXT NOT NULL,
            total_diamond_pieces INTEGER NOT NULL DEFAULT 0,
            total_diamond_weight TEXT NOT NULL,
            color_stone_pieces INTEGER NOT NULL DEFAULT 0,
            color_stone_weight TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 1,
            gross_amount TEXT NOT NULL,
            discount_amount TEXT NOT NULL,
            discount_percentage TEXT NOT NULL,
            gst_amount TEXT NOT NULL,
            final_amount TEXT NOT NULL,
            gross_margin TEXT NOT NULL,
            region TEXT NOT NULL DEFAULT '',
            sales_person TEXT NOT NULL DEFAULT '',
            entry_type TEXT NOT NULL DEFAULT '',
            created_by TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sales_company_date
         ON sales_record(company_id, transaction_date)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sales_company_style
         ON sales_record(company_id, style_code)",
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS stock_snapshot (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id TEXT NOT NULL,
            jewel_code TEXT NOT NULL DEFAULT '',
            style_code TEXT NOT NULL,
            location TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            sub_category TEXT NOT NULL DEFAULT '',
            base_metal TEXT NOT NULL DEFAULT '',
            item_size TEXT NOT NULL DEFAULT '',
            certificate_no TEXT NOT NULL DEFAULT '',
            stock_month TEXT NOT NULL DEFAULT '',
            stock_year INTEGER,
            quantity INTEGER NOT NULL DEFAULT 0,
            gross_weight TEXT NOT NULL,
            net_weight TEXT NOT NULL,
            pure_weight TEXT NOT NULL,
            diamond_pieces INTEGER NOT NULL DEFAULT 0,
            diamond_weight TEXT NOT NULL,
            color_stone_pieces INTEGER NOT NULL DEFAULT 0,
            color_stone_weight TEXT NOT NULL,
            sale_price TEXT NOT NULL,
            snapshot_date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_stock_company_style
         ON stock_snapshot(company_id, style_code)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_stock_company_location
         ON stock_snapshot(company_id, location)",
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS crm_contact (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id TEXT NOT NULL,
            record_id TEXT NOT NULL DEFAULT '',
            full_name TEXT NOT NULL DEFAULT '',
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            mobile TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            dob TEXT,
            anniversary TEXT,
            store_name TEXT NOT NULL DEFAULT '',
            location TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            state TEXT NOT NULL DEFAULT '',
            lead_source TEXT NOT NULL DEFAULT '',
            lead_status TEXT NOT NULL DEFAULT '',
            original_lead_source TEXT NOT NULL DEFAULT '',
            gender TEXT NOT NULL DEFAULT '',
            marital_status TEXT NOT NULL DEFAULT '',
            budget_range TEXT NOT NULL DEFAULT '',
            interest_category TEXT NOT NULL DEFAULT '',
            loyalty_points INTEGER NOT NULL DEFAULT 0,
            loyalty_redeemed INTEGER NOT NULL DEFAULT 0,
            loyalty_earned INTEGER NOT NULL DEFAULT 0,
            last_engagement_date TEXT,
            total_signal_score TEXT NOT NULL,
            sales_person TEXT NOT NULL DEFAULT '',
            original_sales_person TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contact_company_mobile
         ON crm_contact(company_id, mobile)",
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS import_log (
            entry_id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            record_type TEXT NOT NULL,
            file_name TEXT NOT NULL,
            rows_imported INTEGER NOT NULL DEFAULT 0,
            rows_skipped INTEGER NOT NULL DEFAULT 0,
            rows_ignored INTEGER NOT NULL DEFAULT 0,
            columns_mapped TEXT NOT NULL,
            columns_unmapped TEXT NOT NULL,
            errors TEXT NOT NULL,
            imported_by TEXT,
            imported_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_import_log_company_time
         ON import_log(company_id, imported_at)",
        [],
    )?;

    Ok(())
}
