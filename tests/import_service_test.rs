// ==========================================
// Import pipeline - end-to-end tests
// ==========================================
// CSV file in, canonical records + ledger entry out, against a real
// temp SQLite database.
// ==========================================


use darpan_portal::db::open_sqlite_connection;
use darpan_portal::importer::{ImportRequest, ImportService};
use darpan_portal::repository::ImportRepository;
use darpan_portal::{ImportApi, ImportConfig, ImportRepositoryImpl, RecordType};
use std::path::{Path, PathBuf};

fn service(db_path: &str) -> ImportService<ImportRepositoryImpl> {
    let repo = ImportRepositoryImpl::new(db_path).expect("repository open failed");
    ImportService::new(repo, ImportConfig::default())
}

fn request(record_type: RecordType, file_path: &Path, company_id: &str) -> ImportRequest {
    ImportRequest {
        company_id: company_id.to_string(),
        actor: "tester".to_string(),
        record_type,
        file_path: PathBuf::from(file_path),
    }
}

// ==========================================
// Sales
// ==========================================

#[tokio::test]
async fn test_sales_import_end_to_end() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let csv = test_helpers::write_csv(&[
        "ClientName,TransactionNo,Transaction Date,Final Amount (with GST),Gross Margin,Quantity,Mystery Column",
        "Asha Patel,FF/1001,15-01-2024,\"1,500.00\",300,1,x",
        "Ravi Shah,7DE/2001,16-01-2024,\"2,000.00\",150,1,x",
        "Internal,RI/3001,16-01-2024,99,0,1,x",
        "Meera Iyer,FF/1002,bad-date,500,50,1,x",
    ])
    .unwrap();

    let svc = service(&db_path);
    let report = svc
        .import_file(&request(RecordType::Sales, csv.path(), "company-1"))
        .await
        .unwrap();

    assert_eq!(report.rows_imported, 2);
    assert_eq!(report.rows_skipped, 1);
    assert_eq!(report.rows_ignored, 1);

    // mapped canonical fields, in declaration order
    assert!(report.columns_mapped.contains(&"client_name".to_string()));
    assert!(report.columns_mapped.contains(&"transaction_no".to_string()));
    assert!(report.columns_mapped.contains(&"final_amount".to_string()));
    // unknown header reported verbatim
    assert_eq!(report.columns_unmapped, vec!["Mystery Column".to_string()]);

    // the bad-date row is the 4th data row = spreadsheet line 5
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with("Row 5:"));

    // persisted rows: the sale untouched, the return forced negative
    let conn = open_sqlite_connection(&db_path).unwrap();
    let rows: Vec<(String, String)> = conn
        .prepare(
            "SELECT transaction_type, final_amount FROM sales_record
             WHERE company_id = 'company-1' ORDER BY transaction_no",
        )
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], ("return".to_string(), "-2000.00".to_string()));
    assert_eq!(rows[1], ("sale".to_string(), "1500.00".to_string()));

    // exactly one ledger entry, carrying the same counts
    let entries = svc
        .repository()
        .recent_import_logs("company-1", 10)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].rows_imported, 2);
    assert_eq!(entries[0].rows_skipped, 1);
    assert_eq!(entries[0].rows_ignored, 1);
    assert_eq!(entries[0].columns_unmapped, vec!["Mystery Column".to_string()]);
    assert_eq!(entries[0].imported_by.as_deref(), Some("tester"));
}

#[tokio::test]
async fn test_return_without_valid_date_is_skipped_not_persisted() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let csv = test_helpers::write_csv(&[
        "Date,TxnNo,Final Amount (with GST)",
        "bad-date,7DE/123,\"1,000.50\"",
        "01-01-2024,FF/124,200",
    ])
    .unwrap();

    let svc = service(&db_path);
    let report = svc
        .import_file(&request(RecordType::Sales, csv.path(), "company-1"))
        .await
        .unwrap();

    // a return-classified row still needs a valid date to persist
    assert_eq!(report.rows_imported, 1);
    assert_eq!(report.rows_skipped, 1);

    let conn = open_sqlite_connection(&db_path).unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sales_record WHERE transaction_type = 'return'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_reimporting_same_file_duplicates_records() {
    // no dedup by design: re-running an identical file doubles the rows
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let csv = test_helpers::write_csv(&[
        "TransactionNo,Transaction Date,Final Amount (with GST)",
        "FF/1,15-01-2024,100",
        "FF/2,15-01-2024,200",
    ])
    .unwrap();

    let svc = service(&db_path);
    for _ in 0..2 {
        let report = svc
            .import_file(&request(RecordType::Sales, csv.path(), "company-1"))
            .await
            .unwrap();
        assert_eq!(report.rows_imported, 2);
    }

    assert_eq!(
        svc.repository().count_sales_records("company-1").await.unwrap(),
        4
    );
    // one ledger entry per attempt
    let entries = svc
        .repository()
        .recent_import_logs("company-1", 10)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn test_warning_list_is_bounded_in_response() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();

    let mut lines = vec!["TransactionNo,Transaction Date".to_string()];
    for i in 0..25 {
        lines.push(format!("FF/{},never-a-date", i));
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let csv = test_helpers::write_csv(&refs).unwrap();

    let svc = service(&db_path);
    let report = svc
        .import_file(&request(RecordType::Sales, csv.path(), "company-1"))
        .await
        .unwrap();

    assert_eq!(report.rows_skipped, 25);
    // response carries the first 20 warnings, the ledger up to 50
    assert_eq!(report.warnings.len(), 20);
    let entries = svc
        .repository()
        .recent_import_logs("company-1", 1)
        .await
        .unwrap();
    assert_eq!(entries[0].errors.len(), 25);
}

// ==========================================
// Failure tiers
// ==========================================

#[tokio::test]
async fn test_file_level_failure_leaves_no_ledger_entry() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let svc = service(&db_path);

    let err = svc
        .import_file(&request(
            RecordType::Sales,
            Path::new("no_such_upload.csv"),
            "company-1",
        ))
        .await
        .unwrap_err();

    assert!(!err.is_persistence());

    // the known audit gap: nothing reached the ledger
    let entries = svc
        .repository()
        .recent_import_logs("company-1", 10)
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_headers_only_file_is_an_empty_file_error() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let csv = test_helpers::write_csv(&["TransactionNo,Transaction Date"]).unwrap();

    let svc = service(&db_path);
    let err = svc
        .import_file(&request(RecordType::Sales, csv.path(), "company-1"))
        .await
        .unwrap_err();

    assert!(!err.is_persistence());
    assert!(err.to_string().contains("empty"));
}

#[tokio::test]
async fn test_missing_tenant_fails_before_reading_the_file() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let svc = service(&db_path);

    // the path does not even exist; the tenant check fires first
    let err = svc
        .import_file(&request(
            RecordType::Sales,
            Path::new("whatever.csv"),
            "   ",
        ))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("company"));
}

#[tokio::test]
async fn test_persistence_failure_rolls_back_and_is_distinct_from_file_errors() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();

    // constraint that the fixture violates mid-batch
    {
        let conn = open_sqlite_connection(&db_path).unwrap();
        conn.execute_batch(
            "CREATE UNIQUE INDEX idx_sales_txn_unique
             ON sales_record(company_id, transaction_no)",
        )
        .unwrap();
    }

    let csv = test_helpers::write_csv(&[
        "TransactionNo,Transaction Date,Final Amount (with GST)",
        "FF/1,15-01-2024,100",
        "FF/1,16-01-2024,200",
    ])
    .unwrap();

    let svc = service(&db_path);
    let err = svc
        .import_file(&request(RecordType::Sales, csv.path(), "company-1"))
        .await
        .unwrap_err();

    // hard failure, surfaced as the persistence tier
    assert!(err.is_persistence());

    // full rollback: zero new records, and no ledger entry either
    assert_eq!(
        svc.repository().count_sales_records("company-1").await.unwrap(),
        0
    );
    let entries = svc
        .repository()
        .recent_import_logs("company-1", 10)
        .await
        .unwrap();
    assert!(entries.is_empty());
}

// ==========================================
// Stock
// ==========================================

#[tokio::test]
async fn test_stock_import_with_date_carry_forward() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let csv = test_helpers::write_csv(&[
        "Style Code,Location Name,Qty,Sale Price,Date",
        "ST001,Mumbai Store,2,\"45,000\",10-03-2024",
        "ST002,Mumbai Store,1,\"12,500\",",
        ",Mumbai Store,1,999,",
        "ST003,Pune Store,3,\"8,000\",11-03-2024",
    ])
    .unwrap();

    let svc = service(&db_path);
    let report = svc
        .import_file(&request(RecordType::Stock, csv.path(), "company-1"))
        .await
        .unwrap();

    assert_eq!(report.rows_imported, 3);
    assert_eq!(report.rows_skipped, 1); // the style-less row
    assert_eq!(report.rows_ignored, 0);

    let conn = open_sqlite_connection(&db_path).unwrap();
    let rows: Vec<(String, String, String)> = conn
        .prepare(
            "SELECT style_code, snapshot_date, sale_price FROM stock_snapshot
             ORDER BY style_code",
        )
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rows[0].1, "2024-03-10");
    // dateless row inherits the date of the row above it
    assert_eq!(rows[1].1, "2024-03-10");
    assert_eq!(rows[2].1, "2024-03-11");
    // thousands separators scrubbed before storage
    assert_eq!(rows[0].2, "45000");
}

// ==========================================
// Contacts
// ==========================================

#[tokio::test]
async fn test_contacts_import_with_name_fallback() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let csv = test_helpers::write_csv(&[
        "Record Id,Contact Name,First Name,Last Name,Mobile,Loyalty Points Available",
        "R1,Asha Patel,Asha,Patel,9876500001,120",
        "R2,,Ravi,Shah,9876500002,0",
    ])
    .unwrap();

    let svc = service(&db_path);
    let report = svc
        .import_file(&request(RecordType::Contacts, csv.path(), "company-1"))
        .await
        .unwrap();

    assert_eq!(report.rows_imported, 2);
    assert_eq!(report.rows_skipped, 0);

    let conn = open_sqlite_connection(&db_path).unwrap();
    let names: Vec<String> = conn
        .prepare("SELECT full_name FROM crm_contact ORDER BY record_id")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(names, vec!["Asha Patel".to_string(), "Ravi Shah".to_string()]);
}

// ==========================================
// API layer
// ==========================================

#[tokio::test]
async fn test_api_flattens_success_and_failure() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let csv = test_helpers::write_csv(&[
        "TransactionNo,Transaction Date",
        "FF/1,15-01-2024",
    ])
    .unwrap();

    let api = ImportApi::new(service(&db_path));

    let ok = api
        .import(&request(RecordType::Sales, csv.path(), "company-1"))
        .await;
    assert!(ok.success);
    assert_eq!(ok.rows_imported, 1);
    assert!(ok.error.is_none());

    let failed = api
        .import(&request(
            RecordType::Sales,
            Path::new("missing.csv"),
            "company-1",
        ))
        .await;
    assert!(!failed.success);
    assert_eq!(failed.rows_imported, 0);
    assert!(failed.error.is_some());

    let recent = api.recent_imports("company-1", 10).await.unwrap();
    assert_eq!(recent.len(), 1);
}
