// ==========================================
// Darpan Portal - import orchestration
// ==========================================
// Responsibility: drive one import end to end.
// Flow: validate tenant -> parse file -> resolve column mapping ->
//       process rows -> commit batch -> write ledger entry
//
// Failure tiers:
// - file tier aborts before anything is written (and before the ledger,
//   a known gap carried over from the legacy portal)
// - row tier is absorbed into counts and warnings
// - persistence tier rolls the whole batch back
// ==========================================

use crate::config::ImportConfig;
use crate::domain::ledger::ImportLogEntry;
use crate::domain::types::RecordType;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use crate::importer::row_processor::{ImportContext, RowProcessor};
use crate::importer::schema_mapper::SchemaMapper;
use crate::repository::ImportRepository;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// One import invocation: who, what type, which file.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub company_id: String,
    pub actor: String,
    pub record_type: RecordType,
    pub file_path: PathBuf,
}

/// Structured outcome of a successful import. The counts and column
/// lists are authoritative evidence of what happened even when warnings
/// are non-empty.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub entry_id: String,
    pub record_type: RecordType,
    pub file_name: String,
    pub rows_imported: usize,
    pub rows_skipped: usize,
    pub rows_ignored: usize,
    pub columns_mapped: Vec<String>,
    pub columns_unmapped: Vec<String>,
    /// First N warnings only (configured bound)
    pub warnings: Vec<String>,
}

// ==========================================
// ImportService
// ==========================================
pub struct ImportService<R>
where
    R: ImportRepository,
{
    repo: R,
    config: ImportConfig,
    parser: Box<dyn FileParser>,
}

impl<R> ImportService<R>
where
    R: ImportRepository,
{
    pub fn new(repo: R, config: ImportConfig) -> Self {
        Self {
            repo,
            config,
            parser: Box::new(UniversalFileParser),
        }
    }

    /// Swap the file parser (tests, fixed-format callers)
    pub fn with_parser(mut self, parser: Box<dyn FileParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Access the underlying repository (ledger queries, counts)
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Run one import synchronously from start to finish.
    ///
    /// One invocation = one sequential pass over the rows; there is no
    /// intermediate suspension point and no partial result. Re-running
    /// the same file is not idempotent: the pipeline performs no
    /// deduplication, so confirm the prior attempt's ledger entry before
    /// retrying.
    #[instrument(
        skip(self, request),
        fields(
            record_type = %request.record_type,
            file = %request.file_path.display(),
            company = %request.company_id,
        )
    )]
    pub async fn import_file(&self, request: &ImportRequest) -> ImportResult<ImportReport> {
        if request.company_id.trim().is_empty() {
            return Err(ImportError::MissingTenant);
        }

        // === Stage 1: parse the file ===
        debug!("stage 1: parse file");
        let table = self.parser.parse(&request.file_path).map_err(|e| {
            error!(error = %e, "file parse failed");
            e
        })?;
        if table.rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        info!(rows = table.rows.len(), columns = table.headers.len(), "file parsed");

        // === Stage 2: resolve the column mapping ===
        debug!("stage 2: map columns");
        let aliases = self.config.aliases_for(request.record_type);
        let mapping = SchemaMapper::new(aliases).map_columns(&table.headers);
        info!(
            mapped = mapping.mapped.len(),
            unmapped = mapping.unmapped.len(),
            "column mapping resolved"
        );

        // === Stage 3: process rows ===
        debug!("stage 3: process rows");
        let ctx = ImportContext {
            company_id: request.company_id.clone(),
            actor: request.actor.clone(),
        };
        let processor = RowProcessor::new(&self.config);

        // === Stage 4: commit the batch (all-or-nothing) ===
        let (rows_imported, rows_skipped, rows_ignored, warnings) = match request.record_type {
            RecordType::Sales => {
                let batch = processor.process_sales(&ctx, &table, &mapping);
                let written = self.repo.insert_sales_records(batch.records).await?;
                (written, batch.skipped, batch.ignored, batch.warnings)
            }
            RecordType::Stock => {
                let batch = processor.process_stock(&ctx, &table, &mapping);
                let written = self.repo.insert_stock_snapshots(batch.records).await?;
                (written, batch.skipped, batch.ignored, batch.warnings)
            }
            RecordType::Contacts => {
                let batch = processor.process_contacts(&ctx, &table, &mapping);
                let written = self.repo.insert_crm_contacts(batch.records).await?;
                (written, batch.skipped, batch.ignored, batch.warnings)
            }
        };

        // === Stage 5: write the ledger entry ===
        debug!("stage 5: write ledger entry");
        let file_name = file_name_of(&request.file_path);
        let entry_id = Uuid::new_v4().to_string();
        let entry = ImportLogEntry {
            entry_id: entry_id.clone(),
            company_id: request.company_id.clone(),
            record_type: request.record_type,
            file_name: file_name.clone(),
            rows_imported,
            rows_skipped,
            rows_ignored,
            columns_mapped: truncated(&mapping.mapped, self.config.max_ledger_columns),
            columns_unmapped: truncated(&mapping.unmapped, self.config.max_ledger_columns),
            errors: truncated(&warnings, self.config.max_ledger_errors),
            imported_by: if request.actor.trim().is_empty() {
                None
            } else {
                Some(request.actor.clone())
            },
            imported_at: Utc::now(),
        };
        self.repo.insert_import_log(entry).await?;

        info!(
            entry_id = %entry_id,
            imported = rows_imported,
            skipped = rows_skipped,
            ignored = rows_ignored,
            "import complete"
        );

        Ok(ImportReport {
            entry_id,
            record_type: request.record_type,
            file_name,
            rows_imported,
            rows_skipped,
            rows_ignored,
            columns_mapped: mapping.mapped,
            columns_unmapped: mapping.unmapped,
            warnings: truncated(&warnings, self.config.max_result_warnings),
        })
    }

    /// Import several files as independent invocations, concurrently.
    ///
    /// One failed file does not affect the others; each result stands on
    /// its own ledger entry.
    pub async fn batch_import(
        &self,
        requests: Vec<ImportRequest>,
    ) -> Vec<Result<ImportReport, String>> {
        use futures::future::join_all;

        info!(count = requests.len(), "batch import started");

        let tasks = requests.iter().map(|request| async move {
            match self.import_file(request).await {
                Ok(report) => Ok(report),
                Err(e) => {
                    error!(file = %request.file_path.display(), error = %e, "file import failed");
                    Err(format!("{}: {}", file_name_of(&request.file_path), e))
                }
            }
        });

        let results = join_all(tasks).await;

        info!(
            total = results.len(),
            succeeded = results.iter().filter(|r| r.is_ok()).count(),
            "batch import finished"
        );

        results
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn truncated(values: &[String], limit: usize) -> Vec<String> {
    values.iter().take(limit).cloned().collect()
}
