// ==========================================
// Darpan Portal - import engine core library
// ==========================================
// Ingests sales, stock and CRM contact extracts from external
// point-of-sale/CRM systems: schema normalization, value coercion,
// transaction classification, row-level fault isolation, transactional
// batch persistence, and the import ledger.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and shared types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Import layer - external data in
pub mod importer;

// Configuration layer - injectable tables and bounds
pub mod config;

// Database infrastructure (connection setup / unified PRAGMAs / schema)
pub mod db;

// Logging
pub mod logging;

// API layer - interface for the web handlers
pub mod api;

// ==========================================
// Re-exports
// ==========================================

// Domain types
pub use domain::types::{RecordType, TransactionType};

// Domain entities
pub use domain::{CrmContact, ImportLogEntry, SalesRecord, StockSnapshot};

// Configuration
pub use config::{AliasTable, ImportConfig, TransactionCodeTable};

// Import pipeline
pub use importer::{
    ImportError, ImportReport, ImportRequest, ImportService, SchemaMapper, TransactionClassifier,
    ValueCoercer,
};

// Repository
pub use repository::{ImportRepository, ImportRepositoryImpl};

// API
pub use api::{ImportApi, ImportResponse};

// ==========================================
// Constants
// ==========================================

// System version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "Darpan Portal";
