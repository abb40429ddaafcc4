// ==========================================
// Darpan Portal - domain layer
// ==========================================
// Entities and shared types for the import engine
// ==========================================

pub mod ledger;
pub mod records;
pub mod types;

pub use ledger::ImportLogEntry;
pub use records::{CrmContact, SalesRecord, StockSnapshot};
pub use types::{RecordType, TransactionType};
