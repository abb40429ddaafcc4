// ==========================================
// Darpan Portal - configuration layer
// ==========================================

pub mod import_config;

pub use import_config::{AliasEntry, AliasTable, ImportConfig, TransactionCodeTable};
