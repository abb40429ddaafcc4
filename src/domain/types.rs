// ==========================================
// Darpan Portal - shared domain types
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// RecordType - import target selector
// ==========================================
// One value per canonical record family; every upload names exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Sales,
    Stock,
    Contacts,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Sales => "sales",
            RecordType::Stock => "stock",
            RecordType::Contacts => "contacts",
        }
    }

    /// Parse a selector as it arrives from a form or the CLI
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sales" => Some(RecordType::Sales),
            "stock" => Some(RecordType::Stock),
            // historical spelling kept for older callers
            "contacts" | "crm" => Some(RecordType::Contacts),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// TransactionType - derived sales classification
// ==========================================
// Computed from the transaction number prefix; never read from a column.
// Ignore rows are dropped before persistence, so only sale/return reach
// the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Sale,
    Return,
    Ignore,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Sale => "sale",
            TransactionType::Return => "return",
            TransactionType::Ignore => "ignore",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sale" => Some(TransactionType::Sale),
            "return" => Some(TransactionType::Return),
            "ignore" => Some(TransactionType::Ignore),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
