// ==========================================
// Darpan Portal - transaction classification
// ==========================================
// Responsibility: prefix code of a transaction number -> sale/return/ignore
// plus the sign-correction rule for return rows.
// ==========================================

use crate::config::TransactionCodeTable;
use crate::domain::types::TransactionType;
use rust_decimal::Decimal;

/// Separator between the prefix code and the running number,
/// e.g. "7DE/123" -> prefix "7DE".
const PREFIX_SEPARATOR: char = '/';

pub struct TransactionClassifier<'a> {
    codes: &'a TransactionCodeTable,
}

impl<'a> TransactionClassifier<'a> {
    pub fn new(codes: &'a TransactionCodeTable) -> Self {
        Self { codes }
    }

    /// Classify a transaction number by its prefix code.
    ///
    /// The prefix is the substring before the first separator, uppercased.
    /// Codes absent from the table, and empty transaction numbers, default
    /// to sale.
    pub fn classify(&self, transaction_no: &str) -> TransactionType {
        let trimmed = transaction_no.trim();
        if trimmed.is_empty() {
            return TransactionType::Sale;
        }

        let prefix = trimmed
            .split(PREFIX_SEPARATOR)
            .next()
            .unwrap_or("")
            .trim()
            .to_uppercase();

        self.codes.lookup(&prefix).unwrap_or(TransactionType::Sale)
    }

    /// Apply the sign-correction rule to a signed monetary field.
    ///
    /// Returns are forced negative via -abs(value), which normalizes
    /// inputs that already arrive negative instead of double-negating
    /// them. Sales pass through untouched.
    pub fn signed_amount(&self, kind: TransactionType, value: Decimal) -> Decimal {
        match kind {
            TransactionType::Return => -value.abs(),
            _ => value,
        }
    }
}
