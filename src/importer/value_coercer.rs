// ==========================================
// Darpan Portal - value coercion
// ==========================================
// Responsibility: turn one raw cell into a typed scalar or a default.
// All defensive parsing lives here so the row processor stays free of
// ad-hoc error handling: missing or garbled value -> default is a single
// contract, and none of these functions can fail.
// ==========================================

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Rupee glyph as exported by well-behaved systems.
const RUPEE: char = '\u{20B9}';
/// The same glyph after a cp1252 mis-decode, which is how several POS
/// exports actually deliver it.
const RUPEE_MANGLED: &str = "\u{00E2}\u{201A}\u{00B9}";

pub struct ValueCoercer {
    date_formats: Vec<String>,
}

impl ValueCoercer {
    pub fn new(date_formats: &[String]) -> Self {
        Self {
            date_formats: date_formats.to_vec(),
        }
    }

    /// Null-like sentinels: empty, "-", and the NA vocabulary that upstream
    /// spreadsheet tooling writes into exported cells.
    fn is_null_like(raw: &str) -> bool {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "-" {
            return true;
        }
        matches!(
            trimmed.to_lowercase().as_str(),
            "nan" | "na" | "n/a" | "null" | "none"
        )
    }

    /// Strip thousands separators, currency glyphs and whitespace
    fn scrub_amount(raw: &str) -> String {
        raw.replace(RUPEE_MANGLED, "")
            .replace(RUPEE, "")
            .replace(',', "")
            .split_whitespace()
            .collect::<String>()
    }

    /// Coerce a cell to a fixed-precision decimal, falling back to
    /// `default` on anything unparseable. Never fails.
    pub fn coerce_decimal(&self, raw: Option<&str>, default: Decimal) -> Decimal {
        let Some(raw) = raw else { return default };
        if Self::is_null_like(raw) {
            return default;
        }

        let clean = Self::scrub_amount(raw);
        if clean.is_empty() || clean == "-" {
            return default;
        }

        Decimal::from_str(&clean).unwrap_or(default)
    }

    /// Coerce a cell to an integer via a float-tolerant path, so "12.0"
    /// and "12" both yield 12. Truncates toward zero. Never fails.
    pub fn coerce_int(&self, raw: Option<&str>, default: i64) -> i64 {
        let Some(raw) = raw else { return default };
        if Self::is_null_like(raw) {
            return default;
        }

        let clean = Self::scrub_amount(raw);
        if clean.is_empty() || clean == "-" {
            return default;
        }

        clean
            .parse::<f64>()
            .map(|f| f.trunc() as i64)
            .unwrap_or(default)
    }

    /// Coerce a cell to a date by trying the configured formats in order.
    ///
    /// Returns None when nothing parses; there is deliberately no default
    /// here. A null date tells the row processor the row cannot be safely
    /// dated and must be skipped rather than persisted with a fabricated
    /// date.
    pub fn coerce_date(&self, raw: Option<&str>) -> Option<NaiveDate> {
        let raw = raw?;
        if Self::is_null_like(raw) {
            return None;
        }

        let trimmed = raw.trim();
        for format in &self.date_formats {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Some(date);
            }
        }
        None
    }

    /// Trim a text cell, mapping null-like sentinels to the empty string
    pub fn clean_text(&self, raw: Option<&str>) -> String {
        let Some(raw) = raw else {
            return String::new();
        };
        if Self::is_null_like(raw) {
            return String::new();
        }
        raw.trim().to_string()
    }
}

/// Clip a string to the column width of the destination model
pub fn clip(value: String, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value
    } else {
        value.chars().take(max_chars).collect()
    }
}
