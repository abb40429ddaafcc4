// ==========================================
// Darpan Portal - schema normalization
// ==========================================
// Responsibility: map arbitrary source headers onto the canonical field
// set for a record type. Purely computes a plan; applying it to rows is
// the row processor's job.
// ==========================================

use crate::config::AliasTable;
use std::collections::HashMap;

/// Result of mapping one header row against one alias table.
///
/// Deterministic for a fixed header set and alias table.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    /// source header -> canonical field
    pub rename_plan: HashMap<String, String>,
    /// canonical fields matched, in declaration order
    pub mapped: Vec<String>,
    /// source headers matched to nothing, in file order
    pub unmapped: Vec<String>,
}

pub struct SchemaMapper<'a> {
    table: &'a AliasTable,
}

impl<'a> SchemaMapper<'a> {
    pub fn new(table: &'a AliasTable) -> Self {
        Self { table }
    }

    /// Map incoming headers onto canonical fields.
    ///
    /// Two phases, both walking fields in declaration order and each
    /// consuming a header for at most one field:
    ///
    /// 1. Exact: case-insensitive equality against the field's aliases,
    ///    aliases scanned in declared order. Exact matches resolve for
    ///    every field before any fallback runs, so a header that is
    ///    exactly some field's alias always maps to that field and can
    ///    never be stolen by an earlier field's substring match.
    /// 2. Substring fallback for the fields left unmatched: containment
    ///    in either direction (alias contains header, or header contains
    ///    alias). Tie-break among a field's candidates: the longest alias
    ///    wins; ties fall back to alias declaration order, then header
    ///    file order. This is a documented policy, pinned by a
    ///    regression test, not an accident of iteration order.
    pub fn map_columns(&self, headers: &[String]) -> ColumnMapping {
        let lowered: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let mut consumed = vec![false; headers.len()];
        let mut matched: Vec<Option<usize>> = vec![None; self.table.entries.len()];

        // Phase 1: exact matches for every field
        for (field_idx, entry) in self.table.entries.iter().enumerate() {
            'exact: for alias in &entry.aliases {
                let alias_lower = alias.trim().to_lowercase();
                for (idx, header) in lowered.iter().enumerate() {
                    if !consumed[idx] && *header == alias_lower {
                        consumed[idx] = true;
                        matched[field_idx] = Some(idx);
                        break 'exact;
                    }
                }
            }
        }

        // Phase 2: substring fallback, longest alias wins
        for (field_idx, entry) in self.table.entries.iter().enumerate() {
            if matched[field_idx].is_some() {
                continue;
            }

            let mut best: Option<(usize, usize)> = None; // (header idx, alias len)
            for alias in &entry.aliases {
                let alias_lower = alias.trim().to_lowercase();
                if alias_lower.is_empty() {
                    continue;
                }
                for (idx, header) in lowered.iter().enumerate() {
                    if consumed[idx] || header.is_empty() {
                        continue;
                    }
                    if alias_lower.contains(header.as_str())
                        || header.contains(alias_lower.as_str())
                    {
                        // strict > keeps the earlier alias/header on ties
                        let better = match best {
                            Some((_, best_len)) => alias_lower.len() > best_len,
                            None => true,
                        };
                        if better {
                            best = Some((idx, alias_lower.len()));
                        }
                    }
                }
            }

            if let Some((idx, _)) = best {
                consumed[idx] = true;
                matched[field_idx] = Some(idx);
            }
        }

        let mut mapping = ColumnMapping::default();
        for (field_idx, entry) in self.table.entries.iter().enumerate() {
            if let Some(idx) = matched[field_idx] {
                mapping
                    .rename_plan
                    .insert(headers[idx].clone(), entry.field.clone());
                mapping.mapped.push(entry.field.clone());
            }
        }
        for (idx, header) in headers.iter().enumerate() {
            if !consumed[idx] {
                mapping.unmapped.push(header.clone());
            }
        }

        mapping
    }
}
