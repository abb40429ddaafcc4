// ==========================================
// Darpan Portal - import configuration
// ==========================================
// Responsibility: alias tables, transaction code table, coercion formats
// and pipeline bounds, bundled into one injectable object.
//
// These used to be module-level constants in the legacy portal; keeping
// them on a config value allows per-tenant or per-record-type overrides
// without shared global state.
// ==========================================

use crate::domain::types::{RecordType, TransactionType};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ==========================================
// AliasTable - canonical field -> accepted source header spellings
// ==========================================
// Entry order is the canonical declaration order and is significant: the
// schema mapper walks entries top to bottom and an earlier field can
// consume a header a later field would also have matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasEntry {
    pub field: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasTable {
    pub entries: Vec<AliasEntry>,
}

impl AliasTable {
    pub fn new(entries: &[(&str, &[&str])]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(field, aliases)| AliasEntry {
                    field: (*field).to_string(),
                    aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==========================================
// TransactionCodeTable - prefix code -> classification
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCodeTable {
    pub codes: Vec<(String, TransactionType)>,
}

impl TransactionCodeTable {
    /// Look up an already-uppercased prefix code
    pub fn lookup(&self, prefix: &str) -> Option<TransactionType> {
        self.codes
            .iter()
            .find(|(code, _)| code == prefix)
            .map(|(_, t)| *t)
    }
}

impl Default for TransactionCodeTable {
    fn default() -> Self {
        Self {
            codes: vec![
                ("FF".to_string(), TransactionType::Sale),
                // Credit note / exchange patterns
                ("7DE".to_string(), TransactionType::Return),
                ("7DR".to_string(), TransactionType::Return),
                ("LB".to_string(), TransactionType::Return),
                ("LE".to_string(), TransactionType::Return),
                ("LU".to_string(), TransactionType::Return),
                // Internal reconciliation entries, must never reach reporting
                ("RI".to_string(), TransactionType::Ignore),
                ("RR".to_string(), TransactionType::Ignore),
            ],
        }
    }
}

// ==========================================
// ImportConfig - everything the pipeline needs injected
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub sales_aliases: AliasTable,
    pub stock_aliases: AliasTable,
    pub contact_aliases: AliasTable,
    pub transaction_codes: TransactionCodeTable,

    /// Calendar formats tried in order by the value coercer
    pub date_formats: Vec<String>,

    /// Physical chunk size inside the single commit transaction
    pub commit_chunk_size: usize,

    /// Warnings returned to the caller (first N)
    pub max_result_warnings: usize,
    /// Errors stored on a ledger entry (first N)
    pub max_ledger_errors: usize,
    /// Column names stored per ledger list (first N)
    pub max_ledger_columns: usize,
}

impl ImportConfig {
    pub fn aliases_for(&self, record_type: RecordType) -> &AliasTable {
        match record_type {
            RecordType::Sales => &self.sales_aliases,
            RecordType::Stock => &self.stock_aliases,
            RecordType::Contacts => &self.contact_aliases,
        }
    }

    /// Load a config override from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sales_aliases: default_sales_aliases(),
            stock_aliases: default_stock_aliases(),
            contact_aliases: default_contact_aliases(),
            transaction_codes: TransactionCodeTable::default(),
            date_formats: vec![
                "%d-%m-%Y".to_string(),
                "%Y-%m-%d".to_string(),
                "%d/%m/%Y".to_string(),
            ],
            commit_chunk_size: 500,
            max_result_warnings: 20,
            max_ledger_errors: 50,
            max_ledger_columns: 50,
        }
    }
}

// Spellings observed across the point-of-sale exports this portal
// receives. The first alias is the exporter's own column name; the rest
// are variants seen from older exporter versions.
fn default_sales_aliases() -> AliasTable {
    AliasTable::new(&[
        ("client_name", &["ClientName"]),
        ("client_mobile", &["ClientMobile"]),
        ("jewel_code", &["JewelCode"]),
        ("style_code", &["StyleCode"]),
        ("base_metal", &["BaseMetal"]),
        ("gross_weight", &["GrossWt"]),
        ("net_weight", &["NetWt"]),
        ("entry_type", &["Stocktype"]),
        ("free_gold_weight", &["Free Gold"]),
        ("solitaire_pieces", &["Solitaire pieces"]),
        ("solitaire_weight", &["Solitaire Weight"]),
        ("total_diamond_pieces", &["TotDiaPc"]),
        ("total_diamond_weight", &["TotDiaWt"]),
        ("color_stone_pieces", &["Colour stone pieces"]),
        ("color_stone_weight", &["Colour stone weight"]),
        ("product_category", &["Product Category"]),
        ("product_subcategory", &["Product Subcategory"]),
        ("collection", &["Collection"]),
        ("quantity", &["Quantity", "Qty"]),
        ("transaction_no", &["TransactionNo", "Txn No", "TxnNo", "Bill No"]),
        ("transaction_date", &["Transaction Date", "Sale Date", "Bill Date", "Date"]),
        ("region", &["Location"]),
        ("sales_person", &["SALES EXU", "Sales Person"]),
        ("discount_amount", &["Discount"]),
        ("gross_amount", &["Original selling price"]),
        ("discount_percentage", &["Discount (Percentage)"]),
        ("discount_amount_alt", &["Discount (Amount)"]),
        ("revenue", &["Gross Amount after discount"]),
        ("gst_amount", &["GST"]),
        ("final_amount", &["Final Amount (with GST)", "Net Amount (with GST)"]),
        ("gross_margin", &["Gross Margin"]),
        ("pan_no", &["PANNO"]),
        ("gst_no", &["GSTNO"]),
        ("item_size", &["Itemsize", "Item Size"]),
    ])
}

fn default_stock_aliases() -> AliasTable {
    AliasTable::new(&[
        ("jewel_code", &["Jewel Code"]),
        ("style_code", &["Style Code"]),
        ("location", &["Location Name", "Location"]),
        ("category", &["Category"]),
        ("sub_category", &["Sub Category"]),
        ("base_metal", &["Base Metal"]),
        ("item_size", &["Item Size"]),
        ("quantity", &["Qty", "Quantity"]),
        ("gross_weight", &["Gross Wt"]),
        ("net_weight", &["Net Wt"]),
        ("pure_weight", &["Pure Wt"]),
        ("diamond_pieces", &["Dia Pcs"]),
        ("diamond_weight", &["Dia Wt"]),
        ("color_stone_pieces", &["CS Pcs"]),
        ("color_stone_weight", &["CS Wt"]),
        ("sale_price", &["Sale Price"]),
        ("snapshot_date", &["Date", "Snapshot Date"]),
        ("stock_month", &["Month"]),
        ("stock_year", &["Year"]),
        ("certificate_no", &["Jewelry CertificateNo", "Certificate No"]),
    ])
}

fn default_contact_aliases() -> AliasTable {
    AliasTable::new(&[
        ("record_id", &["Record Id"]),
        ("store_name", &["Contact Owner"]),
        ("first_name", &["First Name"]),
        ("last_name", &["Last Name"]),
        ("full_name", &["Contact Name", "Full Name"]),
        ("mobile", &["Mobile"]),
        ("phone", &["Phone"]),
        ("email", &["Email"]),
        ("dob", &["Date of Birth", "DOB"]),
        ("anniversary", &["Anniversary Date"]),
        ("lead_source", &["Lead Source"]),
        ("lead_status", &["Lead Status"]),
        ("original_lead_source", &["Original Lead Source"]),
        ("gender", &["Gender"]),
        ("marital_status", &["Marital Status"]),
        ("budget_range", &["Budget Range"]),
        ("interest_category", &["Product Category of Interest"]),
        ("loyalty_points", &["Loyalty Points Available"]),
        ("loyalty_redeemed", &["Loyalty Points Redeemed"]),
        ("loyalty_earned", &["Loyalty Points Earned"]),
        ("last_engagement_date", &["Last Engagement Date_overall"]),
        ("total_signal_score", &["Total Signal Scores"]),
        ("sales_person", &["Sales Person"]),
        ("original_sales_person", &["Original Sales Person"]),
        ("location", &["Location"]),
        ("city", &["Mailing City"]),
        ("state", &["Mailing State"]),
        ("created_time", &["Created Time"]),
        ("modified_time", &["Modified Time"]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_code_table() {
        let table = TransactionCodeTable::default();
        assert_eq!(table.lookup("FF"), Some(TransactionType::Sale));
        assert_eq!(table.lookup("7DE"), Some(TransactionType::Return));
        assert_eq!(table.lookup("RI"), Some(TransactionType::Ignore));
        assert_eq!(table.lookup("ZZ"), None);
    }

    #[test]
    fn test_aliases_for_selects_per_record_type() {
        let config = ImportConfig::default();
        assert!(config
            .aliases_for(RecordType::Sales)
            .entries
            .iter()
            .any(|e| e.field == "final_amount"));
        assert!(config
            .aliases_for(RecordType::Stock)
            .entries
            .iter()
            .any(|e| e.field == "snapshot_date"));
        assert!(config
            .aliases_for(RecordType::Contacts)
            .entries
            .iter()
            .any(|e| e.field == "loyalty_points"));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = ImportConfig::default();
        let raw = serde_json::to_string(&config).unwrap();
        let back: ImportConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.commit_chunk_size, config.commit_chunk_size);
        assert_eq!(back.sales_aliases.entries.len(), config.sales_aliases.entries.len());
    }
}
