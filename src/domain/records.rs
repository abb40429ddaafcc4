// ==========================================
// Darpan Portal - canonical import records
// ==========================================
// One struct per record family. Every instance is scoped to exactly one
// tenant (company_id) at construction time; the import pipeline writes
// these, the reporting layer reads them.
// ==========================================

use crate::domain::types::TransactionType;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// SalesRecord - one sales/return transaction line
// ==========================================
// transaction_type is derived from the transaction number prefix; for
// returns, final_amount and gross_margin are stored sign-corrected
// (always negative).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRecord {
    // ===== Tenant scope =====
    pub company_id: String,

    // ===== Core transaction fields =====
    pub transaction_no: String,
    pub transaction_date: NaiveDate,
    pub transaction_type: TransactionType,

    // ===== Client details =====
    pub client_name: String,
    pub client_mobile: String,
    pub pan_no: Option<String>,
    pub gst_no: Option<String>,

    // ===== Product details =====
    pub jewel_code: String,
    pub style_code: String,
    pub product_category: String,
    pub product_subcategory: String,
    pub collection: String,
    pub base_metal: String,

    // ===== Weights and piece counts =====
    pub gross_weight: Decimal,
    pub net_weight: Decimal,
    pub free_gold_weight: Decimal,
    pub solitaire_pieces: i64,
    pub solitaire_weight: Decimal,
    pub total_diamond_pieces: i64,
    pub total_diamond_weight: Decimal,
    pub color_stone_pieces: i64,
    pub color_stone_weight: Decimal,

    // ===== Amounts =====
    pub quantity: i64, // never 0; a missing or zero quantity becomes 1
    pub gross_amount: Decimal,
    pub discount_amount: Decimal,
    pub discount_percentage: Decimal,
    pub gst_amount: Decimal,
    pub final_amount: Decimal,  // sign-corrected for returns
    pub gross_margin: Decimal,  // sign-corrected for returns

    // ===== Attribution =====
    pub region: String,
    pub sales_person: String,
    pub entry_type: String,

    // ===== Audit =====
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// StockSnapshot - one inventory line at a point in time
// ==========================================
// style_code is the only hard requirement; snapshot_date is carried
// forward across rows from the most recent parseable date column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub company_id: String,

    pub jewel_code: String,
    pub style_code: String,
    pub location: String,

    pub category: String,
    pub sub_category: String,
    pub base_metal: String,
    pub item_size: String,
    pub certificate_no: String,

    // Opening stock period, e.g. "Oct" / 2024
    pub stock_month: String,
    pub stock_year: Option<i64>,

    pub quantity: i64,
    pub gross_weight: Decimal,
    pub net_weight: Decimal,
    pub pure_weight: Decimal,
    pub diamond_pieces: i64,
    pub diamond_weight: Decimal,
    pub color_stone_pieces: i64,
    pub color_stone_weight: Decimal,
    pub sale_price: Decimal,

    pub snapshot_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// CrmContact - one imported CRM contact
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmContact {
    pub company_id: String,

    pub record_id: String,
    pub full_name: String, // falls back to "first last" when the source omits it
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub phone: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub anniversary: Option<NaiveDate>,

    pub store_name: String,
    pub location: String,
    pub city: String,
    pub state: String,

    pub lead_source: String,
    pub lead_status: String,
    pub original_lead_source: String,
    pub gender: String,
    pub marital_status: String,
    pub budget_range: String,
    pub interest_category: String,

    pub loyalty_points: i64,
    pub loyalty_redeemed: i64,
    pub loyalty_earned: i64,
    pub last_engagement_date: Option<NaiveDate>,
    pub total_signal_score: Decimal,

    pub sales_person: String,
    pub original_sales_person: String,

    pub created_at: DateTime<Utc>,
}
