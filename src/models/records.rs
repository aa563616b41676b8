use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One line of a receipt. Price and quantity come in dirty: either may be
/// null or zero, which the imputation stage treats as missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub receipt_item_id: i64,
    pub receipt_id: i64,
    pub global_product_id: i64,
    pub primary_category_id: i64,
    pub secondary_category_id: i64,
    pub tertiary_category_id: i64,
    pub brand_id: i64,
    pub retailer_id: i64,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
}

/// One transaction, belonging to exactly one customer and one retailer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    pub customer_id: i64,
    pub retailer_id: i64,
    pub total_price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub gender: Option<String>,
    pub birth_date: NaiveDate,
    pub education: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retailer {
    pub id: i64,
    pub retailer_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
}
