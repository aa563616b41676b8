use chrono::{DateTime, Utc};

/// A numeric field after cascade resolution: the raw source value, the
/// resolved value, and whether resolution had to impute. `value` stays None
/// when every fallback level including the table statistic was unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedField<T> {
    pub raw: Option<T>,
    pub value: Option<T>,
    pub imputed: bool,
}

/// A receipt item with price and quantity resolved through the cascade.
#[derive(Debug, Clone)]
pub struct ImputedItem {
    pub receipt_item_id: i64,
    pub receipt_id: i64,
    pub global_product_id: i64,
    pub primary_category_id: i64,
    pub secondary_category_id: i64,
    pub tertiary_category_id: i64,
    pub brand_id: i64,
    pub retailer_id: i64,
    pub price: ImputedField<f64>,
    pub quantity: ImputedField<i64>,
}

/// A receipt with its total price resolved through the cascade.
#[derive(Debug, Clone)]
pub struct ImputedReceipt {
    pub id: i64,
    pub customer_id: i64,
    pub retailer_id: i64,
    pub total_price: ImputedField<f64>,
    pub created_at: DateTime<Utc>,
}
