/// One `final_output` row per receipt item. Dimension attributes are
/// optional: a missing receipt, customer, retailer, or brand reference nulls
/// its columns, it never drops the row.
#[derive(Debug, Clone)]
pub struct FinalRecord {
    pub customer_id: Option<i64>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub education: Option<String>,
    pub state: Option<String>,
    pub retailer_id: Option<i64>,
    pub retailer_type: Option<String>,
    pub receipt_id: i64,
    pub total_price: Option<f64>,
    pub created_at_mst: Option<String>,
    pub receipt_item_id: i64,
    pub primary_category_id: i64,
    pub secondary_category_id: i64,
    pub tertiary_category_id: i64,
    pub brand_name: Option<String>,
    pub global_product_id: i64,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub flag_price_imputed: bool,
    pub flag_qty_imputed: bool,
}
