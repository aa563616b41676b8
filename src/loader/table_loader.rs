use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::error::PipelineError;
use crate::models::{Brand, Customer, Receipt, ReceiptItem, Retailer};

const RECEIPT_ITEM_COLUMNS: &[&str] = &[
    "receipt_item_id",
    "receipt_id",
    "global_product_id",
    "primary_category_id",
    "secondary_category_id",
    "tertiary_category_id",
    "brand_id",
    "retailer_id",
    "price",
    "quantity",
];
const RECEIPT_COLUMNS: &[&str] = &["id", "customer_id", "retailer_id", "total_price", "created_at"];
const CUSTOMER_COLUMNS: &[&str] = &["id", "gender", "birth_date", "education", "state"];
const RETAILER_COLUMNS: &[&str] = &["id", "retailer_type"];
const BRAND_COLUMNS: &[&str] = &["id", "name"];

/// Reads the input tables from JSON array files and converts rows to typed
/// records. A row missing a required column key is a structural violation
/// and aborts the run; a null value in a nullable column is data, not
/// structure, and loads as None.
pub struct TableLoader;

impl TableLoader {
    pub fn load_receipt_items(path: &Path) -> Result<Vec<ReceiptItem>> {
        Self::load_table(path, "receipt_items", RECEIPT_ITEM_COLUMNS)
    }

    pub fn load_receipts(path: &Path) -> Result<Vec<Receipt>> {
        Self::load_table(path, "receipts", RECEIPT_COLUMNS)
    }

    pub fn load_customers(path: &Path) -> Result<Vec<Customer>> {
        let mut customers: Vec<Customer> = Self::load_table(path, "customers", CUSTOMER_COLUMNS)?;
        // Gender arrives as blank strings in the source extracts.
        for customer in &mut customers {
            if customer.gender.as_deref().is_some_and(|g| g.trim().is_empty()) {
                customer.gender = None;
            }
        }
        Ok(customers)
    }

    pub fn load_retailers(path: &Path) -> Result<Vec<Retailer>> {
        Self::load_table(path, "retailers", RETAILER_COLUMNS)
    }

    pub fn load_brands(path: &Path) -> Result<Vec<Brand>> {
        Self::load_table(path, "brands", BRAND_COLUMNS)
    }

    fn load_table<T: DeserializeOwned>(
        path: &Path,
        table: &str,
        required: &[&str],
    ) -> Result<Vec<T>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {} table file: {}", table, path.display()))?;
        let rows: Vec<Value> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {} table file: {}", table, path.display()))?;

        let records = records_from_rows(rows, table, required)?;
        info!("Loaded {} rows from table {}", records.len(), table);
        Ok(records)
    }
}

fn records_from_rows<T: DeserializeOwned>(
    rows: Vec<Value>,
    table: &str,
    required: &[&str],
) -> Result<Vec<T>> {
    validate_columns(&rows, table, required)?;

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row)
                .with_context(|| format!("Row {} of table {} has malformed values", index, table))
        })
        .collect()
}

fn validate_columns(rows: &[Value], table: &str, required: &[&str]) -> Result<(), PipelineError> {
    for (index, row) in rows.iter().enumerate() {
        let object = row.as_object().ok_or_else(|| PipelineError::MalformedRow {
            table: table.to_string(),
            index,
        })?;
        for column in required {
            if !object.contains_key(*column) {
                return Err(PipelineError::SchemaViolation {
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
        }
    }
    Ok(())
}
