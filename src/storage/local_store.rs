use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use polars::prelude::*;
use tracing::info;

use crate::models::FinalRecord;

/// Materializes `final_output` as Parquet under a date-partitioned path in
/// the output directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore { root: root.into() }
    }

    pub fn output_path(&self) -> PathBuf {
        let date = Utc::now().format("%Y/%m/%d").to_string();
        self.root.join("final_output").join(date).join("data.parquet")
    }

    pub fn write_final_output(&self, records: &[FinalRecord]) -> Result<PathBuf> {
        let mut df = final_output_frame(records)?;

        let path = self.output_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }

        let mut file = fs::File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        ParquetWriter::new(&mut file)
            .finish(&mut df)
            .with_context(|| format!("Failed to write Parquet to {}", path.display()))?;

        info!("Stored final_output ({} rows) at: {}", df.height(), path.display());
        Ok(path)
    }
}

/// Builds the `final_output` DataFrame, one column per output field. Columns
/// the left joins can null are nullable; item-level keys never are.
pub fn final_output_frame(records: &[FinalRecord]) -> Result<DataFrame> {
    let r = records;
    let columns: Vec<Column> = vec![
        column("customer_id", r.iter().map(|x| x.customer_id).collect::<Vec<_>>()),
        column("gender", r.iter().map(|x| x.gender.clone()).collect::<Vec<_>>()),
        column("age", r.iter().map(|x| x.age).collect::<Vec<_>>()),
        column("education", r.iter().map(|x| x.education.clone()).collect::<Vec<_>>()),
        column("state", r.iter().map(|x| x.state.clone()).collect::<Vec<_>>()),
        column("retailer_id", r.iter().map(|x| x.retailer_id).collect::<Vec<_>>()),
        column("retailer_type", r.iter().map(|x| x.retailer_type.clone()).collect::<Vec<_>>()),
        column("receipt_id", r.iter().map(|x| x.receipt_id).collect::<Vec<_>>()),
        column("total_price", r.iter().map(|x| x.total_price).collect::<Vec<_>>()),
        column("created_at_mst", r.iter().map(|x| x.created_at_mst.clone()).collect::<Vec<_>>()),
        column("receipt_item_id", r.iter().map(|x| x.receipt_item_id).collect::<Vec<_>>()),
        column("primary_category_id", r.iter().map(|x| x.primary_category_id).collect::<Vec<_>>()),
        column("secondary_category_id", r.iter().map(|x| x.secondary_category_id).collect::<Vec<_>>()),
        column("tertiary_category_id", r.iter().map(|x| x.tertiary_category_id).collect::<Vec<_>>()),
        column("brand_name", r.iter().map(|x| x.brand_name.clone()).collect::<Vec<_>>()),
        column("global_product_id", r.iter().map(|x| x.global_product_id).collect::<Vec<_>>()),
        column("price", r.iter().map(|x| x.price).collect::<Vec<_>>()),
        column("quantity", r.iter().map(|x| x.quantity).collect::<Vec<_>>()),
        column("flag_price_imputed", r.iter().map(|x| x.flag_price_imputed).collect::<Vec<_>>()),
        column("flag_qty_imputed", r.iter().map(|x| x.flag_qty_imputed).collect::<Vec<_>>()),
    ];

    DataFrame::new(columns).map_err(|e| anyhow!("Failed to create final_output DataFrame: {}", e))
}

fn column<T>(name: &str, values: Vec<T>) -> Column
where
    Series: NamedFrom<Vec<T>, [T]>,
{
    Series::new(name.into(), values).into()
}
