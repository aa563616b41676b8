use anyhow::{Context, Result};
use receipt_pipeline::config::PipelineConfig;
use receipt_pipeline::loader::TableLoader;
use receipt_pipeline::processor::{Assembler, ItemImputer, ReceiptImputer};
use receipt_pipeline::storage::LocalStore;
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "src/configs/pipeline.toml".to_string());

    info!("🚀 Starting receipt imputation pipeline (config: {})", config_path);

    let config = PipelineConfig::from_file(&config_path)
        .context("Failed to load pipeline configuration")?;
    config.validate()?;

    // Schema violations in any table abort here, before any imputation runs.
    let items = TableLoader::load_receipt_items(&config.tables.receipt_items)?;
    let receipts = TableLoader::load_receipts(&config.tables.receipts)?;
    let customers = TableLoader::load_customers(&config.tables.customers)?;
    let retailers = TableLoader::load_retailers(&config.tables.retailers)?;
    let brands = TableLoader::load_brands(&config.tables.brands)?;

    info!(
        "Loaded {} receipt items, {} receipts, {} customers, {} retailers, {} brands",
        items.len(),
        receipts.len(),
        customers.len(),
        retailers.len(),
        brands.len()
    );

    // The item and receipt stages read disjoint tables, so they run side by
    // side; assembly needs both and waits on the join.
    let item_stage = tokio::task::spawn_blocking(move || {
        let imputer = ItemImputer::from_items(&items);
        imputer.impute_all(&items)
    });
    let receipt_stage = tokio::task::spawn_blocking(move || {
        let imputer = ReceiptImputer::from_receipts(&receipts);
        imputer.impute_all(&receipts)
    });

    let (imputed_items, imputed_receipts) = tokio::try_join!(item_stage, receipt_stage)
        .context("Imputation stage failed")?;

    let as_of = config.as_of();
    info!("Assembling final_output (ages as of {})", as_of);

    let assembler = Assembler::new(imputed_receipts, customers, retailers, brands, as_of);
    let final_records = assembler.assemble(&imputed_items);

    let store = LocalStore::new(&config.output_dir);
    let output_path = store.write_final_output(&final_records)?;

    info!(
        "🎉 Pipeline completed: {} rows written to {}",
        final_records.len(),
        output_path.display()
    );

    Ok(())
}
