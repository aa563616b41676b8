//! Imputation pipeline for noisy retail transaction data: robust per-table
//! statistics, a priority-ordered fallback cascade for missing prices and
//! quantities, and assembly of the denormalized `final_output` table.

pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod processor;
pub mod storage;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use loader::TableLoader;
pub use models::{
    Brand, Customer, FinalRecord, ImputedField, ImputedItem, ImputedReceipt, Receipt, ReceiptItem,
    Retailer,
};
pub use processor::{Assembler, FallbackLevel, ItemImputer, ReceiptImputer, Resolution};
pub use storage::LocalStore;
