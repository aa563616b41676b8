use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfigFile {
    pub tables: TablesSection,
    pub output: OutputSection,
    pub run: Option<RunSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesSection {
    pub receipt_items: PathBuf,
    pub receipts: PathBuf,
    pub customers: PathBuf,
    pub retailers: PathBuf,
    pub brands: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSection {
    // Fixes the date used for age computation; defaults to today.
    pub as_of_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub tables: TablesSection,
    pub output_dir: PathBuf,
    pub as_of_date: Option<NaiveDate>,
}

impl PipelineConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config file: {}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse pipeline config file: {}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config_file: PipelineConfigFile = toml::from_str(content)?;

        let mut config = PipelineConfig {
            tables: config_file.tables,
            output_dir: config_file.output.directory,
            as_of_date: config_file.run.and_then(|r| r.as_of_date),
        };
        config.apply_data_dir_override();
        Ok(config)
    }

    /// Re-roots relative table paths onto PIPELINE_DATA_DIR when it is set,
    /// so the same config file works against different data drops.
    fn apply_data_dir_override(&mut self) {
        if let Ok(root) = env::var("PIPELINE_DATA_DIR") {
            let root = PathBuf::from(root);
            for path in [
                &mut self.tables.receipt_items,
                &mut self.tables.receipts,
                &mut self.tables.customers,
                &mut self.tables.retailers,
                &mut self.tables.brands,
            ] {
                if path.is_relative() {
                    let rerooted = root.join(path.as_path());
                    *path = rerooted;
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Output directory cannot be empty"));
        }

        for (table, path) in [
            ("receipt_items", &self.tables.receipt_items),
            ("receipts", &self.tables.receipts),
            ("customers", &self.tables.customers),
            ("retailers", &self.tables.retailers),
            ("brands", &self.tables.brands),
        ] {
            if path.as_os_str().is_empty() {
                return Err(anyhow::anyhow!("Path for table {} cannot be empty", table));
            }
        }

        Ok(())
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of_date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            tables: TablesSection {
                receipt_items: PathBuf::from("data/receipt_items.json"),
                receipts: PathBuf::from("data/receipts.json"),
                customers: PathBuf::from("data/customers.json"),
                retailers: PathBuf::from("data/retailers.json"),
                brands: PathBuf::from("data/brands.json"),
            },
            output_dir: PathBuf::from("output"),
            as_of_date: None,
        }
    }
}
