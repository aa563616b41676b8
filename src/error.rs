use thiserror::Error;

/// Hard failures that abort a pipeline run before any output is produced.
/// Row-local conditions (unresolvable imputations, missing reference rows)
/// are not errors; they surface as null fields and warning counts.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("table {table} is missing required column {column}")]
    SchemaViolation { table: String, column: String },

    #[error("table {table} row {index} is not a JSON object")]
    MalformedRow { table: String, index: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
