use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XLSX error: {0}")]
    Xlsx(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    Schema(Vec<String>),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    DateFormat(String),

    #[error("File {} not found", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, SpendError>;
