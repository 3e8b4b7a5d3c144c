// projeto: lstmstocktrain
// file: src/rna/utils.rs
// Error type and small helpers shared by the pipeline stages.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("Data loading error: {0}")]
    DataLoad(String),

    #[error("Degenerate column '{column}': min equals max, cannot scale")]
    DegenerateColumn { column: String },

    #[error("Insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Empty split: {train} training and {test} test sequences")]
    EmptySplit { train: usize, test: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Appends `suffix` to the full file name, e.g. `lstm_model` -> `lstm_model.scaler.json`.
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

pub fn ensure_parent_dir(path: &Path) -> Result<(), TrainingError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lstmstocktrain-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
