// projeto: lstmstocktrain
// file: src/rna/mod.rs

pub mod config;   // Training settings, TOML and CLI
pub mod data;     // CSV loading, sequences and split
pub mod metrics;  // Error metrics and the training report
pub mod model;    // LSTM regressor
pub mod scaler;   // Min-max normalization
pub mod storage;  // Weights, predictions, scaler and report files
pub mod train;    // Training loop, evaluation and the full pipeline
pub mod utils;    // Error type and path helpers

/// Backend RNG is process-global; tests that create models run one at a time.
#[cfg(test)]
pub(crate) fn backend_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
