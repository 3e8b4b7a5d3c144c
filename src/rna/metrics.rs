// projeto: lstmstocktrain
// file: src/rna/metrics.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs: usize,
    pub final_loss: f32,
    pub loss_history: Vec<f32>,
    pub train_samples: usize,
    pub test_samples: usize,
    /// Test MSE in scaled units.
    pub test_loss: f32,
    /// Error metrics on de-normalized closing prices.
    pub test_rmse: f32,
    pub test_mae: f32,
    pub test_mape: f32,
    pub training_time: f64,
    pub timestamp: String,
}

pub fn calculate_mse(predictions: &[f32], targets: &[f32]) -> f32 {
    let n = predictions.len().max(1) as f32;
    predictions.iter().zip(targets).map(|(p, t)| (p - t).powi(2)).sum::<f32>() / n
}

pub fn calculate_rmse(predictions: &[f32], targets: &[f32]) -> f32 {
    calculate_mse(predictions, targets).sqrt()
}

pub fn calculate_mae(predictions: &[f32], targets: &[f32]) -> f32 {
    let n = predictions.len().max(1) as f32;
    predictions.iter().zip(targets).map(|(p, t)| (p - t).abs()).sum::<f32>() / n
}

pub fn calculate_mape(predictions: &[f32], targets: &[f32]) -> f32 {
    let n = predictions.len().max(1) as f32;
    predictions.iter().zip(targets).map(|(p, t)| (p - t).abs() / t.abs().max(1e-8)).sum::<f32>() / n
}
