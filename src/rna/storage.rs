// projeto: lstmstocktrain
// file: src/rna/storage.rs
// Writes and reads the pipeline outputs. Every write overwrites the previous file.

use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    tensor::backend::Backend,
};
use log::info;
use plotly::{Plot, Scatter, common::Mode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::rna::metrics::TrainingReport;
use crate::rna::model::LstmRegressor;
use crate::rna::scaler::MinMaxScaler;
use crate::rna::utils::{TrainingError, ensure_parent_dir, sibling_path};

type ModelRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// File the recorder actually writes for `model_path`.
pub fn model_file(model_path: &Path) -> PathBuf {
    sibling_path(model_path, ".mpk")
}

pub fn scaler_file(model_path: &Path) -> PathBuf {
    sibling_path(model_path, ".scaler.json")
}

pub fn report_file(model_path: &Path) -> PathBuf {
    sibling_path(model_path, ".report.json")
}

pub fn save_model<B: Backend>(model: &LstmRegressor<B>, model_path: &Path) -> Result<(), TrainingError> {
    ensure_parent_dir(model_path)?;
    model
        .clone()
        .save_file(model_path.to_path_buf(), &ModelRecorder::new())
        .map_err(|e| TrainingError::Persistence(format!("failed to save model to {}: {:?}", model_path.display(), e)))?;
    info!("💾 Model weights saved to {}", model_file(model_path).display());
    Ok(())
}

/// Loads weights saved by [`save_model`] into a freshly shaped regressor.
#[allow(dead_code)]
pub fn load_model<B: Backend>(
    model_path: &Path,
    input_size: usize,
    hidden_size: usize,
    device: &B::Device,
) -> Result<LstmRegressor<B>, TrainingError> {
    LstmRegressor::<B>::new(input_size, hidden_size, device)
        .load_file(model_path.to_path_buf(), &ModelRecorder::new(), device)
        .map_err(|e| TrainingError::Persistence(format!("failed to load model from {}: {:?}", model_path.display(), e)))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), TrainingError> {
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, TrainingError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn save_predictions(path: &Path, predictions: &[f32]) -> Result<(), TrainingError> {
    write_json(path, predictions)?;
    info!("💾 {} predictions saved to {}", predictions.len(), path.display());
    Ok(())
}

pub fn load_predictions(path: &Path) -> Result<Vec<f32>, TrainingError> {
    read_json(path)
}

pub fn save_scaler(model_path: &Path, scaler: &MinMaxScaler) -> Result<(), TrainingError> {
    write_json(&scaler_file(model_path), scaler)
}

#[allow(dead_code)]
pub fn load_scaler(model_path: &Path) -> Result<MinMaxScaler, TrainingError> {
    read_json(&scaler_file(model_path))
}

pub fn save_report(model_path: &Path, report: &TrainingReport) -> Result<(), TrainingError> {
    write_json(&report_file(model_path), report)
}

pub fn save_loss_plot(path: &Path, losses: &[f32]) -> Result<(), TrainingError> {
    ensure_parent_dir(path)?;
    let epochs: Vec<usize> = (1..=losses.len()).collect();
    let trace = Scatter::new(epochs, losses.to_vec())
        .name("Training Loss (MSE)")
        .mode(Mode::Lines);

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.write_html(path);
    info!("📈 Loss curve written to {}", path.display());
    Ok(())
}
