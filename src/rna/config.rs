// projeto: lstmstocktrain
// file: src/rna/config.rs
// Training settings: defaults, optional TOML file, CLI overrides.

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::rna::utils::TrainingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Wgpu,
    Cpu,
}

/// Which rows the min-max scaler is fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum FitScope {
    /// Whole table, train and test together.
    #[serde(rename = "full")]
    #[value(name = "full")]
    Full,
    /// Only the rows the training windows and labels touch.
    #[serde(rename = "train")]
    #[value(name = "train")]
    TrainOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub predictions_path: PathBuf,
    pub loss_plot_path: Option<PathBuf>,
    pub seq_length: usize,
    pub hidden_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub test_fraction: f64,
    pub log_every: usize,
    pub seed: u64,
    pub fit_scope: FitScope,
    pub device: DeviceKind,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("/data/AAPL_30_years.csv"),
            model_path: PathBuf::from("/data/lstm_model"),
            predictions_path: PathBuf::from("/data/predictions.json"),
            loss_plot_path: None,
            seq_length: 60,
            hidden_size: 64,
            epochs: 50,
            learning_rate: 0.001,
            test_fraction: 0.2,
            log_every: 10,
            seed: 42,
            fit_scope: FitScope::Full,
            device: DeviceKind::Wgpu,
        }
    }
}

impl TrainingConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, TrainingError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TrainingError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, TrainingError> {
        toml::from_str(text).map_err(|e| TrainingError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.seq_length == 0 {
            return Err(TrainingError::Config("seq_length must be at least 1".into()));
        }
        if self.hidden_size == 0 {
            return Err(TrainingError::Config("hidden_size must be at least 1".into()));
        }
        if self.epochs == 0 {
            return Err(TrainingError::Config("epochs must be at least 1".into()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(TrainingError::Config(format!("learning_rate must be positive, got {}", self.learning_rate)));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(TrainingError::Config(format!("test_fraction must be in (0, 1), got {}", self.test_fraction)));
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Default)]
#[command(name = "lstm", about = "LSTM closing-price model trained on price, sentiment and economic features", version)]
pub struct Cli {
    #[arg(long, help = "TOML file with training settings")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Input CSV")]
    pub data_path: Option<PathBuf>,
    #[arg(long, help = "Model weights output (recorder adds .mpk)")]
    pub model_path: Option<PathBuf>,
    #[arg(long, help = "Test predictions output (JSON)")]
    pub predictions_path: Option<PathBuf>,
    #[arg(long, help = "Write a loss curve as HTML")]
    pub loss_plot_path: Option<PathBuf>,
    #[arg(long, help = "Sequence length")]
    pub seq_length: Option<usize>,
    #[arg(long, help = "Hidden layer size")]
    pub hidden_size: Option<usize>,
    #[arg(long, help = "Training epochs")]
    pub epochs: Option<usize>,
    #[arg(long, help = "Adam learning rate")]
    pub learning_rate: Option<f64>,
    #[arg(long, help = "Fraction of sequences held out for testing")]
    pub test_fraction: Option<f64>,
    #[arg(long, help = "Log the loss every N epochs")]
    pub log_every: Option<usize>,
    #[arg(long, help = "Backend RNG seed")]
    pub seed: Option<u64>,
    #[arg(long, value_enum, help = "Rows used to fit the scaler")]
    pub fit_scope: Option<FitScope>,
    #[arg(long, value_enum, help = "Tensor backend")]
    pub device: Option<DeviceKind>,
}

impl Cli {
    /// Defaults, then the TOML file if given, then any flag set on the command line.
    pub fn resolve(&self) -> Result<TrainingConfig, TrainingError> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::from_toml_file(path)?,
            None => TrainingConfig::default(),
        };

        if let Some(v) = &self.data_path { config.data_path = v.clone(); }
        if let Some(v) = &self.model_path { config.model_path = v.clone(); }
        if let Some(v) = &self.predictions_path { config.predictions_path = v.clone(); }
        if let Some(v) = &self.loss_plot_path { config.loss_plot_path = Some(v.clone()); }
        if let Some(v) = self.seq_length { config.seq_length = v; }
        if let Some(v) = self.hidden_size { config.hidden_size = v; }
        if let Some(v) = self.epochs { config.epochs = v; }
        if let Some(v) = self.learning_rate { config.learning_rate = v; }
        if let Some(v) = self.test_fraction { config.test_fraction = v; }
        if let Some(v) = self.log_every { config.log_every = v; }
        if let Some(v) = self.seed { config.seed = v; }
        if let Some(v) = self.fit_scope { config.fit_scope = v; }
        if let Some(v) = self.device { config.device = v; }

        config.validate()?;
        Ok(config)
    }
}
