// projeto: lstmstocktrain
// file: src/main.rs
#![recursion_limit = "256"]

mod rna;

use burn::backend::{
    Autodiff, NdArray, Wgpu,
    ndarray::NdArrayDevice,
    wgpu::WgpuDevice,
};
use clap::Parser;
use log::{error, info};
use rna::config::{Cli, DeviceKind};
use rna::train::run_pipeline;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve().map_err(|e| {
        error!("Invalid configuration: {}", e);
        Box::new(e) as Box<dyn std::error::Error>
    })?;

    info!("Starting LSTM training with parameters:");
    info!("  Data: {}", config.data_path.display());
    info!("  Sequence Length: {}", config.seq_length);
    info!("  Hidden Size: {}", config.hidden_size);
    info!("  Learning Rate: {}", config.learning_rate);
    info!("  Epochs: {}", config.epochs);
    info!("  Scaler Fit: {:?}", config.fit_scope);
    info!("  Device: {:?}", config.device);

    let outcome = match config.device {
        DeviceKind::Wgpu => run_pipeline::<Autodiff<Wgpu>>(&config, &WgpuDevice::default()),
        DeviceKind::Cpu => run_pipeline::<Autodiff<NdArray>>(&config, &NdArrayDevice::Cpu),
    }
    .map_err(|e| {
        error!("Training failed: {}", e);
        Box::new(e) as Box<dyn std::error::Error>
    })?;

    info!(
        "🔮 {} test predictions, test RMSE {:.4}",
        outcome.predictions.len(),
        outcome.report.test_rmse
    );
    println!("{}", outcome.status);
    Ok(())
}

// cargo run --release -- --data-path /data/AAPL_30_years.csv
// cargo run --release -- --device cpu --fit-scope train --loss-plot-path /data/loss.html
// cargo run --release -- --config train.toml --epochs 100
