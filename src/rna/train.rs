// projeto: lstmstocktrain
// file: src/rna/train.rs
// Full-batch training loop, test-set inference and the end-to-end pipeline.

use burn::{
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{
        ElementConversion,
        backend::{AutodiffBackend, Backend},
    },
};
use chrono::Utc;
use log::{debug, info, warn};
use ndarray::s;
use std::time::Instant;

use crate::rna::config::{FitScope, TrainingConfig};
use crate::rna::data::{
    CLOSE_INDEX, NUM_FEATURES, SCALED_COLUMNS, SequenceSet, build_sequences, feature_matrix, load_records,
    split_sizes, split_train_test,
};
use crate::rna::metrics::{TrainingReport, calculate_mae, calculate_mape, calculate_mse, calculate_rmse};
use crate::rna::model::{LstmRegressor, to_tensors};
use crate::rna::scaler::MinMaxScaler;
use crate::rna::storage::{
    load_predictions, save_loss_plot, save_model, save_predictions, save_report, save_scaler,
};
use crate::rna::utils::TrainingError;

pub const STATUS_MESSAGE: &str = "Training complete! Model and predictions saved to volume.";

#[derive(Debug)]
pub struct PipelineOutcome {
    pub status: String,
    pub predictions: Vec<f32>,
    pub report: TrainingReport,
}

/// Seeds the backend, builds a fresh regressor and runs `config.epochs` full-batch Adam steps.
/// Returns the trained model and the loss of every epoch.
pub fn train_model<B: AutodiffBackend>(
    train: &SequenceSet,
    config: &TrainingConfig,
    device: &B::Device,
) -> Result<(LstmRegressor<B>, Vec<f32>), TrainingError> {
    if train.is_empty() {
        return Err(TrainingError::EmptySplit { train: 0, test: 0 });
    }

    B::seed(config.seed);
    let mut model = LstmRegressor::<B>::new(NUM_FEATURES, config.hidden_size, device);
    let mut optimizer = AdamConfig::new().init();
    let loss_fn = MseLoss::new();
    let (inputs, targets) = to_tensors::<B>(train, device);

    let mut loss_history = Vec::with_capacity(config.epochs);
    for epoch in 0..config.epochs {
        let outputs = model.forward(inputs.clone());
        let loss = loss_fn.forward(outputs, targets.clone(), Reduction::Mean);
        let loss_value = loss.clone().into_scalar().elem::<f32>();
        if !loss_value.is_finite() {
            return Err(TrainingError::Training(format!("loss became {} at epoch {}", loss_value, epoch + 1)));
        }

        let grads = GradientsParams::from_grads(loss.backward(), &model);
        model = optimizer.step(config.learning_rate, model, grads);
        loss_history.push(loss_value);

        if config.log_every > 0 && epoch % config.log_every == 0 {
            info!("Epoch [{}/{}], Loss: {:.4}", epoch + 1, config.epochs, loss_value);
        }
    }

    Ok((model, loss_history))
}

/// One forward pass in inference mode; one value per sequence, in order.
pub fn predict<B: Backend>(
    model: &LstmRegressor<B>,
    set: &SequenceSet,
    device: &B::Device,
) -> Result<Vec<f32>, TrainingError> {
    if set.is_empty() {
        return Ok(Vec::new());
    }
    let (inputs, _) = to_tensors::<B>(set, device);
    model
        .forward(inputs)
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| TrainingError::Training(format!("cannot read predictions: {:?}", e)))
}

/// load → normalize → window → split → train → save weights → predict → save predictions.
pub fn run_pipeline<B: AutodiffBackend>(
    config: &TrainingConfig,
    device: &B::Device,
) -> Result<PipelineOutcome, TrainingError> {
    let start_time = Instant::now();
    config.validate()?;

    let records = load_records(&config.data_path)?;
    let mut table = feature_matrix(&records);
    let rows = table.nrows();
    if rows <= config.seq_length {
        return Err(TrainingError::InsufficientData { required: config.seq_length + 1, actual: rows });
    }

    let (train_count, test_count) = split_sizes(rows - config.seq_length, config.test_fraction)?;
    let fit_rows = match config.fit_scope {
        FitScope::Full => {
            warn!("⚠️ Scaler fitted on all {} rows; test-period ranges leak into training", rows);
            rows
        }
        FitScope::TrainOnly => train_count + config.seq_length,
    };
    let scaler = MinMaxScaler::fit(table.slice(s![..fit_rows, ..]), &SCALED_COLUMNS)?;
    scaler.transform(&mut table);

    let sequences = build_sequences(&table, config.seq_length)?;
    let split = split_train_test(&sequences, config.test_fraction)?;
    debug_assert_eq!(split.test.len(), test_count);
    info!(
        "🧠 Training: {} samples, Test: {} samples, window {} x {} features",
        split.train.len(),
        split.test.len(),
        config.seq_length,
        NUM_FEATURES
    );
    info!(
        "🏗️ Model: LSTM({} → {}) + Linear({} → 1), {} epochs, lr {}",
        NUM_FEATURES, config.hidden_size, config.hidden_size, config.epochs, config.learning_rate
    );

    let (model, loss_history) = train_model::<B>(&split.train, config, device)?;
    save_model(&model, &config.model_path)?;
    save_scaler(&config.model_path, &scaler)?;

    let model = model.valid();
    let predictions = predict(&model, &split.test, device)?;
    save_predictions(&config.predictions_path, &predictions)?;

    let saved = load_predictions(&config.predictions_path)?;
    if saved.len() != split.test.len() {
        return Err(TrainingError::Persistence(format!(
            "predictions file holds {} values, expected {}",
            saved.len(),
            split.test.len()
        )));
    }
    debug!("Predictions: {:?}", saved);

    let prices = scaler.inverse_column(CLOSE_INDEX, &predictions);
    let actual = scaler.inverse_column(CLOSE_INDEX, &split.test.labels);
    let report = TrainingReport {
        epochs: config.epochs,
        final_loss: loss_history.last().copied().unwrap_or_default(),
        loss_history,
        train_samples: split.train.len(),
        test_samples: split.test.len(),
        test_loss: calculate_mse(&predictions, &split.test.labels),
        test_rmse: calculate_rmse(&prices, &actual),
        test_mae: calculate_mae(&prices, &actual),
        test_mape: calculate_mape(&prices, &actual),
        training_time: start_time.elapsed().as_secs_f64(),
        timestamp: Utc::now().to_rfc3339(),
    };
    save_report(&config.model_path, &report)?;
    if let Some(path) = &config.loss_plot_path {
        save_loss_plot(path, &report.loss_history)?;
    }

    info!("✅ Final train loss: {:.6}, test loss: {:.6}", report.final_loss, report.test_loss);
    info!(
        "📏 Test RMSE: {:.4}, MAE: {:.4}, MAPE: {:.2}%",
        report.test_rmse,
        report.test_mae,
        report.test_mape * 100.0
    );
    info!("⏱️ Pipeline time: {:.1}s", report.training_time);

    Ok(PipelineOutcome { status: STATUS_MESSAGE.to_string(), predictions, report })
}
