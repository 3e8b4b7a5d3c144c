// projeto: lstmstocktrain
// file: src/rna/data.rs
// CSV loading, feature matrix, sliding-window sequences and the train/test split.

use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use ndarray::{Array2, s};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rna::utils::TrainingError;

/// Feature order inside every sequence row.
pub const FEATURE_COLUMNS: [&str; 7] = [
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
    "News_Sentiment",
    "Economic Health",
];

/// Columns rescaled by the min-max scaler (everything but `News_Sentiment`).
pub const SCALED_COLUMNS: [usize; 6] = [0, 1, 2, 3, 4, 6];

pub const CLOSE_INDEX: usize = 3;

pub const NUM_FEATURES: usize = FEATURE_COLUMNS.len();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Open")]
    pub open: f32,
    #[serde(rename = "High")]
    pub high: f32,
    #[serde(rename = "Low")]
    pub low: f32,
    #[serde(rename = "Close")]
    pub close: f32,
    #[serde(rename = "Volume")]
    pub volume: f32,
    #[serde(rename = "News_Sentiment")]
    pub news_sentiment: f32,
    #[serde(rename = "Economic Health")]
    pub economic_health: f32,
}

impl MarketRecord {
    pub fn features(&self) -> [f32; NUM_FEATURES] {
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.news_sentiment,
            self.economic_health,
        ]
    }
}

pub fn load_records(path: &Path) -> Result<Vec<MarketRecord>, TrainingError> {
    info!("📥 Loading market data from {}", path.display());
    let file = std::fs::File::open(path)
        .map_err(|e| TrainingError::DataLoad(format!("cannot open {}: {}", path.display(), e)))?;
    read_records(file)
}

pub fn read_records<R: std::io::Read>(reader: R) -> Result<Vec<MarketRecord>, TrainingError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| TrainingError::DataLoad(format!("cannot read header row: {}", e)))?
        .clone();
    for column in FEATURE_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(TrainingError::DataLoad(format!("missing column '{}'", column)));
        }
    }

    let mut records = Vec::new();
    for (i, result) in rdr.deserialize::<MarketRecord>().enumerate() {
        // +2: one for the header row, one because rows are 1-based in editors
        let record = result.map_err(|e| TrainingError::DataLoad(format!("row {}: {}", i + 2, e)))?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(TrainingError::DataLoad("file has a header but no rows".into()));
    }
    info!("📊 Loaded {} records", records.len());
    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        if let (Some(from), Some(to)) = (&first.date, &last.date) {
            info!("📅 Range: {} → {}", from, to);
        }
    }
    Ok(records)
}

/// `[rows, 7]` matrix in `FEATURE_COLUMNS` order.
pub fn feature_matrix(records: &[MarketRecord]) -> Array2<f32> {
    let mut matrix = Array2::zeros((records.len(), NUM_FEATURES));
    for (mut row, record) in matrix.rows_mut().into_iter().zip(records) {
        for (cell, value) in row.iter_mut().zip(record.features()) {
            *cell = value;
        }
    }
    matrix
}

/// Windows of `seq_length` rows paired with the `Close` of the row after each window.
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    pub sequences: Vec<Array2<f32>>,
    pub labels: Vec<f32>,
    /// Table row each label was taken from.
    pub label_rows: Vec<usize>,
}

impl SequenceSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn seq_length(&self) -> usize {
        self.sequences.first().map_or(0, |s| s.nrows())
    }

    /// Row-major `[len, seq_length, 7]` buffer for building a tensor.
    pub fn flat_features(&self) -> Vec<f32> {
        self.sequences.iter().flat_map(|s| s.iter().copied()).collect()
    }

    fn slice(&self, range: std::ops::Range<usize>) -> SequenceSet {
        SequenceSet {
            sequences: self.sequences[range.clone()].to_vec(),
            labels: self.labels[range.clone()].to_vec(),
            label_rows: self.label_rows[range].to_vec(),
        }
    }
}

pub fn build_sequences(table: &Array2<f32>, seq_length: usize) -> Result<SequenceSet, TrainingError> {
    let rows = table.nrows();
    if rows <= seq_length {
        return Err(TrainingError::InsufficientData { required: seq_length + 1, actual: rows });
    }

    let count = rows - seq_length;
    let mut set = SequenceSet {
        sequences: Vec::with_capacity(count),
        labels: Vec::with_capacity(count),
        label_rows: Vec::with_capacity(count),
    };
    for i in 0..count {
        set.sequences.push(table.slice(s![i..i + seq_length, ..]).to_owned());
        set.labels.push(table[[i + seq_length, CLOSE_INDEX]]);
        set.label_rows.push(i + seq_length);
    }

    debug!("Built {} sequences of {} rows x {} features", count, seq_length, NUM_FEATURES);
    Ok(set)
}

/// `(train, test)` sizes; test takes `ceil(total * test_fraction)`.
pub fn split_sizes(total: usize, test_fraction: f64) -> Result<(usize, usize), TrainingError> {
    let test = ((total as f64 * test_fraction).ceil() as usize).min(total);
    let train = total - test;
    if train == 0 || test == 0 {
        return Err(TrainingError::EmptySplit { train, test });
    }
    Ok((train, test))
}

#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: SequenceSet,
    pub test: SequenceSet,
}

/// Positional split, earliest sequences go to training.
pub fn split_train_test(set: &SequenceSet, test_fraction: f64) -> Result<DatasetSplit, TrainingError> {
    let (train, _test) = split_sizes(set.len(), test_fraction)?;
    Ok(DatasetSplit {
        train: set.slice(0..train),
        test: set.slice(train..set.len()),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// CSV text with `rows` days of slowly trending prices.
    pub(crate) fn synthetic_csv(rows: usize) -> String {
        let mut text = String::from("Date,Open,High,Low,Close,Volume,News_Sentiment,Economic Health\n");
        for i in 0..rows {
            let base = 100.0 + i as f32 * 0.5 + (i as f32 * 0.3).sin() * 2.0;
            text.push_str(&format!(
                "2020-01-{:03},{:.3},{:.3},{:.3},{:.3},{},{:.3},{:.3}\n",
                i + 1,
                base,
                base + 1.5,
                base - 1.5,
                base + 0.25,
                1_000_000 + (i % 7) * 25_000,
                (i as f32 * 0.7).cos() * 0.5,
                50.0 + (i % 11) as f32,
            ));
        }
        text
    }

    fn index_table(rows: usize) -> Array2<f32> {
        Array2::from_shape_fn((rows, NUM_FEATURES), |(r, c)| (r * 10 + c) as f32)
    }

    #[test]
    fn test_read_records_by_header_name() {
        let csv = "Economic Health,Close,Open,High,Low,Volume,News_Sentiment,Extra\n\
                   7,4,1,2,3,5,6,ignored\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].features(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(records[0].date, None);
    }

    #[test]
    fn test_missing_column_is_data_load_error() {
        let csv = "Open,High,Low,Close,Volume,News_Sentiment\n1,2,3,4,5,6\n";
        match read_records(csv.as_bytes()) {
            Err(TrainingError::DataLoad(msg)) => assert!(msg.contains("Economic Health")),
            other => panic!("expected DataLoad error, got {:?}", other),
        }
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let csv = "open,High,Low,Close,Volume,News_Sentiment,Economic Health\n1,2,3,4,5,6,7\n";
        assert!(matches!(read_records(csv.as_bytes()), Err(TrainingError::DataLoad(_))));
    }

    #[test]
    fn test_non_numeric_cell_reports_row() {
        let csv = "Open,High,Low,Close,Volume,News_Sentiment,Economic Health\n1,2,3,4,5,6,7\n1,2,x,4,5,6,7\n";
        match read_records(csv.as_bytes()) {
            Err(TrainingError::DataLoad(msg)) => assert!(msg.starts_with("row 3")),
            other => panic!("expected DataLoad error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        let err = load_records(Path::new("/nonexistent/prices.csv")).unwrap_err();
        assert!(matches!(err, TrainingError::DataLoad(_)));
    }

    #[test]
    fn test_header_only_file_is_rejected() {
        let csv = "Open,High,Low,Close,Volume,News_Sentiment,Economic Health\n";
        assert!(matches!(read_records(csv.as_bytes()), Err(TrainingError::DataLoad(_))));
    }

    #[test]
    fn test_feature_matrix_order() {
        let records = read_records(synthetic_csv(3).as_bytes()).unwrap();
        let matrix = feature_matrix(&records);
        assert_eq!(matrix.dim(), (3, NUM_FEATURES));
        assert_eq!(matrix[[2, CLOSE_INDEX]], records[2].close);
        assert_eq!(matrix[[1, 6]], records[1].economic_health);
    }

    #[test]
    fn test_sequence_count_and_label_alignment() {
        let table = index_table(25);
        let set = build_sequences(&table, 5).unwrap();
        assert_eq!(set.len(), 20);
        assert_eq!(set.seq_length(), 5);
        for (i, seq) in set.sequences.iter().enumerate() {
            let last_row = (seq[[4, 0]] / 10.0) as usize;
            assert_eq!(last_row + 1, set.label_rows[i]);
            assert_eq!(set.labels[i], table[[set.label_rows[i], CLOSE_INDEX]]);
        }
    }

    #[test]
    fn test_too_few_rows_is_insufficient_data() {
        let table = index_table(60);
        match build_sequences(&table, 60) {
            Err(TrainingError::InsufficientData { required, actual }) => {
                assert_eq!(required, 61);
                assert_eq!(actual, 60);
            }
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn test_hundred_rows_window_sixty() {
        let set = build_sequences(&index_table(100), 60).unwrap();
        assert_eq!(set.len(), 40);
        let split = split_train_test(&set, 0.2).unwrap();
        assert_eq!(split.train.len(), 32);
        assert_eq!(split.test.len(), 8);
    }

    #[test]
    fn test_split_preserves_order() {
        let set = build_sequences(&index_table(57), 6).unwrap();
        let split = split_train_test(&set, 0.2).unwrap();
        assert_eq!(split.train.len() + split.test.len(), set.len());
        assert!(split.train.label_rows.last().unwrap() < split.test.label_rows.first().unwrap());
        assert_eq!(split.test.labels, set.labels[split.train.len()..].to_vec());
    }

    #[test]
    fn test_empty_split_is_error() {
        assert!(matches!(split_sizes(1, 0.2), Err(TrainingError::EmptySplit { train: 0, test: 1 })));
        assert!(matches!(split_sizes(0, 0.2), Err(TrainingError::EmptySplit { .. })));
        assert_eq!(split_sizes(41, 0.2).unwrap(), (32, 9));
    }

    #[test]
    fn test_flat_features_layout() {
        let set = build_sequences(&index_table(4), 2).unwrap();
        let flat = set.flat_features();
        assert_eq!(flat.len(), 2 * 2 * NUM_FEATURES);
        // second sequence starts at table row 1
        assert_eq!(flat[2 * NUM_FEATURES], 10.0);
    }
}
