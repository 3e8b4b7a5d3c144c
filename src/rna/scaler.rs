// projeto: lstmstocktrain
// file: src/rna/scaler.rs
// Per-column min-max scaling into [0, 1].

use log::info;
use ndarray::{Array2, ArrayView2, Axis};
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};

use crate::rna::data::FEATURE_COLUMNS;
use crate::rna::utils::TrainingError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub name: String,
    pub index: usize,
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub columns: Vec<ColumnRange>,
    /// Number of leading rows the ranges were computed from.
    pub fitted_rows: usize,
}

impl MinMaxScaler {
    /// Fits `columns` of `table`. A constant or non-finite column cannot be scaled.
    pub fn fit(table: ArrayView2<f32>, columns: &[usize]) -> Result<Self, TrainingError> {
        let mut ranges = Vec::with_capacity(columns.len());
        for &index in columns {
            let name = FEATURE_COLUMNS.get(index).map_or_else(|| format!("column {}", index), |n| n.to_string());
            let column = table.index_axis(Axis(1), index);
            let (min, max) = match (column.min(), column.max()) {
                (Ok(min), Ok(max)) => (*min, *max),
                _ => return Err(TrainingError::DegenerateColumn { column: name }),
            };
            if !min.is_finite() || !max.is_finite() || max == min {
                return Err(TrainingError::DegenerateColumn { column: name });
            }
            info!("📊 {} range: [{:.4}, {:.4}]", name, min, max);
            ranges.push(ColumnRange { name, index, min, max });
        }
        Ok(Self { columns: ranges, fitted_rows: table.nrows() })
    }

    pub fn transform(&self, table: &mut Array2<f32>) {
        for range in &self.columns {
            let span = range.max - range.min;
            table
                .index_axis_mut(Axis(1), range.index)
                .mapv_inplace(|x| (x - range.min) / span);
        }
    }

    pub fn inverse_transform(&self, table: &mut Array2<f32>) {
        for range in &self.columns {
            let span = range.max - range.min;
            table
                .index_axis_mut(Axis(1), range.index)
                .mapv_inplace(|x| x * span + range.min);
        }
    }

    /// Maps scaled values of feature `index` back to raw units.
    /// Columns that were never scaled are returned unchanged.
    pub fn inverse_column(&self, index: usize, values: &[f32]) -> Vec<f32> {
        match self.columns.iter().find(|r| r.index == index) {
            Some(range) => {
                let span = range.max - range.min;
                values.iter().map(|&x| x * span + range.min).collect()
            }
            None => values.to_vec(),
        }
    }
}
