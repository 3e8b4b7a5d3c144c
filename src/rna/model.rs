// projeto: lstmstocktrain
// file: src/rna/model.rs

use burn::{
    module::Module,
    nn::{Linear, LinearConfig, Lstm, LstmConfig},
    tensor::{backend::Backend, Tensor, TensorData},
};

use crate::rna::data::SequenceSet;

/// One LSTM layer followed by a linear projection of the last time step.
#[derive(Module, Debug)]
pub struct LstmRegressor<B: Backend> {
    lstm: Lstm<B>,
    linear: Linear<B>,
}

impl<B: Backend> LstmRegressor<B> {
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        let lstm = LstmConfig::new(input_size, hidden_size, true).init(device);
        let linear = LinearConfig::new(hidden_size, 1).init(device);
        Self { lstm, linear }
    }

    /// `[batch, seq_len, features]` -> `[batch, 1]`
    pub fn forward(&self, inputs: Tensor<B, 3>) -> Tensor<B, 2> {
        let (outputs, _) = self.lstm.forward(inputs, None);
        let [batch_size, seq_len, hidden_size] = outputs.dims();
        let last_output = outputs
            .slice([0..batch_size, seq_len - 1..seq_len, 0..hidden_size])
            .reshape([batch_size, hidden_size]);
        self.linear.forward(last_output)
    }
}

/// Builds the `[n, seq_len, features]` input and `[n, 1]` label tensors for a sequence set.
pub fn to_tensors<B: Backend>(set: &SequenceSet, device: &B::Device) -> (Tensor<B, 3>, Tensor<B, 2>) {
    let n = set.len();
    let seq_len = set.seq_length();
    let features = set.sequences.first().map_or(0, |s| s.ncols());

    let x = Tensor::<B, 3>::from_data(TensorData::new(set.flat_features(), [n, seq_len, features]), device);
    let y = Tensor::<B, 2>::from_data(TensorData::new(set.labels.clone(), [n, 1]), device);
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rna::data::{build_sequences, NUM_FEATURES};
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use ndarray::Array2;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_forward_shape() {
        let _guard = crate::rna::backend_lock();
        let device = NdArrayDevice::Cpu;
        let model = LstmRegressor::<TestBackend>::new(NUM_FEATURES, 8, &device);
        let input = Tensor::<TestBackend, 3>::zeros([5, 12, NUM_FEATURES], &device);
        assert_eq!(model.forward(input).dims(), [5, 1]);
    }

    #[test]
    fn test_only_last_step_matters_for_batch_independence() {
        let _guard = crate::rna::backend_lock();
        let device = NdArrayDevice::Cpu;
        let model = LstmRegressor::<TestBackend>::new(NUM_FEATURES, 4, &device);
        let a = Tensor::<TestBackend, 3>::ones([1, 6, NUM_FEATURES], &device);
        let b = Tensor::<TestBackend, 3>::zeros([1, 6, NUM_FEATURES], &device);
        let single: Vec<f32> = model.forward(a.clone()).into_data().to_vec().unwrap();
        let batched: Vec<f32> = model.forward(Tensor::cat(vec![a, b], 0)).into_data().to_vec().unwrap();
        assert!((single[0] - batched[0]).abs() < 1e-6);
        assert_eq!(batched.len(), 2);
    }

    #[test]
    fn test_to_tensors_shapes() {
        let table = Array2::from_shape_fn((30, NUM_FEATURES), |(r, c)| (r + c) as f32);
        let set = build_sequences(&table, 10).unwrap();
        let (x, y) = to_tensors::<TestBackend>(&set, &NdArrayDevice::Cpu);
        assert_eq!(x.dims(), [20, 10, NUM_FEATURES]);
        assert_eq!(y.dims(), [20, 1]);
        let labels: Vec<f32> = y.into_data().to_vec().unwrap();
        assert_eq!(labels, set.labels);
    }
}
