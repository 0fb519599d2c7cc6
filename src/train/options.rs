use serde::{Deserialize, Serialize};

use crate::loss::loss_type::LossFunction;

/// Hyperparameters for a [`train`](crate::train::train) run.
///
/// # Fields
/// - `epochs`        — maximum number of full passes over the training data
/// - `learning_rate` — step size for every layer's in-place update
/// - `batch_size`    — samples per mini-batch; trailing samples that do not
///                     fill a whole batch are dropped each epoch
/// - `l2_lambda`     — weight-decay coefficient added to parameter gradients
/// - `patience`      — epochs without sufficient improvement before stopping
/// - `min_delta`     — improvement below this margin does not reset patience
/// - `loss`          — loss function driving the backward pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub l2_lambda: f64,
    pub patience: usize,
    pub min_delta: f64,
    pub loss: LossFunction,
}

impl TrainOptions {
    /// Defaults: batch 32, no weight decay, patience 10, min_delta 1e-4, MSE.
    pub fn new(epochs: usize, learning_rate: f64) -> TrainOptions {
        TrainOptions {
            epochs,
            learning_rate,
            batch_size: 32,
            l2_lambda: 0.0,
            patience: 10,
            min_delta: 1e-4,
            loss: LossFunction::Mse,
        }
    }
}
