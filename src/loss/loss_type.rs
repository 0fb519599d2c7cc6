use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::hinge::HingeLoss;
use crate::loss::mse::MseLoss;
use crate::math::grid::Grid;

/// Selects which loss function the training loop uses.
///
/// - `Mse`          — mean squared error over all cells.
/// - `CrossEntropy` — categorical cross-entropy; pair with a softmax output
///   layer (whose backward expects exactly this loss's gradient).
/// - `Hinge`        — declared but unimplemented; selecting it aborts the run
///   on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFunction {
    Mse,
    CrossEntropy,
    Hinge,
}

impl LossFunction {
    /// Scalar loss for one prediction/target grid pair.
    pub fn loss(&self, predicted: &Grid, expected: &Grid) -> Result<f64> {
        match self {
            LossFunction::Mse => MseLoss::loss(predicted, expected),
            LossFunction::CrossEntropy => CrossEntropyLoss::loss(predicted, expected),
            LossFunction::Hinge => HingeLoss::loss(predicted, expected),
        }
    }

    /// Gradient of the loss with respect to the prediction grid.
    pub fn gradient(&self, predicted: &Grid, expected: &Grid) -> Result<Grid> {
        match self {
            LossFunction::Mse => MseLoss::gradient(predicted, expected),
            LossFunction::CrossEntropy => CrossEntropyLoss::gradient(predicted, expected),
            LossFunction::Hinge => HingeLoss::gradient(predicted, expected),
        }
    }
}
