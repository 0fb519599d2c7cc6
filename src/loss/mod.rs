pub mod cross_entropy;
pub mod hinge;
pub mod loss_type;
pub mod mse;

pub use cross_entropy::CrossEntropyLoss;
pub use hinge::HingeLoss;
pub use loss_type::LossFunction;
pub use mse::MseLoss;

use crate::error::{LaminaError, Result};
use crate::math::grid::Grid;

pub(crate) fn check_shapes(predicted: &Grid, expected: &Grid, context: &str) -> Result<()> {
    if !predicted.same_shape(expected) {
        return Err(LaminaError::ShapeMismatch(format!(
            "{context}: prediction is {}x{}, target is {}x{}",
            predicted.rows(),
            predicted.cols(),
            expected.rows(),
            expected.cols()
        )));
    }
    Ok(())
}
