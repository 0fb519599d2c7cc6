use crate::error::{LaminaError, Result};
use crate::math::grid::Grid;

/// Hinge loss. Selectable through
/// [`LossFunction`](crate::loss::LossFunction) but not implemented: both
/// entry points fail unconditionally, which the trainer surfaces as an
/// aborted run.
pub struct HingeLoss;

impl HingeLoss {
    pub fn loss(_predicted: &Grid, _expected: &Grid) -> Result<f64> {
        Err(LaminaError::Unsupported(
            "hinge loss is not implemented".into(),
        ))
    }

    pub fn gradient(_predicted: &Grid, _expected: &Grid) -> Result<Grid> {
        Err(LaminaError::Unsupported(
            "hinge loss gradient is not implemented".into(),
        ))
    }
}
