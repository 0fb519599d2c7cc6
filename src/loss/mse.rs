use crate::error::Result;
use crate::loss::check_shapes;
use crate::math::grid::Grid;

/// Mean squared error over every cell of the prediction grid.
pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: `mean((predicted - expected)^2)` over all cells.
    pub fn loss(predicted: &Grid, expected: &Grid) -> Result<f64> {
        check_shapes(predicted, expected, "mse loss")?;
        let count = (predicted.rows() * predicted.cols()) as f64;
        let mut sum = 0.0;
        for i in 0..predicted.rows() {
            for j in 0..predicted.cols() {
                let diff = predicted[(i, j)] - expected[(i, j)];
                sum += diff * diff;
            }
        }
        Ok(sum / count)
    }

    /// Per-cell gradient: `2 * (predicted - expected) / count`.
    pub fn gradient(predicted: &Grid, expected: &Grid) -> Result<Grid> {
        check_shapes(predicted, expected, "mse gradient")?;
        let count = (predicted.rows() * predicted.cols()) as f64;
        let mut grad = Grid::zeros(predicted.rows(), predicted.cols());
        for i in 0..predicted.rows() {
            for j in 0..predicted.cols() {
                grad[(i, j)] = 2.0 * (predicted[(i, j)] - expected[(i, j)]) / count;
            }
        }
        Ok(grad)
    }
}
