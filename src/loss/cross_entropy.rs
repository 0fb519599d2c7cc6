use crate::error::Result;
use crate::loss::check_shapes;
use crate::math::grid::Grid;

/// Categorical cross-entropy for use with a softmax output layer.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-15;

impl CrossEntropyLoss {
    /// `-mean over rows of sum(expected * ln(predicted + eps))`.
    ///
    /// `predicted` holds softmax probabilities, `expected` a one-hot (or
    /// soft) target distribution per row.
    pub fn loss(predicted: &Grid, expected: &Grid) -> Result<f64> {
        check_shapes(predicted, expected, "cross-entropy loss")?;
        let mut loss = 0.0;
        for i in 0..predicted.rows() {
            for j in 0..predicted.cols() {
                loss -= expected[(i, j)] * (predicted[(i, j)] + EPS).ln();
            }
        }
        Ok(loss / predicted.rows() as f64)
    }

    /// Per-cell gradient: `-expected / (predicted + eps)`.
    ///
    /// This is the raw derivative with respect to the softmax output. The
    /// softmax layer's backward passes it through unchanged rather than
    /// applying the Jacobian, so the pairing must stay softmax + cross-entropy.
    pub fn gradient(predicted: &Grid, expected: &Grid) -> Result<Grid> {
        check_shapes(predicted, expected, "cross-entropy gradient")?;
        let mut grad = Grid::zeros(predicted.rows(), predicted.cols());
        for i in 0..predicted.rows() {
            for j in 0..predicted.cols() {
                grad[(i, j)] = -expected[(i, j)] / (predicted[(i, j)] + EPS);
            }
        }
        Ok(grad)
    }
}
