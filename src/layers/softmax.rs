use crate::error::{LaminaError, Result};
use crate::layers::expect_single;
use crate::layers::layer::Layer;
use crate::math::grid::Grid;

/// Row-wise softmax over a single channel.
///
/// The forward pass is numerically stable: each row's maximum is subtracted
/// before exponentiating, then the row is normalized by its sum.
///
/// The backward pass does **not** compute the softmax Jacobian. It passes the
/// incoming gradient through unchanged, on the assumption that the gradient
/// was produced by a loss whose derivative already accounts for the softmax
/// (the cross-entropy pairing used by the trainer). Pairing this layer with
/// any other loss silently yields gradients that ignore the softmax.
#[derive(Debug, Clone, Default)]
pub struct SoftmaxLayer;

impl SoftmaxLayer {
    pub fn new() -> SoftmaxLayer {
        SoftmaxLayer
    }
}

impl Layer for SoftmaxLayer {
    fn forward(&self, input: &[Grid]) -> Result<Vec<Grid>> {
        let input = expect_single(input, "softmax forward")?;
        let mut output = Grid::zeros(input.rows(), input.cols());
        for i in 0..input.rows() {
            let mut max_val = input[(i, 0)];
            for j in 1..input.cols() {
                if input[(i, j)] > max_val {
                    max_val = input[(i, j)];
                }
            }
            let mut sum = 0.0;
            for j in 0..input.cols() {
                let e = (input[(i, j)] - max_val).exp();
                output[(i, j)] = e;
                sum += e;
            }
            for j in 0..input.cols() {
                output[(i, j)] /= sum;
            }
        }
        Ok(vec![output])
    }

    fn backward(
        &mut self,
        input: &[Grid],
        d_loss: &[Grid],
        _learning_rate: f64,
        _l2_lambda: f64,
    ) -> Result<Vec<Grid>> {
        let input = expect_single(input, "softmax backward (recorded input)")?;
        let d_loss = expect_single(d_loss, "softmax backward")?;
        if !input.same_shape(d_loss) {
            return Err(LaminaError::ShapeMismatch(format!(
                "softmax backward: gradient is {}x{}, recorded input is {}x{}",
                d_loss.rows(),
                d_loss.cols(),
                input.rows(),
                input.cols()
            )));
        }
        // Pass-through: the incoming gradient is assumed softmax-aware.
        Ok(vec![d_loss.clone()])
    }
}
