use rand::prelude::*;

use crate::error::{LaminaError, Result};
use crate::layers::expect_single;
use crate::layers::layer::Layer;
use crate::math::grid::Grid;

/// Fully-connected (dense) layer: `output = input * weights + bias`, bias
/// broadcast over rows. Operates on exactly one channel.
#[derive(Debug, Clone)]
pub struct FullyConnectedLayer {
    /// `input_size x output_size`.
    pub weights: Grid,
    /// `1 x output_size`.
    pub biases: Grid,
}

impl FullyConnectedLayer {
    /// He-initialized weights (fan-in `input_size`), zero biases.
    pub fn new(input_size: usize, output_size: usize) -> FullyConnectedLayer {
        Self::with_rng(input_size, output_size, &mut rand::thread_rng())
    }

    /// Like [`FullyConnectedLayer::new`] but with a caller-supplied generator,
    /// for reproducible initialization.
    pub fn with_rng<R: Rng>(
        input_size: usize,
        output_size: usize,
        rng: &mut R,
    ) -> FullyConnectedLayer {
        FullyConnectedLayer {
            weights: Grid::he(input_size, output_size, input_size, rng),
            biases: Grid::zeros(1, output_size),
        }
    }
}

impl Layer for FullyConnectedLayer {
    fn forward(&self, input: &[Grid]) -> Result<Vec<Grid>> {
        let input = expect_single(input, "fully connected forward")?;
        if input.cols() != self.weights.rows() {
            return Err(LaminaError::ShapeMismatch(format!(
                "fully connected forward: input has {} columns, weights expect {}",
                input.cols(),
                self.weights.rows()
            )));
        }

        let mut output = input.matmul(&self.weights)?;
        for i in 0..output.rows() {
            for j in 0..output.cols() {
                output[(i, j)] += self.biases[(0, j)];
            }
        }

        Ok(vec![output])
    }

    fn backward(
        &mut self,
        input: &[Grid],
        d_loss: &[Grid],
        learning_rate: f64,
        l2_lambda: f64,
    ) -> Result<Vec<Grid>> {
        let input = expect_single(input, "fully connected backward (recorded input)")?;
        let d_loss = expect_single(d_loss, "fully connected backward")?;

        if input.cols() != self.weights.rows() {
            return Err(LaminaError::ShapeMismatch(format!(
                "fully connected backward: recorded input has {} columns, weights expect {}",
                input.cols(),
                self.weights.rows()
            )));
        }
        if d_loss.rows() != input.rows() || d_loss.cols() != self.weights.cols() {
            return Err(LaminaError::ShapeMismatch(format!(
                "fully connected backward: gradient is {}x{}, expected {}x{}",
                d_loss.rows(),
                d_loss.cols(),
                input.rows(),
                self.weights.cols()
            )));
        }

        let mut d_weights = input.transpose().matmul(d_loss)?;

        let mut d_biases = Grid::zeros(1, self.weights.cols());
        for i in 0..d_loss.rows() {
            for j in 0..d_loss.cols() {
                d_biases[(0, j)] += d_loss[(i, j)];
            }
        }

        // L2 decays the weights only; the bias row stays unregularized.
        for i in 0..d_weights.rows() {
            for j in 0..d_weights.cols() {
                d_weights[(i, j)] += l2_lambda * self.weights[(i, j)];
            }
        }

        let d_input = d_loss.matmul(&self.weights.transpose())?;

        for i in 0..self.weights.rows() {
            for j in 0..self.weights.cols() {
                self.weights[(i, j)] -= learning_rate * d_weights[(i, j)];
            }
        }
        for j in 0..self.biases.cols() {
            self.biases[(0, j)] -= learning_rate * d_biases[(0, j)];
        }

        Ok(vec![d_input])
    }
}
