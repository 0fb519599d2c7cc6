use crate::error::{LaminaError, Result};
use crate::layers::expect_single;
use crate::layers::layer::Layer;
use crate::math::grid::Grid;

/// `f(x) = x` for positive inputs, `alpha * x` otherwise.
#[derive(Debug, Clone)]
pub struct LeakyReluLayer {
    alpha: f64,
}

impl LeakyReluLayer {
    pub fn new(alpha: f64) -> LeakyReluLayer {
        LeakyReluLayer { alpha }
    }
}

impl Default for LeakyReluLayer {
    fn default() -> Self {
        LeakyReluLayer::new(0.01)
    }
}

impl Layer for LeakyReluLayer {
    fn forward(&self, input: &[Grid]) -> Result<Vec<Grid>> {
        let input = expect_single(input, "leaky relu forward")?;
        let alpha = self.alpha;
        Ok(vec![
            input.map(|x| if x > 0.0 { x } else { alpha * x }),
        ])
    }

    fn backward(
        &mut self,
        input: &[Grid],
        d_loss: &[Grid],
        _learning_rate: f64,
        _l2_lambda: f64,
    ) -> Result<Vec<Grid>> {
        let input = expect_single(input, "leaky relu backward (recorded input)")?;
        let d_loss = expect_single(d_loss, "leaky relu backward")?;
        check_same_shape(input, d_loss, "leaky relu backward")?;

        let mut d_input = Grid::zeros(input.rows(), input.cols());
        for i in 0..input.rows() {
            for j in 0..input.cols() {
                d_input[(i, j)] = if input[(i, j)] > 0.0 {
                    d_loss[(i, j)]
                } else {
                    self.alpha * d_loss[(i, j)]
                };
            }
        }
        Ok(vec![d_input])
    }
}

/// `f(x) = x` for positive inputs, `alpha * (e^x - 1)` otherwise.
#[derive(Debug, Clone)]
pub struct EluLayer {
    alpha: f64,
}

impl EluLayer {
    pub fn new(alpha: f64) -> EluLayer {
        EluLayer { alpha }
    }
}

impl Default for EluLayer {
    fn default() -> Self {
        EluLayer::new(1.0)
    }
}

impl Layer for EluLayer {
    fn forward(&self, input: &[Grid]) -> Result<Vec<Grid>> {
        let input = expect_single(input, "elu forward")?;
        let alpha = self.alpha;
        Ok(vec![
            input.map(|x| if x > 0.0 { x } else { alpha * (x.exp() - 1.0) }),
        ])
    }

    fn backward(
        &mut self,
        input: &[Grid],
        d_loss: &[Grid],
        _learning_rate: f64,
        _l2_lambda: f64,
    ) -> Result<Vec<Grid>> {
        let input = expect_single(input, "elu backward (recorded input)")?;
        let d_loss = expect_single(d_loss, "elu backward")?;
        check_same_shape(input, d_loss, "elu backward")?;

        let mut d_input = Grid::zeros(input.rows(), input.cols());
        for i in 0..input.rows() {
            for j in 0..input.cols() {
                let x = input[(i, j)];
                d_input[(i, j)] = if x > 0.0 {
                    d_loss[(i, j)]
                } else {
                    d_loss[(i, j)] * self.alpha * x.exp()
                };
            }
        }
        Ok(vec![d_input])
    }
}

fn check_same_shape(input: &Grid, d_loss: &Grid, context: &str) -> Result<()> {
    if !input.same_shape(d_loss) {
        return Err(LaminaError::ShapeMismatch(format!(
            "{context}: gradient is {}x{}, recorded input is {}x{}",
            d_loss.rows(),
            d_loss.cols(),
            input.rows(),
            input.cols()
        )));
    }
    Ok(())
}
