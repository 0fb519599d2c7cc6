use crate::error::{LaminaError, Result};
use crate::layers::expect_single;
use crate::layers::layer::Layer;
use crate::math::grid::Grid;

/// Concatenates `C` equal-shaped `R x W` channels column-wise into one
/// `R x (C * W)` grid: row `i` of the output holds channel 0's row `i`, then
/// channel 1's row `i`, and so on. Backward slices the gradient back into the
/// original channels.
#[derive(Debug, Clone, Default)]
pub struct FlattenLayer;

impl FlattenLayer {
    pub fn new() -> FlattenLayer {
        FlattenLayer
    }
}

impl Layer for FlattenLayer {
    fn forward(&self, input: &[Grid]) -> Result<Vec<Grid>> {
        let channels = input.len();
        if channels == 0 {
            return Err(LaminaError::ShapeMismatch(
                "flatten forward: no input channels".into(),
            ));
        }
        let first = &input[0];
        if input.iter().any(|ch| !ch.same_shape(first)) {
            return Err(LaminaError::ShapeMismatch(
                "flatten forward: input channels differ in shape".into(),
            ));
        }

        let rows = first.rows();
        let cols = first.cols();
        let mut out = Grid::zeros(rows, channels * cols);
        for (channel, grid) in input.iter().enumerate() {
            for i in 0..rows {
                for j in 0..cols {
                    out[(i, channel * cols + j)] = grid[(i, j)];
                }
            }
        }
        Ok(vec![out])
    }

    fn backward(
        &mut self,
        input: &[Grid],
        d_loss: &[Grid],
        _learning_rate: f64,
        _l2_lambda: f64,
    ) -> Result<Vec<Grid>> {
        let d_loss = expect_single(d_loss, "flatten backward")?;
        let channels = input.len();
        if channels == 0 {
            return Err(LaminaError::ShapeMismatch(
                "flatten backward: no recorded input channels".into(),
            ));
        }
        let rows = input[0].rows();
        let cols = input[0].cols();
        if d_loss.rows() != rows || d_loss.cols() != channels * cols {
            return Err(LaminaError::ShapeMismatch(format!(
                "flatten backward: gradient is {}x{}, expected {}x{}",
                d_loss.rows(),
                d_loss.cols(),
                rows,
                channels * cols
            )));
        }

        let mut d_input = Vec::with_capacity(channels);
        for channel in 0..channels {
            let mut grid = Grid::zeros(rows, cols);
            for i in 0..rows {
                for j in 0..cols {
                    grid[(i, j)] = d_loss[(i, channel * cols + j)];
                }
            }
            d_input.push(grid);
        }
        Ok(d_input)
    }
}
