use crate::error::{LaminaError, Result};
use crate::layers::layer::Layer;
use crate::math::grid::Grid;

/// Selects how [`PoolingLayer`] propagates gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolBackward {
    /// Historical behavior: backward returns zero-filled grids of the
    /// upsampled shape `(out_rows * stride + pool - 1, out_cols * stride +
    /// pool - 1)`. No gradient flows through the layer, so anything upstream
    /// of a pooling layer in this mode does not learn.
    Zeroed,
    /// Routes each output-gradient cell to the location that produced the
    /// window maximum (accumulating where windows overlap). Gradients come
    /// back in the input shape.
    MaxRouted,
}

/// Max-pooling over a square window. Channel count is preserved; each output
/// cell is the maximum of one `pool_size x pool_size` window taken at
/// `stride`.
#[derive(Debug, Clone)]
pub struct PoolingLayer {
    pool_size: usize,
    stride: usize,
    mode: PoolBackward,
}

impl PoolingLayer {
    /// Defaults to [`PoolBackward::Zeroed`].
    pub fn new(pool_size: usize, stride: usize) -> PoolingLayer {
        Self::with_backward(pool_size, stride, PoolBackward::Zeroed)
    }

    pub fn with_backward(pool_size: usize, stride: usize, mode: PoolBackward) -> PoolingLayer {
        PoolingLayer {
            pool_size,
            stride,
            mode,
        }
    }

    fn pooled_dims(&self, channel: &Grid) -> Result<(usize, usize)> {
        if channel.rows() < self.pool_size || channel.cols() < self.pool_size {
            return Err(LaminaError::ShapeMismatch(format!(
                "pooling: {}x{} channel is smaller than the {}x{} window",
                channel.rows(),
                channel.cols(),
                self.pool_size,
                self.pool_size
            )));
        }
        Ok((
            (channel.rows() - self.pool_size) / self.stride + 1,
            (channel.cols() - self.pool_size) / self.stride + 1,
        ))
    }

    /// Location of the first maximum inside the window anchored at
    /// `(i * stride, j * stride)`; ties resolve to the earliest cell, matching
    /// the forward pass's strict `>` comparison.
    fn window_argmax(&self, channel: &Grid, i: usize, j: usize) -> (usize, usize) {
        let mut max_val = channel[(i * self.stride, j * self.stride)];
        let mut max_at = (i * self.stride, j * self.stride);
        for pi in 0..self.pool_size {
            for pj in 0..self.pool_size {
                let r = i * self.stride + pi;
                let c = j * self.stride + pj;
                if channel[(r, c)] > max_val {
                    max_val = channel[(r, c)];
                    max_at = (r, c);
                }
            }
        }
        max_at
    }
}

impl Layer for PoolingLayer {
    fn forward(&self, input: &[Grid]) -> Result<Vec<Grid>> {
        let mut output = Vec::with_capacity(input.len());
        for channel in input {
            let (out_h, out_w) = self.pooled_dims(channel)?;
            let mut pooled = Grid::zeros(out_h, out_w);
            for i in 0..out_h {
                for j in 0..out_w {
                    let mut max_val = channel[(i * self.stride, j * self.stride)];
                    for pi in 0..self.pool_size {
                        for pj in 0..self.pool_size {
                            let current = channel[(i * self.stride + pi, j * self.stride + pj)];
                            if current > max_val {
                                max_val = current;
                            }
                        }
                    }
                    pooled[(i, j)] = max_val;
                }
            }
            output.push(pooled);
        }
        Ok(output)
    }

    fn backward(
        &mut self,
        input: &[Grid],
        d_loss: &[Grid],
        _learning_rate: f64,
        _l2_lambda: f64,
    ) -> Result<Vec<Grid>> {
        match self.mode {
            PoolBackward::Zeroed => Ok(d_loss
                .iter()
                .map(|ch| {
                    Grid::zeros(
                        ch.rows() * self.stride + self.pool_size - 1,
                        ch.cols() * self.stride + self.pool_size - 1,
                    )
                })
                .collect()),
            PoolBackward::MaxRouted => {
                if input.len() != d_loss.len() {
                    return Err(LaminaError::ShapeMismatch(format!(
                        "pooling backward: {} gradient channels for {} input channels",
                        d_loss.len(),
                        input.len()
                    )));
                }
                let mut grad_input = Vec::with_capacity(input.len());
                for (channel, d_out) in input.iter().zip(d_loss.iter()) {
                    let (out_h, out_w) = self.pooled_dims(channel)?;
                    if d_out.rows() != out_h || d_out.cols() != out_w {
                        return Err(LaminaError::ShapeMismatch(format!(
                            "pooling backward: gradient is {}x{}, pooled shape is {}x{}",
                            d_out.rows(),
                            d_out.cols(),
                            out_h,
                            out_w
                        )));
                    }
                    let mut routed = Grid::zeros(channel.rows(), channel.cols());
                    for i in 0..out_h {
                        for j in 0..out_w {
                            let (r, c) = self.window_argmax(channel, i, j);
                            routed[(r, c)] += d_out[(i, j)];
                        }
                    }
                    grad_input.push(routed);
                }
                Ok(grad_input)
            }
        }
    }
}
