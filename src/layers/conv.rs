use rand::prelude::*;

use crate::error::{LaminaError, Result};
use crate::layers::layer::Layer;
use crate::math::grid::Grid;

/// 2-D convolutional layer.
///
/// Holds `out_channels * in_channels` square kernels plus one bias per output
/// channel. The forward pass is a cross-correlation (no kernel flip): each
/// input channel is zero-padded, a `k x k` window slides at `stride`, and the
/// per-channel window products are summed into each output channel before the
/// bias is added. The backward pass flips each kernel 180 degrees to
/// scatter the output gradient back onto the input.
#[derive(Debug, Clone)]
pub struct ConvolutionalLayer {
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
    padding: usize,
    /// Kernel grids, indexed `out_channel * in_channels + in_channel`.
    pub kernels: Vec<Grid>,
    /// One bias per output channel.
    pub biases: Vec<f64>,
}

impl ConvolutionalLayer {
    /// He-initialized kernels (fan-in `in_channels * k * k`), zero biases.
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
    ) -> ConvolutionalLayer {
        Self::with_rng(
            in_channels,
            out_channels,
            kernel_size,
            stride,
            padding,
            &mut rand::thread_rng(),
        )
    }

    /// Like [`ConvolutionalLayer::new`] but with a caller-supplied generator,
    /// for reproducible initialization.
    pub fn with_rng<R: Rng>(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
        rng: &mut R,
    ) -> ConvolutionalLayer {
        let fan_in = in_channels * kernel_size * kernel_size;
        let kernels = (0..out_channels * in_channels)
            .map(|_| Grid::he(kernel_size, kernel_size, fan_in, rng))
            .collect();

        ConvolutionalLayer {
            in_channels,
            out_channels,
            kernel_size,
            stride,
            padding,
            kernels,
            biases: vec![0.0; out_channels],
        }
    }

    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    /// Output shape for an `height x width` input channel:
    /// `(h - k + 2p) / s + 1` per axis, floor division.
    fn output_dims(&self, height: usize, width: usize) -> Result<(usize, usize)> {
        let padded_h = height + 2 * self.padding;
        let padded_w = width + 2 * self.padding;
        if padded_h < self.kernel_size || padded_w < self.kernel_size {
            return Err(LaminaError::ShapeMismatch(format!(
                "convolution: {}x{} input with padding {} is smaller than the {}x{} kernel",
                height, width, self.padding, self.kernel_size, self.kernel_size
            )));
        }
        Ok((
            (padded_h - self.kernel_size) / self.stride + 1,
            (padded_w - self.kernel_size) / self.stride + 1,
        ))
    }

    fn kernel_index(&self, out_c: usize, in_c: usize) -> usize {
        out_c * self.in_channels + in_c
    }
}

impl Layer for ConvolutionalLayer {
    fn forward(&self, input: &[Grid]) -> Result<Vec<Grid>> {
        if input.len() != self.in_channels {
            return Err(LaminaError::ShapeMismatch(format!(
                "convolution forward: expected {} input channels, got {}",
                self.in_channels,
                input.len()
            )));
        }
        let first = &input[0];
        if input.iter().any(|ch| !ch.same_shape(first)) {
            return Err(LaminaError::ShapeMismatch(
                "convolution forward: input channels differ in shape".into(),
            ));
        }
        let (out_h, out_w) = self.output_dims(first.rows(), first.cols())?;

        let padded: Vec<Grid> = input.iter().map(|ch| pad(ch, self.padding)).collect();

        let mut output = Vec::with_capacity(self.out_channels);
        for out_c in 0..self.out_channels {
            let mut out_ch = Grid::new(out_h, out_w, self.biases[out_c]);
            for in_c in 0..self.in_channels {
                let kernel = &self.kernels[self.kernel_index(out_c, in_c)];
                for i in 0..out_h {
                    for j in 0..out_w {
                        let mut sum = 0.0;
                        for m in 0..self.kernel_size {
                            for n in 0..self.kernel_size {
                                sum += padded[in_c][(i * self.stride + m, j * self.stride + n)]
                                    * kernel[(m, n)];
                            }
                        }
                        out_ch[(i, j)] += sum;
                    }
                }
            }
            output.push(out_ch);
        }

        Ok(output)
    }

    fn backward(
        &mut self,
        input: &[Grid],
        d_loss: &[Grid],
        learning_rate: f64,
        l2_lambda: f64,
    ) -> Result<Vec<Grid>> {
        if d_loss.len() != self.out_channels {
            return Err(LaminaError::ShapeMismatch(format!(
                "convolution backward: expected {} gradient channels, got {}",
                self.out_channels,
                d_loss.len()
            )));
        }
        if input.len() != self.in_channels {
            return Err(LaminaError::ShapeMismatch(format!(
                "convolution backward: recorded input has {} channels, expected {}",
                input.len(),
                self.in_channels
            )));
        }
        let input_h = input[0].rows();
        let input_w = input[0].cols();
        let (out_h, out_w) = self.output_dims(input_h, input_w)?;
        if d_loss
            .iter()
            .any(|ch| ch.rows() != out_h || ch.cols() != out_w)
        {
            return Err(LaminaError::ShapeMismatch(format!(
                "convolution backward: gradient channels must be {}x{} for a {}x{} input",
                out_h, out_w, input_h, input_w
            )));
        }

        let padded: Vec<Grid> = input.iter().map(|ch| pad(ch, self.padding)).collect();

        let mut grad_input = vec![Grid::zeros(input_h, input_w); self.in_channels];
        let mut grad_biases = vec![0.0; self.out_channels];

        for out_c in 0..self.out_channels {
            let d_out = &d_loss[out_c];

            for in_c in 0..self.in_channels {
                let idx = self.kernel_index(out_c, in_c);

                // Kernel gradient: correlate the padded input with the output
                // gradient at the forward stride.
                let mut grad_kernel = Grid::zeros(self.kernel_size, self.kernel_size);
                for m in 0..self.kernel_size {
                    for n in 0..self.kernel_size {
                        let mut sum = 0.0;
                        for i in 0..out_h {
                            for j in 0..out_w {
                                sum += padded[in_c][(i * self.stride + m, j * self.stride + n)]
                                    * d_out[(i, j)];
                            }
                        }
                        grad_kernel[(m, n)] = sum;
                    }
                }

                // Input gradient: scatter every output-gradient cell through
                // the 180-degree-rotated kernel; contributions landing outside
                // the input window are dropped.
                let flipped = flip180(&self.kernels[idx]);
                for i in 0..out_h {
                    for j in 0..out_w {
                        let d = d_out[(i, j)];
                        for m in 0..self.kernel_size {
                            for n in 0..self.kernel_size {
                                let x = (i * self.stride + m) as isize - self.padding as isize;
                                let y = (j * self.stride + n) as isize - self.padding as isize;
                                if x >= 0
                                    && (x as usize) < input_h
                                    && y >= 0
                                    && (y as usize) < input_w
                                {
                                    grad_input[in_c][(x as usize, y as usize)] +=
                                        d * flipped[(m, n)];
                                }
                            }
                        }
                    }
                }

                let kernel = &mut self.kernels[idx];
                for m in 0..self.kernel_size {
                    for n in 0..self.kernel_size {
                        let g = grad_kernel[(m, n)] + l2_lambda * kernel[(m, n)];
                        kernel[(m, n)] -= learning_rate * g;
                    }
                }
            }

            for i in 0..out_h {
                for j in 0..out_w {
                    grad_biases[out_c] += d_out[(i, j)];
                }
            }
        }

        for out_c in 0..self.out_channels {
            let g = grad_biases[out_c] + l2_lambda * self.biases[out_c];
            self.biases[out_c] -= learning_rate * g;
        }

        Ok(grad_input)
    }
}

/// Zero-pads `input` by `padding` cells on every side.
fn pad(input: &Grid, padding: usize) -> Grid {
    if padding == 0 {
        return input.clone();
    }
    let mut padded = Grid::zeros(input.rows() + 2 * padding, input.cols() + 2 * padding);
    for i in 0..input.rows() {
        for j in 0..input.cols() {
            padded[(i + padding, j + padding)] = input[(i, j)];
        }
    }
    padded
}

fn flip180(kernel: &Grid) -> Grid {
    let rows = kernel.rows();
    let cols = kernel.cols();
    let mut flipped = Grid::zeros(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            flipped[(i, j)] = kernel[(rows - 1 - i, cols - 1 - j)];
        }
    }
    flipped
}
