use crate::error::Result;
use crate::math::grid::Grid;

/// The capability contract every layer implements.
///
/// A layer transforms an ordered list of channels (equal-shaped grids) into
/// another list of channels. `forward` is a pure function of the layer's
/// parameters and its input; nothing is cached inside the layer. The input a
/// forward call consumed is recorded by
/// [`Network::forward_with_trace`](crate::network::Network::forward_with_trace)
/// and handed back to `backward`, so interleaved forward passes cannot
/// corrupt each other's state.
pub trait Layer {
    fn forward(&self, input: &[Grid]) -> Result<Vec<Grid>>;

    /// Consumes the recorded forward `input` together with the loss gradient
    /// with respect to this layer's output, applies the in-place update
    /// `param -= learning_rate * (grad + l2_lambda * param)` to every
    /// trainable parameter, and returns the loss gradient with respect to
    /// `input` (same channel count and shapes as `input`).
    fn backward(
        &mut self,
        input: &[Grid],
        d_loss: &[Grid],
        learning_rate: f64,
        l2_lambda: f64,
    ) -> Result<Vec<Grid>>;
}
