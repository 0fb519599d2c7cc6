pub mod activation;
pub mod conv;
pub mod dense;
pub mod flatten;
pub mod layer;
pub mod pool;
pub mod softmax;

pub use activation::{EluLayer, LeakyReluLayer};
pub use conv::ConvolutionalLayer;
pub use dense::FullyConnectedLayer;
pub use flatten::FlattenLayer;
pub use layer::Layer;
pub use pool::{PoolBackward, PoolingLayer};
pub use softmax::SoftmaxLayer;

use crate::error::{LaminaError, Result};
use crate::math::grid::Grid;

/// Single-channel arity check shared by the layers that only accept one grid.
pub(crate) fn expect_single<'a>(channels: &'a [Grid], context: &str) -> Result<&'a Grid> {
    match channels {
        [grid] => Ok(grid),
        _ => Err(LaminaError::ShapeMismatch(format!(
            "{context}: expected one channel, got {}",
            channels.len()
        ))),
    }
}
