pub mod data;
pub mod error;
pub mod layers;
pub mod logging;
pub mod loss;
pub mod math;
pub mod metrics;
pub mod network;
pub mod train;

// Convenience re-exports
pub use data::{k_fold_split, load_mnist, parse_idx_pair, MnistImage};
pub use error::{LaminaError, Result};
pub use layers::{
    ConvolutionalLayer, EluLayer, FlattenLayer, FullyConnectedLayer, Layer, LeakyReluLayer,
    PoolBackward, PoolingLayer, SoftmaxLayer,
};
pub use logging::RunLogger;
pub use loss::{CrossEntropyLoss, HingeLoss, LossFunction, MseLoss};
pub use math::grid::Grid;
pub use network::{ForwardTrace, Network};
pub use train::{train, EpochMetrics, TrainOptions, TrainOutcome, TrainReport};
