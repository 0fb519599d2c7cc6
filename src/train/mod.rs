pub mod options;
pub mod report;
pub mod trainer;

pub use options::TrainOptions;
pub use report::{EpochMetrics, TrainOutcome, TrainReport};
pub use trainer::train;
