pub mod cross_validation;
pub mod mnist;

pub use cross_validation::k_fold_split;
pub use mnist::{load_mnist, parse_idx_pair, MnistImage};
