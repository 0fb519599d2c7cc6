use thiserror::Error;

/// Errors surfaced by grids, layers, losses and the data loaders.
///
/// Everything is raised synchronously at the point of violation and
/// propagated with `?`. The training loop is the containment boundary: an
/// error inside an epoch aborts the run, it is never retried.
#[derive(Debug, Error)]
pub enum LaminaError {
    /// Channel count or grid dimensions do not match what an operation expects.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A grid element access outside `rows x cols`.
    #[error("grid index ({row}, {col}) out of range for {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// The requested operation exists in the API but has no implementation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Dataset file missing or malformed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LaminaError>;
