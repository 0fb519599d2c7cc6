//! Classification metrics over prediction/target grids (one row per sample,
//! one column per class).

use crate::error::{LaminaError, Result};
use crate::math::grid::Grid;

/// Index of the maximum value in `row`. Ties resolve to the lowest index.
fn argmax_row(grid: &Grid, row: usize) -> usize {
    let mut max_idx = 0;
    let mut max_val = grid[(row, 0)];
    for j in 1..grid.cols() {
        if grid[(row, j)] > max_val {
            max_val = grid[(row, j)];
            max_idx = j;
        }
    }
    max_idx
}

fn check_shapes(predictions: &Grid, targets: &Grid, context: &str) -> Result<()> {
    if !predictions.same_shape(targets) {
        return Err(LaminaError::ShapeMismatch(format!(
            "{context}: predictions are {}x{}, targets are {}x{}",
            predictions.rows(),
            predictions.cols(),
            targets.rows(),
            targets.cols()
        )));
    }
    Ok(())
}

/// Fraction of rows whose predicted argmax class matches the target argmax.
/// Returns 0.0 for empty grids.
pub fn accuracy(predictions: &Grid, targets: &Grid) -> Result<f64> {
    check_shapes(predictions, targets, "accuracy")?;
    let n = predictions.rows();
    if n == 0 || predictions.cols() == 0 {
        return Ok(0.0);
    }
    let mut correct = 0;
    for i in 0..n {
        if argmax_row(predictions, i) == argmax_row(targets, i) {
            correct += 1;
        }
    }
    Ok(correct as f64 / n as f64)
}

/// Simplified micro-averaged F1 over argmax classes: one shared tp/fp/fn
/// pool, so every misclassified row counts as both a false positive and a
/// false negative. With that pooling, the score coincides with accuracy.
pub fn f1_score(predictions: &Grid, targets: &Grid, _num_classes: usize) -> Result<f64> {
    check_shapes(predictions, targets, "f1 score")?;
    let n = predictions.rows();
    if n == 0 || predictions.cols() == 0 {
        return Ok(0.0);
    }
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    for i in 0..n {
        if argmax_row(predictions, i) == argmax_row(targets, i) {
            tp += 1;
        } else {
            fp += 1;
            fn_ += 1;
        }
    }
    let precision = if tp + fp == 0 {
        0.0
    } else {
        tp as f64 / (tp + fp) as f64
    };
    let recall = if tp + fn_ == 0 {
        0.0
    } else {
        tp as f64 / (tp + fn_) as f64
    };
    if precision + recall == 0.0 {
        return Ok(0.0);
    }
    Ok(2.0 * precision * recall / (precision + recall))
}

/// Multiclass ROC-AUC. Placeholder: always reports 0.5 (the chance level),
/// pending a real ranking-based implementation.
pub fn roc_auc(predictions: &Grid, targets: &Grid, _num_classes: usize) -> Result<f64> {
    check_shapes(predictions, targets, "roc auc")?;
    Ok(0.5)
}
