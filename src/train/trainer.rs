use std::slice;

use rand::seq::SliceRandom;

use crate::error::{LaminaError, Result};
use crate::logging::RunLogger;
use crate::math::grid::Grid;
use crate::metrics;
use crate::network::network::Network;
use crate::train::options::TrainOptions;
use crate::train::report::{EpochMetrics, TrainOutcome, TrainReport};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` with mini-batch gradient descent and early stopping.
///
/// # Arguments
/// - `network` — mutable reference to the network; updated in place
/// - `x`       — full feature grid, one sample per row
/// - `y`       — one-hot target grid, one sample per row
/// - `options` — hyperparameters (see [`TrainOptions`])
/// - `logger`  — metrics sink; one CSV row per completed epoch
///
/// # Behavior
/// Each epoch shuffles the sample order, slices `x.rows() / batch_size`
/// fixed-size batches (the trailing remainder is dropped), and runs
/// forward / loss / backward per batch. After the batches, loss and
/// classification metrics are evaluated once over the full grids. Early
/// stopping halts the run when the mean batch loss has not improved by at
/// least `min_delta` for `patience` consecutive epochs, recording that
/// epoch's metrics as final.
///
/// Any error inside an epoch (shape mismatch, unsupported loss, ...) aborts
/// the run: the error is logged, the outcome becomes
/// [`TrainOutcome::Aborted`], and the last successfully recorded metrics are
/// returned — all zeros if the very first epoch failed.
///
/// # Panics
/// Panics if `x` is empty, `x` and `y` disagree on row count, or
/// `batch_size` is zero.
pub fn train(
    network: &mut Network,
    x: &Grid,
    y: &Grid,
    options: &TrainOptions,
    logger: &RunLogger,
) -> TrainReport {
    assert!(x.rows() > 0, "train: x must not be empty");
    assert_eq!(
        x.rows(),
        y.rows(),
        "train: x and y must have equal row counts"
    );
    assert!(options.batch_size > 0, "train: batch_size must be at least 1");

    let num_samples = x.rows();
    let num_batches = num_samples / options.batch_size;

    let mut best_loss = f64::INFINITY;
    let mut wait = 0usize;
    let mut final_metrics = EpochMetrics::default();
    let mut outcome = TrainOutcome::Completed;
    let mut epochs_run = 0;

    let mut indices: Vec<usize> = (0..num_samples).collect();

    for epoch in 0..options.epochs {
        epochs_run = epoch + 1;

        let epoch_metrics = match run_epoch(network, x, y, &mut indices, num_batches, options) {
            Ok(m) => m,
            Err(err) => {
                logger.error(&format!("epoch {epoch} aborted: {err}"));
                outcome = TrainOutcome::Aborted {
                    reason: err.to_string(),
                };
                break;
            }
        };

        logger.log_metrics(epoch, &epoch_metrics);

        // ── Early stopping ──────────────────────────────────────────────────
        if epoch_metrics.train_loss + options.min_delta < best_loss {
            best_loss = epoch_metrics.train_loss;
            wait = 0;
        } else {
            wait += 1;
            if wait >= options.patience {
                logger.info(&format!(
                    "early stopping at epoch {} with loss {:.6}",
                    epoch, epoch_metrics.train_loss
                ));
                final_metrics = epoch_metrics;
                outcome = TrainOutcome::EarlyStopped;
                break;
            }
        }

        if epoch % 10 == 0 {
            logger.info(&format!(
                "epoch {} - train loss: {:.6}, train acc: {:.4}, eval loss: {:.6}, eval acc: {:.4}",
                epoch,
                epoch_metrics.train_loss,
                epoch_metrics.train_accuracy,
                epoch_metrics.eval_loss,
                epoch_metrics.eval_accuracy
            ));
        }

        final_metrics = epoch_metrics;
    }

    TrainReport {
        outcome,
        epochs_run,
        metrics: final_metrics,
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// One full pass over the training data: shuffled mini-batches with
/// forward / loss / backward per batch, then an evaluation pass over the
/// whole grids.
fn run_epoch(
    network: &mut Network,
    x: &Grid,
    y: &Grid,
    indices: &mut [usize],
    num_batches: usize,
    options: &TrainOptions,
) -> Result<EpochMetrics> {
    indices.shuffle(&mut rand::thread_rng());

    let num_classes = y.cols();

    let mut epoch_loss = 0.0;
    let mut sum_accuracy = 0.0;
    let mut sum_f1 = 0.0;
    let mut sum_auc = 0.0;

    for batch in 0..num_batches {
        let start = batch * options.batch_size;
        let batch_indices = &indices[start..start + options.batch_size];
        let x_batch = gather_rows(x, batch_indices);
        let y_batch = gather_rows(y, batch_indices);

        let (outputs, trace) = network.forward_with_trace(slice::from_ref(&x_batch))?;
        let predictions = single_prediction(&outputs)?;

        epoch_loss += options.loss.loss(predictions, &y_batch)?;
        sum_accuracy += metrics::accuracy(predictions, &y_batch)?;
        sum_f1 += metrics::f1_score(predictions, &y_batch, num_classes)?;
        sum_auc += metrics::roc_auc(predictions, &y_batch, num_classes)?;

        let grad = options.loss.gradient(predictions, &y_batch)?;
        network.backward(
            trace,
            slice::from_ref(&grad),
            options.learning_rate,
            options.l2_lambda,
        )?;
    }

    let batches = num_batches as f64;

    // ── Full-set evaluation ─────────────────────────────────────────────────
    let outputs = network.forward(slice::from_ref(x))?;
    let predictions = single_prediction(&outputs)?;
    let eval_loss = options.loss.loss(predictions, y)?;
    let eval_accuracy = metrics::accuracy(predictions, y)?;
    let eval_f1 = metrics::f1_score(predictions, y, num_classes)?;
    let eval_auc = metrics::roc_auc(predictions, y, num_classes)?;

    Ok(EpochMetrics {
        train_loss: epoch_loss / batches,
        train_accuracy: sum_accuracy / batches,
        train_f1: sum_f1 / batches,
        train_auc: sum_auc / batches,
        eval_loss,
        eval_accuracy,
        eval_f1,
        eval_auc,
    })
}

fn single_prediction(outputs: &[Grid]) -> Result<&Grid> {
    match outputs {
        [grid] => Ok(grid),
        _ => Err(LaminaError::ShapeMismatch(format!(
            "network output must be a single channel, got {}",
            outputs.len()
        ))),
    }
}

/// Copies the given rows of `src` into a fresh grid, in order.
fn gather_rows(src: &Grid, rows: &[usize]) -> Grid {
    let mut out = Grid::zeros(rows.len(), src.cols());
    for (bi, &idx) in rows.iter().enumerate() {
        for j in 0..src.cols() {
            out[(bi, j)] = src[(idx, j)];
        }
    }
    out
}
