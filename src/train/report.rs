use serde::{Deserialize, Serialize};

/// One epoch's aggregated metrics.
///
/// `train_*` fields are means over the epoch's mini-batches; `eval_*` fields
/// come from a single pass over the entire training grid at the end of the
/// epoch. The trainer does no held-out split itself — callers wanting true
/// validation metrics pre-split their data (see the k-fold helper).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub train_f1: f64,
    pub train_auc: f64,
    pub eval_loss: f64,
    pub eval_accuracy: f64,
    pub eval_f1: f64,
    pub eval_auc: f64,
}

/// How a training run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainOutcome {
    /// All requested epochs ran.
    Completed,
    /// The loss stopped improving and patience ran out before all epochs ran.
    EarlyStopped,
    /// An error inside an epoch ended the run; `metrics` holds the last
    /// successfully recorded epoch (zeros if the first epoch failed).
    Aborted { reason: String },
}

/// Result of one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    pub outcome: TrainOutcome,
    /// Number of epochs entered, including an aborted one.
    pub epochs_run: usize,
    /// Final recorded epoch metrics.
    pub metrics: EpochMetrics,
}

impl TrainReport {
    /// Serializes the report to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
