//! Training-run logging: a CSV metrics sink plus info/error lines.
//!
//! The logger is an explicitly constructed value owned by the caller and
//! passed by reference into the trainer; its file closes when it is dropped.
//! The sink sits behind a mutex so callers that parallelize across folds
//! cannot interleave partial lines.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::train::report::EpochMetrics;

const CSV_HEADER: &str =
    "epoch,train_loss,train_accuracy,train_f1,train_auc,eval_loss,eval_accuracy,eval_f1,eval_auc";

pub struct RunLogger {
    sink: Mutex<Option<BufWriter<File>>>,
}

impl RunLogger {
    /// Creates (truncating) the CSV file at `path` and writes the header row.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<RunLogger> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{CSV_HEADER}")?;
        Ok(RunLogger {
            sink: Mutex::new(Some(writer)),
        })
    }

    /// A logger with no file sink. Info and error lines still echo to
    /// stdout/stderr; metrics rows are discarded.
    pub fn disabled() -> RunLogger {
        RunLogger {
            sink: Mutex::new(None),
        }
    }

    /// Appends one CSV row. Write failures are swallowed: losing a metrics
    /// line must not abort a training run.
    pub fn log_metrics(&self, epoch: usize, m: &EpochMetrics) {
        self.append_line(&format!(
            "{},{},{},{},{},{},{},{},{}",
            epoch,
            m.train_loss,
            m.train_accuracy,
            m.train_f1,
            m.train_auc,
            m.eval_loss,
            m.eval_accuracy,
            m.eval_f1,
            m.eval_auc
        ));
    }

    pub fn info(&self, msg: &str) {
        println!("[INFO] {msg}");
        self.append_line(&format!("[INFO] {msg}"));
    }

    pub fn error(&self, msg: &str) {
        eprintln!("[ERROR] {msg}");
        self.append_line(&format!("[ERROR] {msg}"));
    }

    fn append_line(&self, line: &str) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        if let Some(writer) = sink.as_mut() {
            let _ = writeln!(writer, "{line}");
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        if let Ok(mut sink) = self.sink.lock() {
            if let Some(writer) = sink.as_mut() {
                let _ = writer.flush();
            }
        }
    }
}
