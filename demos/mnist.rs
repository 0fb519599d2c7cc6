//! MNIST digit classification with 5-fold cross-validation.
//!
//! Architecture: 784 -> 128 (ELU) -> 10 (Softmax)
//! Loss:         cross-entropy
//! Batch size:   64, lr 0.001, L2 1e-4, patience 5
//!
//! Run with:
//!   cargo run --example mnist --release
//!
//! Data files must be present at data/mnist/ (IDX binary format).
//! Each fold writes a training_metrics_fold<N>.csv log and a
//! training_report_fold<N>.json summary.

use lamina::{
    k_fold_split, load_mnist, metrics, train, EluLayer, FullyConnectedLayer, Grid, LossFunction,
    MnistImage, Network, Result, RunLogger, SoftmaxLayer, TrainOptions,
};

const IMAGES_PATH: &str = "data/mnist/train-images-idx3-ubyte";
const LABELS_PATH: &str = "data/mnist/train-labels-idx1-ubyte";
const NUM_CLASSES: usize = 10;
const FOLDS: usize = 5;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let dataset = load_mnist(IMAGES_PATH, LABELS_PATH)?;
    println!("loaded {} samples", dataset.len());

    let folds = k_fold_split(&dataset, FOLDS);

    let mut total_accuracy = 0.0;
    let mut total_f1 = 0.0;
    let mut total_auc = 0.0;

    for (fold_num, (training, validation)) in folds.iter().enumerate() {
        let fold_num = fold_num + 1;
        let (x_train, y_train) = to_grids(training)?;
        let (x_val, y_val) = to_grids(validation)?;

        let mut network = Network::new();
        network.add_layer(FullyConnectedLayer::new(28 * 28, 128));
        network.add_layer(EluLayer::default());
        network.add_layer(FullyConnectedLayer::new(128, NUM_CLASSES));
        network.add_layer(SoftmaxLayer::new());

        let mut options = TrainOptions::new(20, 0.001);
        options.batch_size = 64;
        options.l2_lambda = 1e-4;
        options.patience = 5;
        options.loss = LossFunction::CrossEntropy;

        let logger = RunLogger::create(format!("training_metrics_fold{fold_num}.csv"))?;
        let report = train(&mut network, &x_train, &y_train, &options, &logger);

        // Held-out metrics on the fold's validation split.
        let outputs = network.forward(std::slice::from_ref(&x_val))?;
        let predictions = &outputs[0];
        let val_accuracy = metrics::accuracy(predictions, &y_val)?;
        let val_f1 = metrics::f1_score(predictions, &y_val, NUM_CLASSES)?;
        let val_auc = metrics::roc_auc(predictions, &y_val, NUM_CLASSES)?;

        println!("Fold {fold_num} ({:?}, {} epochs):", report.outcome, report.epochs_run);
        println!("  Train Loss:     {:.6}", report.metrics.train_loss);
        println!("  Train Accuracy: {:.4}", report.metrics.train_accuracy);
        println!("  Train F1:       {:.4}", report.metrics.train_f1);
        println!("  Val Accuracy:   {:.4}", val_accuracy);
        println!("  Val F1:         {:.4}", val_f1);
        println!("  Val ROC AUC:    {:.4}", val_auc);

        report.save_json(&format!("training_report_fold{fold_num}.json"))?;

        total_accuracy += val_accuracy;
        total_f1 += val_f1;
        total_auc += val_auc;
    }

    let k = folds.len() as f64;
    println!("Average Accuracy: {:.4}", total_accuracy / k);
    println!("Average F1:       {:.4}", total_f1 / k);
    println!("Average ROC AUC:  {:.4}", total_auc / k);

    Ok(())
}

/// Flattens samples into a features grid and a one-hot target grid.
fn to_grids(samples: &[MnistImage]) -> Result<(Grid, Grid)> {
    let n = samples.len();
    let pixel_rows = samples[0].pixels.rows();
    let pixel_cols = samples[0].pixels.cols();
    let features = pixel_rows * pixel_cols;

    let mut x = Grid::zeros(n, features);
    let mut y = Grid::zeros(n, NUM_CLASSES);
    for (i, sample) in samples.iter().enumerate() {
        for r in 0..pixel_rows {
            for c in 0..pixel_cols {
                x[(i, r * pixel_cols + c)] = sample.pixels[(r, c)];
            }
        }
        // set() rejects labels outside the class range.
        y.set(i, sample.label as usize, 1.0)?;
    }
    Ok((x, y))
}
