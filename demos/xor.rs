use lamina::{
    train, FullyConnectedLayer, Grid, LeakyReluLayer, LossFunction, Network, RunLogger,
    SoftmaxLayer, TrainOptions,
};

fn main() {
    let x = Grid::from_rows(vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ]);
    // One-hot targets: class 1 when the inputs differ.
    let y = Grid::from_rows(vec![
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
    ]);

    let mut network = Network::new();
    network.add_layer(FullyConnectedLayer::new(2, 8));
    network.add_layer(LeakyReluLayer::default());
    network.add_layer(FullyConnectedLayer::new(8, 2));
    network.add_layer(SoftmaxLayer::new());

    let mut options = TrainOptions::new(2000, 0.05);
    options.batch_size = 4;
    options.loss = LossFunction::CrossEntropy;
    options.patience = 200;

    let logger = RunLogger::disabled();
    let report = train(&mut network, &x, &y, &options, &logger);

    println!(
        "{:?} after {} epochs, final loss {:.6}, accuracy {:.2}",
        report.outcome, report.epochs_run, report.metrics.train_loss, report.metrics.eval_accuracy
    );

    let outputs = network
        .forward(std::slice::from_ref(&x))
        .expect("forward pass failed");
    let predictions = &outputs[0];
    for i in 0..x.rows() {
        let class = if predictions[(i, 1)] > predictions[(i, 0)] { 1 } else { 0 };
        println!(
            "input ({}, {}) -> class {} (p = {:.4}, {:.4})",
            x[(i, 0)],
            x[(i, 1)],
            class,
            predictions[(i, 0)],
            predictions[(i, 1)]
        );
    }
}
