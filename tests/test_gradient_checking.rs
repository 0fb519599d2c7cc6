// Numerical gradient checking with central finite differences.
//
// Analytic gradients are recovered from a layer's in-place update: with
// learning rate 1 and no weight decay, `param_before - param_after` equals
// the gradient the backward pass computed. Numerical gradients perturb one
// parameter at a time on a cloned layer and re-evaluate the loss.

use rand::rngs::StdRng;
use rand::SeedableRng;

use lamina::{
    ConvolutionalLayer, FullyConnectedLayer, Grid, Layer, MseLoss, PoolBackward, PoolingLayer,
};

const EPS: f64 = 1e-5;
const TOLERANCE: f64 = 1e-6;

/// Deterministic filler for test inputs: varied signs and magnitudes.
fn grid_fn(rows: usize, cols: usize, offset: f64) -> Grid {
    let mut grid = Grid::zeros(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            grid[(i, j)] = ((i * cols + j) as f64 * 0.7 + offset).sin() * 0.9;
        }
    }
    grid
}

/// Sum of per-channel MSE losses.
fn multi_channel_loss(outputs: &[Grid], targets: &[Grid]) -> f64 {
    outputs
        .iter()
        .zip(targets.iter())
        .map(|(o, t)| MseLoss::loss(o, t).unwrap())
        .sum()
}

// ---------------------------------------------------------------------------
// Fully connected
// ---------------------------------------------------------------------------

fn dense_loss(layer: &FullyConnectedLayer, x: &Grid, y: &Grid) -> f64 {
    let output = layer.forward(std::slice::from_ref(x)).unwrap();
    MseLoss::loss(&output[0], y).unwrap()
}

/// Runs one backward pass with lr = 1 and returns the updated layer, so the
/// caller can read off `before - after` as the analytic gradient.
fn dense_after_step(layer: &FullyConnectedLayer, x: &Grid, y: &Grid) -> FullyConnectedLayer {
    let mut stepped = layer.clone();
    let output = stepped.forward(std::slice::from_ref(x)).unwrap();
    let grad = MseLoss::gradient(&output[0], y).unwrap();
    stepped
        .backward(
            std::slice::from_ref(x),
            std::slice::from_ref(&grad),
            1.0,
            0.0,
        )
        .unwrap();
    stepped
}

#[test]
fn dense_weight_gradients_match_finite_differences() {
    let mut rng = StdRng::seed_from_u64(7);
    let layer = FullyConnectedLayer::with_rng(3, 2, &mut rng);
    let x = grid_fn(2, 3, 0.1);
    let y = Grid::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

    let stepped = dense_after_step(&layer, &x, &y);

    for i in 0..3 {
        for j in 0..2 {
            let analytic = layer.weights[(i, j)] - stepped.weights[(i, j)];

            let mut plus = layer.clone();
            plus.weights[(i, j)] += EPS;
            let mut minus = layer.clone();
            minus.weights[(i, j)] -= EPS;
            let numeric = (dense_loss(&plus, &x, &y) - dense_loss(&minus, &x, &y)) / (2.0 * EPS);

            assert!(
                (analytic - numeric).abs() < TOLERANCE,
                "weight ({i}, {j}): analytic {analytic}, numeric {numeric}"
            );
        }
    }
}

#[test]
fn dense_bias_gradients_match_finite_differences() {
    let mut rng = StdRng::seed_from_u64(11);
    let layer = FullyConnectedLayer::with_rng(3, 2, &mut rng);
    let x = grid_fn(2, 3, 0.4);
    let y = Grid::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);

    let stepped = dense_after_step(&layer, &x, &y);

    for j in 0..2 {
        let analytic = layer.biases[(0, j)] - stepped.biases[(0, j)];

        let mut plus = layer.clone();
        plus.biases[(0, j)] += EPS;
        let mut minus = layer.clone();
        minus.biases[(0, j)] -= EPS;
        let numeric = (dense_loss(&plus, &x, &y) - dense_loss(&minus, &x, &y)) / (2.0 * EPS);

        assert!(
            (analytic - numeric).abs() < TOLERANCE,
            "bias {j}: analytic {analytic}, numeric {numeric}"
        );
    }
}

#[test]
fn dense_input_gradient_matches_finite_differences() {
    let mut rng = StdRng::seed_from_u64(13);
    let layer = FullyConnectedLayer::with_rng(3, 2, &mut rng);
    let x = grid_fn(2, 3, 0.9);
    let y = Grid::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

    let mut stepped = layer.clone();
    let output = stepped.forward(std::slice::from_ref(&x)).unwrap();
    let grad = MseLoss::gradient(&output[0], &y).unwrap();
    let d_input = stepped
        .backward(
            std::slice::from_ref(&x),
            std::slice::from_ref(&grad),
            1.0,
            0.0,
        )
        .unwrap();

    for i in 0..2 {
        for j in 0..3 {
            let mut plus = x.clone();
            plus[(i, j)] += EPS;
            let mut minus = x.clone();
            minus[(i, j)] -= EPS;
            let numeric =
                (dense_loss(&layer, &plus, &y) - dense_loss(&layer, &minus, &y)) / (2.0 * EPS);

            assert!(
                (d_input[0][(i, j)] - numeric).abs() < TOLERANCE,
                "input ({i}, {j})"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Convolution
// ---------------------------------------------------------------------------

fn conv_loss(layer: &ConvolutionalLayer, input: &[Grid], targets: &[Grid]) -> f64 {
    multi_channel_loss(&layer.forward(input).unwrap(), targets)
}

fn conv_setup() -> (ConvolutionalLayer, Vec<Grid>, Vec<Grid>) {
    let mut rng = StdRng::seed_from_u64(17);
    let layer = ConvolutionalLayer::with_rng(2, 2, 3, 1, 1, &mut rng);
    let input = vec![grid_fn(4, 4, 0.2), grid_fn(4, 4, 1.3)];
    // Padding 1, stride 1, kernel 3 on a 4x4 input keeps the 4x4 shape.
    let targets = vec![grid_fn(4, 4, 2.1), grid_fn(4, 4, 3.4)];
    (layer, input, targets)
}

fn conv_after_step(layer: &ConvolutionalLayer, input: &[Grid], targets: &[Grid]) -> (ConvolutionalLayer, Vec<Grid>) {
    let mut stepped = layer.clone();
    let outputs = stepped.forward(input).unwrap();
    let grads: Vec<Grid> = outputs
        .iter()
        .zip(targets.iter())
        .map(|(o, t)| MseLoss::gradient(o, t).unwrap())
        .collect();
    let d_input = stepped.backward(input, &grads, 1.0, 0.0).unwrap();
    (stepped, d_input)
}

#[test]
fn conv_kernel_gradients_match_finite_differences() {
    let (layer, input, targets) = conv_setup();
    let (stepped, _) = conv_after_step(&layer, &input, &targets);

    for kernel_idx in 0..layer.kernels.len() {
        for m in 0..3 {
            for n in 0..3 {
                let analytic =
                    layer.kernels[kernel_idx][(m, n)] - stepped.kernels[kernel_idx][(m, n)];

                let mut plus = layer.clone();
                plus.kernels[kernel_idx][(m, n)] += EPS;
                let mut minus = layer.clone();
                minus.kernels[kernel_idx][(m, n)] -= EPS;
                let numeric = (conv_loss(&plus, &input, &targets)
                    - conv_loss(&minus, &input, &targets))
                    / (2.0 * EPS);

                assert!(
                    (analytic - numeric).abs() < TOLERANCE,
                    "kernel {kernel_idx} ({m}, {n}): analytic {analytic}, numeric {numeric}"
                );
            }
        }
    }
}

#[test]
fn conv_bias_gradients_match_finite_differences() {
    let (layer, input, targets) = conv_setup();
    let (stepped, _) = conv_after_step(&layer, &input, &targets);

    for out_c in 0..2 {
        let analytic = layer.biases[out_c] - stepped.biases[out_c];

        let mut plus = layer.clone();
        plus.biases[out_c] += EPS;
        let mut minus = layer.clone();
        minus.biases[out_c] -= EPS;
        let numeric =
            (conv_loss(&plus, &input, &targets) - conv_loss(&minus, &input, &targets)) / (2.0 * EPS);

        assert!(
            (analytic - numeric).abs() < TOLERANCE,
            "bias {out_c}: analytic {analytic}, numeric {numeric}"
        );
    }
}

#[test]
fn conv_input_gradient_matches_finite_differences() {
    let (layer, input, targets) = conv_setup();
    let (_, d_input) = conv_after_step(&layer, &input, &targets);

    for ch in 0..2 {
        for r in 0..4 {
            for c in 0..4 {
                let mut plus = input.clone();
                plus[ch][(r, c)] += EPS;
                let mut minus = input.clone();
                minus[ch][(r, c)] -= EPS;
                let numeric = (conv_loss(&layer, &plus, &targets)
                    - conv_loss(&layer, &minus, &targets))
                    / (2.0 * EPS);

                assert!(
                    (d_input[ch][(r, c)] - numeric).abs() < TOLERANCE,
                    "input channel {ch} ({r}, {c})"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pooling
// ---------------------------------------------------------------------------

#[test]
fn max_routed_pooling_gradient_matches_finite_differences() {
    let mut layer = PoolingLayer::with_backward(2, 2, PoolBackward::MaxRouted);
    // Distinct values with margins well above EPS, so perturbation cannot
    // move a window maximum.
    let input = Grid::from_rows(vec![
        vec![0.11, 0.52, 0.23, 0.94],
        vec![0.75, 0.16, 0.87, 0.38],
        vec![0.29, 0.61, 0.42, 0.13],
        vec![0.84, 0.05, 0.66, 0.97],
    ]);
    let target = Grid::from_rows(vec![vec![0.5, 0.5], vec![0.5, 0.5]]);

    let pool_loss = |grid: &Grid| -> f64 {
        let pooled = PoolingLayer::new(2, 2)
            .forward(std::slice::from_ref(grid))
            .unwrap();
        MseLoss::loss(&pooled[0], &target).unwrap()
    };

    let pooled = layer.forward(std::slice::from_ref(&input)).unwrap();
    let grad = MseLoss::gradient(&pooled[0], &target).unwrap();
    let d_input = layer
        .backward(
            std::slice::from_ref(&input),
            std::slice::from_ref(&grad),
            1.0,
            0.0,
        )
        .unwrap();

    for r in 0..4 {
        for c in 0..4 {
            let mut plus = input.clone();
            plus[(r, c)] += EPS;
            let mut minus = input.clone();
            minus[(r, c)] -= EPS;
            let numeric = (pool_loss(&plus) - pool_loss(&minus)) / (2.0 * EPS);

            assert!(
                (d_input[0][(r, c)] - numeric).abs() < TOLERANCE,
                "input ({r}, {c})"
            );
        }
    }
}

#[test]
fn zeroed_pooling_is_gradient_dead() {
    // The default backward mode reproduces the historical stub: whatever the
    // incoming gradient, nothing propagates.
    let mut layer = PoolingLayer::new(2, 2);
    let input = vec![grid_fn(4, 4, 0.6)];
    let d_loss = vec![Grid::new(2, 2, 1.0)];
    let grads = layer.backward(&input, &d_loss, 1.0, 0.0).unwrap();
    assert_eq!(grads[0], Grid::zeros(5, 5));
}
