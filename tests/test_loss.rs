// Loss functions and classification metrics.

use lamina::{metrics, CrossEntropyLoss, Grid, HingeLoss, LaminaError, LossFunction, MseLoss};

// ---------------------------------------------------------------------------
// MSE
// ---------------------------------------------------------------------------

#[test]
fn mse_loss_known_value() {
    let pred = Grid::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    let target = Grid::zeros(2, 2);
    // (1 + 4 + 9 + 16) / 4
    assert!((MseLoss::loss(&pred, &target).unwrap() - 7.5).abs() < 1e-12);
}

#[test]
fn mse_gradient_known_value() {
    let pred = Grid::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    let target = Grid::zeros(2, 2);
    let grad = MseLoss::gradient(&pred, &target).unwrap();
    // 2 * pred / 4 = pred / 2
    assert_eq!(
        grad,
        Grid::from_rows(vec![vec![0.5, 1.0], vec![1.5, 2.0]])
    );
}

#[test]
fn mse_rejects_shape_mismatch() {
    let pred = Grid::zeros(2, 2);
    let target = Grid::zeros(2, 3);
    assert!(matches!(
        MseLoss::loss(&pred, &target),
        Err(LaminaError::ShapeMismatch(_))
    ));
    assert!(matches!(
        MseLoss::gradient(&pred, &target),
        Err(LaminaError::ShapeMismatch(_))
    ));
}

// ---------------------------------------------------------------------------
// Cross-entropy
// ---------------------------------------------------------------------------

#[test]
fn cross_entropy_loss_known_value() {
    let pred = Grid::from_rows(vec![vec![0.7, 0.3]]);
    let target = Grid::from_rows(vec![vec![1.0, 0.0]]);
    let expected = -(0.7f64 + 1e-15).ln();
    assert!((CrossEntropyLoss::loss(&pred, &target).unwrap() - expected).abs() < 1e-12);
}

#[test]
fn cross_entropy_averages_over_rows() {
    let pred = Grid::from_rows(vec![vec![0.5, 0.5], vec![0.5, 0.5]]);
    let target = Grid::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    let expected = -(0.5f64 + 1e-15).ln();
    assert!((CrossEntropyLoss::loss(&pred, &target).unwrap() - expected).abs() < 1e-12);
}

#[test]
fn cross_entropy_epsilon_prevents_infinite_loss() {
    // A confident wrong prediction must stay finite.
    let pred = Grid::from_rows(vec![vec![0.0, 1.0]]);
    let target = Grid::from_rows(vec![vec![1.0, 0.0]]);
    let loss = CrossEntropyLoss::loss(&pred, &target).unwrap();
    assert!(loss.is_finite());
    assert!(loss > 30.0); // -ln(1e-15) ~ 34.5
}

#[test]
fn cross_entropy_gradient_known_value() {
    let pred = Grid::from_rows(vec![vec![0.7, 0.3]]);
    let target = Grid::from_rows(vec![vec![1.0, 0.0]]);
    let grad = CrossEntropyLoss::gradient(&pred, &target).unwrap();
    assert!((grad.get(0, 0).unwrap() - (-1.0 / (0.7 + 1e-15))).abs() < 1e-12);
    assert_eq!(grad.get(0, 1).unwrap(), 0.0);
}

// ---------------------------------------------------------------------------
// Hinge and dispatch
// ---------------------------------------------------------------------------

#[test]
fn hinge_loss_is_unsupported() {
    let pred = Grid::zeros(1, 2);
    let target = Grid::zeros(1, 2);
    assert!(matches!(
        HingeLoss::loss(&pred, &target),
        Err(LaminaError::Unsupported(_))
    ));
    assert!(matches!(
        HingeLoss::gradient(&pred, &target),
        Err(LaminaError::Unsupported(_))
    ));
}

#[test]
fn loss_function_dispatches() {
    let pred = Grid::from_rows(vec![vec![1.0, 0.0]]);
    let target = Grid::from_rows(vec![vec![1.0, 0.0]]);

    assert_eq!(LossFunction::Mse.loss(&pred, &target).unwrap(), 0.0);
    assert!(LossFunction::CrossEntropy.loss(&pred, &target).unwrap().abs() < 1e-12);
    assert!(matches!(
        LossFunction::Hinge.loss(&pred, &target),
        Err(LaminaError::Unsupported(_))
    ));
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[test]
fn accuracy_counts_argmax_agreement() {
    let pred = Grid::from_rows(vec![
        vec![0.9, 0.1],
        vec![0.2, 0.8],
        vec![0.6, 0.4],
    ]);
    let target = Grid::from_rows(vec![
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![0.0, 1.0],
    ]);
    let acc = metrics::accuracy(&pred, &target).unwrap();
    assert!((acc - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn f1_score_with_shared_pool_equals_accuracy() {
    let pred = Grid::from_rows(vec![
        vec![0.9, 0.1],
        vec![0.2, 0.8],
        vec![0.6, 0.4],
    ]);
    let target = Grid::from_rows(vec![
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![0.0, 1.0],
    ]);
    let acc = metrics::accuracy(&pred, &target).unwrap();
    let f1 = metrics::f1_score(&pred, &target, 2).unwrap();
    assert!((f1 - acc).abs() < 1e-12);
}

#[test]
fn roc_auc_is_a_placeholder() {
    let pred = Grid::from_rows(vec![vec![0.9, 0.1]]);
    let target = Grid::from_rows(vec![vec![1.0, 0.0]]);
    assert_eq!(metrics::roc_auc(&pred, &target, 2).unwrap(), 0.5);
}

#[test]
fn metrics_reject_shape_mismatch() {
    let pred = Grid::zeros(2, 2);
    let target = Grid::zeros(3, 2);
    assert!(metrics::accuracy(&pred, &target).is_err());
    assert!(metrics::f1_score(&pred, &target, 2).is_err());
    assert!(metrics::roc_auc(&pred, &target, 2).is_err());
}
