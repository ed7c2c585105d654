// =========================================================================
// FALSIFY-GBM: GradientBoostingClassifier invariants
//
//   GBM-001 probabilities lie in [0, 1]
//   GBM-002 one prediction per input row
//   GBM-003 well-separated data is classified correctly
//   GBM-004 validation curve has one entry per round
//   GBM-005 identical seed, data and hyperparameters give identical output
//
// References:
//   - Friedman (2001) "Greedy Function Approximation: A Gradient Boosting Machine"
// =========================================================================

use super::*;
use crate::primitives::Matrix;
use crate::traits::BinaryClassifier;

fn separable() -> (Matrix<f32>, Vec<usize>) {
    let x = Matrix::from_vec(
        8,
        2,
        vec![
            0.0, 0.0, 0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 10.0, 10.0, 10.1, 10.1, 10.2, 10.2, 10.3, 10.3,
        ],
    )
    .expect("valid");
    (x, vec![0_usize, 0, 0, 0, 1, 1, 1, 1])
}

/// Noisy two-feature problem where the classes overlap.
fn overlapping(n: usize) -> (Matrix<f32>, Vec<usize>) {
    let mut data = Vec::with_capacity(n * 2);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let a = ((i * 37) % 101) as f32 / 10.0;
        let b = ((i * 53) % 97) as f32 / 10.0;
        data.push(a);
        data.push(b);
        labels.push(usize::from(a + 0.5 * b + ((i * 7) % 5) as f32 > 9.0));
    }
    (Matrix::from_vec(n, 2, data).expect("valid"), labels)
}

/// FALSIFY-GBM-001: Probabilities bounded
#[test]
fn falsify_gbm_001_probabilities_in_unit_interval() {
    let (x, y) = overlapping(60);
    let mut gbm = GradientBoostingClassifier::new().with_n_estimators(50);
    gbm.fit(&x, &y).expect("fit");

    for (i, p) in gbm.predict_proba(&x).expect("predict").iter().enumerate() {
        assert!(
            (0.0..=1.0).contains(p),
            "FALSIFIED GBM-001: probability[{i}] = {p}"
        );
    }
}

/// FALSIFY-GBM-002: Prediction count matches input count
#[test]
fn falsify_gbm_002_prediction_count() {
    let x = Matrix::from_vec(
        6,
        2,
        vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 5.0, 5.0, 6.0, 6.0, 7.0, 7.0],
    )
    .expect("valid");
    let y = vec![0_usize, 0, 0, 1, 1, 1];

    let mut gbm = GradientBoostingClassifier::new();
    gbm.fit(&x, &y).expect("fit");

    let preds = gbm.predict(&x, 0.5).expect("predict");
    assert_eq!(
        preds.len(),
        6,
        "FALSIFIED GBM-002: {} predictions for 6 inputs",
        preds.len()
    );
    assert_eq!(gbm.n_estimators(), 100);
}

/// FALSIFY-GBM-003: Well-separated data classified correctly
#[test]
fn falsify_gbm_003_separable_data() {
    let (x, y) = separable();
    let mut gbm = GradientBoostingClassifier::new();
    gbm.fit(&x, &y).expect("fit");

    let preds = gbm.predict(&x, 0.5).expect("predict");
    assert_eq!(
        preds, y,
        "FALSIFIED GBM-003: GBM cannot classify well-separated data"
    );
}

/// FALSIFY-GBM-004: Validation curve length and range
#[test]
fn falsify_gbm_004_validation_curve() {
    let (x, y) = overlapping(80);
    let (x_val, y_val) = separable();
    let x_val = Matrix::from_vec(8, 2, x_val.as_slice().iter().map(|v| v.min(10.0)).collect())
        .expect("valid");

    let mut gbm = GradientBoostingClassifier::new().with_n_estimators(40);
    let errors = gbm
        .fit_with_validation(&x, &y, &x_val, &y_val)
        .expect("fit");

    assert_eq!(errors.len(), 40, "FALSIFIED GBM-004: one error per round");
    assert!(errors.iter().all(|e| (0.0..=1.0).contains(e)));

    // The last entry describes the full ensemble.
    let full = gbm.predict(&x_val, 0.5).expect("predict");
    let wrong = full.iter().zip(&y_val).filter(|(p, t)| p != t).count();
    assert!((errors[39] - wrong as f32 / 8.0).abs() < 1e-6);
}

/// FALSIFY-GBM-005: Training determinism
#[test]
fn falsify_gbm_005_deterministic() {
    let (x, y) = overlapping(90);
    let build = || {
        GradientBoostingClassifier::new()
            .with_n_estimators(60)
            .with_subsample(0.7)
            .with_random_state(17)
    };

    let mut a = build();
    let mut b = build();
    a.fit(&x, &y).expect("fit a");
    b.fit(&x, &y).expect("fit b");

    assert_eq!(
        a.predict_proba(&x).expect("a"),
        b.predict_proba(&x).expect("b"),
        "FALSIFIED GBM-005: same seed produced different models"
    );
}

#[test]
fn test_more_rounds_reduce_training_loss() {
    let (x, y) = overlapping(100);
    let log_loss = |gbm: &GradientBoostingClassifier| -> f64 {
        let p = gbm.predict_proba(&x).expect("predict");
        p.iter()
            .zip(&y)
            .map(|(&pi, &yi)| {
                let pi = f64::from(pi).clamp(1e-7, 1.0 - 1e-7);
                if yi == 1 {
                    -pi.ln()
                } else {
                    -(1.0 - pi).ln()
                }
            })
            .sum::<f64>()
            / y.len() as f64
    };

    let mut short = GradientBoostingClassifier::new().with_n_estimators(5);
    short.fit(&x, &y).expect("fit");
    let mut long = GradientBoostingClassifier::new().with_n_estimators(200);
    long.fit(&x, &y).expect("fit");

    assert!(log_loss(&long) < log_loss(&short));
}

#[test]
fn test_staged_predictions_end_at_final_model() {
    let (x, y) = overlapping(40);
    let mut gbm = GradientBoostingClassifier::new().with_n_estimators(12);
    gbm.fit(&x, &y).expect("fit");

    let stages = gbm.staged_predict_proba(&x).expect("staged");
    assert_eq!(stages.len(), 12);
    assert_eq!(stages[11], gbm.predict_proba(&x).expect("predict"));
}

#[test]
fn test_invalid_inputs_rejected() {
    let (x, y) = separable();
    let fit = |mut gbm: GradientBoostingClassifier, y: &[usize]| gbm.fit(&x, y);

    assert!(fit(GradientBoostingClassifier::new(), &y[..4]).is_err());
    assert!(fit(GradientBoostingClassifier::new(), &[0, 0, 0, 0, 1, 1, 1, 2]).is_err());
    assert!(fit(GradientBoostingClassifier::new().with_n_estimators(0), &y).is_err());
    assert!(fit(GradientBoostingClassifier::new().with_learning_rate(0.0), &y).is_err());
    assert!(fit(GradientBoostingClassifier::new().with_subsample(1.5), &y).is_err());

    let unfitted = GradientBoostingClassifier::new();
    assert!(unfitted.predict_proba(&x).is_err());
}

#[test]
fn test_single_class_training_predicts_that_class() {
    let (x, _) = separable();
    let mut gbm = GradientBoostingClassifier::new().with_n_estimators(10);
    gbm.fit(&x, &[1; 8]).expect("fit");
    assert!(gbm.predict_proba(&x).expect("predict").iter().all(|&p| p > 0.9));
}
