use adaptive_pca::{Pca, PcaConfig};

use approx::assert_abs_diff_eq;
use ndarray::array;

// Centered four-point dataset whose covariance is diag(8/3, 2/3): the
// explained-variance ratios are exactly 0.8 and 0.2, which makes threshold
// selection easy to check by hand.
fn axis_aligned_data() -> ndarray::Array2<f64> {
    array![
        [2.0, 0.0],
        [-2.0, 0.0],
        [0.0, 1.0],
        [0.0, -1.0],
    ]
}

#[test]
fn hand_computed_variance_ratios() {
    let x = axis_aligned_data();
    let mut pca = Pca::with_config(PcaConfig::with_components(2));
    pca.fit(x.view()).unwrap();

    let eigenvalues = pca.explained_variance().unwrap();
    assert_abs_diff_eq!(eigenvalues[0], 8.0 / 3.0, epsilon = 1e-10);
    assert_abs_diff_eq!(eigenvalues[1], 2.0 / 3.0, epsilon = 1e-10);

    let ratios = pca.explained_variance_ratio().unwrap();
    assert_abs_diff_eq!(ratios[0], 0.8, epsilon = 1e-10);
    assert_abs_diff_eq!(ratios[1], 0.2, epsilon = 1e-10);
}

#[test]
fn threshold_at_the_ratio_boundary_keeps_one_component() {
    let x = axis_aligned_data();
    let mut pca = Pca::with_config(PcaConfig::with_variance_threshold(0.8));
    let scores = pca.fit_transform(x.view()).unwrap();

    assert_eq!(pca.n_components(), Some(1));
    assert_eq!(scores.dim(), (4, 1));

    // The leading component is the first axis up to sign, so the scores are
    // +/- the first input column.
    let first_column = x.column(0);
    let same = scores
        .column(0)
        .iter()
        .zip(first_column.iter())
        .all(|(&s, &c)| (s - c).abs() < 1e-10);
    let flipped = scores
        .column(0)
        .iter()
        .zip(first_column.iter())
        .all(|(&s, &c)| (s + c).abs() < 1e-10);
    assert!(same || flipped);
}

#[test]
fn threshold_above_the_boundary_keeps_both_components() {
    let x = axis_aligned_data();
    let mut pca = Pca::with_config(PcaConfig::with_variance_threshold(0.9));
    pca.fit(x.view()).unwrap();
    assert_eq!(pca.n_components(), Some(2));
}
