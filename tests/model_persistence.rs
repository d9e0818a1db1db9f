use adaptive_pca::{Pca, PcaConfig, PcaError};

use approx::assert_abs_diff_eq;
use ndarray::{Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use tempfile::NamedTempFile;

fn centered_data(n_samples: usize, n_features: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut x = Array2::random_using((n_samples, n_features), Uniform::new(-1.0, 1.0), &mut rng);
    let mean = x.mean_axis(Axis(0)).unwrap();
    x -= &mean;
    x
}

#[test]
fn saved_model_round_trips() {
    let x = centered_data(50, 6, 404);
    let mut pca = Pca::with_config(PcaConfig::with_variance_threshold(0.95));
    pca.fit(x.view()).unwrap();

    let file = NamedTempFile::new().unwrap();
    pca.save_model(file.path()).unwrap();
    let loaded = Pca::load_model(file.path()).unwrap();

    assert_eq!(loaded.n_components(), pca.n_components());
    assert_eq!(loaded.components().unwrap(), pca.components().unwrap());

    let expected = pca.transform(x.view()).unwrap();
    let actual = loaded.transform(x.view()).unwrap();
    for (a, b) in expected.iter().zip(actual.iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }
}

#[test]
fn unfitted_model_cannot_be_saved() {
    let pca = Pca::new();
    let file = NamedTempFile::new().unwrap();
    let err = pca.save_model(file.path()).unwrap_err();
    assert!(matches!(err, PcaError::NotFitted));
}

#[test]
fn garbage_file_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"not a pca model").unwrap();
    file.flush().unwrap();

    let err = Pca::load_model(file.path()).unwrap_err();
    assert!(matches!(
        err,
        PcaError::Serialization(_) | PcaError::InvalidModel(_)
    ));
}

#[test]
fn missing_file_surfaces_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Pca::load_model(dir.path().join("absent.bin")).unwrap_err();
    assert!(matches!(err, PcaError::Io(_)));
}
