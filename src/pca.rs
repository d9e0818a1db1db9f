// PCA engine: covariance eigen-decomposition with threshold-driven selection

use log::{debug, info};
use ndarray::{stack, Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_linalg::{Eigh, UPLO};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::config::PcaConfig;
use crate::error::{PcaError, PcaResult};

/// Total-variance floor below which the input is considered degenerate.
const DEGENERATE_VARIANCE_FLOOR: f64 = 1e-12;

/// Result of a successful fit. Replaced wholesale by each later fit, never
/// partially mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct FittedState {
    /// Selected eigenvectors as columns.
    /// Shape: (n_features, n_components)
    components: Array2<f64>,
    /// All eigenvalues of the covariance matrix, descending, clamped to >= 0.
    /// Shape: (n_features)
    explained_variance: Array1<f64>,
    /// Eigenvalues normalized by their sum, descending.
    /// Shape: (n_features)
    explained_variance_ratio: Array1<f64>,
    /// Resolved number of retained components (K).
    n_components: usize,
}

/// Principal component analysis (PCA) engine.
///
/// Learns a reduced orthonormal basis from the eigen-decomposition of the
/// sample covariance matrix of a feature matrix, then projects matrices onto
/// that basis. The number of retained components is either requested
/// explicitly through [`PcaConfig`] or resolved from a cumulative
/// explained-variance threshold.
///
/// The engine does not mean-center its input. Callers center (and ideally
/// standardize) features once before `fit` and apply the same treatment before
/// every `transform`; uncentered data silently contaminates the variance
/// estimates with feature location.
///
/// `fit` takes `&mut self` and `transform` takes `&self`, so the instance
/// cannot be refitted while transforms against it are still in flight.
#[derive(Debug, Serialize, Deserialize)]
pub struct Pca {
    config: PcaConfig,
    state: Option<FittedState>,
}

impl Default for Pca {
    fn default() -> Self {
        Self::new()
    }
}

impl Pca {
    /// Creates an unfitted engine with the default configuration
    /// (threshold-driven selection at 0.90).
    ///
    /// # Examples
    ///
    /// ```
    /// use adaptive_pca::Pca;
    /// let pca = Pca::new();
    /// assert!(pca.components().is_none());
    /// ```
    pub fn new() -> Self {
        Pca {
            config: PcaConfig::default(),
            state: None,
        }
    }

    /// Creates an unfitted engine with the given configuration.
    pub fn with_config(config: PcaConfig) -> Self {
        Pca {
            config,
            state: None,
        }
    }

    /// Returns the configuration this engine was constructed with.
    pub fn config(&self) -> &PcaConfig {
        &self.config
    }

    /// Returns the component basis, eigenvectors as columns, if fitted.
    ///
    /// Shape: (n_features, n_components), columns orthonormal and ordered by
    /// descending eigenvalue.
    pub fn components(&self) -> Option<&Array2<f64>> {
        self.state.as_ref().map(|s| &s.components)
    }

    /// Returns the covariance eigenvalues in descending order, if fitted.
    ///
    /// Reported for all `n_features` directions regardless of how many
    /// components were retained.
    pub fn explained_variance(&self) -> Option<&Array1<f64>> {
        self.state.as_ref().map(|s| &s.explained_variance)
    }

    /// Returns the fraction of total variance explained by each direction,
    /// descending, if fitted.
    ///
    /// Reported for all `n_features` directions regardless of how many
    /// components were retained; the values sum to 1 up to floating-point
    /// round-off.
    pub fn explained_variance_ratio(&self) -> Option<&Array1<f64>> {
        self.state.as_ref().map(|s| &s.explained_variance_ratio)
    }

    /// Returns the resolved number of retained components, if fitted.
    ///
    /// This is the output of component selection, distinct from the
    /// `n_components` request in [`PcaConfig`].
    pub fn n_components(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.n_components)
    }

    /// Fits the engine to a feature matrix.
    ///
    /// Computes the unbiased sample covariance `Xᵀ X / (n_samples - 1)`
    /// (columns as variables), eigen-decomposes it, sorts the eigenpairs by
    /// descending eigenvalue with a stable tie-break on the original index,
    /// and retains the leading eigenvectors per the configured selection rule.
    /// A successful fit replaces all prior state; a failed fit leaves it
    /// untouched.
    ///
    /// * `x` - Feature matrix of shape (n_samples, n_features), already
    ///   centered by the caller.
    ///
    /// # Errors
    ///
    /// [`PcaError::Dimension`] if `x` has fewer than 2 rows or no columns,
    /// [`PcaError::InvalidConfig`] for a zero component request or a threshold
    /// outside `(0, 1]`, [`PcaError::DegenerateInput`] if the total variance
    /// is zero, and [`PcaError::Decomposition`] if the eigensolver fails.
    pub fn fit(&mut self, x: ArrayView2<f64>) -> PcaResult<()> {
        self.config.validate()?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples < 2 || n_features < 1 {
            return Err(PcaError::Dimension(format!(
                "fit requires at least 2 samples and 1 feature, got {}x{}",
                n_samples, n_features
            )));
        }

        let mut covariance = x.t().dot(&x);
        covariance /= (n_samples - 1) as f64;

        let (eigenvalues, eigenvectors) = covariance.eigh(UPLO::Upper)?;

        // Descending eigenvalue order with a stable tie-break on the original
        // index, so numerically equal eigenvalues always sort the same way.
        let mut order: Vec<usize> = (0..n_features).collect();
        order.sort_by(|&i, &j| {
            eigenvalues[j]
                .partial_cmp(&eigenvalues[i])
                .unwrap_or(Ordering::Equal)
                .then_with(|| i.cmp(&j))
        });

        // Round-off can push tiny eigenvalues slightly negative; clamp before
        // forming ratios.
        let explained_variance: Array1<f64> =
            order.iter().map(|&i| eigenvalues[i].max(0.0)).collect();
        let total_variance = explained_variance.sum();
        if total_variance <= DEGENERATE_VARIANCE_FLOOR {
            return Err(PcaError::DegenerateInput);
        }
        let explained_variance_ratio = &explained_variance / total_variance;

        let n_components = self.resolve_components(&explained_variance_ratio, n_features);

        let selected: Vec<ArrayView1<f64>> = order[..n_components]
            .iter()
            .map(|&i| eigenvectors.column(i))
            .collect();
        let components = stack(Axis(1), &selected)
            .map_err(|e| PcaError::Dimension(format!("failed to assemble component basis: {}", e)))?;

        info!(
            "fitted PCA on {} samples x {} features; retained {} components explaining {:.2}% of variance",
            n_samples,
            n_features,
            n_components,
            explained_variance_ratio.iter().take(n_components).sum::<f64>() * 100.0
        );

        self.state = Some(FittedState {
            components,
            explained_variance,
            explained_variance_ratio,
            n_components,
        });
        Ok(())
    }

    /// Resolves K from the configured request or the cumulative ratio sum.
    fn resolve_components(&self, ratios: &Array1<f64>, n_features: usize) -> usize {
        if let Some(requested) = self.config.n_components {
            let resolved = requested.clamp(1, n_features);
            if resolved != requested {
                debug!(
                    "requested {} components clamped to {} for {} features",
                    requested, resolved, n_features
                );
            }
            return resolved;
        }

        let mut cumulative = 0.0;
        for (index, ratio) in ratios.iter().enumerate() {
            cumulative += ratio;
            if cumulative >= self.config.variance_threshold {
                return index + 1;
            }
        }
        // Ratios sum to 1 up to round-off, so this is only reachable when the
        // threshold sits inside that round-off; keep the full basis.
        n_features
    }

    /// Projects a feature matrix onto the fitted component basis.
    ///
    /// Returns `X · components`, an (n_samples, n_components) matrix. This is
    /// a pure linear projection: no recentering is applied, so any centering
    /// done before `fit` must be repeated by the caller here.
    ///
    /// # Errors
    ///
    /// [`PcaError::NotFitted`] before a successful `fit`, and
    /// [`PcaError::Dimension`] if the column count differs from the matrix the
    /// engine was fitted on.
    pub fn transform(&self, x: ArrayView2<f64>) -> PcaResult<Array2<f64>> {
        let state = self.state.as_ref().ok_or(PcaError::NotFitted)?;
        let n_model_features = state.components.nrows();
        if x.ncols() != n_model_features {
            return Err(PcaError::Dimension(format!(
                "input has {} columns but the fitted basis expects {}",
                x.ncols(),
                n_model_features
            )));
        }
        Ok(x.dot(&state.components))
    }

    /// Fits the engine to `x` and immediately projects `x`, failing fast on
    /// the first error.
    pub fn fit_transform(&mut self, x: ArrayView2<f64>) -> PcaResult<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Saves the fitted engine to a file using bincode.
    ///
    /// * `path` - The file path to save the model to.
    ///
    /// # Errors
    ///
    /// [`PcaError::NotFitted`] if `fit` has not completed, plus I/O and
    /// serialization failures.
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> PcaResult<()> {
        if self.state.is_none() {
            return Err(PcaError::NotFitted);
        }
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())
            .map_err(|e| PcaError::Serialization(e.to_string()))?;
        Ok(())
    }

    /// Loads an engine from a file previously written by [`Pca::save_model`].
    ///
    /// The decoded model is validated for internal consistency: basis and
    /// variance dimensions must agree, the retained count must match the basis
    /// width, and all stored values must be finite (variances and ratios also
    /// non-negative).
    ///
    /// # Errors
    ///
    /// I/O and deserialization failures, or [`PcaError::InvalidModel`] when
    /// the decoded state is inconsistent.
    pub fn load_model<P: AsRef<Path>>(path: P) -> PcaResult<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let model: Pca =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())
                .map_err(|e| PcaError::Serialization(e.to_string()))?;

        model
            .config
            .validate()
            .map_err(|e| PcaError::InvalidModel(e.to_string()))?;

        let state = model
            .state
            .as_ref()
            .ok_or_else(|| PcaError::InvalidModel("model holds no fitted state".to_string()))?;
        let n_features = state.components.nrows();
        if state.n_components == 0
            || state.n_components > n_features
            || state.n_components != state.components.ncols()
        {
            return Err(PcaError::InvalidModel(format!(
                "retained component count {} does not fit a {}x{} basis",
                state.n_components,
                n_features,
                state.components.ncols()
            )));
        }
        if state.explained_variance.len() != n_features
            || state.explained_variance_ratio.len() != n_features
        {
            return Err(PcaError::InvalidModel(format!(
                "variance vectors have lengths {} and {} but the basis has {} features",
                state.explained_variance.len(),
                state.explained_variance_ratio.len(),
                n_features
            )));
        }
        if state.components.iter().any(|v| !v.is_finite()) {
            return Err(PcaError::InvalidModel(
                "component basis contains non-finite values".to_string(),
            ));
        }
        if state
            .explained_variance
            .iter()
            .chain(state.explained_variance_ratio.iter())
            .any(|&v| !v.is_finite() || v < 0.0)
        {
            return Err(PcaError::InvalidModel(
                "variance vectors contain non-finite or negative values".to_string(),
            ));
        }

        Ok(model)
    }
}
