use serde::{Deserialize, Serialize};

use crate::error::{PcaError, PcaResult};

/// Cumulative explained-variance threshold used when no explicit component
/// count is requested.
pub const DEFAULT_VARIANCE_THRESHOLD: f64 = 0.90;

/// Configuration for a [`Pca`](crate::Pca) instance.
///
/// `n_components` requests a fixed basis size. When it is `None`, the number
/// of retained components is resolved at fit time as the smallest prefix of
/// the descending explained-variance ratios whose cumulative sum reaches
/// `variance_threshold`.
///
/// The configured request and the resolved count are deliberately separate:
/// the request lives here, the resolved value is read back through
/// [`Pca::n_components`](crate::Pca::n_components).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PcaConfig {
    /// Requested number of components. Clamped to `[1, n_features]` at fit
    /// time; an explicit request of zero is rejected.
    pub n_components: Option<usize>,
    /// Fraction of total variance to retain, in `(0, 1]`.
    pub variance_threshold: f64,
}

impl Default for PcaConfig {
    fn default() -> Self {
        PcaConfig {
            n_components: None,
            variance_threshold: DEFAULT_VARIANCE_THRESHOLD,
        }
    }
}

impl PcaConfig {
    /// Configuration with a fixed number of components.
    pub fn with_components(n_components: usize) -> Self {
        PcaConfig {
            n_components: Some(n_components),
            ..PcaConfig::default()
        }
    }

    /// Configuration resolving the component count from a cumulative
    /// explained-variance threshold.
    pub fn with_variance_threshold(variance_threshold: f64) -> Self {
        PcaConfig {
            n_components: None,
            variance_threshold,
        }
    }

    pub(crate) fn validate(&self) -> PcaResult<()> {
        if self.n_components == Some(0) {
            return Err(PcaError::InvalidConfig(
                "requested component count must be positive".to_string(),
            ));
        }
        if !self.variance_threshold.is_finite()
            || self.variance_threshold <= 0.0
            || self.variance_threshold > 1.0
        {
            return Err(PcaError::InvalidConfig(format!(
                "variance threshold must lie in (0, 1], got {}",
                self.variance_threshold
            )));
        }
        Ok(())
    }
}
