use thiserror::Error;

/// Errors reported by [`Pca`](crate::Pca) operations.
///
/// All variants are local and non-retryable; callers are expected to fail the
/// enclosing operation. There is no partial-success mode: a failed `fit`
/// leaves any previously fitted state untouched.
#[derive(Debug, Error)]
pub enum PcaError {
    /// The input shape cannot support the requested operation, either because
    /// there are too few samples/features to fit or because the column count
    /// does not match the fitted basis.
    #[error("dimension error: {0}")]
    Dimension(String),

    /// The input carries no variance at all, so there is nothing to explain.
    #[error("degenerate input: total variance is zero")]
    DegenerateInput,

    /// The configuration is rejected before any computation starts.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// `transform` was called before a successful `fit`.
    #[error("PCA model is not fitted; call fit first")]
    NotFitted,

    /// The delegated symmetric eigensolver failed.
    #[error("eigen decomposition failed: {0}")]
    Decomposition(#[from] ndarray_linalg::error::LinalgError),

    /// File I/O during model persistence failed.
    #[error("model i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding a persisted model failed.
    #[error("model serialization failed: {0}")]
    Serialization(String),

    /// A persisted model decoded cleanly but is internally inconsistent.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Convenience alias for results carrying a [`PcaError`].
pub type PcaResult<T> = Result<T, PcaError>;
