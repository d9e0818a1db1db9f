// Principal component analysis (PCA) with threshold-driven component selection

#![doc = include_str!("../README.md")]

mod config;
mod error;
mod pca;

pub use config::{PcaConfig, DEFAULT_VARIANCE_THRESHOLD};
pub use error::{PcaError, PcaResult};
pub use pca::Pca;
