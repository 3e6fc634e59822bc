//! Error types for configuration operations.

use ripple_core::BuildError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur while turning settings into a chain.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An engine could not be constructed.
    #[error("failed to build {stage}: {source}")]
    Build {
        /// Stage that failed.
        stage: &'static str,
        /// Underlying construction error.
        #[source]
        source: BuildError,
    },
}

impl ConfigError {
    /// Create a build error for the named stage.
    pub fn build(stage: &'static str, source: BuildError) -> Self {
        ConfigError::Build { stage, source }
    }
}
