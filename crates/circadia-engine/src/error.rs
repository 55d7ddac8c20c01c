//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and playback.

use std::path::PathBuf;

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: circadia_core::config::ConfigError,
    },

    /// The dataset file could not be read.
    #[error("failed to read dataset {path}: {source}")]
    DatasetRead {
        /// Path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The dataset file is not a JSON array of samples.
    #[error("failed to parse dataset {path}: {source}")]
    DatasetParse {
        /// Path that was parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The samples could not be indexed.
    #[error("dataset error: {source}")]
    Dataset {
        /// The underlying index error.
        #[from]
        source: circadia_core::sample_index::DatasetError,
    },

    /// The simulation core rejected its inputs.
    #[error("core error: {source}")]
    Core {
        /// The underlying core error.
        #[from]
        source: circadia_core::simulation::CoreError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: circadia_observer::startup::StartupError,
    },
}
