//! Dataset loading.
//!
//! The recording is a single JSON array of per-minute samples, as
//! produced by the preprocessing step:
//!
//! ```json
//! [{"id": "f1", "sex": "female", "time": 0, "temp": 36.8, "act": 12.0}]
//! ```

use std::path::Path;

use circadia_core::sample_index::SampleIndex;
use circadia_types::Sample;
use tracing::info;

use crate::error::EngineError;

/// Parse a JSON sample array.
///
/// # Errors
///
/// Returns [`EngineError::DatasetParse`] if the text is not an array of
/// samples. `path` only labels the error.
pub fn parse_samples(path: &Path, json: &str) -> Result<Vec<Sample>, EngineError> {
    serde_json::from_str(json).map_err(|source| EngineError::DatasetParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read, parse and index the dataset at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a JSON sample
/// array, or fails index validation (empty, non-finite values,
/// duplicates, conflicting sex).
pub fn load(path: &Path) -> Result<SampleIndex, EngineError> {
    let json = std::fs::read_to_string(path).map_err(|source| EngineError::DatasetRead {
        path: path.to_path_buf(),
        source,
    })?;
    let samples = parse_samples(path, &json)?;
    let index = SampleIndex::new(samples)?;
    info!(
        path = %path.display(),
        samples = index.len(),
        subjects = index.entities().len(),
        min_time = index.min_time(),
        max_time = index.max_time(),
        "Dataset loaded"
    );
    Ok(index)
}
