//! Error types for the extraction pipeline

use thiserror::Error;

/// Errors that escape the pipeline boundary
///
/// Per-chunk failures never appear here; they are absorbed into the run
/// result's `error_message` and stats. Only setup problems abort a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Terminal failure for a single chunk, after the retry policy is spent
///
/// A failed chunk contributes zero candidates; the rest of the document
/// still gets extracted.
#[derive(Error, Debug, Clone)]
pub enum ChunkError {
    /// Provider kept failing transiently (timeout, rate limit, network)
    #[error("provider transient failure after {attempts} attempts: {reason}")]
    ProviderTransient {
        /// Attempts made before giving up
        attempts: u32,
        /// Last provider error seen
        reason: String,
    },

    /// Provider failed in a way retrying cannot fix
    #[error("provider failure: {0}")]
    ProviderFatal(String),

    /// Model output did not parse into the expected structure, even
    /// after the repair retry
    #[error("malformed model output: {0}")]
    MalformedOutput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_error_display() {
        let err = ChunkError::ProviderTransient {
            attempts: 3,
            reason: "Provider timeout".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("timeout"));
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::Config("max_chunk_chars must be greater than 0".to_string());
        assert!(err.to_string().contains("Configuration error"));
    }
}
