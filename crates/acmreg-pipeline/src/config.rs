//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Regex patterns used to recognize document structure
///
/// Passed explicitly into the chunker and context tracker at
/// construction so the same pipeline code can run against documents
/// from different survey vendors without global state. Patterns are
/// matched against individual trimmed lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderPatterns {
    /// Building section header, e.g. `B00A - Admin Block - 1924 - Brick`
    ///
    /// Captures: building id, name, optional 4-digit year, optional
    /// construction type.
    pub building: String,

    /// Room subsection header, e.g. `B00A-R0001 - Main Office - 12.5 m²`
    ///
    /// Captures: room id, name, optional area in square meters.
    pub room: String,

    /// Area-type section header, e.g. `Exterior`
    pub area_type: String,

    /// Document title carrying the school name
    pub school: String,

    /// Page-boundary marker inserted by the upstream document
    /// converter, e.g. `--- Page 12 ---`. Captures the page number.
    pub page_marker: String,
}

impl Default for HeaderPatterns {
    fn default() -> Self {
        Self {
            building: r"(?i)^(?:#+\s*)?(?:Building[:\s]+)?([A-Z]\d+[A-Z]?)\s*[-–]\s*([^-–\n]+?)(?:\s*[-–]\s*(\d{4}))?(?:\s*[-–]\s*([^-–\n]+?))?\s*$".to_string(),
            room: r"(?i)^(?:#+\s*)?(?:Room[:\s]+)?([A-Z0-9]+\s*-\s*R\d+)\s*[-–]\s*([^-–\n]+?)(?:\s*[-–]\s*([\d.]+)\s*m(?:²|2))?\s*$".to_string(),
            area_type: r"(?i)^(?:#+\s*)?(?:Area\s*Type[:\s]+)?(Interior|Exterior|Grounds)\s*$".to_string(),
            school: r"(?i)^#\s*([^-–#\n]+?)(?:\s*[-–]\s*(?:Asbestos|ACM|SAMP).*)?\s*$".to_string(),
            page_marker: r"(?i)^[-—]+\s*Page\s+(\d+)\s*[-—]+\s*$".to_string(),
        }
    }
}

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum chunk size submitted to the model in one call (characters)
    pub max_chunk_chars: usize,

    /// Attempts per chunk for transient provider failures
    pub max_retries: u32,

    /// Maximum time for a single model call (seconds)
    pub attempt_timeout_secs: u64,

    /// Base delay between retry attempts (milliseconds, doubles per attempt)
    pub retry_backoff_ms: u64,

    /// Sampling temperature; kept low for consistent structured output
    pub temperature: f32,

    /// Opaque handle naming the model to run extraction with
    pub model_handle: String,

    /// Structure-recognition patterns for the chunker and context tracker
    pub header_patterns: HeaderPatterns,
}

impl PipelineConfig {
    /// Get the per-attempt timeout as a Duration
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Backoff delay before retry attempt `n` (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_chars == 0 {
            return Err("max_chunk_chars must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be greater than 0".to_string());
        }
        if self.attempt_timeout_secs == 0 {
            return Err("attempt_timeout_secs must be greater than 0".to_string());
        }
        if self.model_handle.trim().is_empty() {
            return Err("model_handle must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0, 2]", self.temperature));
        }
        for (name, pattern) in [
            ("building", &self.header_patterns.building),
            ("room", &self.header_patterns.room),
            ("area_type", &self.header_patterns.area_type),
            ("school", &self.header_patterns.school),
            ("page_marker", &self.header_patterns.page_marker),
        ] {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(format!("invalid {} header pattern: {}", name, e));
            }
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    /// Default configuration sized for a 128k-token context window
    fn default() -> Self {
        Self {
            max_chunk_chars: 60_000,
            max_retries: 3,
            attempt_timeout_secs: 120,
            retry_backoff_ms: 1_000,
            temperature: 0.1,
            model_handle: "extraction".to_string(),
            header_patterns: HeaderPatterns::default(),
        }
    }
}

impl PipelineConfig {
    /// Aggressive preset: smaller chunks and shorter timeouts for faster runs
    pub fn aggressive() -> Self {
        Self {
            max_chunk_chars: 20_000,
            max_retries: 2,
            attempt_timeout_secs: 60,
            retry_backoff_ms: 500,
            ..Self::default()
        }
    }

    /// Lenient preset: larger chunks and longer timeouts for dense registers
    pub fn lenient() -> Self {
        Self {
            max_chunk_chars: 120_000,
            max_retries: 3,
            attempt_timeout_secs: 300,
            retry_backoff_ms: 2_000,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_preset_configs_are_valid() {
        assert!(PipelineConfig::aggressive().validate().is_ok());
        assert!(PipelineConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_chunk_budget() {
        let mut config = PipelineConfig::default();
        config.max_chunk_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_model_handle_rejected() {
        let mut config = PipelineConfig::default();
        config.model_handle = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_header_pattern_rejected() {
        let mut config = PipelineConfig::default();
        config.header_patterns.building = "([unclosed".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("building"));
    }

    #[test]
    fn test_retry_delay_doubles() {
        let config = PipelineConfig::default();
        assert_eq!(config.retry_delay(1), Duration::from_millis(1_000));
        assert_eq!(config.retry_delay(2), Duration::from_millis(2_000));
        assert_eq!(config.retry_delay(3), Duration::from_millis(4_000));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.max_chunk_chars, parsed.max_chunk_chars);
        assert_eq!(config.max_retries, parsed.max_retries);
        assert_eq!(config.header_patterns, parsed.header_patterns);
    }
}
