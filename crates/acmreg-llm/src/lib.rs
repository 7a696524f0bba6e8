//! ACM Register Model-Provider Layer
//!
//! Pluggable language-model provider implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `ModelProvider` trait from
//! `acmreg-domain`. It supports multiple model backends behind a common
//! prompt-in/text-out interface, so the extraction pipeline never embeds
//! provider-specific request or response shapes.
//!
//! # Providers
//!
//! - `MockProvider`: deterministic, scriptable mock for testing
//! - `OllamaProvider`: local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use acmreg_llm::MockProvider;
//! use acmreg_domain::traits::ModelProvider;
//!
//! let provider = MockProvider::new("{\"status\": \"no_acm_data\", \"records\": []}");
//! let result = provider.invoke("test prompt", 0.1).unwrap();
//! assert!(result.contains("no_acm_data"));
//! ```

#![warn(missing_docs)]

pub mod ollama;

use acmreg_domain::traits::{ModelProvider as ModelProviderTrait, ProviderFailure};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during model-provider operations
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// The model call did not complete in time
    #[error("Provider timeout")]
    Timeout,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Requested model is not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Response body could not be read or decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Generic error
    #[error("Provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Whether retrying the same request has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout | ProviderError::RateLimited | ProviderError::Communication(_)
        )
    }
}

/// Mock model provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Responses can be scripted as a FIFO sequence, which lets tests drive
/// retry paths (fail, fail, succeed) exactly.
///
/// # Examples
///
/// ```
/// use acmreg_llm::{MockProvider, ProviderError};
/// use acmreg_domain::traits::ModelProvider;
///
/// // Fixed response for every prompt
/// let provider = MockProvider::new("fixed");
/// assert_eq!(provider.invoke("any prompt", 0.0).unwrap(), "fixed");
///
/// // Scripted sequence: one failure, then a success
/// let provider = MockProvider::with_script(vec![
///     Err(ProviderError::Timeout),
///     Ok("recovered".to_string()),
/// ]);
/// assert!(provider.invoke("p", 0.0).is_err());
/// assert_eq!(provider.invoke("p", 0.0).unwrap(), "recovered");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a MockProvider returning a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockProvider that plays back a scripted sequence
    ///
    /// Once the script is exhausted, the provider returns an empty
    /// default response.
    pub fn with_script(script: Vec<Result<String, ProviderError>>) -> Self {
        let provider = Self::new("");
        *provider.script.lock().unwrap() = script.into();
        provider
    }

    /// Queue one more scripted result
    pub fn push_response(&self, result: Result<String, ProviderError>) {
        self.script.lock().unwrap().push_back(result);
    }

    /// Number of times `invoke` was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }

    /// Every prompt seen so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// The most recent prompt, if any
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("")
    }
}

impl ModelProviderTrait for MockProvider {
    type Error = ProviderError;

    fn invoke(&self, prompt: &str, _temperature: f32) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(scripted) = self.script.lock().unwrap().pop_front() {
            return scripted;
        }

        Ok(self.default_response.clone())
    }

    fn failure_kind(err: &Self::Error) -> ProviderFailure {
        if err.is_transient() {
            ProviderFailure::Transient
        } else {
            ProviderFailure::Fatal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_fixed_response() {
        let provider = MockProvider::new("Test response");
        let result = provider.invoke("any prompt", 0.1);
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_script_playback() {
        let provider = MockProvider::with_script(vec![
            Ok("first".to_string()),
            Err(ProviderError::RateLimited),
            Ok("third".to_string()),
        ]);

        assert_eq!(provider.invoke("p", 0.0).unwrap(), "first");
        assert!(provider.invoke("p", 0.0).is_err());
        assert_eq!(provider.invoke("p", 0.0).unwrap(), "third");
        // Exhausted script falls back to the default
        assert_eq!(provider.invoke("p", 0.0).unwrap(), "");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);
        provider.invoke("prompt1", 0.0).unwrap();
        provider.invoke("prompt2", 0.0).unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_records_prompts() {
        let provider = MockProvider::new("ok");
        provider.invoke("alpha", 0.0).unwrap();
        provider.invoke("beta", 0.0).unwrap();

        assert_eq!(provider.prompts(), vec!["alpha", "beta"]);
        assert_eq!(provider.last_prompt().as_deref(), Some("beta"));
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.invoke("test", 0.0).unwrap();

        // Both share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_failure_classification() {
        assert!(ProviderError::Timeout.is_transient());
        assert!(ProviderError::RateLimited.is_transient());
        assert!(ProviderError::Communication("reset".to_string()).is_transient());
        assert!(!ProviderError::ModelNotAvailable("m".to_string()).is_transient());
        assert!(!ProviderError::InvalidResponse("bad".to_string()).is_transient());

        assert_eq!(
            MockProvider::failure_kind(&ProviderError::Timeout),
            ProviderFailure::Transient
        );
        assert_eq!(
            MockProvider::failure_kind(&ProviderError::Other("x".to_string())),
            ProviderFailure::Fatal
        );
    }
}
