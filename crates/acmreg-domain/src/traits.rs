//! Trait definitions for external interactions
//!
//! These traits define the boundary between the extraction pipeline and
//! infrastructure. Provider implementations live in other crates.

/// Classification of a provider failure, used by the retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    /// Timeout, rate limit, or network hiccup; worth retrying
    Transient,
    /// Misconfiguration or a rejected request; retrying won't help
    Fatal,
}

/// Trait for language-model provider operations
///
/// Implemented by the infrastructure layer (acmreg-llm). The pipeline
/// is provider-agnostic: one uniform prompt-in/text-out call, with a
/// temperature knob for deterministic structured output.
pub trait ModelProvider {
    /// Error type for provider operations
    ///
    /// Invocations run on blocking worker threads, so errors must be
    /// able to cross a thread boundary.
    type Error: std::fmt::Display + Send + 'static;

    /// Run one model invocation and return the raw response text
    fn invoke(&self, prompt: &str, temperature: f32) -> Result<String, Self::Error>;

    /// Classify a failure so the caller can apply its retry policy
    fn failure_kind(err: &Self::Error) -> ProviderFailure;
}
