//! End-to-end extraction orchestration
//!
//! The pipeline owns the full document-to-records flow: chunk the
//! text, extract each chunk sequentially while threading location
//! context, merge and validate the candidates, then summarize the run.
//! Chunk failures degrade the run instead of aborting it; only
//! configuration problems surface as errors.

use crate::chunker::Chunker;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::invoker::ChunkExtractor;
use crate::merge::{count_records, merge_candidates};
use crate::types::{ChunkStatus, ExtractionOutput, ExtractionStats, ExtractionStatus};
use acmreg_domain::traits::ModelProvider;
use acmreg_domain::BuildingRoomContext;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Document-to-records extraction pipeline
pub struct Pipeline<P> {
    chunker: Chunker,
    extractor: ChunkExtractor<P>,
}

impl<P> Pipeline<P>
where
    P: ModelProvider + Send + Sync + 'static,
{
    /// Build a pipeline over a provider, validating the configuration
    pub fn new(provider: P, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;

        let chunker = Chunker::new(&config.header_patterns, config.max_chunk_chars)
            .map_err(|e| PipelineError::Config(format!("invalid page_marker pattern: {}", e)))?;
        let extractor = ChunkExtractor::new(Arc::new(provider), config)?;

        Ok(Self { chunker, extractor })
    }

    /// Extract every ACM record from one document's text
    ///
    /// `source_ref` identifies the originating document and is stamped
    /// onto every record. The call always returns a run summary; chunk
    /// and validation failures are folded into its status, stats, and
    /// `error_message` rather than returned as errors.
    pub async fn run(
        &self,
        text: &str,
        source_ref: &str,
    ) -> Result<ExtractionOutput, PipelineError> {
        self.run_with_cancellation(text, source_ref, CancellationToken::new())
            .await
    }

    /// Like [`Pipeline::run`], but stops between chunks when cancelled
    ///
    /// A cancelled run reports `Failed` and never returns partial
    /// records.
    pub async fn run_with_cancellation(
        &self,
        text: &str,
        source_ref: &str,
        cancel: CancellationToken,
    ) -> Result<ExtractionOutput, PipelineError> {
        let start = Instant::now();
        let mut stats = ExtractionStats::default();

        if text.trim().is_empty() {
            warn!("Empty document text for '{}'", source_ref);
            return Ok(failed_output(
                "empty document text".to_string(),
                stats,
                start,
            ));
        }

        let chunks = self.chunker.chunk(text);
        stats.chunk_count = chunks.len();

        info!(
            "Starting extraction for '{}': {} chars in {} chunks",
            source_ref,
            text.len(),
            chunks.len()
        );

        let mut context = BuildingRoomContext::empty();
        let mut candidates = Vec::new();
        let mut chunk_failures = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Extraction for '{}' cancelled at chunk {}", source_ref, idx);
                return Ok(failed_output(
                    "extraction cancelled".to_string(),
                    stats,
                    start,
                ));
            }

            let outcome = self
                .extractor
                .extract_chunk(chunk, idx, chunks.len(), &context)
                .await;
            context = outcome.context_out;

            if outcome.status == ChunkStatus::Failed {
                stats.failed_chunks += 1;
                if let Some(error) = outcome.error {
                    chunk_failures.push(format!("chunk {}: {}", idx, error));
                }
            }
            candidates.extend(outcome.candidates);
        }

        stats.candidate_count = candidates.len();

        for candidate in &mut candidates {
            candidate.draft.source_id = source_ref.to_string();
        }

        let merged = merge_candidates(candidates);
        stats.duplicates_merged = merged.duplicates_merged;
        stats.validation_drops = merged.validation_drops;
        let (by_confidence, by_risk) = count_records(&merged.records);
        stats.by_confidence = by_confidence;
        stats.by_risk = by_risk;

        let mut problems = chunk_failures;
        problems.extend(merged.drop_summaries);

        let (status, error_message) = if !merged.records.is_empty() {
            let message = if problems.is_empty() {
                None
            } else {
                Some(problems.join("; "))
            };
            (ExtractionStatus::Completed, message)
        } else if !problems.is_empty() {
            (ExtractionStatus::Failed, Some(problems.join("; ")))
        } else {
            (ExtractionStatus::NoAcmData, None)
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extraction for '{}' finished: {:?}, {} records, {} failed chunks, {}ms",
            source_ref,
            status,
            merged.records.len(),
            stats.failed_chunks,
            elapsed_ms
        );

        Ok(ExtractionOutput {
            records: merged.records,
            status,
            error_message,
            stats,
            elapsed_ms,
        })
    }
}

fn failed_output(message: String, stats: ExtractionStats, start: Instant) -> ExtractionOutput {
    ExtractionOutput {
        records: Vec::new(),
        status: ExtractionStatus::Failed,
        error_message: Some(message),
        stats,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acmreg_llm::MockProvider;

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = PipelineConfig {
            max_chunk_chars: 0,
            ..PipelineConfig::default()
        };

        let result = Pipeline::new(MockProvider::new("{}"), config);
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[tokio::test]
    async fn test_empty_document_fails_without_model_call() {
        let provider = MockProvider::new(r#"{"status": "ok", "records": []}"#);
        let pipeline = Pipeline::new(provider.clone(), PipelineConfig::default()).unwrap();

        let output = pipeline.run("   \n  ", "doc_001").await.unwrap();

        assert_eq!(output.status, ExtractionStatus::Failed);
        assert_eq!(output.error_message.as_deref(), Some("empty document text"));
        assert_eq!(provider.call_count(), 0);
    }
}
