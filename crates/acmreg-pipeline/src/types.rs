//! Shared value types flowing through the extraction pipeline

use acmreg_domain::{BuildingRoomContext, Confidence, RecordDraft};
use serde::{Deserialize, Serialize};

use crate::error::ChunkError;

/// One location-row candidate produced by extraction, before merging
#[derive(Debug, Clone)]
pub struct ExtractionCandidate {
    /// Draft record, backfilled with document context but not yet validated
    pub draft: RecordDraft,
    /// Confidence tier used for merge precedence
    pub confidence: Confidence,
    /// Index of the chunk this candidate came from
    pub chunk_index: usize,
}

/// What happened to a single chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkStatus {
    /// The model returned parseable output
    Extracted,
    /// The model explicitly reported no register content in the chunk
    NoAcmData,
    /// All attempts for the chunk were exhausted
    Failed,
}

/// Result of extracting one chunk, including the context to carry forward
#[derive(Debug)]
pub struct ChunkOutcome {
    /// Candidates recovered from the chunk, empty on failure
    pub candidates: Vec<ExtractionCandidate>,
    /// Context after scanning this chunk's headers
    pub context_out: BuildingRoomContext,
    /// Terminal status for the chunk
    pub status: ChunkStatus,
    /// Populated when `status` is [`ChunkStatus::Failed`]
    pub error: Option<ChunkError>,
}

/// Terminal status of a whole pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// At least one record survived merge and validation
    Completed,
    /// The document was processed but contained no register content
    NoAcmData,
    /// Nothing was recovered and at least one step went wrong
    Failed,
}

impl ExtractionStatus {
    /// Whether the run counts as a success for reporting purposes
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::NoAcmData)
    }
}

/// Record counts by confidence tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceCounts {
    /// Records extracted with high confidence
    pub high: usize,
    /// Records extracted with medium confidence
    pub medium: usize,
    /// Records extracted with low confidence
    pub low: usize,
}

/// Record counts by assessed risk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    /// Records assessed Low risk
    pub low: usize,
    /// Records assessed Medium risk
    pub medium: usize,
    /// Records assessed High risk
    pub high: usize,
    /// Records whose risk field was absent or unrecognized
    pub unknown: usize,
}

/// Aggregate numbers for one pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Chunks the document was split into
    pub chunk_count: usize,
    /// Chunks whose extraction ultimately failed
    pub failed_chunks: usize,
    /// Candidates seen before merging
    pub candidate_count: usize,
    /// Candidates removed as duplicates
    pub duplicates_merged: usize,
    /// Candidates dropped by validation
    pub validation_drops: usize,
    /// Final record counts by confidence tier
    pub by_confidence: ConfidenceCounts,
    /// Final record counts by risk bucket
    pub by_risk: RiskCounts,
}

/// Everything a pipeline run produces
#[derive(Debug)]
pub struct ExtractionOutput {
    /// Merged, validated records in first-seen order
    pub records: Vec<acmreg_domain::AcmRecord>,
    /// Terminal status of the run
    pub status: ExtractionStatus,
    /// Human-readable failure summary, `None` on success
    pub error_message: Option<String>,
    /// Aggregate numbers for the run
    pub stats: ExtractionStats,
    /// Wall-clock duration of the run
    pub elapsed_ms: u64,
}
