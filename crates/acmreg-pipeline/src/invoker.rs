//! Per-chunk model invocation with retry, repair, and context backfill

use crate::config::PipelineConfig;
use crate::context::ContextTracker;
use crate::error::{ChunkError, PipelineError};
use crate::parser::{parse_model_response, ParsedResponse, WireRecord, WireStatus};
use crate::prompt::PromptBuilder;
use crate::types::{ChunkOutcome, ChunkStatus, ExtractionCandidate};
use acmreg_domain::traits::{ModelProvider, ProviderFailure};
use acmreg_domain::{BuildingRoomContext, Confidence, RecordDraft};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Issue string attached when building_id comes from carried context
const BUILDING_INFERRED_ISSUE: &str = "building_id inferred from document context";

/// Fallback when neither the model nor the document yields a school name
const UNKNOWN_SCHOOL: &str = "Unknown School";

/// Runs the model over single chunks and turns wire records into
/// context-backfilled candidates
pub struct ChunkExtractor<P> {
    provider: Arc<P>,
    config: PipelineConfig,
    tracker: ContextTracker,
}

/// One model call's failure, before the retry policy is applied
enum CallFailure {
    Transient(String),
    Fatal(String),
}

impl<P> ChunkExtractor<P>
where
    P: ModelProvider + Send + Sync + 'static,
{
    /// Create a chunk extractor over a shared provider
    pub fn new(provider: Arc<P>, config: PipelineConfig) -> Result<Self, PipelineError> {
        let tracker = ContextTracker::new(&config.header_patterns)
            .map_err(|e| PipelineError::Config(format!("invalid header pattern: {}", e)))?;
        Ok(Self {
            provider,
            config,
            tracker,
        })
    }

    /// Extract one chunk, threading location context through it
    ///
    /// The header scan runs before the model call, so `context_out` is
    /// valid even when every attempt fails; later chunks keep their
    /// location context across a failed one.
    pub async fn extract_chunk(
        &self,
        chunk_text: &str,
        chunk_index: usize,
        total_chunks: usize,
        context_in: &BuildingRoomContext,
    ) -> ChunkOutcome {
        let context_out = self.tracker.scan(chunk_text, context_in);

        let builder = PromptBuilder::new(chunk_text.to_string(), chunk_index, total_chunks)
            .with_context(context_in.clone());
        let mut prompt = builder.build();

        // Transient failures and malformed output draw on separate
        // budgets: the repair retry never eats into max_retries
        let mut transient_attempts: u32 = 0;
        let mut repair_used = false;

        loop {
            match self.call_model(&prompt).await {
                Ok(response) => match parse_model_response(&response) {
                    Ok(parsed) => {
                        return self.outcome_from_parsed(parsed, chunk_index, context_in, context_out)
                    }
                    Err(parse_err) => {
                        if repair_used {
                            warn!(
                                "Chunk {} output still malformed after repair: {}",
                                chunk_index, parse_err
                            );
                            return Self::failed(context_out, parse_err);
                        }
                        debug!(
                            "Chunk {} output malformed ({}), retrying with repair prompt",
                            chunk_index, parse_err
                        );
                        repair_used = true;
                        prompt = builder.build_repair(&response);
                    }
                },
                Err(CallFailure::Fatal(reason)) => {
                    warn!("Chunk {} provider failure: {}", chunk_index, reason);
                    return Self::failed(context_out, ChunkError::ProviderFatal(reason));
                }
                Err(CallFailure::Transient(reason)) => {
                    transient_attempts += 1;
                    if transient_attempts >= self.config.max_retries {
                        warn!(
                            "Chunk {} giving up after {} attempts: {}",
                            chunk_index, transient_attempts, reason
                        );
                        return Self::failed(
                            context_out,
                            ChunkError::ProviderTransient {
                                attempts: transient_attempts,
                                reason,
                            },
                        );
                    }
                    let delay = self.config.retry_delay(transient_attempts);
                    debug!(
                        "Chunk {} attempt {} failed ({}), retrying in {:?}",
                        chunk_index, transient_attempts, reason, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Call the provider with the per-attempt timeout
    async fn call_model(&self, prompt: &str) -> Result<String, CallFailure> {
        let provider = Arc::clone(&self.provider);
        let prompt = prompt.to_string();
        let temperature = self.config.temperature;

        // Call in a blocking context since ModelProvider is not async
        let call = tokio::task::spawn_blocking(move || provider.invoke(&prompt, temperature));

        let joined = match timeout(self.config.attempt_timeout(), call).await {
            Ok(joined) => joined,
            Err(_) => {
                return Err(CallFailure::Transient(format!(
                    "no response within {}s",
                    self.config.attempt_timeout_secs
                )))
            }
        };

        let result = joined.map_err(|e| CallFailure::Fatal(format!("provider task failed: {}", e)))?;

        result.map_err(|e| match P::failure_kind(&e) {
            ProviderFailure::Transient => CallFailure::Transient(e.to_string()),
            ProviderFailure::Fatal => CallFailure::Fatal(e.to_string()),
        })
    }

    fn failed(context_out: BuildingRoomContext, error: ChunkError) -> ChunkOutcome {
        ChunkOutcome {
            candidates: Vec::new(),
            context_out,
            status: ChunkStatus::Failed,
            error: Some(error),
        }
    }

    fn outcome_from_parsed(
        &self,
        parsed: ParsedResponse,
        chunk_index: usize,
        context_in: &BuildingRoomContext,
        context_out: BuildingRoomContext,
    ) -> ChunkOutcome {
        if parsed.status == WireStatus::NoAcmData {
            debug!(
                "Chunk {} has no register content{}",
                chunk_index,
                parsed
                    .notes
                    .as_deref()
                    .map(|n| format!(": {}", n))
                    .unwrap_or_default()
            );
            return ChunkOutcome {
                candidates: Vec::new(),
                context_out,
                status: ChunkStatus::NoAcmData,
                error: None,
            };
        }

        let candidates = parsed
            .records
            .into_iter()
            .map(|wire| self.candidate_from_wire(wire, chunk_index, context_in, &context_out))
            .collect();

        ChunkOutcome {
            candidates,
            context_out,
            status: ChunkStatus::Extracted,
            error: None,
        }
    }

    /// Backfill a wire record from document context and build a candidate
    ///
    /// Rows the model leaves without a building sit before any header
    /// in the chunk, so they inherit the carried-in building and room.
    /// Rows that do name a building get enriched (name, year, area)
    /// from whichever context - carried-in or end-of-chunk - describes
    /// that same building, since headers inside the chunk also appear
    /// in the end-of-chunk context.
    fn candidate_from_wire(
        &self,
        wire: WireRecord,
        chunk_index: usize,
        context_in: &BuildingRoomContext,
        context_out: &BuildingRoomContext,
    ) -> ExtractionCandidate {
        let mut data_issues = Vec::new();

        // The school title is set once and never overwritten, so the
        // end-of-chunk context always carries the widest view of it
        let school_name = match non_empty(wire.school_name) {
            Some(name) => name,
            None => context_out
                .school_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_SCHOOL.to_string()),
        };

        let wire_building = non_empty(wire.building_id);
        let (building_id, building_ctx) = match &wire_building {
            Some(id) => {
                let ctx = [context_in, context_out]
                    .into_iter()
                    .find(|c| matches_id(c.building_id.as_deref(), id));
                (id.clone(), ctx)
            }
            None => match &context_in.building_id {
                Some(id) => {
                    data_issues.push(BUILDING_INFERRED_ISSUE.to_string());
                    (id.clone(), Some(context_in))
                }
                None => (String::new(), None),
            },
        };

        let mut building_name = non_empty(wire.building_name);
        let mut building_year = None;
        let mut building_construction = None;
        if let Some(ctx) = building_ctx {
            building_name = building_name.or_else(|| ctx.building_name.clone());
            building_year = ctx.building_year;
            building_construction = ctx.building_construction.clone();
        }

        let mut room_id = non_empty(wire.room_id);
        let mut room_name = non_empty(wire.room_name);
        let mut room_area = None;
        match &room_id {
            Some(id) => {
                let room_ctx = [context_in, context_out]
                    .into_iter()
                    .find(|c| matches_id(c.room_id.as_deref(), id));
                if let Some(ctx) = room_ctx {
                    room_name = room_name.or_else(|| ctx.room_name.clone());
                    room_area = ctx.room_area;
                }
            }
            None => {
                // The carried room only applies when the row sits in
                // the carried building
                if matches_id(context_in.building_id.as_deref(), &building_id) {
                    room_id = context_in.room_id.clone();
                    room_name = room_name.or_else(|| context_in.room_name.clone());
                    room_area = context_in.room_area;
                }
            }
        }

        let area_type = non_empty(wire.area_type)
            .or_else(|| building_ctx.and_then(|c| c.area_type.clone()))
            .unwrap_or_else(|| "Interior".to_string());

        let confidence = match wire.confidence.as_deref().map(str::trim) {
            None | Some("") => Confidence::Medium,
            Some(raw) => match Confidence::parse(raw) {
                Some(tier) => tier,
                None => {
                    data_issues.push(format!("unrecognized confidence value: '{}'", raw));
                    Confidence::Medium
                }
            },
        };

        if let Some(notes) = non_empty(wire.notes) {
            data_issues.push(format!("extraction note: {}", notes));
        }

        let draft = RecordDraft {
            source_id: String::new(),
            school_name,
            school_code: context_out.school_code.clone(),
            building_id,
            building_name,
            building_year,
            building_construction,
            room_id,
            room_name,
            room_area,
            area_type: Some(area_type),
            product: non_empty(wire.product).unwrap_or_default(),
            material_description: non_empty(wire.material_description).unwrap_or_default(),
            extent: non_empty(wire.extent),
            location: non_empty(wire.location),
            friable: non_empty(wire.friable),
            material_condition: non_empty(wire.material_condition),
            risk_status: non_empty(wire.risk_status),
            result: normalize_result(wire.result.as_deref()),
            disturbance_potential: non_empty(wire.disturbance_potential),
            sample_no: non_empty(wire.sample_no),
            sample_result: non_empty(wire.sample_result),
            identifying_company: non_empty(wire.identifying_company),
            quantity: non_empty(wire.quantity),
            removal_status: non_empty(wire.removal_status),
            page_number: wire.page_number.or(context_in.current_page),
            confidence,
            extraction_confidence: None,
            data_issues,
        };

        ExtractionCandidate {
            draft,
            confidence,
            chunk_index,
        }
    }
}

/// Canonicalize the classification result
///
/// Registers spell the result many ways ("NAD", "No asbestos detected",
/// "Assumed ACM"); everything maps onto the four canonical values, with
/// unrecognized wording kept verbatim for the auditor.
fn normalize_result(raw: Option<&str>) -> String {
    let trimmed = match raw.map(str::trim) {
        None | Some("") => return "Unknown".to_string(),
        Some(s) => s,
    };

    let lower = trimmed.to_lowercase();
    // "not detected" checks must run before the "detected" check
    if lower.contains("not detected") || lower.contains("no asbestos") || lower == "nad" {
        "Not Detected".to_string()
    } else if lower.contains("presumed") || lower.contains("assumed") {
        "Presumed".to_string()
    } else if lower.contains("detected") || lower.contains("positive") {
        "Detected".to_string()
    } else if lower == "unknown" || lower == "n/a" || lower == "-" {
        "Unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

fn matches_id(context_id: Option<&str>, id: &str) -> bool {
    context_id.is_some_and(|c| c.trim().eq_ignore_ascii_case(id.trim()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
