//! Confidence-weighted merging of extraction candidates
//!
//! Chunk overlap at section boundaries and model repetition both
//! produce the same register row more than once. Candidates describing
//! the same material at the same location collapse to one record, the
//! higher-confidence description winning.

use crate::types::{ConfidenceCounts, ExtractionCandidate, RiskCounts};
use acmreg_domain::fields::RiskStatus;
use acmreg_domain::AcmRecord;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Result of merging and validating one run's candidates
#[derive(Debug)]
pub struct MergeOutcome {
    /// Validated records in first-seen order
    pub records: Vec<AcmRecord>,
    /// Candidates absorbed into an earlier or better duplicate
    pub duplicates_merged: usize,
    /// Candidates rejected by record validation
    pub validation_drops: usize,
    /// One human-readable summary per dropped candidate
    pub drop_summaries: Vec<String>,
}

/// Collapse duplicate candidates and validate the survivors
pub fn merge_candidates(candidates: Vec<ExtractionCandidate>) -> MergeOutcome {
    let mut winners: Vec<ExtractionCandidate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut duplicates_merged = 0;

    for candidate in candidates {
        let key = identity_key(&candidate);
        match index.get(&key) {
            None => {
                index.insert(key, winners.len());
                winners.push(candidate);
            }
            Some(&slot) => {
                duplicates_merged += 1;
                let existing = &mut winners[slot];
                merge_pair(existing, candidate);
            }
        }
    }

    let mut records = Vec::new();
    let mut drop_summaries = Vec::new();

    for winner in winners {
        let chunk_index = winner.chunk_index;
        let product = winner.draft.product.clone();
        match winner.draft.validate() {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!("Dropping candidate from chunk {}: {}", chunk_index, err);
                drop_summaries.push(format!(
                    "chunk {}: '{}' dropped: {}",
                    chunk_index,
                    truncate(&product, 40),
                    err
                ));
            }
        }
    }

    debug!(
        "Merge complete: {} records, {} duplicates, {} dropped",
        records.len(),
        duplicates_merged,
        drop_summaries.len()
    );

    MergeOutcome {
        records,
        duplicates_merged,
        validation_drops: drop_summaries.len(),
        drop_summaries,
    }
}

/// Fold a newly-seen duplicate into the kept candidate
///
/// A strictly higher confidence tier replaces the kept description;
/// ties keep the first-seen one. Data issues are unioned either way,
/// and a missing page number inherits from the duplicate.
fn merge_pair(existing: &mut ExtractionCandidate, incoming: ExtractionCandidate) {
    if incoming.confidence > existing.confidence {
        let prior_issues = std::mem::take(&mut existing.draft.data_issues);
        let prior_page = existing.draft.page_number;

        *existing = incoming;

        let new_issues = std::mem::take(&mut existing.draft.data_issues);
        existing.draft.data_issues = union_issues(prior_issues, new_issues);
        existing.draft.page_number = existing.draft.page_number.or(prior_page);
    } else {
        let incoming_issues = incoming.draft.data_issues;
        let existing_issues = std::mem::take(&mut existing.draft.data_issues);
        existing.draft.data_issues = union_issues(existing_issues, incoming_issues);
        existing.draft.page_number = existing.draft.page_number.or(incoming.draft.page_number);
    }
}

/// Count validated records by confidence tier and risk bucket
pub fn count_records(records: &[AcmRecord]) -> (ConfidenceCounts, RiskCounts) {
    let mut by_confidence = ConfidenceCounts::default();
    let mut by_risk = RiskCounts::default();

    for record in records {
        match record.confidence {
            acmreg_domain::Confidence::High => by_confidence.high += 1,
            acmreg_domain::Confidence::Medium => by_confidence.medium += 1,
            acmreg_domain::Confidence::Low => by_confidence.low += 1,
        }

        match record.risk_status.as_deref().and_then(RiskStatus::parse) {
            Some(RiskStatus::Low) => by_risk.low += 1,
            Some(RiskStatus::Medium) => by_risk.medium += 1,
            Some(RiskStatus::High) => by_risk.high += 1,
            None => by_risk.unknown += 1,
        }
    }

    (by_confidence, by_risk)
}

/// Location-and-material identity used for duplicate detection
fn identity_key(candidate: &ExtractionCandidate) -> String {
    let draft = &candidate.draft;
    format!(
        "{}|{}|{}|{}",
        normalize(&draft.building_id),
        normalize(draft.room_id.as_deref().unwrap_or("")),
        normalize(&draft.product),
        normalize(&draft.material_description),
    )
}

/// Lowercase and collapse internal whitespace for key comparison
fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Union two issue lists, preserving first-seen order
fn union_issues(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    let mut merged = first;
    for issue in second {
        if !merged.contains(&issue) {
            merged.push(issue);
        }
    }
    merged
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        value.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acmreg_domain::{Confidence, RecordDraft};

    fn candidate(
        building: &str,
        room: &str,
        product: &str,
        confidence: Confidence,
        chunk_index: usize,
    ) -> ExtractionCandidate {
        ExtractionCandidate {
            draft: RecordDraft {
                source_id: "doc_001".to_string(),
                school_name: "Example Primary School".to_string(),
                building_id: building.to_string(),
                room_id: if room.is_empty() {
                    None
                } else {
                    Some(room.to_string())
                },
                product: product.to_string(),
                material_description: "AC sheet".to_string(),
                result: "Presumed".to_string(),
                confidence,
                ..Default::default()
            },
            confidence,
            chunk_index,
        }
    }

    #[test]
    fn test_distinct_candidates_all_kept() {
        let outcome = merge_candidates(vec![
            candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Medium, 0),
            candidate("B001", "B001-R0002", "Floor Tiles", Confidence::Medium, 0),
            candidate("B002", "B002-R0001", "Eaves Lining", Confidence::Medium, 1),
        ]);

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.duplicates_merged, 0);
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let outcome = merge_candidates(vec![
            candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Medium, 0),
            candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Medium, 1),
        ]);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.duplicates_merged, 1);
    }

    #[test]
    fn test_key_ignores_case_and_spacing() {
        let outcome = merge_candidates(vec![
            candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Medium, 0),
            candidate("b001", "B001-R0001", "floor   tiles", Confidence::Medium, 1),
        ]);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.duplicates_merged, 1);
    }

    #[test]
    fn test_higher_confidence_wins() {
        let mut low = candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Low, 0);
        low.draft.material_condition = Some("Poor".to_string());
        let mut high = candidate("B001", "B001-R0001", "Floor Tiles", Confidence::High, 1);
        high.draft.material_condition = Some("Good".to_string());

        let outcome = merge_candidates(vec![low, high]);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].confidence, Confidence::High);
        assert_eq!(outcome.records[0].material_condition.as_deref(), Some("Good"));
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let mut first = candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Medium, 0);
        first.draft.material_condition = Some("Good".to_string());
        let mut second = candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Medium, 1);
        second.draft.material_condition = Some("Fair".to_string());

        let outcome = merge_candidates(vec![first, second]);

        assert_eq!(outcome.records[0].material_condition.as_deref(), Some("Good"));
    }

    #[test]
    fn test_issues_unioned_across_duplicates() {
        let mut first = candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Low, 0);
        first.draft.data_issues = vec!["building_id inferred from document context".to_string()];
        let mut second = candidate("B001", "B001-R0001", "Floor Tiles", Confidence::High, 1);
        second.draft.data_issues = vec![
            "building_id inferred from document context".to_string(),
            "extraction note: row partially legible".to_string(),
        ];

        let outcome = merge_candidates(vec![first, second]);

        assert_eq!(
            outcome.records[0].data_issues,
            vec![
                "building_id inferred from document context".to_string(),
                "extraction note: row partially legible".to_string(),
            ]
        );
    }

    #[test]
    fn test_page_number_inherited() {
        let mut first = candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Medium, 0);
        first.draft.page_number = Some(4);
        let second = candidate("B001", "B001-R0001", "Floor Tiles", Confidence::High, 1);

        let outcome = merge_candidates(vec![first, second]);

        // The high-confidence winner had no page, so it inherits page 4
        assert_eq!(outcome.records[0].page_number, Some(4));
    }

    #[test]
    fn test_invalid_candidates_dropped_with_summary() {
        let mut bad = candidate("B001", "", "Floor Tiles", Confidence::Medium, 2);
        bad.draft.material_description = String::new();

        let outcome = merge_candidates(vec![
            candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Medium, 0),
            bad,
        ]);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.validation_drops, 1);
        assert_eq!(outcome.drop_summaries.len(), 1);
        assert!(outcome.drop_summaries[0].contains("chunk 2"));
        assert!(outcome.drop_summaries[0].contains("material_description"));
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let outcome = merge_candidates(vec![
            candidate("B002", "B002-R0001", "Eaves Lining", Confidence::Medium, 0),
            candidate("B001", "B001-R0001", "Floor Tiles", Confidence::Medium, 0),
            candidate("B002", "B002-R0001", "Eaves Lining", Confidence::High, 1),
        ]);

        assert_eq!(outcome.records[0].building_id, "B002");
        assert_eq!(outcome.records[1].building_id, "B001");
    }

    #[test]
    fn test_count_records() {
        let records: Vec<AcmRecord> = vec![
            {
                let mut c = candidate("B001", "B001-R0001", "Floor Tiles", Confidence::High, 0);
                c.draft.risk_status = Some("Low".to_string());
                c.draft.validate().unwrap()
            },
            {
                let mut c = candidate("B001", "B001-R0002", "Eaves Lining", Confidence::Medium, 0);
                c.draft.risk_status = Some("High".to_string());
                c.draft.validate().unwrap()
            },
            candidate("B002", "B002-R0001", "Pipe Lagging", Confidence::Medium, 1)
                .draft
                .validate()
                .unwrap(),
        ];

        let (by_confidence, by_risk) = count_records(&records);

        assert_eq!(by_confidence.high, 1);
        assert_eq!(by_confidence.medium, 2);
        assert_eq!(by_confidence.low, 0);
        assert_eq!(by_risk.low, 1);
        assert_eq!(by_risk.high, 1);
        assert_eq!(by_risk.unknown, 1);
    }
}
