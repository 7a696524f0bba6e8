//! Record assembly and invariant enforcement
//!
//! A [`RecordDraft`] holds candidate field values exactly as extracted.
//! [`RecordDraft::validate`] is the only way to obtain an [`AcmRecord`],
//! so every record in the system has passed the required-field and
//! range invariants.

use crate::confidence::Confidence;
use crate::fields::{AreaType, Friable, RiskStatus};
use crate::record::{now_epoch_secs, AcmRecord, RecordId};
use std::fmt;

/// A record failed required-field or range invariants
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was empty after trimming whitespace
    EmptyField(&'static str),
    /// `extraction_confidence` fell outside [0, 1]
    ConfidenceOutOfRange(f64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => {
                write!(f, "required field '{}' is empty", field)
            }
            ValidationError::ConfidenceOutOfRange(value) => {
                write!(
                    f,
                    "extraction_confidence {} outside valid range [0, 1]",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Candidate field values for one ACM record, prior to validation
///
/// Required fields are plain `String`s (empty means missing); optional
/// fields default to `None`, never to an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDraft {
    /// Owning source document reference
    pub source_id: String,
    /// School or facility name (required)
    pub school_name: String,
    /// School code/identifier
    pub school_code: Option<String>,
    /// Building identifier (required)
    pub building_id: String,
    /// Building name
    pub building_name: Option<String>,
    /// Building construction year
    pub building_year: Option<i32>,
    /// Building construction type
    pub building_construction: Option<String>,
    /// Room identifier
    pub room_id: Option<String>,
    /// Room name
    pub room_name: Option<String>,
    /// Room area in square meters
    pub room_area: Option<f64>,
    /// Area type
    pub area_type: Option<String>,
    /// Product containing asbestos (required)
    pub product: String,
    /// Material description (required)
    pub material_description: String,
    /// Extent/coverage
    pub extent: Option<String>,
    /// Location within the room
    pub location: Option<String>,
    /// Friability
    pub friable: Option<String>,
    /// Material condition
    pub material_condition: Option<String>,
    /// Risk level
    pub risk_status: Option<String>,
    /// Classification result (required)
    pub result: String,
    /// Likelihood of disturbance
    pub disturbance_potential: Option<String>,
    /// Sample identification number
    pub sample_no: Option<String>,
    /// Laboratory analysis result
    pub sample_result: Option<String>,
    /// Inspecting hygiene company
    pub identifying_company: Option<String>,
    /// Amount of material
    pub quantity: Option<String>,
    /// Removal status
    pub removal_status: Option<String>,
    /// Source page number
    pub page_number: Option<u32>,
    /// Extraction confidence tier
    pub confidence: Confidence,
    /// Numeric extraction confidence in [0, 1]
    pub extraction_confidence: Option<f64>,
    /// Data quality issues collected during extraction
    pub data_issues: Vec<String>,
}

impl RecordDraft {
    /// Enforce record invariants and assemble the final [`AcmRecord`]
    ///
    /// - Trims every string field; optional fields that trim to empty
    ///   become `None`
    /// - Rejects any required field that is empty after trimming
    /// - Normalizes `source_id` to carry the `source:` table prefix
    /// - Rejects `extraction_confidence` outside [0, 1]; the caller
    ///   decides whether to discard or flag the record
    /// - Checks `friable`/`area_type`/`risk_status` against their
    ///   closed vocabularies; out-of-enum values are kept as provided
    ///   and flagged in `data_issues`
    pub fn validate(self) -> Result<AcmRecord, ValidationError> {
        let school_name = required(&self.school_name, "school_name")?;
        let building_id = required(&self.building_id, "building_id")?;
        let product = required(&self.product, "product")?;
        let material_description = required(&self.material_description, "material_description")?;
        let result = required(&self.result, "result")?;

        if let Some(value) = self.extraction_confidence {
            // NaN fails the range check too
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::ConfidenceOutOfRange(value));
            }
        }

        let mut data_issues = dedup_issues(self.data_issues);

        let friable = optional(self.friable);
        if let Some(v) = &friable {
            if Friable::parse(v).is_none() {
                data_issues.push(format!("unrecognized friable value: '{}'", v));
            }
        }

        let area_type = optional(self.area_type);
        if let Some(v) = &area_type {
            if AreaType::parse(v).is_none() {
                data_issues.push(format!("unrecognized area_type value: '{}'", v));
            }
        }

        let risk_status = optional(self.risk_status);
        if let Some(v) = &risk_status {
            if RiskStatus::parse(v).is_none() {
                data_issues.push(format!("unrecognized risk_status value: '{}'", v));
            }
        }

        let now = now_epoch_secs();

        Ok(AcmRecord {
            id: RecordId::new(),
            source_id: normalize_source_id(&self.source_id),
            school_name,
            school_code: optional(self.school_code),
            building_id,
            building_name: optional(self.building_name),
            building_year: self.building_year,
            building_construction: optional(self.building_construction),
            room_id: optional(self.room_id),
            room_name: optional(self.room_name),
            room_area: self.room_area,
            area_type,
            product,
            material_description,
            extent: optional(self.extent),
            location: optional(self.location),
            friable,
            material_condition: optional(self.material_condition),
            risk_status,
            result,
            disturbance_potential: optional(self.disturbance_potential),
            sample_no: optional(self.sample_no),
            sample_result: optional(self.sample_result),
            identifying_company: optional(self.identifying_company),
            quantity: optional(self.quantity),
            removal_status: optional(self.removal_status),
            page_number: self.page_number,
            confidence: self.confidence,
            extraction_confidence: self.extraction_confidence,
            data_issues,
            created: now,
            updated: now,
        })
    }
}

/// Trim a required field, rejecting when nothing is left
fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional field; empty-after-trim collapses to `None`
fn optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Ensure the source reference carries its owning-table prefix
///
/// Upstream callers have drifted between `source:<id>` and bare `<id>`
/// formats; records always persist the prefixed form.
fn normalize_source_id(source_id: &str) -> String {
    let trimmed = source_id.trim();
    if trimmed.starts_with("source:") {
        trimmed.to_string()
    } else {
        format!("source:{}", trimmed)
    }
}

/// De-duplicate issue strings, preserving first-seen order
fn dedup_issues(issues: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for issue in issues {
        if !seen.contains(&issue) {
            seen.push(issue);
        }
    }
    seen
}
