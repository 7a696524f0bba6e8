//! Record module - one physical ACM item and its identifier

use crate::confidence::Confidence;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for an ACM record, a UUIDv7
///
/// Every record minted by a pipeline run gets a fresh id, so two
/// extractions of the same document yield distinct identities. UUIDv7
/// puts the generation time in the high bits, so the `Ord` on the raw
/// value sorts records by when they were extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u128);

impl RecordId {
    /// Generate a new UUIDv7-based RecordId
    ///
    /// # Examples
    ///
    /// ```
    /// use acmreg_domain::RecordId;
    ///
    /// let id = RecordId::new();
    /// assert_ne!(id, RecordId::new());
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Parse a RecordId back from its string form, as printed by
    /// `Display`
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// One ACM item extracted from a SAMP (School Asbestos Management Plan)
/// or ACM register document
///
/// Records capture the School > Building > Room > Item hierarchy along
/// with the substance description, extraction provenance, and any data
/// quality issues noticed along the way. Optional fields default to
/// `None`, never to an empty string, so records produced before the
/// extraction-metadata fields existed stay readable.
///
/// Records are immutable once returned by the pipeline; manual edits
/// and deletion belong to the external CRUD layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AcmRecord {
    /// Unique identifier
    pub id: RecordId,

    /// Owning source document, always in `source:<ref>` form
    pub source_id: String,

    /// Name of the school or facility (required)
    pub school_name: String,

    /// School code/identifier (e.g. "PS123")
    pub school_code: Option<String>,

    /// Building identifier (e.g. "B00A") (required)
    pub building_id: String,

    /// Building name (e.g. "Admin Block")
    pub building_name: Option<String>,

    /// Year the building was constructed
    pub building_year: Option<i32>,

    /// Construction type (e.g. "Brick", "Demountable")
    pub building_construction: Option<String>,

    /// Room identifier within the building (e.g. "B00A-R0001")
    pub room_id: Option<String>,

    /// Room name (e.g. "Main Office")
    pub room_name: Option<String>,

    /// Room area in square meters
    pub room_area: Option<f64>,

    /// Area type: "Interior", "Exterior", or "Grounds"
    pub area_type: Option<String>,

    /// Product containing asbestos (e.g. "Floor Tiles") (required)
    pub product: String,

    /// Detailed description of the material (required)
    pub material_description: String,

    /// Extent/coverage of the material (e.g. "Whole ceiling")
    pub extent: Option<String>,

    /// Specific location within the room (e.g. "Under stairs")
    pub location: Option<String>,

    /// Friability: "Friable" or "Non Friable"
    pub friable: Option<String>,

    /// Condition: "Good", "Fair", "Poor", "Damaged"
    pub material_condition: Option<String>,

    /// Risk level: "Low", "Medium", "High"
    pub risk_status: Option<String>,

    /// Classification result (e.g. "Asbestos-containing material") (required)
    pub result: String,

    /// Likelihood of material disturbance
    pub disturbance_potential: Option<String>,

    /// Sample identification number from lab testing
    pub sample_no: Option<String>,

    /// Laboratory analysis result for the sample
    pub sample_result: Option<String>,

    /// Hygiene consulting company that performed the inspection
    pub identifying_company: Option<String>,

    /// Amount of material (e.g. "10 m²")
    pub quantity: Option<String>,

    /// Removal status (e.g. "N/A", "Pending", "Complete")
    pub removal_status: Option<String>,

    /// Page of the source document the item was found on
    pub page_number: Option<u32>,

    /// Extraction confidence tier
    pub confidence: Confidence,

    /// Numeric extraction confidence in [0, 1], when the model supplies one
    pub extraction_confidence: Option<f64>,

    /// Data quality issues identified during extraction
    pub data_issues: Vec<String>,

    /// Creation timestamp (seconds since Unix epoch)
    pub created: u64,

    /// Last-update timestamp (seconds since Unix epoch)
    pub updated: u64,
}

/// Current time as seconds since the Unix epoch
pub(crate) fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_generation() {
        let id1 = RecordId::new();
        let id2 = RecordId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_record_id_round_trip() {
        let id = RecordId::new();
        let parsed = RecordId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_record_ids_sort_by_generation_time() {
        let earlier = RecordId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let later = RecordId::new();
        assert!(earlier < later);
    }

    #[test]
    fn test_record_id_invalid_string() {
        assert!(RecordId::from_string("not-a-uuid").is_err());
    }
}
