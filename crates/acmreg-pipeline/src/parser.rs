//! Parse LLM output into wire records

use crate::error::ChunkError;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Chunk-level verdict reported by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireStatus {
    /// The chunk contained register rows
    Ok,
    /// The model saw no register content in the chunk
    NoAcmData,
}

/// One register row as the model emits it, before any backfilling
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireRecord {
    pub school_name: Option<String>,
    pub building_id: Option<String>,
    pub building_name: Option<String>,
    pub room_id: Option<String>,
    pub room_name: Option<String>,
    pub area_type: Option<String>,
    pub product: Option<String>,
    pub material_description: Option<String>,
    pub extent: Option<String>,
    pub location: Option<String>,
    pub friable: Option<String>,
    pub material_condition: Option<String>,
    pub risk_status: Option<String>,
    pub result: Option<String>,
    pub disturbance_potential: Option<String>,
    pub sample_no: Option<String>,
    pub sample_result: Option<String>,
    pub identifying_company: Option<String>,
    pub quantity: Option<String>,
    pub removal_status: Option<String>,
    pub page_number: Option<u32>,
    pub confidence: Option<String>,
    pub notes: Option<String>,
}

/// Fully parsed model response for one chunk
#[derive(Debug)]
pub struct ParsedResponse {
    pub status: WireStatus,
    pub records: Vec<WireRecord>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    status: WireStatus,
    #[serde(default)]
    records: Vec<Value>,
    #[serde(default)]
    notes: Option<String>,
}

/// Parse a model response into wire records
///
/// Accepts the `{status, records, notes}` envelope the prompt asks for,
/// and tolerates a bare JSON array of records since models drop the
/// envelope often enough. Individually malformed records are skipped
/// with a warning rather than failing the chunk.
pub fn parse_model_response(response: &str) -> Result<ParsedResponse, ChunkError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ChunkError::MalformedOutput(format!("JSON parse error: {}", e)))?;

    let (status, raw_records, notes) = match json {
        Value::Array(items) => (WireStatus::Ok, items, None),
        obj @ Value::Object(_) => {
            let envelope: WireEnvelope = serde_json::from_value(obj)
                .map_err(|e| ChunkError::MalformedOutput(format!("bad envelope: {}", e)))?;
            (envelope.status, envelope.records, envelope.notes)
        }
        other => {
            return Err(ChunkError::MalformedOutput(format!(
                "expected JSON object or array, got {}",
                type_name(&other)
            )))
        }
    };

    let mut records = Vec::new();
    for (idx, raw) in raw_records.into_iter().enumerate() {
        match serde_json::from_value::<WireRecord>(raw) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping unparseable record {}: {}", idx, e),
        }
    }

    Ok(ParsedResponse {
        status,
        records,
        notes,
    })
}

/// Extract JSON from a response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ChunkError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ChunkError::MalformedOutput("empty code block".to_string()));
        }

        // Skip first line (```json or ```) and last line (```)
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope() {
        let response = r#"{
            "status": "ok",
            "records": [
                {
                    "building_id": "B00A",
                    "room_id": "B00A-R0001",
                    "product": "Floor Tiles",
                    "material_description": "Vinyl asbestos tile",
                    "friable": "Non Friable",
                    "risk_status": "Low",
                    "result": "Presumed",
                    "confidence": "high"
                }
            ],
            "notes": null
        }"#;

        let parsed = parse_model_response(response).unwrap();
        assert_eq!(parsed.status, WireStatus::Ok);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].building_id.as_deref(), Some("B00A"));
        assert_eq!(parsed.records[0].product.as_deref(), Some("Floor Tiles"));
    }

    #[test]
    fn test_parse_no_acm_data() {
        let response = r#"{"status": "no_acm_data", "records": [], "notes": "table of contents"}"#;

        let parsed = parse_model_response(response).unwrap();
        assert_eq!(parsed.status, WireStatus::NoAcmData);
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.notes.as_deref(), Some("table of contents"));
    }

    #[test]
    fn test_parse_bare_array() {
        let response = r#"[
            {"product": "Eaves Lining", "material_description": "AC sheet", "result": "Detected"}
        ]"#;

        let parsed = parse_model_response(response).unwrap();
        assert_eq!(parsed.status, WireStatus::Ok);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].product.as_deref(), Some("Eaves Lining"));
    }

    #[test]
    fn test_parse_markdown_wrapped() {
        let response = "```json\n{\"status\": \"ok\", \"records\": []}\n```";

        let parsed = parse_model_response(response).unwrap();
        assert_eq!(parsed.status, WireStatus::Ok);
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn test_parse_markdown_without_language() {
        let response = "```\n{\"status\": \"ok\", \"records\": []}\n```";
        assert!(parse_model_response(response).is_ok());
    }

    #[test]
    fn test_parse_prose_is_malformed() {
        let result = parse_model_response("I could not find any asbestos records.");
        assert!(matches!(result, Err(ChunkError::MalformedOutput(_))));
    }

    #[test]
    fn test_parse_unknown_status_is_malformed() {
        let result = parse_model_response(r#"{"status": "maybe", "records": []}"#);
        assert!(matches!(result, Err(ChunkError::MalformedOutput(_))));
    }

    #[test]
    fn test_parse_scalar_is_malformed() {
        let result = parse_model_response("42");
        assert!(matches!(result, Err(ChunkError::MalformedOutput(_))));
    }

    #[test]
    fn test_skips_unparseable_records() {
        let response = r#"{
            "status": "ok",
            "records": [
                {"product": "Floor Tiles"},
                "not an object",
                {"product": "Eaves Lining"}
            ]
        }"#;

        let parsed = parse_model_response(response).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].product.as_deref(), Some("Floor Tiles"));
        assert_eq!(parsed.records[1].product.as_deref(), Some("Eaves Lining"));
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let response = r#"{
            "status": "ok",
            "records": [{"product": "Pipe Lagging", "surprise_field": true}]
        }"#;

        let parsed = parse_model_response(response).unwrap();
        assert_eq!(parsed.records.len(), 1);
    }

    #[test]
    fn test_extract_json_plain() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_json_markdown() {
        let response = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap().trim(), r#"{"key": "value"}"#);
    }
}
