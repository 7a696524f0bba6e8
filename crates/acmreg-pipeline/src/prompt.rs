//! LLM prompt engineering for register extraction

use acmreg_domain::BuildingRoomContext;

/// Builds prompts for the LLM to extract register rows from one chunk
pub struct PromptBuilder {
    text: String,
    chunk_index: usize,
    total_chunks: usize,
    context: BuildingRoomContext,
}

impl PromptBuilder {
    /// Create a new prompt builder for one chunk of document text
    pub fn new(text: String, chunk_index: usize, total_chunks: usize) -> Self {
        Self {
            text,
            chunk_index,
            total_chunks,
            context: BuildingRoomContext::empty(),
        }
    }

    /// Add the location context carried in from earlier chunks
    pub fn with_context(mut self, context: BuildingRoomContext) -> Self {
        self.context = context;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Instruction and format specification
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Position within the document
        prompt.push_str(&format!(
            "This is chunk {} of {} of the document.\n\n",
            self.chunk_index + 1,
            self.total_chunks
        ));

        // 3. Context carried in from earlier chunks (if any)
        if !self.context.is_empty() {
            prompt.push_str("Location context from earlier in the document:\n");
            if let Some(school) = &self.context.school_name {
                prompt.push_str(&format!("- School: {}\n", school));
            }
            if let Some(building) = &self.context.building_id {
                match &self.context.building_name {
                    Some(name) => {
                        prompt.push_str(&format!("- Current building: {} ({})\n", building, name))
                    }
                    None => prompt.push_str(&format!("- Current building: {}\n", building)),
                }
            }
            if let Some(room) = &self.context.room_id {
                match &self.context.room_name {
                    Some(name) => {
                        prompt.push_str(&format!("- Current room: {} ({})\n", room, name))
                    }
                    None => prompt.push_str(&format!("- Current room: {}\n", room)),
                }
            }
            if let Some(area) = &self.context.area_type {
                prompt.push_str(&format!("- Current area type: {}\n", area));
            }
            prompt.push_str(
                "Rows appearing before any new building or room header belong to this context.\n\n",
            );
        }

        // 4. The text to analyze
        prompt.push_str("Document text:\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.text);
        prompt.push_str("\n---\n\n");

        // 5. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    /// Build a repair prompt asking the model to fix its malformed output
    ///
    /// Re-sends the full extraction prompt so the model still has the
    /// document text in front of it, with the repair framing appended.
    pub fn build_repair(&self, bad_output: &str) -> String {
        let mut prompt = self.build();

        prompt.push_str(
            "\n\nYour previous response could not be parsed as the required JSON object.\n\n",
        );
        prompt.push_str("Previous response:\n");
        prompt.push_str("---\n");
        prompt.push_str(bad_output);
        prompt.push_str("\n---\n\n");
        prompt.push_str(
            "Redo the extraction and return valid JSON matching the required schema exactly. \
             Do not add commentary or markdown code blocks.",
        );

        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are extracting rows from a school Asbestos Containing Material (ACM) register.
The text comes from an Asbestos Management Plan and mixes register tables with prose, headers, and page furniture.

Extract one record per register row describing a material at a location. Each record has these fields:

{
  "school_name": "school the register belongs to",
  "building_id": "building code, e.g. B00A",
  "building_name": "building name if stated",
  "room_id": "room code, e.g. B00A-R0001",
  "room_name": "room name if stated",
  "area_type": "Interior, Exterior, or Grounds",
  "product": "product containing the material, e.g. Floor Tiles",
  "material_description": "description of the material, e.g. Vinyl asbestos tile",
  "extent": "quantity or coverage if stated",
  "location": "position within the room if stated",
  "friable": "Friable or Non Friable",
  "material_condition": "condition as stated, e.g. Good",
  "risk_status": "Low, Medium, or High",
  "result": "Detected, Not Detected, Presumed, or Unknown",
  "disturbance_potential": "if stated",
  "sample_no": "laboratory sample number if stated",
  "sample_result": "laboratory result if stated",
  "identifying_company": "assessor or hygienist company if stated",
  "quantity": "amount if stated",
  "removal_status": "removal or remediation status if stated",
  "page_number": page number the row appears on, or null,
  "confidence": "high, medium, or low",
  "notes": "anything ambiguous about this row"
}

Rules:
- One record per register row, never invent rows
- Rows inherit the building and room from the nearest preceding header
- Omit fields the row does not state rather than guessing
- "Presumed" means the material was assumed to contain asbestos without sampling
- Set confidence to "high" only when every populated field is read directly from the row
- Set confidence to "low" when the row is truncated, garbled, or its location is uncertain"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON object only, no additional text):
{
  "status": "ok",
  "records": [ ...records as specified above... ],
  "notes": null
}

If the text contains no register rows at all, return:
{
  "status": "no_acm_data",
  "records": [],
  "notes": "brief reason"
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_text() {
        let builder = PromptBuilder::new(
            "Floor Tiles | Vinyl asbestos tile".to_string(),
            0,
            1,
        );

        let prompt = builder.build();
        assert!(prompt.contains("Floor Tiles | Vinyl asbestos tile"));
    }

    #[test]
    fn test_prompt_includes_instructions() {
        let prompt = PromptBuilder::new("Test text".to_string(), 0, 1).build();
        assert!(prompt.contains("Asbestos Containing Material"));
        assert!(prompt.contains("material_description"));
        assert!(prompt.contains("no_acm_data"));
    }

    #[test]
    fn test_prompt_includes_chunk_position() {
        let prompt = PromptBuilder::new("Test".to_string(), 2, 5).build();
        assert!(prompt.contains("chunk 3 of 5"));
    }

    #[test]
    fn test_prompt_includes_carried_context() {
        let mut context = BuildingRoomContext::empty();
        context.school_name = Some("Springfield Primary School".to_string());
        context.enter_building("B00A".to_string(), Some("Admin Block".to_string()), Some(1924), None);
        context.enter_room("B00A-R0001".to_string(), Some("Main Office".to_string()), None);

        let prompt = PromptBuilder::new("Test".to_string(), 1, 3)
            .with_context(context)
            .build();

        assert!(prompt.contains("Location context from earlier"));
        assert!(prompt.contains("Springfield Primary School"));
        assert!(prompt.contains("B00A (Admin Block)"));
        assert!(prompt.contains("B00A-R0001 (Main Office)"));
    }

    #[test]
    fn test_prompt_omits_context_block_when_empty() {
        let prompt = PromptBuilder::new("Test".to_string(), 0, 1).build();
        assert!(!prompt.contains("Location context from earlier"));
    }

    #[test]
    fn test_repair_prompt_quotes_bad_output() {
        let builder = PromptBuilder::new("Test".to_string(), 0, 1);
        let repair = builder.build_repair("here are the records you asked for: {...");

        assert!(repair.contains("could not be parsed"));
        assert!(repair.contains("here are the records you asked for"));
        assert!(repair.contains("Return ONLY valid JSON"));
    }

    #[test]
    fn test_repair_prompt_keeps_full_extraction_prompt() {
        let mut context = BuildingRoomContext::empty();
        context.enter_building("B001".to_string(), Some("Block A".to_string()), None, None);

        let builder = PromptBuilder::new(
            "Floor Tiles | Vinyl asbestos tile".to_string(),
            1,
            3,
        )
        .with_context(context);
        let repair = builder.build_repair("Sure, here is the register data.");

        // A prose refusal carries no extractable content, so the repair
        // prompt must re-supply the chunk and its instructions
        assert!(repair.contains("Floor Tiles | Vinyl asbestos tile"));
        assert!(repair.contains("Asbestos Containing Material"));
        assert!(repair.contains("chunk 2 of 3"));
        assert!(repair.contains("B001 (Block A)"));
        assert!(repair.contains("Sure, here is the register data."));
    }
}
