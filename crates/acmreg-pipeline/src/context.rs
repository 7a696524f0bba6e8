//! Building/room context tracking across chunk boundaries
//!
//! Register tables put location information in section headers, not in
//! per-row columns, so item rows must inherit whatever building and
//! room headers were last seen - possibly in an earlier chunk. The
//! tracker recognizes those headers and folds them into a
//! [`BuildingRoomContext`] value that the orchestrator threads from
//! chunk to chunk.

use crate::config::HeaderPatterns;
use acmreg_domain::fields::AreaType;
use acmreg_domain::BuildingRoomContext;
use regex::Regex;
use tracing::debug;

/// Recognizes structure headers and maintains location context
///
/// Stateless between calls: `scan` takes a context in and returns a new
/// context out, so concurrent runs over different documents can share
/// one tracker without interference.
pub struct ContextTracker {
    building: Regex,
    room: Regex,
    area_type: Regex,
    school: Regex,
    page_marker: Regex,
}

impl ContextTracker {
    /// Compile the configured header patterns
    pub fn new(patterns: &HeaderPatterns) -> Result<Self, regex::Error> {
        Ok(Self {
            building: Regex::new(&patterns.building)?,
            room: Regex::new(&patterns.room)?,
            area_type: Regex::new(&patterns.area_type)?,
            school: Regex::new(&patterns.school)?,
            page_marker: Regex::new(&patterns.page_marker)?,
        })
    }

    /// Fold the header lines of `text` into a copy of `context_in`
    ///
    /// Lines matching no header pattern leave the context untouched.
    /// The room pattern is tried before the building pattern because a
    /// room id (`B00A-R0001`) embeds a building id and would otherwise
    /// be misread as a building header.
    pub fn scan(&self, text: &str, context_in: &BuildingRoomContext) -> BuildingRoomContext {
        let mut ctx = context_in.clone();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = self.page_marker.captures(line) {
                if let Some(page) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
                    ctx.current_page = Some(page);
                }
                continue;
            }

            if let Some(caps) = self.room.captures(line) {
                let room_id: String = caps[1].chars().filter(|c| !c.is_whitespace()).collect();
                let room_name = caps.get(2).map(|m| m.as_str().trim().to_string());
                let room_area = caps.get(3).and_then(|m| m.as_str().parse::<f64>().ok());
                debug!("Room header: {}", room_id);
                ctx.enter_room(room_id, room_name, room_area);
                continue;
            }

            if let Some(caps) = self.building.captures(line) {
                let building_id = caps[1].trim().to_string();
                let building_name = caps.get(2).map(|m| m.as_str().trim().to_string());
                let building_year = caps.get(3).and_then(|m| m.as_str().parse::<i32>().ok());
                let building_construction = caps.get(4).map(|m| m.as_str().trim().to_string());
                debug!("Building header: {}", building_id);
                ctx.enter_building(building_id, building_name, building_year, building_construction);
                continue;
            }

            if let Some(caps) = self.area_type.captures(line) {
                let canonical = AreaType::parse(&caps[1])
                    .map(|a| a.as_str().to_string())
                    .unwrap_or_else(|| caps[1].trim().to_string());
                ctx.area_type = Some(canonical);
                continue;
            }

            if ctx.school_name.is_none() {
                if let Some(caps) = self.school.captures(line) {
                    let name = caps[1].trim().to_string();
                    if !name.is_empty() {
                        debug!("School title: {}", name);
                        ctx.school_name = Some(name);
                    }
                }
            }
        }

        ctx
    }
}
