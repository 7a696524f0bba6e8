//! Building/room location context carried across document chunks

/// The currently-active hierarchical position while scanning a document
///
/// Register tables are formatted as a narrative hierarchy (building
/// section headers containing nested room subsections followed by item
/// rows), so each item row inherits whatever building/room header was
/// last seen. The context is a plain value: the tracker returns an
/// updated copy for each chunk, and the orchestrator threads it from
/// the end of chunk N into the start of chunk N+1. A building header
/// always clears the room fields; a stale room must never survive a
/// building boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingRoomContext {
    /// School or facility name, usually from the document title
    pub school_name: Option<String>,
    /// School code/identifier
    pub school_code: Option<String>,
    /// Current building identifier
    pub building_id: Option<String>,
    /// Current building name
    pub building_name: Option<String>,
    /// Current building construction year
    pub building_year: Option<i32>,
    /// Current building construction type
    pub building_construction: Option<String>,
    /// Current room identifier
    pub room_id: Option<String>,
    /// Current room name
    pub room_name: Option<String>,
    /// Current room area in square meters
    pub room_area: Option<f64>,
    /// Current area type ("Interior", "Exterior", "Grounds")
    pub area_type: Option<String>,
    /// Last page marker seen
    pub current_page: Option<u32>,
}

impl BuildingRoomContext {
    /// Fully-empty context, the state at document start
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the building fields and clear all room fields
    ///
    /// Room context does not carry across building boundaries, and the
    /// area type resets because each building section restates it.
    pub fn enter_building(
        &mut self,
        building_id: String,
        building_name: Option<String>,
        building_year: Option<i32>,
        building_construction: Option<String>,
    ) {
        self.building_id = Some(building_id);
        self.building_name = building_name;
        self.building_year = building_year;
        self.building_construction = building_construction;
        self.clear_room();
        self.area_type = None;
    }

    /// Replace the room fields, preserving the current building
    pub fn enter_room(
        &mut self,
        room_id: String,
        room_name: Option<String>,
        room_area: Option<f64>,
    ) {
        self.room_id = Some(room_id);
        self.room_name = room_name;
        self.room_area = room_area;
    }

    /// Drop all room-level fields
    pub fn clear_room(&mut self) {
        self.room_id = None;
        self.room_name = None;
        self.room_area = None;
    }

    /// True when no building has been seen yet
    pub fn is_empty(&self) -> bool {
        self.building_id.is_none() && self.room_id.is_none() && self.school_name.is_none()
    }
}
