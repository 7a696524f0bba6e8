//! Closed field vocabularies and lenient matching helpers
//!
//! Survey documents spell these values inconsistently, so the
//! enumerations here are advisory: unrecognized values are kept on the
//! record and flagged as a data issue rather than rejected.

/// Friability of an ACM item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Friable {
    /// Crumbles under hand pressure (higher release risk)
    Friable,
    /// Bonded material, lower release risk
    NonFriable,
}

impl Friable {
    /// Canonical register spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Friable::Friable => "Friable",
            Friable::NonFriable => "Non Friable",
        }
    }

    /// Lenient parse: tolerates case and the "non-friable" hyphen variant
    pub fn parse(s: &str) -> Option<Self> {
        let norm = s.trim().to_ascii_lowercase().replace('-', " ");
        match norm.as_str() {
            "friable" => Some(Friable::Friable),
            "non friable" | "nonfriable" => Some(Friable::NonFriable),
            _ => None,
        }
    }
}

/// Area classification for a room or location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaType {
    /// Inside a building
    Interior,
    /// Building exterior surfaces
    Exterior,
    /// Grounds, buried pits, fences
    Grounds,
}

impl AreaType {
    /// Canonical register spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaType::Interior => "Interior",
            AreaType::Exterior => "Exterior",
            AreaType::Grounds => "Grounds",
        }
    }

    /// Lenient, case-insensitive parse
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interior" => Some(AreaType::Interior),
            "exterior" => Some(AreaType::Exterior),
            "grounds" => Some(AreaType::Grounds),
            _ => None,
        }
    }
}

/// Assessed risk level for an ACM item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskStatus {
    /// Material stable, undisturbed
    Low,
    /// Material showing wear or in a trafficked area
    Medium,
    /// Material damaged or friable in an occupied space
    High,
}

impl RiskStatus {
    /// Canonical register spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::Low => "Low",
            RiskStatus::Medium => "Medium",
            RiskStatus::High => "High",
        }
    }

    /// Lenient, case-insensitive parse
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskStatus::Low),
            "medium" => Some(RiskStatus::Medium),
            "high" => Some(RiskStatus::High),
            _ => None,
        }
    }
}
