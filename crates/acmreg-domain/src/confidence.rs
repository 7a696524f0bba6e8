//! Extraction confidence tiers

use std::fmt;

/// Confidence tier assigned to an extracted record
///
/// Tiers carry a total order (high > medium > low) used by the merge
/// engine to decide which duplicate's field values survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Confidence {
    /// Extraction required guesswork or the source was badly formatted
    Low,
    /// Extraction is plausible but some fields were ambiguous
    Medium,
    /// Extraction matched a well-formed table row
    High,
}

impl Confidence {
    /// Numeric rank for merge comparisons (higher wins)
    pub fn rank(&self) -> u8 {
        match self {
            Confidence::Low => 1,
            Confidence::Medium => 2,
            Confidence::High => 3,
        }
    }

    /// Canonical lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// Parse a tier label, case-insensitively
    ///
    /// Returns `None` for anything outside the closed vocabulary so the
    /// caller can decide whether to default or flag the value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Confidence::Low),
            "medium" => Some(Confidence::Medium),
            "high" => Some(Confidence::High),
            _ => None,
        }
    }
}

impl Default for Confidence {
    /// The model defaults uncertain extractions to medium
    fn default() -> Self {
        Confidence::Medium
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_ordering() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Low);
        assert_eq!(Confidence::High.rank(), 3);
        assert_eq!(Confidence::Low.rank(), 1);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(Confidence::parse("HIGH"), Some(Confidence::High));
        assert_eq!(Confidence::parse(" medium "), Some(Confidence::Medium));
        assert_eq!(Confidence::parse("low"), Some(Confidence::Low));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Confidence::parse("unclear"), None);
        assert_eq!(Confidence::parse(""), None);
    }

    #[test]
    fn test_display_round_trip() {
        for tier in [Confidence::Low, Confidence::Medium, Confidence::High] {
            assert_eq!(Confidence::parse(&tier.to_string()), Some(tier));
        }
    }
}
