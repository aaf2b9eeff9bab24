//! Merged scan result types
//!
//! A scan produces an ordered list of breed guesses from the vision model,
//! enriched with static reference facts for the top match. Reference fields
//! that could not be supplied carry an explicit sentinel, never an absent
//! field, so presenters render them without null checks.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One candidate breed with a confidence score (0-100)
///
/// Wire name for the score is `percentage` (vision service schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedGuess {
    pub name: String,
    #[serde(rename = "percentage")]
    pub confidence: f64,
}

/// A reference field that is either known or explicitly absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceField {
    Known(String),
    NotAvailable,
}

impl ReferenceField {
    /// Promote an optional string, treating blank values as absent
    pub fn from_option(value: Option<String>) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() => ReferenceField::Known(s),
            _ => ReferenceField::NotAvailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ReferenceField::Known(_))
    }
}

impl fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceField::Known(s) => f.write_str(s),
            ReferenceField::NotAvailable => f.write_str("Not available"),
        }
    }
}

/// Static reference facts for a breed
///
/// `Default` is the all-sentinel "empty reference" returned whenever the
/// reference lookup degrades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedReference {
    pub origin: ReferenceField,
    pub temperament: ReferenceField,
    pub lifespan: ReferenceField,
    pub size_and_weight: ReferenceField,
    pub common_traits: ReferenceField,
}

impl Default for BreedReference {
    fn default() -> Self {
        Self {
            origin: ReferenceField::NotAvailable,
            temperament: ReferenceField::NotAvailable,
            lifespan: ReferenceField::NotAvailable,
            size_and_weight: ReferenceField::NotAvailable,
            common_traits: ReferenceField::NotAvailable,
        }
    }
}

/// Final merged result of one scan
///
/// Invariant: a result with `is_dog == false` is never surfaced as a
/// successful scan; when true, `breeds` is non-empty and sorted descending
/// by confidence (primary breed at index 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub is_dog: bool,
    pub breeds: Vec<BreedGuess>,
    pub fact: String,
    pub reference: BreedReference,
}

impl ScanResult {
    /// Name of the highest-confidence breed
    pub fn primary_breed(&self) -> Option<&str> {
        self.breeds.first().map(|b| b.name.as_str())
    }
}

/// One committed history record
///
/// Owned exclusively by the history store once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique, timestamp-derived identifier
    pub id: String,
    /// Opaque display handle for the scanned image
    pub image_ref: String,
    pub result: ScanResult,
}

impl HistoryEntry {
    pub fn new(image_ref: String, result: ScanResult) -> Self {
        Self {
            id: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
            image_ref,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_field_from_option_treats_blank_as_absent() {
        assert_eq!(
            ReferenceField::from_option(Some("France".to_string())),
            ReferenceField::Known("France".to_string())
        );
        assert_eq!(
            ReferenceField::from_option(Some("   ".to_string())),
            ReferenceField::NotAvailable
        );
        assert_eq!(ReferenceField::from_option(None), ReferenceField::NotAvailable);
    }

    #[test]
    fn reference_field_display_renders_sentinel() {
        assert_eq!(ReferenceField::NotAvailable.to_string(), "Not available");
        assert_eq!(
            ReferenceField::Known("Friendly".to_string()).to_string(),
            "Friendly"
        );
    }

    #[test]
    fn default_reference_is_all_sentinel() {
        let reference = BreedReference::default();
        assert!(!reference.origin.is_available());
        assert!(!reference.temperament.is_available());
        assert!(!reference.lifespan.is_available());
        assert!(!reference.size_and_weight.is_available());
        assert!(!reference.common_traits.is_available());
    }

    #[test]
    fn history_entry_gets_timestamp_id() {
        let result = ScanResult {
            is_dog: true,
            breeds: vec![BreedGuess {
                name: "Beagle".to_string(),
                confidence: 91.0,
            }],
            fact: "Beagles were bred for scent tracking.".to_string(),
            reference: BreedReference::default(),
        };
        let entry = HistoryEntry::new("photo-1".to_string(), result);
        assert!(!entry.id.is_empty());
        assert_eq!(entry.image_ref, "photo-1");
    }
}
