//! Typed entities extracted from one protein entry.

use serde::Serialize;

use crate::error::SchemaError;

/// Maximum length, in characters, of a Feature name.
pub const FEATURE_NAME_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Protein {
    pub name: String,
    /// Base filename of the source document.
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organism {
    pub name: String,
    pub taxonomy_id: String,
}

/// A sequence annotation. `name` is `None` when the source has no description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub name: Option<String>,
    pub feature_type: String,
    pub position: String,
    /// The description was longer than `FEATURE_NAME_MAX_CHARS` and was cut.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl Feature {
    /// Build a feature, truncating the description to the name limit.
    pub fn new(description: Option<&str>, feature_type: impl Into<String>, position: impl Into<String>) -> Self {
        let (name, truncated) = match description {
            Some(text) => {
                let truncated = text.chars().count() > FEATURE_NAME_MAX_CHARS;
                (Some(text.chars().take(FEATURE_NAME_MAX_CHARS).collect()), truncated)
            }
            None => (None, false),
        };
        Self {
            name,
            feature_type: feature_type.into(),
            position: position.into(),
            truncated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gene {
    pub name: String,
    /// Gene name type: primary, synonym, ordered locus, ORF.
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: Option<String>,
}

/// A citation. Unnamed references are kept so their position in the entry
/// is known, but they never reach the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub name: Option<String>,
    pub citation_type: String,
    /// Citation key (`reference/@key`).
    pub key: String,
    pub authors: Vec<Author>,
}

/// Everything extracted from one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProteinEntry {
    pub protein: Protein,
    pub full_name: FullName,
    pub organism: Organism,
    pub features: Vec<Feature>,
    pub genes: Vec<Gene>,
    pub references: Vec<Reference>,
    /// Sub-entities that were dropped because they were malformed.
    #[serde(skip)]
    pub rejected: Vec<SchemaError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_name_truncated_by_chars() {
        let long = "é".repeat(60);
        let feature = Feature::new(Some(&long), "chain", "1");
        assert_eq!(feature.name.as_ref().unwrap().chars().count(), FEATURE_NAME_MAX_CHARS);
        assert!(feature.truncated);
    }

    #[test]
    fn test_feature_short_name_untouched() {
        let feature = Feature::new(Some("Hemoglobin subunit alpha"), "chain", "2");
        assert_eq!(feature.name.as_deref(), Some("Hemoglobin subunit alpha"));
        assert!(!feature.truncated);

        let exact = "a".repeat(FEATURE_NAME_MAX_CHARS);
        assert!(!Feature::new(Some(&exact), "chain", "2").truncated);
    }

    #[test]
    fn test_feature_without_description() {
        let feature = Feature::new(None, "helix", "4");
        assert_eq!(feature.name, None);
        assert!(!feature.truncated);
    }
}
