//! Upsert operation descriptors.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Property map of an upsert. Keys are fixed identifiers chosen by the mapper,
/// never taken from source data.
pub type PropertyMap = BTreeMap<&'static str, String>;

/// Node labels in the protein graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Label {
    Protein,
    FullName,
    Organism,
    Feature,
    Gene,
    Reference,
    Author,
}

impl Label {
    pub const ALL: [Label; 7] = [
        Label::Protein,
        Label::FullName,
        Label::Organism,
        Label::Feature,
        Label::Gene,
        Label::Reference,
        Label::Author,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Protein => "Protein",
            Label::FullName => "FullName",
            Label::Organism => "Organism",
            Label::Feature => "Feature",
            Label::Gene => "Gene",
            Label::Reference => "Reference",
            Label::Author => "Author",
        }
    }

    /// Properties that together identify a node with this label. A key left
    /// out of an upsert must be absent on the matched node too.
    pub fn identity_keys(&self) -> &'static [&'static str] {
        match self {
            Label::Protein => &["name", "id"],
            Label::FullName => &["name"],
            Label::Organism => &["name", "taxonomy_id"],
            Label::Feature => &["name", "type"],
            Label::Gene => &["name"],
            Label::Reference => &["name", "type", "id"],
            Label::Author => &["name"],
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship types in the protein graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RelType {
    HasFullName,
    InOrganism,
    HasFeature,
    FromGene,
    HasReference,
    HasAuthor,
}

impl RelType {
    pub const ALL: [RelType; 6] = [
        RelType::HasFullName,
        RelType::InOrganism,
        RelType::HasFeature,
        RelType::FromGene,
        RelType::HasReference,
        RelType::HasAuthor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelType::HasFullName => "HAS_FULL_NAME",
            RelType::InOrganism => "IN_ORGANISM",
            RelType::HasFeature => "HAS_FEATURE",
            RelType::FromGene => "FROM_GENE",
            RelType::HasReference => "HAS_REFERENCE",
            RelType::HasAuthor => "HAS_AUTHOR",
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match-or-create one node on its full property set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeUpsert {
    pub label: Label,
    pub properties: PropertyMap,
}

impl NodeUpsert {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            properties: PropertyMap::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.properties.insert(key, value.into());
        self
    }

    /// Set a property only when the source provided it.
    pub fn with_opt(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.properties.insert(key, value.to_string());
        }
        self
    }

    /// Identity keys this upsert leaves unset, in declaration order.
    pub fn absent_identity_keys(&self) -> Vec<&'static str> {
        self.label
            .identity_keys()
            .iter()
            .copied()
            .filter(|key| !self.properties.contains_key(key))
            .collect()
    }

    /// The `name` property, used for diagnostics.
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").map(String::as_str)
    }
}

impl fmt::Display for NodeUpsert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(:{}", self.label)?;
        write_properties(f, &self.properties)?;
        f.write_str(")")
    }
}

/// Match-or-create both endpoints, then the relationship between them. The
/// relationship's own properties are part of its match pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipUpsert {
    pub from: NodeUpsert,
    pub rel_type: RelType,
    pub properties: PropertyMap,
    pub to: NodeUpsert,
}

impl fmt::Display for RelationshipUpsert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-[:{}", self.from, self.rel_type)?;
        write_properties(f, &self.properties)?;
        write!(f, "]->{}", self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpsertOp {
    Node(NodeUpsert),
    Relationship(RelationshipUpsert),
}

impl UpsertOp {
    pub fn kind(&self) -> &'static str {
        match self {
            UpsertOp::Node(_) => "node",
            UpsertOp::Relationship(_) => "relationship",
        }
    }
}

impl fmt::Display for UpsertOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertOp::Node(node) => write!(f, "MERGE {}", node),
            UpsertOp::Relationship(rel) => write!(f, "MERGE {}", rel),
        }
    }
}

/// Entities that were extracted but produce no operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub references: usize,
    pub authors: usize,
}

impl SkipCounts {
    pub fn merge(&mut self, other: &SkipCounts) {
        self.references += other.references;
        self.authors += other.authors;
    }

    pub fn total(&self) -> usize {
        self.references + self.authors
    }
}

/// Ordered upsert operations for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphPlan {
    pub operations: Vec<UpsertOp>,
    pub skipped: SkipCounts,
    pub truncated_features: usize,
}

fn write_properties(f: &mut fmt::Formatter<'_>, properties: &PropertyMap) -> fmt::Result {
    if properties.is_empty() {
        return Ok(());
    }
    f.write_str(" {")?;
    for (i, (key, value)) in properties.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {:?}", key, value)?;
    }
    f.write_str("}")
}
