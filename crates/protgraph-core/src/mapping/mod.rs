//! Entity set to ordered upsert operations.
//!
//! Produces the graph shape:
//! - (:Protein)-[:HAS_FULL_NAME]->(:FullName)
//! - (:Protein)-[:IN_ORGANISM]->(:Organism)
//! - (:Protein)-[:HAS_FEATURE {position}]->(:Feature)
//! - (:Protein)-[:FROM_GENE {status}]->(:Gene)
//! - (:Protein)-[:HAS_REFERENCE]->(:Reference)
//! - (:Reference)-[:HAS_AUTHOR]->(:Author)

pub mod model;

use tracing::debug;

use crate::extract::model::{Feature, ProteinEntry, Reference};
use model::{GraphPlan, Label, NodeUpsert, PropertyMap, RelType, RelationshipUpsert, SkipCounts, UpsertOp};

/// Build the operation sequence for one entry.
///
/// Order: the Protein node, then its FullName, Organism, Feature, Gene and
/// Reference relationships, then the Author relationships of each Reference.
/// Unnamed references (with all their authors) and unnamed authors are
/// skipped and counted.
pub fn map_entry(entry: &ProteinEntry) -> GraphPlan {
    let protein = NodeUpsert::new(Label::Protein)
        .with("name", &entry.protein.name)
        .with("id", &entry.protein.id);

    let mut operations = vec![UpsertOp::Node(protein.clone())];
    let mut skipped = SkipCounts::default();

    operations.push(relationship(
        &protein,
        RelType::HasFullName,
        PropertyMap::new(),
        NodeUpsert::new(Label::FullName).with("name", &entry.full_name.name),
    ));

    operations.push(relationship(
        &protein,
        RelType::InOrganism,
        PropertyMap::new(),
        NodeUpsert::new(Label::Organism)
            .with("name", &entry.organism.name)
            .with("taxonomy_id", &entry.organism.taxonomy_id),
    ));

    for feature in &entry.features {
        operations.push(relationship(
            &protein,
            RelType::HasFeature,
            PropertyMap::from([("position", feature.position.clone())]),
            feature_node(feature),
        ));
    }

    for gene in &entry.genes {
        operations.push(relationship(
            &protein,
            RelType::FromGene,
            PropertyMap::from([("status", gene.status.clone())]),
            NodeUpsert::new(Label::Gene).with("name", &gene.name),
        ));
    }

    let mut named = Vec::with_capacity(entry.references.len());
    for reference in &entry.references {
        match reference_node(reference) {
            Some(node) => {
                operations.push(relationship(
                    &protein,
                    RelType::HasReference,
                    PropertyMap::new(),
                    node.clone(),
                ));
                named.push((reference, node));
            }
            None => {
                skipped.references += 1;
                skipped.authors += reference.authors.len();
                debug!(key = %reference.key, "Skipping reference without a name");
            }
        }
    }

    for (reference, node) in named {
        for author in &reference.authors {
            match &author.name {
                Some(name) => operations.push(relationship(
                    &node,
                    RelType::HasAuthor,
                    PropertyMap::new(),
                    NodeUpsert::new(Label::Author).with("name", name),
                )),
                None => skipped.authors += 1,
            }
        }
    }

    GraphPlan {
        operations,
        skipped,
        truncated_features: entry.features.iter().filter(|f| f.truncated).count(),
    }
}

fn relationship(from: &NodeUpsert, rel_type: RelType, properties: PropertyMap, to: NodeUpsert) -> UpsertOp {
    UpsertOp::Relationship(RelationshipUpsert {
        from: from.clone(),
        rel_type,
        properties,
        to,
    })
}

fn feature_node(feature: &Feature) -> NodeUpsert {
    NodeUpsert::new(Label::Feature)
        .with_opt("name", feature.name.as_deref())
        .with("type", &feature.feature_type)
}

fn reference_node(reference: &Reference) -> Option<NodeUpsert> {
    let name = reference.name.as_deref()?;
    Some(
        NodeUpsert::new(Label::Reference)
            .with("name", name)
            .with("type", &reference.citation_type)
            .with("id", &reference.key),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::model::{Author, FullName, Gene, Organism, Protein};

    fn hemoglobin() -> ProteinEntry {
        ProteinEntry {
            protein: Protein { name: "Hemoglobin".into(), id: "P12345".into() },
            full_name: FullName { name: "Hemoglobin subunit alpha".into() },
            organism: Organism { name: "Human".into(), taxonomy_id: "9606".into() },
            features: vec![
                Feature::new(Some("Hemoglobin subunit alpha"), "chain", "2"),
                Feature::new(None, "helix", "4"),
            ],
            genes: vec![Gene { name: "HBA1".into(), status: "primary".into() }],
            references: vec![Reference {
                name: Some("Smith et al".into()),
                citation_type: "journal article".into(),
                key: "1".into(),
                authors: vec![Author { name: Some("Smith".into()) }, Author { name: None }],
            }],
            rejected: Vec::new(),
        }
    }

    fn rel(op: &UpsertOp) -> &RelationshipUpsert {
        match op {
            UpsertOp::Relationship(rel) => rel,
            other => panic!("expected a relationship, got {}", other),
        }
    }

    #[test]
    fn test_operation_sequence() {
        let plan = map_entry(&hemoglobin());
        assert_eq!(plan.operations.len(), 8);

        match &plan.operations[0] {
            UpsertOp::Node(node) => {
                assert_eq!(node.label, Label::Protein);
                assert_eq!(node.properties.get("name").unwrap(), "Hemoglobin");
                assert_eq!(node.properties.get("id").unwrap(), "P12345");
            }
            other => panic!("expected the protein node first, got {}", other),
        }

        let types: Vec<RelType> = plan.operations[1..].iter().map(|op| rel(op).rel_type).collect();
        assert_eq!(
            types,
            vec![
                RelType::HasFullName,
                RelType::InOrganism,
                RelType::HasFeature,
                RelType::HasFeature,
                RelType::FromGene,
                RelType::HasReference,
                RelType::HasAuthor,
            ]
        );
        assert_eq!(plan.skipped, SkipCounts { references: 0, authors: 1 });
    }

    #[test]
    fn test_feature_without_description_has_no_name() {
        let plan = map_entry(&hemoglobin());
        let second = rel(&plan.operations[4]);
        assert!(!second.to.properties.contains_key("name"));
        assert_eq!(second.to.properties.get("type").unwrap(), "helix");
        assert_eq!(second.properties.get("position").unwrap(), "4");

        let first = rel(&plan.operations[3]);
        assert_eq!(first.to.name(), Some("Hemoglobin subunit alpha"));
    }

    #[test]
    fn test_relationship_attributes() {
        let plan = map_entry(&hemoglobin());
        let gene = rel(&plan.operations[5]);
        assert_eq!(gene.properties.get("status").unwrap(), "primary");
        assert!(rel(&plan.operations[1]).properties.is_empty());
    }

    #[test]
    fn test_author_hangs_off_reference() {
        let plan = map_entry(&hemoglobin());
        let author = rel(&plan.operations[7]);
        assert_eq!(author.from.label, Label::Reference);
        assert_eq!(author.from.properties.get("id").unwrap(), "1");
        assert_eq!(author.from.properties.get("type").unwrap(), "journal article");
        assert_eq!(author.to.name(), Some("Smith"));
    }

    #[test]
    fn test_unnamed_reference_is_skipped_with_its_authors() {
        let mut entry = hemoglobin();
        entry.references.insert(
            0,
            Reference {
                name: None,
                citation_type: "submission".into(),
                key: "0".into(),
                authors: vec![Author { name: Some("Jones".into()) }],
            },
        );
        entry.references.push(Reference {
            name: Some("Doe et al".into()),
            citation_type: "journal article".into(),
            key: "2".into(),
            authors: vec![Author { name: Some("Doe".into()) }],
        });

        let plan = map_entry(&entry);
        let references: Vec<&RelationshipUpsert> = plan
            .operations
            .iter()
            .filter_map(|op| match op {
                UpsertOp::Relationship(rel) if rel.rel_type == RelType::HasReference => Some(rel),
                _ => None,
            })
            .collect();
        assert_eq!(references.len(), 2);
        assert_eq!(references[0].to.name(), Some("Smith et al"));
        assert_eq!(references[1].to.name(), Some("Doe et al"));

        let authors: Vec<Option<&str>> = plan
            .operations
            .iter()
            .filter_map(|op| match op {
                UpsertOp::Relationship(rel) if rel.rel_type == RelType::HasAuthor => Some(rel.to.name()),
                _ => None,
            })
            .collect();
        assert_eq!(authors, vec![Some("Smith"), Some("Doe")]);
        assert_eq!(plan.skipped, SkipCounts { references: 1, authors: 2 });
    }

    #[test]
    fn test_truncated_features_are_counted() {
        let mut entry = hemoglobin();
        entry.features.push(Feature::new(Some(&"x".repeat(80)), "domain", "10"));
        let plan = map_entry(&entry);
        assert_eq!(plan.truncated_features, 1);
    }

    #[test]
    fn test_node_properties_are_identity_keys() {
        let plan = map_entry(&hemoglobin());
        for op in &plan.operations {
            let nodes = match op {
                UpsertOp::Node(node) => vec![node],
                UpsertOp::Relationship(rel) => vec![&rel.from, &rel.to],
            };
            for node in nodes {
                for key in node.properties.keys() {
                    assert!(node.label.identity_keys().contains(key), "{} on {}", key, node.label);
                }
            }
        }

        assert_eq!(rel(&plan.operations[4]).to.absent_identity_keys(), vec!["name"]);
        assert!(rel(&plan.operations[3]).to.absent_identity_keys().is_empty());
    }

    #[test]
    fn test_mapping_is_deterministic() {
        assert_eq!(map_entry(&hemoglobin()), map_entry(&hemoglobin()));
    }
}
