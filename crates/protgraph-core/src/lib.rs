//! protgraph core library
//!
//! Turns UniProt XML entries into ordered, idempotent graph upsert
//! operations: record parsing, entity extraction and graph mapping.

pub mod config;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod record;
pub mod source;

pub use config::{InputConfig, PipelineConfig, RunConfig, StoreConfig};
pub use error::{ParseError, ProtgraphError, ProtgraphResult, SchemaError};
pub use extract::{extract_entry, model::ProteinEntry};
pub use mapping::map_entry;
pub use mapping::model::{GraphPlan, Label, NodeUpsert, PropertyMap, RelType, RelationshipUpsert, SkipCounts, UpsertOp};
pub use record::parse_document;
pub use source::{discover_documents, SourceDocument};

/// Parse, extract and map one document's XML.
pub fn plan_document(xml: &str, id: &str) -> ProtgraphResult<(ProteinEntry, GraphPlan)> {
    let record = parse_document(xml)?;
    let entry = extract_entry(&record, id)?;
    let plan = map_entry(&entry);
    Ok((entry, plan))
}

#[cfg(test)]
mod tests {
    use super::*;

    const P12345: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<uniprot xmlns="http://uniprot.org/uniprot">
  <entry dataset="Swiss-Prot">
    <accession>P12345</accession>
    <name>Hemoglobin</name>
    <protein>
      <recommendedName><fullName>Hemoglobin subunit alpha</fullName></recommendedName>
    </protein>
    <gene><name type="primary">HBA1</name></gene>
    <organism>
      <name type="scientific">Human</name>
      <dbReference type="NCBI Taxonomy" id="9606"/>
    </organism>
    <reference key="1">
      <citation type="journal article" name="Smith et al">
        <authorList><person name="Smith"/><person/></authorList>
      </citation>
    </reference>
    <feature type="chain" description="Hemoglobin subunit alpha">
      <location><begin position="2"/><end position="142"/></location>
    </feature>
    <feature type="helix">
      <location><position position="4"/></location>
    </feature>
  </entry>
</uniprot>"#;

    #[test]
    fn test_plan_document_scenario() {
        let (entry, plan) = plan_document(P12345, "P12345").unwrap();
        assert_eq!(entry.protein.id, "P12345");

        let summary: Vec<String> = plan
            .operations
            .iter()
            .map(|op| match op {
                UpsertOp::Node(node) => node.label.to_string(),
                UpsertOp::Relationship(rel) => rel.rel_type.to_string(),
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                "Protein",
                "HAS_FULL_NAME",
                "IN_ORGANISM",
                "HAS_FEATURE",
                "HAS_FEATURE",
                "FROM_GENE",
                "HAS_REFERENCE",
                "HAS_AUTHOR",
            ]
        );
        assert_eq!(plan.skipped.authors, 1);
    }

    #[test]
    fn test_plan_document_errors() {
        assert!(matches!(plan_document("<uniprot>", "x"), Err(ProtgraphError::Parse(_))));
        assert!(matches!(
            plan_document("<uniprot><entry><accession>A</accession></entry></uniprot>", "x"),
            Err(ProtgraphError::Schema(_))
        ));
    }
}
