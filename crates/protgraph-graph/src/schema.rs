//! Neo4j schema initialization (identity indexes).

use neo4rs::Query;
use tracing::info;

use crate::{GraphClient, StoreError};

/// One range index per identity key, so MERGE can match without a label scan.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE INDEX protein_identity IF NOT EXISTS FOR (p:Protein) ON (p.name, p.id)",
    "CREATE INDEX full_name_identity IF NOT EXISTS FOR (f:FullName) ON (f.name)",
    "CREATE INDEX organism_identity IF NOT EXISTS FOR (o:Organism) ON (o.name, o.taxonomy_id)",
    "CREATE INDEX feature_identity IF NOT EXISTS FOR (f:Feature) ON (f.type, f.name)",
    "CREATE INDEX gene_identity IF NOT EXISTS FOR (g:Gene) ON (g.name)",
    "CREATE INDEX reference_identity IF NOT EXISTS FOR (r:Reference) ON (r.id, r.type, r.name)",
    "CREATE INDEX author_identity IF NOT EXISTS FOR (a:Author) ON (a.name)",
];

/// Initialize Neo4j schema with identity indexes.
///
/// Safe to run multiple times - uses IF NOT EXISTS clauses. A store that
/// went away since `connect` surfaces as [`StoreError::Unavailable`].
pub async fn initialize_schema(client: &GraphClient) -> Result<(), StoreError> {
    info!("Initializing Neo4j schema...");

    for statement in SCHEMA_STATEMENTS {
        client.execute(Query::new(statement.to_string())).await?;
    }

    info!("Neo4j schema initialized ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protgraph_core::Label;

    #[test]
    fn test_every_label_is_indexed() {
        for label in Label::ALL {
            let pattern = format!(":{})", label.as_str());
            assert!(
                SCHEMA_STATEMENTS.iter().any(|s| s.contains(&pattern)),
                "no index for {}",
                label
            );
        }
    }

    #[test]
    fn test_statements_are_idempotent() {
        assert!(SCHEMA_STATEMENTS.iter().all(|s| s.contains("IF NOT EXISTS")));
    }
}
