//! Cypher rendering of upsert descriptors.
//!
//! Labels, relationship types and property keys come from closed enums and
//! `&'static str` keys; every property value is sent as a `$parameter`.

use neo4rs::Query;
use protgraph_core::{NodeUpsert, PropertyMap, RelationshipUpsert};

/// A rendered query with its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub text: String,
    pub params: Vec<(String, String)>,
}

impl Statement {
    pub fn to_query(&self) -> Query {
        self.params
            .iter()
            .fold(Query::new(self.text.clone()), |query, (key, value)| {
                query.param(key, value.clone())
            })
    }
}

/// Variables bound by `node_statement`.
pub const NODE_VARIABLES: [&str; 1] = ["n"];

/// Variables bound by `relationship_statement`, start node first.
pub const RELATIONSHIP_VARIABLES: [&str; 2] = ["a", "b"];

/// `MERGE (n:Label {k: $n_k, ...}) RETURN n.name AS n_name`
pub fn node_statement(node: &NodeUpsert) -> Statement {
    let mut params = Vec::new();
    let bind = bind_node("n", node, &[], &mut params);
    Statement {
        text: format!("{} RETURN n.name AS n_name", bind),
        params,
    }
}

/// Bind both endpoints, then merge the relationship with its properties in
/// the match pattern.
pub fn relationship_statement(rel: &RelationshipUpsert) -> Statement {
    let mut params = Vec::new();
    let from = bind_node("a", &rel.from, &[], &mut params);
    let to = bind_node("b", &rel.to, &["a"], &mut params);
    let properties = property_pattern("r", &rel.properties, &mut params);

    Statement {
        text: format!(
            "{} {} MERGE (a)-[r:{}{}]->(b) RETURN a.name AS a_name, b.name AS b_name",
            from,
            to,
            rel.rel_type.as_str(),
            properties
        ),
        params,
    }
}

/// Bind `variable` to the node identified by `node`.
///
/// With every identity key present this is a plain `MERGE`. MERGE ignores
/// properties missing from its pattern, so a node with an absent identity key
/// is matched with an `IS NULL` guard on that key and created only when no
/// such node exists. `carried` are variables bound by earlier clauses.
fn bind_node(variable: &str, node: &NodeUpsert, carried: &[&str], params: &mut Vec<(String, String)>) -> String {
    let label = node.label.as_str();
    let properties = property_pattern(variable, &node.properties, params);
    let absent = node.absent_identity_keys();

    if absent.is_empty() {
        return format!("MERGE ({}:{}{})", variable, label, properties);
    }

    let existing = format!("{}_existing", variable);
    let found = format!("{}_found", variable);
    let guard = |var: &str| {
        absent
            .iter()
            .map(|key| format!("{}.{} IS NULL", var, key))
            .collect::<Vec<_>>()
            .join(" AND ")
    };
    let with = |last: &str| {
        carried
            .iter()
            .copied()
            .chain(std::iter::once(last))
            .collect::<Vec<_>>()
            .join(", ")
    };
    // MATCH may not follow an updating clause without a WITH.
    let lead = if carried.is_empty() {
        String::new()
    } else {
        format!("WITH {} ", carried.join(", "))
    };

    format!(
        "{lead}OPTIONAL MATCH ({existing}:{label}{properties}) WHERE {existing_guard} \
         WITH {count} \
         FOREACH ({variable}_new IN CASE WHEN {found} = 0 THEN [1] ELSE [] END | CREATE (:{label}{properties})) \
         WITH {keep} \
         MATCH ({variable}:{label}{properties}) WHERE {guard} \
         WITH {collect}",
        existing_guard = guard(&existing),
        count = with(&format!("count({}) AS {}", existing, found)),
        keep = with(&found),
        guard = guard(variable),
        collect = with(&format!("head(collect({0})) AS {0}", variable)),
    )
}

fn property_pattern(variable: &str, properties: &PropertyMap, params: &mut Vec<(String, String)>) -> String {
    if properties.is_empty() {
        return String::new();
    }
    let fields: Vec<String> = properties
        .iter()
        .map(|(key, value)| {
            let param = format!("{}_{}", variable, key);
            let field = format!("{}: ${}", key, param);
            params.push((param, value.clone()));
            field
        })
        .collect();
    format!(" {{{}}}", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use protgraph_core::{Label, RelType};

    fn protein() -> NodeUpsert {
        NodeUpsert::new(Label::Protein)
            .with("name", "Hemoglobin")
            .with("id", "P12345")
    }

    #[test]
    fn test_node_statement() {
        let statement = node_statement(&protein());
        assert_eq!(
            statement.text,
            "MERGE (n:Protein {id: $n_id, name: $n_name}) RETURN n.name AS n_name"
        );
        assert_eq!(
            statement.params,
            vec![
                ("n_id".to_string(), "P12345".to_string()),
                ("n_name".to_string(), "Hemoglobin".to_string()),
            ]
        );
    }

    fn feature_at(feature: NodeUpsert, position: &str) -> RelationshipUpsert {
        RelationshipUpsert {
            from: protein(),
            rel_type: RelType::HasFeature,
            properties: PropertyMap::from([("position", position.to_string())]),
            to: feature,
        }
    }

    #[test]
    fn test_relationship_statement_with_properties() {
        let feature = NodeUpsert::new(Label::Feature).with("name", "Zinc").with("type", "site");
        let statement = relationship_statement(&feature_at(feature, "4"));
        assert_eq!(
            statement.text,
            "MERGE (a:Protein {id: $a_id, name: $a_name}) \
             MERGE (b:Feature {name: $b_name, type: $b_type}) \
             MERGE (a)-[r:HAS_FEATURE {position: $r_position}]->(b) \
             RETURN a.name AS a_name, b.name AS b_name"
        );
        assert_eq!(statement.params.len(), 5);
        assert!(statement.params.contains(&("r_position".to_string(), "4".to_string())));
    }

    #[test]
    fn test_absent_identity_key_is_guarded() {
        let feature = NodeUpsert::new(Label::Feature).with("type", "site");
        let statement = relationship_statement(&feature_at(feature, "4"));
        assert_eq!(
            statement.text,
            "MERGE (a:Protein {id: $a_id, name: $a_name}) \
             WITH a OPTIONAL MATCH (b_existing:Feature {type: $b_type}) WHERE b_existing.name IS NULL \
             WITH a, count(b_existing) AS b_found \
             FOREACH (b_new IN CASE WHEN b_found = 0 THEN [1] ELSE [] END | CREATE (:Feature {type: $b_type})) \
             WITH a, b_found \
             MATCH (b:Feature {type: $b_type}) WHERE b.name IS NULL \
             WITH a, head(collect(b)) AS b \
             MERGE (a)-[r:HAS_FEATURE {position: $r_position}]->(b) \
             RETURN a.name AS a_name, b.name AS b_name"
        );
        // The guarded pattern reuses one parameter per property.
        assert_eq!(statement.params.len(), 4);
        assert!(!statement.text.contains("MERGE (b:Feature"));
    }

    #[test]
    fn test_node_statement_guards_absent_keys() {
        let statement = node_statement(&NodeUpsert::new(Label::Feature).with("type", "helix"));
        assert!(statement.text.starts_with("OPTIONAL MATCH (n_existing:Feature {type: $n_type}) WHERE n_existing.name IS NULL"));
        assert!(statement.text.contains("WITH n_found MATCH"));
        assert!(statement.text.ends_with("WITH head(collect(n)) AS n RETURN n.name AS n_name"));
    }

    #[test]
    fn test_relationship_without_properties() {
        let rel = RelationshipUpsert {
            from: protein(),
            rel_type: RelType::HasFullName,
            properties: PropertyMap::new(),
            to: NodeUpsert::new(Label::FullName).with("name", "Hemoglobin subunit alpha"),
        };
        let statement = relationship_statement(&rel);
        assert!(statement.text.contains("MERGE (a)-[r:HAS_FULL_NAME]->(b)"));
    }

    #[test]
    fn test_values_never_reach_query_text() {
        let hostile = "x\"}) DETACH DELETE n //";
        let node = NodeUpsert::new(Label::Author).with("name", hostile);
        let statement = node_statement(&node);
        assert!(!statement.text.contains(hostile));
        assert_eq!(statement.params[0].1, hostile);
    }
}
