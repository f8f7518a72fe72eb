//! Neo4j connection client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{
    ConfigBuilder, Graph, Neo4jClientErrorKind, Neo4jErrorKind, Neo4jSecurityErrorKind, Query, Row,
};
use protgraph_core::{Label, NodeUpsert, RelType, RelationshipUpsert, StoreConfig};
use serde::Serialize;

use crate::cypher::{self, Statement, NODE_VARIABLES, RELATIONSHIP_VARIABLES};
use crate::store::{BoundNode, BoundRecord, GraphStore, StoreError};

/// Client for the protein graph in Neo4j.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Create a new GraphClient from config.
    ///
    /// neo4rs only builds its pool in `Graph::connect`; the `RETURN 1` ping
    /// forces a real bolt handshake so an unreachable store fails here.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(200)
            .build()
            .context("Failed to build Neo4j config")?;

        let graph = Graph::connect(neo4j_config)
            .await
            .context("Failed to create Neo4j connection pool")?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .context("Neo4j is not responding to queries")?;

        Ok(Self { graph })
    }

    /// Execute a Cypher query that returns no results.
    pub async fn execute(&self, query: Query) -> Result<(), StoreError> {
        self.graph.run(query).await.map_err(classify)
    }

    /// Execute a Cypher query and return results as rows.
    pub async fn query(&self, query: Query) -> Result<Vec<Row>> {
        self.rows(query).await.context("Neo4j query failed")
    }

    /// Node and relationship counts.
    pub async fn get_counts(&self) -> Result<GraphCounts> {
        let nodes = self.scalar_count("MATCH (n) RETURN count(n) AS count").await?;
        let relationships = self.scalar_count("MATCH ()-[r]->() RETURN count(r) AS count").await?;
        Ok(GraphCounts {
            nodes,
            relationships,
        })
    }

    /// Node counts per protein-graph label and relationship counts per type.
    pub async fn get_breakdown(&self) -> Result<GraphBreakdown> {
        let mut breakdown = GraphBreakdown::default();

        for label in Label::ALL {
            let count = self
                .scalar_count(&format!("MATCH (n:{}) RETURN count(n) AS count", label.as_str()))
                .await?;
            breakdown.nodes.push((label.as_str(), count));
        }

        for rel_type in RelType::ALL {
            let count = self
                .scalar_count(&format!("MATCH ()-[r:{}]->() RETURN count(r) AS count", rel_type.as_str()))
                .await?;
            breakdown.relationships.push((rel_type.as_str(), count));
        }

        Ok(breakdown)
    }

    async fn scalar_count(&self, cypher: &str) -> Result<usize> {
        let rows = self.query(Query::new(cypher.to_string())).await?;
        let count: i64 = match rows.first() {
            Some(row) => row
                .get("count")
                .map_err(|e| anyhow::anyhow!("Failed to get field 'count': {:?}", e))?,
            None => 0,
        };
        Ok(count.max(0) as usize)
    }

    async fn rows(&self, query: Query) -> Result<Vec<Row>, neo4rs::Error> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn run_statement(&self, statement: &Statement) -> Result<Vec<Row>, StoreError> {
        self.rows(statement.to_query()).await.map_err(classify)
    }
}

/// Map a neo4rs error onto the store boundary. Transport failures and
/// server errors that say "try again later" are `Unavailable`; anything else
/// the server refused is `Rejected`.
fn classify(error: neo4rs::Error) -> StoreError {
    let unavailable = match &error {
        neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError => true,
        neo4rs::Error::Neo4j(e) => is_retryable(e.kind()),
        _ => false,
    };
    if unavailable {
        StoreError::Unavailable(error.to_string())
    } else {
        StoreError::Rejected(error.to_string())
    }
}

/// `Neo.TransientError.*` (e.g. DatabaseUnavailable), expired sessions and
/// expired authorization.
fn is_retryable(kind: Neo4jErrorKind) -> bool {
    matches!(
        kind,
        Neo4jErrorKind::Transient
            | Neo4jErrorKind::Client(
                Neo4jClientErrorKind::SessionExpired
                    | Neo4jClientErrorKind::Security(Neo4jSecurityErrorKind::AuthorizationExpired)
            )
    )
}

fn bind(row: &Row, variable: &'static str, node: &NodeUpsert) -> BoundNode {
    BoundNode {
        variable,
        label: node.label,
        name: row.get::<String>(&format!("{}_name", variable)).ok(),
    }
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn merge_node(&self, node: &NodeUpsert) -> Result<Vec<BoundRecord>, StoreError> {
        let rows = self.run_statement(&cypher::node_statement(node)).await?;
        Ok(rows
            .iter()
            .map(|row| BoundRecord {
                nodes: vec![bind(row, NODE_VARIABLES[0], node)],
            })
            .collect())
    }

    async fn merge_relationship(&self, rel: &RelationshipUpsert) -> Result<Vec<BoundRecord>, StoreError> {
        let rows = self.run_statement(&cypher::relationship_statement(rel)).await?;
        Ok(rows
            .iter()
            .map(|row| BoundRecord {
                nodes: vec![
                    bind(row, RELATIONSHIP_VARIABLES[0], &rel.from),
                    bind(row, RELATIONSHIP_VARIABLES[1], &rel.to),
                ],
            })
            .collect())
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}

/// Per-label and per-type counts, in model order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphBreakdown {
    pub nodes: Vec<(&'static str, usize)>,
    pub relationships: Vec<(&'static str, usize)>,
}
