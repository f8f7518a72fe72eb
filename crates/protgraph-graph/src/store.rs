//! The graph store boundary.

use async_trait::async_trait;
use protgraph_core::{Label, NodeUpsert, RelationshipUpsert};
use serde::Serialize;
use thiserror::Error;

/// Failure of a single store request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached. Retryable by whoever scheduled the run.
    #[error("Graph store unavailable: {0}")]
    Unavailable(String),

    /// The store refused this particular request.
    #[error("Upsert rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// A node bound by an upsert, as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundNode {
    pub variable: &'static str,
    pub label: Label,
    pub name: Option<String>,
}

/// One result record of an upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoundRecord {
    pub nodes: Vec<BoundNode>,
}

impl BoundRecord {
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().filter_map(|n| n.name.as_deref()).collect()
    }
}

/// Match-or-create requests against a property graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Merge one node on its full property set.
    async fn merge_node(&self, node: &NodeUpsert) -> Result<Vec<BoundRecord>, StoreError>;

    /// Merge both endpoints and the relationship between them in one request.
    async fn merge_relationship(&self, rel: &RelationshipUpsert) -> Result<Vec<BoundRecord>, StoreError>;
}
