//! In-process graph store with the same match-or-create semantics as the
//! Neo4j client. Backs `ingest --dry-run`.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use protgraph_core::{Label, NodeUpsert, PropertyMap, RelType, RelationshipUpsert};

use crate::cypher::{NODE_VARIABLES, RELATIONSHIP_VARIABLES};
use crate::store::{BoundNode, BoundRecord, GraphStore, StoreError};
use crate::GraphCounts;

/// Label plus the full property map. Upserts carry only identity keys, so an
/// identity key the upsert leaves out only matches a node that lacks it too.
type NodeKey = (Label, PropertyMap);
type EdgeKey = (NodeKey, RelType, PropertyMap, NodeKey);

#[derive(Debug, Default)]
struct State {
    nodes: BTreeSet<NodeKey>,
    edges: BTreeSet<EdgeKey>,
    available: bool,
}

#[derive(Debug)]
pub struct MemoryGraph {
    state: Mutex<State>,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                available: true,
                ..State::default()
            }),
        }
    }

    /// Simulate the store going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    pub fn counts(&self) -> GraphCounts {
        let state = self.lock();
        GraphCounts {
            nodes: state.nodes.len(),
            relationships: state.edges.len(),
        }
    }

    pub fn count_label(&self, label: Label) -> usize {
        self.lock().nodes.iter().filter(|(l, _)| *l == label).count()
    }

    pub fn count_rel_type(&self, rel_type: RelType) -> usize {
        self.lock().edges.iter().filter(|(_, t, _, _)| *t == rel_type).count()
    }

    /// Nodes with the given label, as their property maps.
    pub fn nodes(&self, label: Label) -> Vec<PropertyMap> {
        self.lock()
            .nodes
            .iter()
            .filter(|(l, _)| *l == label)
            .map(|(_, properties)| properties.clone())
            .collect()
    }

    /// Identity snapshot of every node and edge.
    pub fn snapshot(&self) -> (Vec<String>, Vec<String>) {
        let state = self.lock();
        let nodes = state
            .nodes
            .iter()
            .map(|(label, props)| format!("{}{:?}", label, props))
            .collect();
        let edges = state
            .edges
            .iter()
            .map(|(from, rel_type, props, to)| format!("{:?}-{}{:?}->{:?}", from, rel_type, props, to))
            .collect();
        (nodes, edges)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked mid-upsert; the sets are
        // still consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn key(node: &NodeUpsert) -> NodeKey {
    (node.label, node.properties.clone())
}

fn bound(variable: &'static str, node: &NodeUpsert) -> BoundNode {
    BoundNode {
        variable,
        label: node.label,
        name: node.name().map(str::to_string),
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn merge_node(&self, node: &NodeUpsert) -> Result<Vec<BoundRecord>, StoreError> {
        let mut state = self.lock();
        if !state.available {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        state.nodes.insert(key(node));
        Ok(vec![BoundRecord {
            nodes: vec![bound(NODE_VARIABLES[0], node)],
        }])
    }

    async fn merge_relationship(&self, rel: &RelationshipUpsert) -> Result<Vec<BoundRecord>, StoreError> {
        let mut state = self.lock();
        if !state.available {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        let from = key(&rel.from);
        let to = key(&rel.to);
        state.nodes.insert(from.clone());
        state.nodes.insert(to.clone());
        state.edges.insert((from, rel.rel_type, rel.properties.clone(), to));
        Ok(vec![BoundRecord {
            nodes: vec![
                bound(RELATIONSHIP_VARIABLES[0], &rel.from),
                bound(RELATIONSHIP_VARIABLES[1], &rel.to),
            ],
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protein() -> NodeUpsert {
        NodeUpsert::new(Label::Protein).with("name", "Hemoglobin").with("id", "P12345")
    }

    fn feature_at(position: &str) -> RelationshipUpsert {
        RelationshipUpsert {
            from: protein(),
            rel_type: RelType::HasFeature,
            properties: PropertyMap::from([("position", position.to_string())]),
            to: NodeUpsert::new(Label::Feature).with("type", "helix"),
        }
    }

    #[tokio::test]
    async fn test_node_upsert_is_idempotent() {
        let graph = MemoryGraph::new();
        graph.merge_node(&protein()).await.unwrap();
        graph.merge_node(&protein()).await.unwrap();
        assert_eq!(graph.count_label(Label::Protein), 1);
    }

    #[tokio::test]
    async fn test_relationship_creates_endpoints() {
        let graph = MemoryGraph::new();
        let records = graph.merge_relationship(&feature_at("4")).await.unwrap();
        assert_eq!(records[0].names(), vec!["Hemoglobin"]);
        assert_eq!(graph.counts().nodes, 2);
        assert_eq!(graph.counts().relationships, 1);

        graph.merge_relationship(&feature_at("4")).await.unwrap();
        assert_eq!(graph.counts().relationships, 1);
    }

    #[tokio::test]
    async fn test_relationship_attributes_are_part_of_identity() {
        let graph = MemoryGraph::new();
        graph.merge_relationship(&feature_at("4")).await.unwrap();
        graph.merge_relationship(&feature_at("9")).await.unwrap();
        assert_eq!(graph.counts().nodes, 2);
        assert_eq!(graph.count_rel_type(RelType::HasFeature), 2);
    }

    #[tokio::test]
    async fn test_unnamed_feature_never_binds_a_named_one() {
        let graph = MemoryGraph::new();
        let named = NodeUpsert::new(Label::Feature).with("name", "Zinc").with("type", "site");
        let unnamed = NodeUpsert::new(Label::Feature).with("type", "site");
        let edge = |to: NodeUpsert| RelationshipUpsert {
            from: protein(),
            rel_type: RelType::HasFeature,
            properties: PropertyMap::from([("position", "7".to_string())]),
            to,
        };

        graph.merge_relationship(&edge(named)).await.unwrap();
        let records = graph.merge_relationship(&edge(unnamed.clone())).await.unwrap();
        assert_eq!(records[0].names(), vec!["Hemoglobin"]);
        graph.merge_relationship(&edge(unnamed)).await.unwrap();

        let features = graph.nodes(Label::Feature);
        assert_eq!(features.len(), 2);
        assert_eq!(features.iter().filter(|f| !f.contains_key("name")).count(), 1);
        assert_eq!(graph.count_rel_type(RelType::HasFeature), 2);
    }

    #[tokio::test]
    async fn test_offline_store() {
        let graph = MemoryGraph::new();
        graph.set_available(false);
        let err = graph.merge_node(&protein()).await.unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(graph.counts().nodes, 0);
    }
}
