//! Upsert execution against a `GraphStore`.

use std::collections::BTreeMap;

use protgraph_core::{GraphPlan, UpsertOp};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::store::{BoundRecord, GraphStore, StoreError};

/// Outcome of one operation within a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationOutcome {
    Applied { records: usize },
    Rejected { message: String },
    /// The store went away while this operation was in flight.
    Interrupted { message: String },
    NotAttempted,
}

/// Per-plan execution report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanReport {
    pub outcomes: Vec<OperationOutcome>,
    /// Applied node upserts per label, endpoints of relationships included.
    pub nodes_by_label: BTreeMap<&'static str, usize>,
    pub relationships_by_type: BTreeMap<&'static str, usize>,
    /// Set when the store became unreachable; later operations were skipped.
    pub unavailable: Option<String>,
}

impl PlanReport {
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, OperationOutcome::Applied { .. }))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, OperationOutcome::Rejected { .. }))
    }

    pub fn not_attempted(&self) -> usize {
        self.count(|o| matches!(o, OperationOutcome::NotAttempted))
    }

    fn count(&self, predicate: impl Fn(&OperationOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

/// Executes upsert operations one at a time, in order.
pub struct UpsertExecutor<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    /// Log created identities at info instead of debug.
    log: bool,
}

impl<'a, S: GraphStore + ?Sized> UpsertExecutor<'a, S> {
    pub fn new(store: &'a S, log: bool) -> Self {
        Self { store, log }
    }

    /// Execute a single operation.
    pub async fn execute(&self, op: &UpsertOp) -> Result<Vec<BoundRecord>, StoreError> {
        let records = match op {
            UpsertOp::Node(node) => self.store.merge_node(node).await?,
            UpsertOp::Relationship(rel) => self.store.merge_relationship(rel).await?,
        };

        let names: Vec<&str> = records.iter().flat_map(BoundRecord::names).collect();
        if self.log {
            info!(kind = op.kind(), operation = %op, bound = ?names, "Upsert applied");
        } else {
            debug!(kind = op.kind(), operation = %op, bound = ?names, "Upsert applied");
        }
        Ok(records)
    }

    /// Execute a plan in order. A rejected operation is reported and skipped;
    /// an unavailable store stops the plan and marks the rest not attempted.
    pub async fn execute_plan(&self, plan: &GraphPlan) -> PlanReport {
        let mut report = PlanReport::default();

        for (index, op) in plan.operations.iter().enumerate() {
            match self.execute(op).await {
                Ok(records) => {
                    tally(&mut report, op);
                    report.outcomes.push(OperationOutcome::Applied {
                        records: records.len(),
                    });
                }
                Err(StoreError::Rejected(message)) => {
                    warn!(index, operation = %op, error = %message, "Upsert rejected, continuing");
                    report.outcomes.push(OperationOutcome::Rejected { message });
                }
                Err(StoreError::Unavailable(message)) => {
                    warn!(index, operation = %op, error = %message, "Graph store unavailable, abandoning plan");
                    report.outcomes.push(OperationOutcome::Interrupted {
                        message: message.clone(),
                    });
                    report.unavailable = Some(message);
                    let remaining = plan.operations.len() - index - 1;
                    report
                        .outcomes
                        .extend(std::iter::repeat(OperationOutcome::NotAttempted).take(remaining));
                    break;
                }
            }
        }

        report
    }
}

fn tally(report: &mut PlanReport, op: &UpsertOp) {
    match op {
        UpsertOp::Node(node) => {
            *report.nodes_by_label.entry(node.label.as_str()).or_default() += 1;
        }
        UpsertOp::Relationship(rel) => {
            *report.nodes_by_label.entry(rel.from.label.as_str()).or_default() += 1;
            *report.nodes_by_label.entry(rel.to.label.as_str()).or_default() += 1;
            *report.relationships_by_type.entry(rel.rel_type.as_str()).or_default() += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use protgraph_core::{Label, NodeUpsert, PropertyMap, RelType, RelationshipUpsert};

    use crate::MemoryGraph;

    /// Fails the listed calls (0-based) with the given error.
    struct FlakyStore {
        calls: AtomicUsize,
        failures: Vec<(usize, StoreError)>,
        inner: MemoryGraph,
    }

    impl FlakyStore {
        fn new(failures: Vec<(usize, StoreError)>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures,
                inner: MemoryGraph::new(),
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failures.iter().find(|(n, _)| *n == call) {
                Some((_, err)) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl GraphStore for FlakyStore {
        async fn merge_node(&self, node: &NodeUpsert) -> Result<Vec<BoundRecord>, StoreError> {
            self.check()?;
            self.inner.merge_node(node).await
        }

        async fn merge_relationship(&self, rel: &RelationshipUpsert) -> Result<Vec<BoundRecord>, StoreError> {
            self.check()?;
            self.inner.merge_relationship(rel).await
        }
    }

    fn plan() -> GraphPlan {
        let protein = NodeUpsert::new(Label::Protein).with("name", "Hemoglobin").with("id", "P1");
        let gene = |name: &str| {
            UpsertOp::Relationship(RelationshipUpsert {
                from: protein.clone(),
                rel_type: RelType::FromGene,
                properties: PropertyMap::from([("status", "primary".to_string())]),
                to: NodeUpsert::new(Label::Gene).with("name", name),
            })
        };
        GraphPlan {
            operations: vec![UpsertOp::Node(protein.clone()), gene("HBA1"), gene("HBA2"), gene("HBA3")],
            ..GraphPlan::default()
        }
    }

    #[tokio::test]
    async fn test_execute_plan_applies_all() {
        let store = MemoryGraph::new();
        let report = UpsertExecutor::new(&store, false).execute_plan(&plan()).await;
        assert_eq!(report.applied(), 4);
        assert_eq!(report.relationships_by_type.get("FROM_GENE"), Some(&3));
        assert_eq!(report.nodes_by_label.get("Gene"), Some(&3));
        assert!(report.unavailable.is_none());
        assert_eq!(store.count_label(Label::Gene), 3);
    }

    #[tokio::test]
    async fn test_rejected_operation_does_not_block_siblings() {
        let store = FlakyStore::new(vec![(2, StoreError::Rejected("constraint".into()))]);
        let report = UpsertExecutor::new(&store, false).execute_plan(&plan()).await;
        assert_eq!(report.applied(), 3);
        assert_eq!(report.rejected(), 1);
        assert_eq!(
            report.outcomes[2],
            OperationOutcome::Rejected { message: "constraint".into() }
        );
        assert_eq!(store.inner.count_label(Label::Gene), 2);
    }

    #[tokio::test]
    async fn test_unavailable_store_stops_plan() {
        let store = FlakyStore::new(vec![(1, StoreError::Unavailable("connection refused".into()))]);
        let report = UpsertExecutor::new(&store, true).execute_plan(&plan()).await;
        assert_eq!(report.applied(), 1);
        assert!(matches!(report.outcomes[1], OperationOutcome::Interrupted { .. }));
        assert_eq!(report.not_attempted(), 2);
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.unavailable.as_deref(), Some("connection refused"));
        // Only the first operation reached the store.
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_execute_returns_bound_records() {
        let store = MemoryGraph::new();
        let op = &plan().operations[1];
        let records = UpsertExecutor::new(&store, false).execute(op).await.unwrap();
        assert_eq!(records[0].names(), vec!["Hemoglobin", "HBA1"]);
    }
}
