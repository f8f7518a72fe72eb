//! # protgraph graph
//!
//! Neo4j side of protgraph: executes upsert plans against a graph store
//! and drives the document ingest pipeline.

pub mod client;
pub mod cypher;
pub mod executor;
pub mod memory;
pub mod pipeline;
pub mod schema;
pub mod store;

pub use client::{GraphBreakdown, GraphClient, GraphCounts};
pub use executor::{OperationOutcome, PlanReport, UpsertExecutor};
pub use memory::MemoryGraph;
pub use pipeline::{run_ingest, DocumentOutcome, DocumentReport, IngestOptions, RunSummary};
pub use store::{BoundNode, BoundRecord, GraphStore, StoreError};
