//! UniProt documents to Neo4j ingest pipeline.
//!
//! Each document is parsed, extracted, mapped to an upsert plan and executed
//! on its own. A failing document is reported and the run moves on to the
//! next one.

pub mod report;

use futures::stream::{self, StreamExt};
use protgraph_core::{plan_document, PipelineConfig, SourceDocument};
use tracing::{debug, error, info, warn};

use crate::executor::UpsertExecutor;
use crate::store::GraphStore;
pub use report::{DocumentOutcome, DocumentReport, RunSummary};

/// Run-level settings taken from the pipeline configuration.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub log: bool,
    pub concurrency: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            log: false,
            concurrency: 1,
        }
    }
}

impl From<&PipelineConfig> for IngestOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            log: config.log,
            concurrency: config.pipeline.concurrency.max(1),
        }
    }
}

/// Ingest every document into the store. `on_document` is called as each
/// document completes, in input order.
pub async fn run_ingest<S, F>(
    store: &S,
    documents: &[SourceDocument],
    options: &IngestOptions,
    mut on_document: F,
) -> RunSummary
where
    S: GraphStore + ?Sized,
    F: FnMut(&DocumentReport),
{
    let mut summary = RunSummary::default();
    info!(run_id = %summary.run_id, documents = documents.len(), "Starting ingest run");

    let mut reports = std::pin::pin!(stream::iter(documents)
        .map(|document| ingest_document(store, document, options))
        .buffered(options.concurrency.max(1)));

    while let Some(report) = reports.next().await {
        on_document(&report);
        summary.record(report);
    }

    summary.finish();
    info!(
        run_id = %summary.run_id,
        succeeded = summary.succeeded(),
        partial = summary.partial(),
        failed = summary.failed(),
        store_unavailable = summary.store_unavailable,
        "Ingest run complete"
    );

    summary
}

/// Ingest one document. Never fails: every problem ends up in the report.
pub async fn ingest_document<S>(store: &S, document: &SourceDocument, options: &IngestOptions) -> DocumentReport
where
    S: GraphStore + ?Sized,
{
    let report = DocumentReport::new(document.path.clone(), document.id.clone());

    let xml = match document.read() {
        Ok(xml) => xml,
        Err(e) => {
            error!(path = %document.path.display(), error = %e, "Failed to read document");
            return report.failed(e.to_string());
        }
    };

    let (entry, plan) = match plan_document(&xml, &document.id) {
        Ok(planned) => planned,
        Err(e) => {
            error!(path = %document.path.display(), error = %e, "Failed to map document");
            return report.failed(e.to_string());
        }
    };

    let mut report = report;
    report.protein_name = Some(entry.protein.name.clone());
    report.operations = plan.operations.len();
    report.skipped = plan.skipped;
    report.truncated_features = plan.truncated_features;
    report.rejected_sub_entities = entry.rejected.iter().map(ToString::to_string).collect();

    for rejected in &entry.rejected {
        warn!(id = %document.id, error = %rejected, "Dropped malformed sub-entity");
    }
    if plan.skipped.total() > 0 {
        debug!(
            id = %document.id,
            references = plan.skipped.references,
            authors = plan.skipped.authors,
            "Skipped unnamed entities"
        );
    }
    if plan.truncated_features > 0 {
        debug!(id = %document.id, count = plan.truncated_features, "Truncated feature names");
    }

    let executed = UpsertExecutor::new(store, options.log).execute_plan(&plan).await;
    report.applied = executed.applied();
    report.nodes_by_label = executed.nodes_by_label.clone();
    report.relationships_by_type = executed.relationships_by_type.clone();

    report.store_unavailable = executed.unavailable.is_some();
    report.outcome = match &executed.unavailable {
        Some(reason) => DocumentOutcome::Failed {
            reason: format!("graph store unavailable: {}", reason),
        },
        None if executed.rejected() > 0 => DocumentOutcome::Partial {
            failed_operations: executed.rejected(),
        },
        None => DocumentOutcome::Succeeded,
    };

    if options.log {
        info!(
            id = %document.id,
            protein = %entry.protein.name,
            applied = report.applied,
            operations = report.operations,
            outcome = report.outcome.as_str(),
            "Document ingested"
        );
    } else {
        debug!(
            id = %document.id,
            protein = %entry.protein.name,
            applied = report.applied,
            operations = report.operations,
            outcome = report.outcome.as_str(),
            "Document ingested"
        );
    }

    report
}
