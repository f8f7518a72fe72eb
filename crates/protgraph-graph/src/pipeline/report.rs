//! Per-document and per-run reports.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use protgraph_core::SkipCounts;
use serde::Serialize;
use uuid::Uuid;

/// How a single document fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Succeeded,
    /// Some operations were rejected by the store; the rest were applied.
    Partial { failed_operations: usize },
    Failed { reason: String },
}

impl DocumentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentOutcome::Succeeded => "succeeded",
            DocumentOutcome::Partial { .. } => "partial",
            DocumentOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub protein_id: String,
    pub protein_name: Option<String>,
    pub outcome: DocumentOutcome,
    pub operations: usize,
    pub applied: usize,
    pub skipped: SkipCounts,
    pub truncated_features: usize,
    /// Malformed features, genes or references dropped during extraction.
    pub rejected_sub_entities: Vec<String>,
    pub nodes_by_label: BTreeMap<&'static str, usize>,
    pub relationships_by_type: BTreeMap<&'static str, usize>,
    /// The store was unreachable while this document was being written.
    pub store_unavailable: bool,
}

impl DocumentReport {
    pub(crate) fn new(path: PathBuf, protein_id: String) -> Self {
        Self {
            path,
            protein_id,
            protein_name: None,
            outcome: DocumentOutcome::Succeeded,
            operations: 0,
            applied: 0,
            skipped: SkipCounts::default(),
            truncated_features: 0,
            rejected_sub_entities: Vec::new(),
            nodes_by_label: BTreeMap::new(),
            relationships_by_type: BTreeMap::new(),
            store_unavailable: false,
        }
    }

    pub(crate) fn failed(mut self, reason: impl Into<String>) -> Self {
        self.outcome = DocumentOutcome::Failed {
            reason: reason.into(),
        };
        self
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub documents: Vec<DocumentReport>,
    pub nodes_by_label: BTreeMap<&'static str, usize>,
    pub relationships_by_type: BTreeMap<&'static str, usize>,
    pub skipped: SkipCounts,
    pub truncated_features: usize,
    pub rejected_sub_entities: usize,
    pub store_unavailable: bool,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            documents: Vec::new(),
            nodes_by_label: BTreeMap::new(),
            relationships_by_type: BTreeMap::new(),
            skipped: SkipCounts::default(),
            truncated_features: 0,
            rejected_sub_entities: 0,
            store_unavailable: false,
        }
    }
}

impl RunSummary {
    pub(crate) fn record(&mut self, report: DocumentReport) {
        for (label, count) in &report.nodes_by_label {
            *self.nodes_by_label.entry(*label).or_default() += *count;
        }
        for (rel_type, count) in &report.relationships_by_type {
            *self.relationships_by_type.entry(*rel_type).or_default() += *count;
        }
        self.skipped.merge(&report.skipped);
        self.truncated_features += report.truncated_features;
        self.rejected_sub_entities += report.rejected_sub_entities.len();
        self.store_unavailable |= report.store_unavailable;
        self.documents.push(report);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Succeeded))
    }

    pub fn partial(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Partial { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Failed { .. }))
    }

    pub fn is_clean(&self) -> bool {
        self.documents.iter().all(|d| d.outcome == DocumentOutcome::Succeeded)
    }

    fn count(&self, predicate: impl Fn(&DocumentOutcome) -> bool) -> usize {
        self.documents.iter().filter(|d| predicate(&d.outcome)).count()
    }
}
