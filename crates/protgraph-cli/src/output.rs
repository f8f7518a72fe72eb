//! Terminal output formatting.

use colored::{ColoredString, Colorize};
use protgraph_core::{GraphPlan, ProteinEntry, UpsertOp};
use protgraph_graph::{DocumentOutcome, DocumentReport, GraphBreakdown, GraphCounts, RunSummary};

/// One progress line per finished document.
pub fn document_line(report: &DocumentReport) -> String {
    let name = report.protein_name.as_deref().unwrap_or("-");
    let detail = match &report.outcome {
        DocumentOutcome::Succeeded => format!("{}/{} applied", report.applied, report.operations),
        DocumentOutcome::Partial { failed_operations } => {
            format!("{}/{} applied, {} rejected", report.applied, report.operations, failed_operations)
        }
        DocumentOutcome::Failed { reason } => reason.clone(),
    };

    format!(
        "  {} {:<12} {:<30} {}",
        outcome_marker(&report.outcome),
        report.protein_id,
        truncate(name, 28),
        detail.dimmed()
    )
}

fn outcome_marker(outcome: &DocumentOutcome) -> ColoredString {
    match outcome {
        DocumentOutcome::Succeeded => "✓".green(),
        DocumentOutcome::Partial { .. } => "~".yellow(),
        DocumentOutcome::Failed { .. } => "✗".red(),
    }
}

/// Print the end-of-run summary.
pub fn print_summary(summary: &RunSummary) {
    let title = if summary.store_unavailable {
        "Ingest interrupted: graph store unavailable".red().bold()
    } else if summary.is_clean() {
        "Ingest complete".green().bold()
    } else {
        "Ingest finished with errors".yellow().bold()
    };

    println!("\n{}", title);
    println!("  Run:        {}", summary.run_id.to_string().dimmed());
    if let Some(finished_at) = summary.finished_at {
        let elapsed = finished_at - summary.started_at;
        println!("  Elapsed:    {:.2}s", elapsed.num_milliseconds() as f64 / 1000.0);
    }
    println!(
        "  Documents:  {} succeeded, {} partial, {} failed",
        summary.succeeded().to_string().green(),
        summary.partial().to_string().yellow(),
        summary.failed().to_string().red()
    );

    if !summary.nodes_by_label.is_empty() {
        println!("\n{}", "Nodes upserted".bold());
        for (label, count) in &summary.nodes_by_label {
            println!("  {:<16} {}", label.cyan(), count);
        }
    }
    if !summary.relationships_by_type.is_empty() {
        println!("\n{}", "Relationships upserted".bold());
        for (rel_type, count) in &summary.relationships_by_type {
            println!("  {:<16} {}", rel_type.yellow(), count);
        }
    }

    if summary.skipped.total() > 0 || summary.truncated_features > 0 || summary.rejected_sub_entities > 0 {
        println!();
        println!(
            "  Skipped: {} unnamed references, {} authors",
            summary.skipped.references, summary.skipped.authors
        );
        println!("  Truncated feature names: {}", summary.truncated_features);
        println!("  Malformed sub-entities:  {}", summary.rejected_sub_entities);
    }

    for report in summary.documents.iter().filter(|r| r.outcome != DocumentOutcome::Succeeded) {
        if let DocumentOutcome::Failed { reason } = &report.outcome {
            println!("  {} {}: {}", "✗".red(), report.path.display(), reason);
        }
        for rejected in &report.rejected_sub_entities {
            println!("    {} {}", "-".dimmed(), rejected.dimmed());
        }
    }
}

/// Print one document's extracted entry and upsert plan.
pub fn print_plan(entry: &ProteinEntry, plan: &GraphPlan) {
    println!(
        "{} {}",
        entry.protein.name.cyan().bold(),
        format!("({})", entry.protein.id).dimmed()
    );
    println!("  {}: {}", "Full name".bold(), entry.full_name.name);
    println!(
        "  {}: {} {}",
        "Organism".bold(),
        entry.organism.name,
        format!("(taxonomy {})", entry.organism.taxonomy_id).dimmed()
    );
    println!(
        "  {}: {} features, {} genes, {} references",
        "Entities".bold(),
        entry.features.len(),
        entry.genes.len(),
        entry.references.len()
    );

    println!("\n{} ({}):", "Operations".bold(), plan.operations.len());
    for (i, op) in plan.operations.iter().enumerate() {
        let kind = match op {
            UpsertOp::Node(_) => "node".cyan(),
            UpsertOp::Relationship(_) => "rel ".yellow(),
        };
        println!("  {:>3}. {} {}", i + 1, kind, op);
    }

    if plan.skipped.total() > 0 {
        println!(
            "\n  Skipped {} unnamed references and {} of their authors",
            plan.skipped.references, plan.skipped.authors
        );
    }
    if plan.truncated_features > 0 {
        println!("  Truncated {} feature names", plan.truncated_features);
    }
    for rejected in &entry.rejected {
        println!("  {} {}", "!".yellow(), rejected);
    }
}

pub fn print_counts(counts: &GraphCounts) {
    println!("  Nodes:         {}", counts.nodes.to_string().cyan());
    println!("  Relationships: {}", counts.relationships.to_string().cyan());
}

pub fn print_breakdown(breakdown: &GraphBreakdown) {
    println!();
    for (label, count) in &breakdown.nodes {
        println!("  {:<16} {}", label.cyan(), count);
    }
    println!();
    for (rel_type, count) in &breakdown.relationships {
        println!("  {:<16} {}", rel_type.yellow(), count);
    }
}

/// Truncate a string to max chars, adding ellipsis if needed.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
