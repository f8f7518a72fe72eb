//! `protgraph ingest`

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use protgraph_core::{discover_documents, PipelineConfig, SourceDocument};
use protgraph_graph::{run_ingest, GraphClient, GraphStore, IngestOptions, MemoryGraph, RunSummary};
use tracing::info;

use super::{store_failure, EXIT_STORE_UNAVAILABLE};
use crate::output;

#[derive(Args)]
pub struct IngestArgs {
    /// Run against an in-memory graph instead of Neo4j
    #[arg(long)]
    pub dry_run: bool,

    /// Do not create identity indexes before ingesting
    #[arg(long)]
    pub skip_schema: bool,
}

pub async fn execute(args: &IngestArgs, config: &PipelineConfig) -> Result<ExitCode> {
    let documents = discover_documents(&config.input.dir, &config.input.extension)
        .with_context(|| format!("Failed to scan {}", config.input.dir.display()))?;

    if documents.is_empty() {
        println!(
            "{} {}",
            "No documents found in".dimmed(),
            config.input.dir.display().to_string().dimmed()
        );
        return Ok(ExitCode::SUCCESS);
    }

    info!(documents = documents.len(), dir = %config.input.dir.display(), "Discovered documents");
    let options = IngestOptions::from(config);

    if args.dry_run {
        println!("{}", "Dry run against an in-memory graph...".bold());
        let graph = MemoryGraph::new();
        let summary = ingest(&graph, &documents, &options).await;
        output::print_summary(&summary);
        output::print_counts(&graph.counts());
        return Ok(ExitCode::from(exit_status(&summary)));
    }

    println!("{} {}", "Ingesting into".bold(), config.store.uri.cyan());

    let client = match GraphClient::connect(&config.store).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {:#}", "Graph store unavailable:".red().bold(), e);
            return Ok(ExitCode::from(EXIT_STORE_UNAVAILABLE));
        }
    };

    if !args.skip_schema {
        if let Err(e) = protgraph_graph::schema::initialize_schema(&client).await {
            return Ok(store_failure("Schema initialization failed", &e));
        }
    }

    let summary = ingest(&client, &documents, &options).await;
    drop(client);

    output::print_summary(&summary);
    Ok(ExitCode::from(exit_status(&summary)))
}

async fn ingest<S: GraphStore>(store: &S, documents: &[SourceDocument], options: &IngestOptions) -> RunSummary {
    let bar = ProgressBar::new(documents.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    bar.enable_steady_tick(Duration::from_millis(100));

    let summary = run_ingest(store, documents, options, |report| {
        bar.println(output::document_line(report));
        bar.set_message(report.protein_id.clone());
        bar.inc(1);
    })
    .await;

    bar.finish_and_clear();
    summary
}

/// 0 when every document succeeded, 2 when the store went away, 1 otherwise.
fn exit_status(summary: &RunSummary) -> u8 {
    if summary.store_unavailable {
        EXIT_STORE_UNAVAILABLE
    } else if summary.is_clean() {
        0
    } else {
        1
    }
}
