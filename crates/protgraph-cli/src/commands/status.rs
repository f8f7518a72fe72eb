//! `protgraph status`

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use protgraph_core::PipelineConfig;
use protgraph_graph::GraphClient;

use super::EXIT_STORE_UNAVAILABLE;
use crate::output;

/// Show node and relationship counts, total and per label/type.
pub async fn execute(config: &PipelineConfig) -> Result<ExitCode> {
    let client = match GraphClient::connect(&config.store).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {:#}", "Graph store unavailable:".red().bold(), e);
            return Ok(ExitCode::from(EXIT_STORE_UNAVAILABLE));
        }
    };

    println!("{} {}", "Protein Graph Status".bold(), config.store.uri.dimmed());
    println!("{}", "─".repeat(40));

    let counts = client.get_counts().await?;
    output::print_counts(&counts);

    let breakdown = client.get_breakdown().await?;
    output::print_breakdown(&breakdown);

    println!("{}", "─".repeat(40));
    Ok(ExitCode::SUCCESS)
}
