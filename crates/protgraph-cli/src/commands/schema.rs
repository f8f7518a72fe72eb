//! `protgraph schema`

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use protgraph_core::PipelineConfig;
use protgraph_graph::schema::{initialize_schema, SCHEMA_STATEMENTS};
use protgraph_graph::GraphClient;

use super::{store_failure, EXIT_STORE_UNAVAILABLE};

pub async fn execute(config: &PipelineConfig) -> Result<ExitCode> {
    let client = match GraphClient::connect(&config.store).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {:#}", "Graph store unavailable:".red().bold(), e);
            return Ok(ExitCode::from(EXIT_STORE_UNAVAILABLE));
        }
    };

    if let Err(e) = initialize_schema(&client).await {
        return Ok(store_failure("Schema initialization failed", &e));
    }
    println!(
        "{} {} identity indexes ensured",
        "✓".green(),
        SCHEMA_STATEMENTS.len().to_string().bold()
    );

    Ok(ExitCode::SUCCESS)
}
