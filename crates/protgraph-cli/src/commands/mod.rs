//! CLI command definitions and handlers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use protgraph_core::PipelineConfig;
use protgraph_graph::StoreError;

pub mod ingest;
pub mod plan;
pub mod schema;
pub mod status;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "protgraph.toml";

/// Exit status when the graph store could not be reached. Safe to retry.
pub const EXIT_STORE_UNAVAILABLE: u8 = 2;

/// Report a failed store call and pick the exit status: 2 when the store
/// went away, 1 when it refused the request.
fn store_failure(context: &str, error: &StoreError) -> ExitCode {
    eprintln!("{} {}", format!("{}:", context).as_str().red().bold(), error);
    ExitCode::from(store_failure_status(error))
}

fn store_failure_status(error: &StoreError) -> u8 {
    if error.is_unavailable() {
        EXIT_STORE_UNAVAILABLE
    } else {
        1
    }
}

/// protgraph - UniProt protein records into a Neo4j graph
#[derive(Parser)]
#[command(name = "protgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to the TOML configuration file
    #[arg(short, long, global = true, env = "PROTGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the UniProt XML documents
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Neo4j bolt URI
    #[arg(long, global = true, env = "NEO4J_URI")]
    pub uri: Option<String>,

    /// Neo4j user
    #[arg(long, global = true, env = "NEO4J_USER")]
    pub user: Option<String>,

    /// Neo4j password
    #[arg(long, global = true, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Neo4j database name
    #[arg(long, global = true, env = "NEO4J_DATABASE")]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest every document in the input directory
    Ingest(ingest::IngestArgs),

    /// Show the upsert plan for one document without touching the store
    Plan(plan::PlanArgs),

    /// Create identity indexes in Neo4j
    Schema,

    /// Show node and relationship counts
    Status,
}

impl Cli {
    /// Run the command. `plan` never touches the store, so it runs without
    /// loading configuration.
    pub async fn execute(self) -> Result<ExitCode> {
        match &self.command {
            Commands::Ingest(args) => ingest::execute(args, &self.resolve_config()?).await,
            Commands::Plan(args) => plan::execute(args).map(|()| ExitCode::SUCCESS),
            Commands::Schema => schema::execute(&self.resolve_config()?).await,
            Commands::Status => status::execute(&self.resolve_config()?).await,
        }
    }

    /// Load the config file (explicit, or `protgraph.toml` if present) and
    /// apply command-line and environment overrides on top.
    fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => load(Path::new(DEFAULT_CONFIG_FILE))?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input.dir = input.clone();
        }
        if let Some(uri) = &self.uri {
            config.store.uri = uri.clone();
        }
        if let Some(user) = &self.user {
            config.store.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.store.password = password.clone();
        }
        if let Some(database) = &self.database {
            config.store.database = database.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn load(path: &Path) -> Result<PipelineConfig> {
    PipelineConfig::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
}
