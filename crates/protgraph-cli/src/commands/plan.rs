//! `protgraph plan <file>`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use protgraph_core::{plan_document, SourceDocument};

use crate::output;

#[derive(Args)]
pub struct PlanArgs {
    /// UniProt XML document
    pub file: PathBuf,

    /// Print the extracted entry and plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: &PlanArgs) -> Result<()> {
    let document = SourceDocument::from_path(&args.file)
        .with_context(|| format!("Not a document path: {}", args.file.display()))?;
    let xml = document.read()?;
    let (entry, plan) =
        plan_document(&xml, &document.id).with_context(|| format!("Failed to plan {}", args.file.display()))?;

    if args.json {
        let value = serde_json::json!({ "entry": entry, "plan": plan });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        output::print_plan(&entry, &plan);
    }

    Ok(())
}
