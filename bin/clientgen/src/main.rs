//! `clientgen`: synthesizes a typed HTTP client library from an
//! annotated server project.
//!
//! Usage:
//!   clientgen <manifest> [--output <file>]
//!
//! Reads the TOML project manifest, analyzes the listed server sources,
//! prints the synthesized client unit to stdout and reports the unit's
//! compile diagnostics. Logs go to stderr so the stdout report stays
//! machine-readable.

mod compile;
mod manifest;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use clientgen_core::{run, ReferenceCache};
use clientgen_semantics::SourceFile;

use manifest::ProjectManifest;

#[derive(Parser)]
#[command(name = "clientgen")]
#[command(about = "Generate a typed HTTP client library from an annotated server project")]
struct Cli {
    /// Path to the project manifest (TOML).
    manifest: PathBuf,

    /// Also write the synthesized unit to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let manifest = ProjectManifest::load(&cli.manifest)?;
    info!("analyzing project {}", manifest.project.name);
    println!("Files: {}", manifest.project.sources.join(", "));

    let mut sources = Vec::new();
    for path in manifest.resolve_sources(&cli.manifest) {
        sources.push(SourceFile::read(&path)?);
    }

    let cache = ReferenceCache::new();
    let output = run(sources, &manifest.references, &manifest.generator, &cache)?;

    println!("Found: {}", output.controllers.join(", "));
    println!("Actions: {}", output.actions.join(", "));
    println!("{}", output.unit);

    if let Some(path) = &cli.output {
        std::fs::write(path, &output.unit)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    // The unit links the runtime, the rest client and serde; the web
    // markers belong to the server side only.
    let unit_references = [cache.runtime(), cache.rest_client(), cache.serde()];
    for diagnostic in compile::verify_unit(&output.unit, &unit_references) {
        println!("{diagnostic}");
    }

    Ok(())
}
