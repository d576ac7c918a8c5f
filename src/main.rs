//! artifact-harvester CLI: scan a tree, write one report.
//!
//! Logging goes to stderr; set `RUST_LOG=artifact_harvester=debug` or pass `-v`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use artifact_harvester::logging::init_logging;
use artifact_harvester::synth::FixtureGenerator;
use artifact_harvester::{HarvestJob, HarvesterExecutor, JobKind};

#[derive(Parser, Debug)]
#[command(name = "artifact-harvester")]
#[command(about = "Scan source trees and summarize their artifacts into a report.")]
struct Cli {
    /// Debug-level logging (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Limit directory recursion (1 = only the root's own entries)
    #[arg(long, global = true, env = "HARVEST_MAX_DEPTH")]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze Python sources (.py)
    Code {
        root: PathBuf,

        /// Report path; extension selects xlsx, csv or json
        #[arg(short, long, default_value = JobKind::Code.default_output())]
        output: PathBuf,
    },
    /// Extract command and table from XML job descriptors (.xml)
    Xml {
        root: PathBuf,

        #[arg(short, long, default_value = JobKind::Xml.default_output())]
        output: PathBuf,
    },
    /// Join DDL and metadata reports of usecase_* folders
    Schema {
        root: PathBuf,

        #[arg(short, long, default_value = JobKind::Schema.default_output())]
        output: PathBuf,
    },
    /// Write a synthetic jethro-metadata tree
    Synth {
        #[arg(long, default_value = "repo")]
        out: PathBuf,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (kind, root, output) = match cli.command {
        Command::Code { root, output } => (JobKind::Code, root, output),
        Command::Xml { root, output } => (JobKind::Xml, root, output),
        Command::Schema { root, output } => (JobKind::Schema, root, output),
        Command::Synth { out, seed } => {
            let mut generator = match seed {
                Some(seed) => FixtureGenerator::seeded(seed),
                None => FixtureGenerator::from_entropy(),
            };
            let usecases = generator
                .generate(&out)
                .with_context(|| format!("failed to write synthetic tree under {}", out.display()))?;
            println!(
                "Created {} usecase folders under {}",
                usecases.len(),
                out.display()
            );
            return Ok(());
        }
    };

    let job = HarvestJob::new(kind, root)
        .with_output(output)
        .with_max_depth(cli.max_depth);
    let result = HarvesterExecutor::new()
        .execute(&job)
        .with_context(|| format!("{kind} harvest of {} failed", job.root.display()))?;

    match result.output_path {
        Some(path) => println!(
            "Wrote {} rows to {} ({} units skipped)",
            result.stats.rows,
            path.display(),
            result.stats.units_skipped
        ),
        None => println!("No data found under {}", job.root.display()),
    }
    Ok(())
}
