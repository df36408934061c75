//! Command line wire extraction
//!
//! Usage:
//!   wire_extract <svg>... [--format markdown|json] [--output <path>]
//!                [--exclusions <json>] [--rules <json|toml>] [--summary]
//!
//! Each input produces `<stem>_connections.md` (or `.json`) next to the input,
//! or inside `--output` when it names a directory. A single input may also be
//! written to an explicit `--output` file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{error, info};
use rayon::prelude::*;

use wire_extract::config::load_rules;
use wire_extract::infer::{infer_connections, InferenceRules};
use wire_extract::report::{load_exclusions, write_json, write_markdown, ExclusionRules, Summary};
use wire_extract::svg::parse_svg_file;

#[derive(Parser)]
#[command(name = "wire_extract")]
#[command(about = "Extract wire connections from SVG wiring diagrams", long_about = None)]
#[command(version)]
struct Cli {
    /// SVG wiring diagrams to process
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Report format
    #[arg(short, long, default_value = "markdown")]
    format: OutputFormat,

    /// Output file (single input) or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file of pins and connections to drop from the results
    #[arg(short, long)]
    exclusions: Option<PathBuf>,

    /// JSON or TOML file overriding the inference thresholds
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Print connection statistics for each input
    #[arg(short, long)]
    summary: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OutputFormat {
    Markdown,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

fn output_path(cli: &Cli, input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("diagram");
    let file_name = format!("{}_connections.{}", stem, cli.format.extension());
    match &cli.output {
        Some(output) if output.is_dir() || cli.inputs.len() > 1 => output.join(file_name),
        Some(output) => output.clone(),
        None => input.with_file_name(file_name),
    }
}

fn process(cli: &Cli, rules: &InferenceRules, exclusions: &ExclusionRules, input: &Path) -> Result<Summary> {
    let start = Instant::now();
    let diagram = parse_svg_file(input)?;
    let output = infer_connections(&diagram, rules)
        .with_context(|| format!("inferring connections for '{}'", input.display()))?;
    let summary = Summary::from_output(&output);
    let connections = exclusions.apply(output.connections);

    let destination = output_path(cli, input);
    match cli.format {
        OutputFormat::Markdown => write_markdown(&connections, &destination)?,
        OutputFormat::Json => write_json(&connections, &destination)?,
    }
    info!(
        "{}: {} connections -> {} in {:?}",
        input.display(),
        connections.len(),
        destination.display(),
        start.elapsed()
    );
    Ok(Summary {
        strategy_counts: summary.strategy_counts,
        ..Summary::of(&connections)
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env = Env::default().default_filter_or("warn");
    env_logger::Builder::from_env(env).init();

    if let Some(output) = &cli.output {
        if cli.inputs.len() > 1 && !output.is_dir() {
            bail!("--output must be an existing directory when several inputs are given");
        }
    }

    let rules = match &cli.rules {
        Some(path) => load_rules(path)?,
        None => InferenceRules::default(),
    };
    let exclusions = match &cli.exclusions {
        Some(path) => load_exclusions(path)?,
        None => ExclusionRules::default(),
    };

    let results: Vec<(&PathBuf, Result<Summary>)> = cli
        .inputs
        .par_iter()
        .map(|input| (input, process(&cli, &rules, &exclusions, input)))
        .collect();

    let mut failures = 0;
    for (input, result) in results {
        match result {
            Ok(summary) => {
                if cli.summary {
                    println!("{}", input.display());
                    print!("{}", summary);
                }
            }
            Err(e) => {
                error!("{:#}", e);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        bail!("{} of {} inputs failed", failures, cli.inputs.len());
    }
    Ok(())
}
