use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use demesim::demography;
use demesim::evolution::introduction;
use demesim::prelude::*;

/// demesim: a Wright-Fisher allele-frequency simulator
///
/// Simulates how allele frequencies drift, respond to selection and flow
/// between populations, over a demes-style demographic model.
#[derive(Parser, Debug)]
#[command(name = "demesim")]
#[command(author, version, about = "Simulates allele-frequency trajectories over demographic models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one or more replicate simulations and export their histories.
    Run {
        /// Demographic model file (demes-style YAML)
        #[arg(short, long)]
        model: PathBuf,

        /// Allele-introduction configuration file (YAML with a new_alleles list)
        #[arg(long)]
        alleles_config: Option<PathBuf>,

        /// Potential-allele set, e.g. "wt,resistant" (default: 0,1)
        #[arg(long, value_delimiter = ',')]
        alleles: Vec<String>,

        /// Initial frequency: a single float for a two-allele set, or
        /// per-allele assignments like "wt=0.9,resistant=0.1"
        #[arg(long)]
        initial_frequency: Option<String>,

        /// Shared forward/backward per-individual mutation probability
        #[arg(long, default_value_t = 0.0)]
        mutation_rate: f64,

        /// Wild-type allele (default: first of the allele set)
        #[arg(long)]
        wild_type: Option<String>,

        /// Selection coefficients, e.g. "resistant=0.05,costly=-0.1"
        #[arg(long)]
        selection: Option<String>,

        /// Random seed; replicate k runs with seed + k. Omit for
        /// non-reproducible runs.
        #[arg(long)]
        seed: Option<u64>,

        /// Number of independent replicate simulations to run in parallel
        #[arg(short, long, default_value_t = 1)]
        replicates: usize,

        /// Output format (csv, json)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show progress bar
        #[arg(long, default_value_t = true)]
        progress: bool,
    },

    /// Resolve a model and optional allele config and print a summary.
    Validate {
        /// Demographic model file (demes-style YAML)
        #[arg(short, long)]
        model: PathBuf,

        /// Allele-introduction configuration file
        #[arg(long)]
        alleles_config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            model,
            alleles_config,
            alleles,
            initial_frequency,
            mutation_rate,
            wild_type,
            selection,
            seed,
            replicates,
            format,
            output,
            progress,
        } => run_command(
            &model,
            alleles_config.as_deref(),
            &alleles,
            initial_frequency.as_deref(),
            mutation_rate,
            wild_type.as_deref(),
            selection.as_deref(),
            seed,
            replicates,
            &format,
            output.as_deref(),
            progress,
        ),
        Commands::Validate {
            model,
            alleles_config,
        } => validate_command(&model, alleles_config.as_deref()),
    }
}

#[derive(Serialize)]
struct ReplicateOutput {
    replicate: usize,
    seed: Option<u64>,
    history: History,
}

#[allow(clippy::too_many_arguments)]
fn run_command(
    model: &Path,
    alleles_config: Option<&Path>,
    alleles: &[String],
    initial_frequency: Option<&str>,
    mutation_rate: f64,
    wild_type: Option<&str>,
    selection: Option<&str>,
    seed: Option<u64>,
    replicates: usize,
    format: &str,
    output: Option<&Path>,
    progress: bool,
) -> Result<()> {
    if replicates == 0 {
        bail!("--replicates must be at least 1");
    }
    if format != "csv" && format != "json" {
        bail!("Unknown output format '{format}' (expected csv or json)");
    }

    let graph = demography::load_path(model)
        .with_context(|| format!("Failed to load demographic model {}", model.display()))?;

    let entries = match alleles_config {
        Some(path) => introduction::load_path(path)
            .with_context(|| format!("Failed to load allele config {}", path.display()))?,
        None => Vec::new(),
    };

    let mut builder = SimulationBuilder::new()
        .graph(graph)
        .mutation_rate(mutation_rate)
        .introductions(entries);
    if !alleles.is_empty() {
        builder = builder.alleles(alleles.iter().map(String::as_str));
    }
    if let Some(wild_type) = wild_type {
        builder = builder.wild_type(wild_type);
    }
    if let Some(text) = initial_frequency {
        builder = builder.initial_frequency(parse_initial_frequency(text)?);
    }
    if let Some(text) = selection {
        builder = builder.selection_coefficients(parse_assignments(text)?);
    }

    // Validate the configuration once up front so errors surface before
    // any replicate starts.
    builder
        .clone()
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid simulation configuration: {e}"))?;

    // Status goes to stderr so piped CSV/JSON output stays clean.
    eprintln!("demesim - Running {replicates} replicate(s)");

    let pb = if progress {
        let pb = ProgressBar::new(replicates as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let results: Vec<ReplicateOutput> = (0..replicates)
        .into_par_iter()
        .map(|replicate| -> Result<ReplicateOutput> {
            let replicate_seed = seed.map(|s| s + replicate as u64);
            let mut builder = builder.clone();
            if let Some(s) = replicate_seed {
                builder = builder.seed(s);
            }
            let mut sim = builder
                .build()
                .map_err(|e| anyhow::anyhow!("Replicate {replicate}: {e}"))?;
            sim.run();
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            Ok(ReplicateOutput {
                replicate,
                seed: replicate_seed,
                history: sim.into_history(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file {}", path.display())
        })?)),
        None => Box::new(std::io::stdout().lock()),
    };

    if format == "csv" {
        write_csv(&mut writer, &results)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, &results)?;
        writeln!(writer)?;
    }
    writer.flush()?;

    if let Some(path) = output {
        eprintln!(
            "✓ Wrote {replicates} replicate histories to {}",
            path.display()
        );
    }
    Ok(())
}

fn write_csv(writer: &mut dyn Write, results: &[ReplicateOutput]) -> Result<()> {
    writeln!(writer, "replicate,deme,generation,allele,frequency")?;
    for result in results {
        for deme in result.history.demes() {
            let series = result.history.series(deme).unwrap_or(&[]);
            for (index, snapshot) in series.iter().enumerate() {
                let generation = result
                    .history
                    .generation_of(deme, index)
                    .unwrap_or_default();
                for (allele, frequency) in snapshot.iter() {
                    writeln!(
                        writer,
                        "{},{},{},{},{}",
                        result.replicate, deme, generation, allele, frequency
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn validate_command(model: &Path, alleles_config: Option<&Path>) -> Result<()> {
    let graph = demography::load_path(model)
        .with_context(|| format!("Failed to load demographic model {}", model.display()))?;

    println!("demesim - Model summary");
    println!("=======================");
    println!("Demes ({}):", graph.demes().len());
    for deme in graph.demes() {
        let start = if deme.start_time().is_infinite() {
            "inf".to_string()
        } else {
            format!("{}", deme.start_time())
        };
        println!(
            "  {} [start {}, end {}] initial size {}",
            deme.name(),
            start,
            deme.end_time(),
            deme.initial_size()
        );
        if !deme.ancestors().is_empty() {
            println!(
                "    ancestors: {} (proportions {:?})",
                deme.ancestors().join(", "),
                deme.proportions()
            );
        }
    }
    if !graph.migrations().is_empty() {
        println!("Migrations ({}):", graph.migrations().len());
        for migration in graph.migrations() {
            println!(
                "  {} -> {} rate {} over [{}, {}]",
                migration.source,
                migration.dest,
                migration.rate,
                migration.end_time,
                migration.start_time
            );
        }
    }
    if !graph.pulses().is_empty() {
        println!("Pulses ({}):", graph.pulses().len());
        for pulse in graph.pulses() {
            println!(
                "  {} -> {} proportion {} at {}",
                pulse.source, pulse.dest, pulse.proportion, pulse.time
            );
        }
    }
    println!("Simulation runs {} generations", graph.start_generation() + 1);

    if let Some(path) = alleles_config {
        let entries = introduction::load_path(path)
            .with_context(|| format!("Failed to load allele config {}", path.display()))?;
        println!("Scheduled introductions ({}):", entries.len());
        for entry in &entries {
            println!(
                "  {} into {} at generation {} (frequency {})",
                entry.allele, entry.population, entry.start_time, entry.initial_frequency
            );
        }
    }

    println!("✓ Model is valid");
    Ok(())
}

fn parse_initial_frequency(text: &str) -> Result<InitialFrequency> {
    if let Ok(frequency) = text.parse::<f64>() {
        return Ok(InitialFrequency::Single(frequency));
    }
    Ok(InitialFrequency::PerAllele(parse_assignments(text)?))
}

fn parse_assignments(text: &str) -> Result<HashMap<Allele, f64>> {
    let mut assignments = HashMap::new();
    for part in text.split(',') {
        let (allele, value) = part
            .split_once('=')
            .with_context(|| format!("Expected allele=value, got '{part}'"))?;
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid number in '{part}'"))?;
        assignments.insert(Allele::new(allele.trim()), value);
    }
    Ok(assignments)
}
