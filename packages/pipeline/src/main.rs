#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CLI for the cooling access and tree density heat map.
//!
//! Loads the cooling site, street tree, and tract statistics CSVs, ranks
//! tracts by tree density, buffers each cooling site, and writes the
//! results for the map frontend.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use heat_map_pipeline::config::DEFAULT_CONFIG_FILE;
use heat_map_pipeline::{InputData, PipelineConfig, output};

#[derive(Parser)]
#[command(name = "heat_map", about = "Heat vulnerability and cooling access pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write outputs
    Run(RunArgs),
    /// Load and validate the inputs without writing anything
    Validate(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Configuration file (defaults to `heat_map.toml` if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cooling sites CSV
    #[arg(long)]
    cooling: Option<PathBuf>,

    /// Street tree census CSV
    #[arg(long)]
    trees: Option<PathBuf>,

    /// Tract statistics CSV
    #[arg(long)]
    tracts: Option<PathBuf>,

    /// Directory for generated files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Buffer radius in feet
    #[arg(long)]
    radius_ft: Option<f64>,
}

impl RunArgs {
    fn resolve_config(&self) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                PipelineConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => PipelineConfig::default(),
        };

        if let Some(path) = &self.cooling {
            config.inputs.cooling = Some(path.clone());
        }
        if let Some(path) = &self.trees {
            config.inputs.trees = Some(path.clone());
        }
        if let Some(path) = &self.tracts {
            config.inputs.tracts = Some(path.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir.clone_from(dir);
        }
        if let Some(radius) = self.radius_ft {
            config.buffer.radius_ft = radius;
        }

        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(&args)?,
        Commands::Validate(args) => validate(&args)?,
    }

    Ok(())
}

fn run(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.resolve_config()?;
    let options = config.options()?;
    let data = InputData::read(&config.input_files()?)?;

    let result = heat_map_pipeline::run(&data, &options)?;
    let files = output::write_outputs(&result, &config.output.dir)?;

    let summary = result.analysis.summary();
    println!("Total census tracts:     {}", summary.total_tracts);
    println!(
        "Average trees per tract: {:.2}",
        summary.mean_trees_per_tract
    );
    println!(
        "High-priority tracts:    {} (risk_index < {})",
        summary.high_priority_tracts,
        result.analysis.priority_threshold()
    );
    println!("Cooling sites buffered:  {}", result.buffers.len());
    println!();
    println!("{:<10} {:>10}", "tract", "trees");
    for row in &summary.preview {
        println!("{:<10} {:>10}", row.tract_2010, row.tree_count);
    }
    println!();
    println!("Wrote {}", files.tracts.display());
    println!("Wrote {}", files.priority.display());
    println!("Wrote {}", files.cooling_sites.display());
    println!("Wrote {}", files.buffers.display());
    println!("Wrote {}", files.summary.display());

    Ok(())
}

fn validate(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.resolve_config()?;
    let options = config.options()?;
    let data = InputData::read(&config.input_files()?)?;

    let loaded = heat_map_pipeline::load(&data, &options)?;

    println!("Cooling sites:  {}", loaded.cooling_sites.len());
    println!(
        "Trees:          {} kept, {} dropped (tract column '{}')",
        loaded.trees.points.len(),
        loaded.trees.dropped,
        loaded.trees.tract_column
    );
    println!("Tract rows:     {}", loaded.tracts.len());

    Ok(())
}
