//! `retro-plan`: plan routes for a target and write a result directory.
//!
//! ```text
//! retro-plan plan --world multi_route --out results/
//! retro-plan plan --catalog catalog.json --target 'CCOC(C)=O' --config planner.toml
//! retro-plan verify results/
//! retro-plan worlds
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use retro_harness::catalog::Catalog;
use retro_harness::config::PlannerConfig;
use retro_harness::result_dir::{verify_result_dir, write_result_dir};
use retro_harness::runner::run_planner;
use retro_harness::worlds;
use retro_search::export::PathFormat;
use retro_search::paths::SortingMetric;
use retro_search::tree::Collaborators;

#[derive(Debug, Parser)]
#[command(name = "retro-plan", version, about = "MCTS retrosynthesis route planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a search tree and extract ranked routes.
    Plan(PlanArgs),
    /// Check a result directory against its recorded digests.
    Verify {
        /// Directory written by `plan --out`.
        dir: PathBuf,
    },
    /// List the built-in fixture worlds.
    Worlds,
}

#[derive(Debug, clap::Args)]
struct PlanArgs {
    /// Catalog file (`.json` or `.toml`) serving templates, prices, and scores.
    #[arg(long, conflicts_with = "world", requires = "target")]
    catalog: Option<PathBuf>,
    /// Built-in world supplying target, catalog, and configuration.
    #[arg(long)]
    world: Option<String>,
    /// Planner configuration (`.json` or `.toml`). Replaces the world's.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Target SMILES. Overrides the world's target.
    #[arg(long)]
    target: Option<String>,
    /// Write the result directory here.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Expansion budget in seconds.
    #[arg(long)]
    expansion_time: Option<f64>,
    #[arg(long)]
    max_iterations: Option<u64>,
    #[arg(long)]
    max_trees: Option<usize>,
    /// `plausibility`, `number_of_reactions`, or `number_of_starting_materials`.
    #[arg(long)]
    sort: Option<SortingMetric>,
    /// `legacy` or `native`.
    #[arg(long)]
    format: Option<PathFormat>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Plan(args) => plan(&args),
        Command::Verify { dir } => {
            let digest = verify_result_dir(&dir)
                .with_context(|| format!("verifying {}", dir.display()))?;
            println!("{digest}");
            Ok(())
        }
        Command::Worlds => {
            for world in worlds::all() {
                println!("{}\t{}", world.world_id(), world.target());
            }
            Ok(())
        }
    }
}

fn plan(args: &PlanArgs) -> Result<()> {
    let (catalog, mut config, target) = match (&args.catalog, &args.world) {
        (Some(path), None) => {
            let catalog = Catalog::load(path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            (catalog, PlannerConfig::default(), args.target.clone())
        }
        (None, Some(id)) => {
            let Some(world) = worlds::by_id(id) else {
                bail!("unknown world {id:?}; run `retro-plan worlds` for the list");
            };
            let target = args.target.clone().or_else(|| Some(world.target().to_string()));
            (world.catalog(), world.config(), target)
        }
        _ => bail!("pass exactly one of --catalog or --world"),
    };
    let Some(target) = target else {
        bail!("--target is required with --catalog");
    };

    if let Some(path) = &args.config {
        config = PlannerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?;
    }
    if let Some(secs) = args.expansion_time {
        config.search.expansion_time = secs;
    }
    if let Some(n) = args.max_iterations {
        config.search.max_iterations = Some(n);
    }
    if let Some(n) = args.max_trees {
        config.paths.max_trees = Some(n);
    }
    if let Some(metric) = args.sort {
        config.paths.sorting_metric = metric;
    }
    if let Some(format) = args.format {
        config.paths.path_format = format;
    }

    let outcome = run_planner(&target, Collaborators::from_provider(&catalog), &config)
        .with_context(|| format!("planning {target}"))?;

    if let Some(dir) = &args.out {
        write_result_dir(&outcome, dir)
            .with_context(|| format!("writing {}", dir.display()))?;
        println!("{}", outcome.digest);
    } else {
        println!("{}", serde_json::to_string_pretty(&outcome.routes)?);
    }
    Ok(())
}
