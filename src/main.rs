//! Chemistry reaction simulator
//!
//! Mixes chemicals in a container and steps through the reactions a recipe
//! catalog allows, one reaction per step.

mod catalog;
mod error;
mod ledger;
mod loader;
mod logging;
mod matcher;
mod models;
mod simulator;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use crate::catalog::RecipeCatalog;
use crate::ledger::QuantityLedger;
use crate::models::{Quantity, RecipeKind};
use crate::simulator::{Simulator, SimulatorConfig};

#[derive(Parser)]
#[command(name = "chem-sim")]
#[command(about = "Step-by-step reaction simulator for ChemMaster-style chemistry")]
struct Cli {
    /// Directory of .recipes files to use instead of the built-in catalog
    #[arg(long, global = true)]
    recipes: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mix chemicals and react them until nothing more happens
    Simulate {
        /// Starting contents, e.g. hydrogen=17 nitrogen=4 (order matters)
        #[arg(required = true, value_parser = parse_quantity_arg)]
        chemicals: Vec<Quantity>,

        /// Maximum number of reactions to apply
        #[arg(short, long, default_value = "64")]
        steps: usize,

        /// Container temperature in °C
        #[arg(short, long, default_value = "20", allow_hyphen_values = true)]
        temperature: i32,
    },

    /// List all recipes in the catalog
    ListRecipes,

    /// Show details for a specific recipe
    Recipe {
        /// Chemical name
        name: String,
    },

    /// Amount to brew to end up with at least the wanted amount
    Minimal {
        /// Chemical name
        name: String,

        /// Units wanted
        amount: u64,
    },

    /// Check whether a recipe can react with the given chemicals
    Check {
        /// Chemical name
        name: String,

        /// Available chemicals, e.g. hydrogen=3 nitrogen=1
        #[arg(value_parser = parse_quantity_arg)]
        chemicals: Vec<Quantity>,

        /// Container temperature in °C
        #[arg(short, long, default_value = "20", allow_hyphen_values = true)]
        temperature: i32,
    },

    /// Load a recipe directory and report what it contains
    Validate {
        /// Directory of .recipes files
        dir: PathBuf,
    },
}

fn parse_quantity_arg(text: &str) -> Result<Quantity, String> {
    loader::parse_quantity(text).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet);

    let catalog = open_catalog(cli.recipes.as_deref())?;

    match cli.command {
        Commands::Simulate {
            chemicals,
            steps,
            temperature,
        } => {
            let config = SimulatorConfig {
                temperature,
                max_steps: steps,
            };
            let ledger = QuantityLedger::from_sequence(&chemicals).context("invalid starting contents")?;
            println!("Start: {}", ledger);

            let mut sim = Simulator::with_config(&catalog, ledger, config);
            let applied = sim
                .run()
                .context("reaction aborted; container left as it was before the failing step")?;
            for (i, reaction) in applied.iter().enumerate() {
                println!("Step {}: {}", i + 1, reaction);
                println!("  {}", reaction.after);
            }

            if applied.len() == sim.config().max_steps {
                println!("Stopped after {} reactions.", applied.len());
            } else {
                println!("No further reactions.");
            }
            println!("Final: {}", sim.ledger());
        }

        Commands::ListRecipes => {
            if catalog.is_empty() {
                println!("No recipes in catalog.");
            } else {
                println!("{} recipes:\n", catalog.len());
                println!("{:<16} {:<12} {:>6}  {}", "Recipe", "Kind", "Yield", "Components");
                println!("{}", "-".repeat(60));
                for r in catalog.iter() {
                    let parts: Vec<String> = r.components().map(|q| q.to_string()).collect();
                    println!(
                        "{:<16} {:<12} {:>6}  {}",
                        r.name,
                        r.kind.label(),
                        r.output_amount,
                        parts.join(", ")
                    );
                }
            }
        }

        Commands::Recipe { name } => {
            if let Some(r) = catalog.get(&name) {
                println!("Recipe: {}", r.name);
                println!("  Kind: {}", r.kind.label());
                println!("  Yield per batch: {}", r.output_amount);
                if let RecipeKind::Composite(components) = &r.kind {
                    println!("  Components:");
                    for (component, q) in components.iter() {
                        println!("    {:<16} {}", component, q.amount);
                    }
                }
            } else {
                println!("Recipe '{}' not found", name);
            }
        }

        Commands::Minimal { name, amount } => {
            let r = catalog
                .get(&name)
                .ok_or_else(|| anyhow!("recipe '{}' not found", name))?;
            let batch = r.minimal(amount).ok_or_else(|| {
                anyhow!("{} units of {} rounded up to whole batches does not fit in 64 bits", amount, r.name)
            })?;
            println!("{}", batch);
        }

        Commands::Check {
            name,
            chemicals,
            temperature,
        } => {
            let r = catalog
                .get(&name)
                .ok_or_else(|| anyhow!("recipe '{}' not found", name))?;
            let available = QuantityLedger::from_sequence(&chemicals).context("invalid chemicals")?;
            if r.can_react(&available, temperature) {
                println!("{} can react with {}", r.name, available);
            } else {
                println!("{} cannot react with {}", r.name, available);
                for required in r.components() {
                    if !available.contains(required) {
                        println!("  missing {}", required);
                    } else if let Some(have) = available.get(&required.name).filter(|h| !h.has_enough(required)) {
                        println!("  short of {}: have {}, need {}", required.name, have.amount, required.amount);
                    }
                }
            }
        }

        Commands::Validate { dir } => {
            let (_, stats) = loader::load_catalog(&dir)?;
            println!("{}", stats);
        }
    }

    Ok(())
}

fn open_catalog(dir: Option<&Path>) -> Result<RecipeCatalog> {
    match dir {
        Some(dir) => {
            let (catalog, stats) = loader::load_catalog(dir)?;
            tracing::info!(recipes = catalog.len(), "{}", stats);
            Ok(catalog)
        }
        None => Ok(RecipeCatalog::standard()?),
    }
}
