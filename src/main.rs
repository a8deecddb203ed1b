use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use fattree::config::Config;
use fattree::config_loader::{self, CliOverrides};
use fattree::orchestrator::generate_network_config;
use fattree::traffic::TrafficPolicy;

/// Configuration generator for k-ary fat-tree data-center network simulations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the network manifest, route tables and traffic matrix
    #[arg(short, long, default_value = "fattree_output")]
    output: PathBuf,

    /// Switch port count K, overrides topology.arity
    #[arg(short = 'k', long)]
    arity: Option<usize>,

    /// Traffic seed, overrides general.seed
    #[arg(long)]
    seed: Option<u64>,

    /// Traffic policy, overrides traffic.policy
    #[arg(long, value_enum)]
    policy: Option<TrafficPolicy>,

    /// Print the synthesized route tables to stdout
    #[arg(long)]
    print_routes: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            arity: self.arity,
            seed: self.seed,
            policy: self.policy,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => Config::default(),
    };
    config_loader::apply_overrides(&mut config, &args.overrides())?;

    // RUST_LOG wins over the configured level
    let default_level = config.general.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Starting fat-tree configuration generator");
    match &args.config {
        Some(path) => info!("Configuration file: {:?}", path),
        None => info!("No configuration file given, using defaults"),
    }
    info!("Output directory: {:?}", args.output);

    // Clean up previous output
    if args.output.exists() && args.output != Path::new(".") {
        fs::remove_dir_all(&args.output)
            .wrap_err_with(|| {
                format!("Failed to remove output directory '{}'", args.output.display())
            })?;
    }

    let network = generate_network_config(&config, &args.output)?;

    if args.print_routes {
        print!("{}", network.routes_text()?);
    }

    info!("Configuration generation completed successfully");
    Ok(())
}
