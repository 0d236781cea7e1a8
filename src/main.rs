//! linkrisk CLI - privacy evaluation with respect to the risk of linkability.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use linkrisk::{expand_env_vars, LinkageGame, RunConfig};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "linkrisk")]
#[command(author = "Infernet <dev@infernet.org>")]
#[command(version)]
#[command(about = "Privacy evaluation of synthetic data generators against linkability attacks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to runconfig file
    #[arg(short, long, global = true, default_value = "runconfig.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the linkage game: partition the population, build the model list
    Run {
        /// Path stem of the local data files (<stem>.csv + <stem>.json)
        #[arg(short, long)]
        data: PathBuf,

        /// Directory for result artifacts (created if absent)
        #[arg(short, long, default_value = "output")]
        outdir: PathBuf,
    },

    /// Validate the runconfig file
    Validate,

    /// Show example runconfig
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"# linkrisk runconfig file

# Global seed: the same runconfig + seed reproduces identical partitions
# and model lists
seed = 42

# Number of target records drawn at random from the population
nTargets = 10

# Pin specific records as attack targets (optional; appended to the draw)
# Targets = ["key_A", "key_B"]

# Size of the adversary's auxiliary-knowledge sample
sizeRawA = 100

# Candidate generative models, one instance per parameter tuple,
# evaluated in declaration order
[[generativeModels]]
family = "BayesianNet"
params = [[3]]                      # [degree]

[[generativeModels]]
family = "PrivBayes"
params = [[1, 0.1], [2, 0.5]]       # [degree, epsilon]
"#;
    println!("{example}");
}

fn expand_path(path: &PathBuf) -> PathBuf {
    PathBuf::from(expand_env_vars(&path.to_string_lossy()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Example => {
            print_example_config();
            return Ok(());
        }

        Commands::Validate => {
            let config = RunConfig::from_file(&cli.config)
                .with_context(|| format!("Failed to load runconfig from {:?}", cli.config))?;

            info!("Runconfig is valid");
            info!(
                "  Targets: {} random + {} pinned",
                config.n_targets,
                config.targets.as_ref().map_or(0, |t| t.len())
            );
            info!("  Auxiliary sample: {}", config.size_raw_a);
            info!(
                "  Model instances: {} across {} families",
                config.declared_instances(),
                config.generative_models.len()
            );
            return Ok(());
        }

        Commands::Run { data, outdir } => {
            let config = RunConfig::from_file(&cli.config)
                .with_context(|| format!("Failed to load runconfig from {:?}", cli.config))?;

            let data = expand_path(&data);
            let outdir = expand_path(&outdir);

            let game = LinkageGame::new(config).context("Invalid runconfig")?;
            let inputs = game
                .prepare(&data, &outdir)
                .context("Linkage game setup failed")?;

            println!("\n=== Linkage Game Ready ===");
            println!(
                "Population: {}",
                inputs.targets.len() + inputs.residual.len()
            );
            println!("Targets:    {}", inputs.targets.len());
            println!("Residual:   {}", inputs.residual.len());
            println!("Auxiliary:  {}", inputs.auxiliary.len());
            println!("Models:     {}", inputs.models.len());
            for model in &inputs.models {
                println!("  - {}", model.label());
            }
            println!("Output dir: {outdir:?}");
        }
    }

    Ok(())
}
