//! pwakit command-line interface.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pwakit_core::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pwakit")]
#[command(about = "Compile caching routes into a worker program")]
#[command(version)]
struct Args {
    /// Path to config file (default: $PWAKIT_CONFIG_FILE, then ./pwakit.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter pwakit.toml
    Init {
        #[arg(default_value = commands::init::DEFAULT_PATH)]
        path: PathBuf,
    },
    /// Compile the config and write the program and push side file
    Generate,
    /// Regenerate whenever the config file or the public dir changes
    Dev,
    /// Validate the config and print the compiled route table
    Check,
    /// Show which route handles a path (rule order matters)
    Match { path: String },
}

fn config_file(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit
        .or_else(|| std::env::var_os("PWAKIT_CONFIG_FILE").map(PathBuf::from))
        .or_else(|| {
            let local = PathBuf::from(commands::init::DEFAULT_PATH);
            local.exists().then_some(local)
        })
}

fn load(explicit: Option<PathBuf>) -> Result<AppConfig> {
    let file = config_file(explicit);
    tracing::debug!(file = ?file, "loading configuration");
    Ok(AppConfig::load_from(file.as_deref())?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let report = match args.command {
        Command::Init { path } => commands::init::run(&path)?,
        Command::Generate => commands::generate::run(&load(args.config)?)?,
        Command::Dev => commands::dev::run(config_file(args.config)).await?,
        Command::Check => commands::check::run(&load(args.config)?)?,
        Command::Match { path } => commands::route::run(&load(args.config)?, &path)?,
    };

    println!("{report}");
    Ok(())
}
