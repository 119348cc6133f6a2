//! # tmplver Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point of the `tmplver` CLI. It parses arguments with Clap, sets up
//! logging from the verbosity flag and routes to the command handlers.
//!
//! ## Examples
//!
//! ```bash
//! # List the version directories of a bundle
//! tmplver inspect bundle.tar.gz
//!
//! # Store a bundle revision and register a template version for it
//! tmplver upload bundle.tar.gz --key env/bundle.tar.gz --commit 0123456789abcdef
//! tmplver -v process --key env/bundle.tar.gz --template my-env-template
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level
//! 3. Route to the command handler
//! 4. Print any error and exit with status 1
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "tmplver",
    about = "Fingerprint deployment-template bundles and register template versions",
    long_about = "Derives a fingerprint from the v<N>/ directories of gzip+tar template bundles,\n\
                  compares revisions and registers minor or major template versions.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "i")]
    Inspect(commands::inspect::InspectArgs),
    #[command(alias = "c")]
    Compare(commands::compare::CompareArgs),
    Bundle(commands::bundle::BundleArgs),
    Upload(commands::upload::UploadArgs),
    #[command(alias = "p")]
    Process(commands::process::ProcessArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Inspect(args) => commands::inspect::handle_inspect(args).await,
        Commands::Compare(args) => commands::compare::handle_compare(args).await,
        Commands::Bundle(args) => commands::bundle::handle_bundle(args).await,
        Commands::Upload(args) => commands::upload::handle_upload(args).await,
        Commands::Process(args) => commands::process::handle_process(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
