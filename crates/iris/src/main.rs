//! Iris CLI - Route image analysis to mock, OpenAI Vision or Google Cloud Vision.
//!
//! Every backend's answer is normalized into one shape (objects, colors,
//! sentiment, confidence, text, metadata) and printed as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Analyze an image with the configured backend
//! iris analyze cat.jpg
//!
//! # Several images through OpenAI, pretty-printed
//! iris analyze a.jpg b.png --mode openai --pretty
//!
//! # Check that the backend is reachable
//! iris test-connection --mode google
//!
//! # Manage configuration
//! iris config set-key openai sk-...
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Iris - Route image analysis to interchangeable vision backends.
#[derive(Parser, Debug)]
#[command(name = "iris")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze images and print normalized results as JSON
    Analyze(cli::analyze::AnalyzeArgs),

    /// Check that the selected backend is usable
    TestConnection(cli::connection::TestConnectionArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match iris_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `iris config path`."
            );
            iris_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Iris v{}", iris_core::VERSION);

    match cli.command {
        Commands::Analyze(args) => cli::analyze::execute(args, config).await,
        Commands::TestConnection(args) => cli::connection::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
