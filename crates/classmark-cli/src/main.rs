//! classmark CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "classmark", version, about = "Classroom test-taking from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a test
    Take {
        /// Path to a .toml test definition
        #[arg(long)]
        test: Option<PathBuf>,

        /// Fetch the test from the record store by id
        #[arg(long)]
        id: Option<String>,

        /// Student name (prompted for when omitted)
        #[arg(long)]
        name: Option<String>,

        /// Student class (prompted for when omitted)
        #[arg(long)]
        class: Option<String>,

        /// Answer script for unattended runs
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Do not talk to the record store
        #[arg(long)]
        offline: bool,

        /// Directory for the saved attempt JSON (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate test definition TOML files
    Validate {
        /// Path to a test file or directory
        #[arg(long)]
        test: PathBuf,
    },

    /// Publish test definitions to the record store
    Publish {
        /// Path to a test file or directory
        #[arg(long)]
        test: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show published results for a test
    Results {
        /// Test id
        #[arg(long)]
        id: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Export results as CSV or HTML
    Export {
        /// Test id to fetch from the record store
        #[arg(long)]
        id: Option<String>,

        /// Read results from a JSON file instead of the store
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output format: csv, html, all
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and an example test
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("classmark=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            test,
            id,
            name,
            class,
            answers,
            offline,
            output,
            config,
        } => commands::take::execute(test, id, name, class, answers, offline, output, config).await,
        Commands::Validate { test } => commands::validate::execute(test),
        Commands::Publish { test, config } => commands::publish::execute(test, config).await,
        Commands::Results { id, config } => commands::results::execute(id, config).await,
        Commands::Export {
            id,
            input,
            format,
            output,
            config,
        } => commands::export::execute(id, input, format, output, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
