mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "rhtmx-routes")]
#[command(version, about = "RHTMX direct routes - inspect route tables and match paths", long_about = None)]
struct Cli {
    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured routes in match order
    List {
        /// Routes file
        #[arg(default_value = "routes.toml")]
        config: PathBuf,
    },

    /// Match request paths against the configured routes
    Match {
        /// Request paths to match
        #[arg(required = true)]
        paths: Vec<String>,

        /// Routes file
        #[arg(short, long, default_value = "routes.toml")]
        config: PathBuf,

        /// Show every matching route, not only the winner
        #[arg(short, long)]
        all: bool,
    },

    /// Resolve an inline constraint and test values against it
    Resolve {
        /// Inline constraint, e.g. `range(1,10)`
        constraint: String,

        /// Values to test
        values: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Execute command
    match cli.command {
        Commands::List { config } => {
            commands::list::execute(&config)?;
        }
        Commands::Match { paths, config, all } => {
            commands::match_path::execute(&config, &paths, all)?;
        }
        Commands::Resolve { constraint, values } => {
            commands::resolve::execute(&constraint, &values)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
