//! Bosun CLI - build environment orchestration for C/C++

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bosun::errors::EXIT_FAILURE;
use bosun::OrchestrateError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("bosun=debug")
    } else {
        EnvFilter::new("bosun=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let color = !cli.no_color;

    // Execute command
    let result = match cli.command {
        Commands::Env(args) => commands::env::execute(args),
        Commands::Doctor(args) => commands::doctor::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        match e.downcast_ref::<OrchestrateError>() {
            Some(err) => {
                bosun::util::diagnostic::emit(&err.to_diagnostic(), color);
                std::process::exit(err.exit_code());
            }
            None => {
                eprintln!("error: {:#}", e);
                std::process::exit(EXIT_FAILURE);
            }
        }
    }
}
