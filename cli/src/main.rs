#![deny(missing_docs)]

//! # ADL CLI
//!
//! Command Line Interface for inspecting API description documents.
//!
//! Supported Commands:
//! - `inspect`: Prints the HTTP protocol collections found in documents.
//! - `addresses`: Prints (and optionally checks) the address of every node.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod addresses;
mod error;
mod inspect;
mod loader;

#[derive(Parser, Debug)]
#[clap(author, version, about = "API description model CLI")]
struct Cli {
    /// Log debug events (overridden by RUST_LOG).
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print operation groups, responses, parameters, authentications and connections.
    Inspect(inspect::InspectArgs),
    /// Print the structural address of every node.
    Addresses(addresses::AddressesArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Inspect(args) => inspect::execute(args)?,
        Commands::Addresses(args) => addresses::execute(args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["adl", "addresses", "api.yaml", "--verbose", "--json"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Addresses(args) => assert!(args.json && !args.check),
            other => panic!("expected addresses, got {:?}", other),
        }
    }
}
