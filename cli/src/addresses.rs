#![deny(missing_docs)]

//! # Addresses Command
//!
//! Prints the structural address of every node in the given documents,
//! optionally checking that each address resolves back to its node.

use crate::error::{CliError, CliResult};
use crate::loader::load_documents;
use adl_core::{compute_address, resolve, DocumentSet, DocumentSource};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;

/// Arguments for the addresses command.
#[derive(clap::Args, Debug, Clone)]
pub struct AddressesArgs {
    /// Document files or directories to load.
    #[clap(required = true)]
    pub paths: Vec<PathBuf>,

    /// Print a JSON array instead of one line per node.
    #[clap(long)]
    pub json: bool,

    /// Fail if any address does not resolve back to its node.
    #[clap(long)]
    pub check: bool,
}

/// Executes the addresses command.
pub fn execute(args: &AddressesArgs) -> CliResult<()> {
    let documents = load_documents(&args.paths)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.check {
        let broken = check(&documents);
        if !broken.is_empty() {
            for address in &broken {
                writeln!(out, "unresolvable: {}", address)?;
            }
            return Err(CliError::General(format!(
                "{} address(es) did not round-trip",
                broken.len()
            )));
        }
    }

    if args.json {
        let entries: Vec<_> = entries(&documents)
            .into_iter()
            .map(|(address, kind)| json!({ "address": address, "kind": kind }))
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        for (address, kind) in entries(&documents) {
            writeln!(out, "{}\t{}", address, kind)?;
        }
    }
    Ok(())
}

/// `(address, kind)` for every node, in document order.
pub fn entries(documents: &DocumentSet) -> Vec<(String, String)> {
    documents
        .documents()
        .flat_map(|document| document.nodes())
        .map(|node| (compute_address(node).to_string(), node.kind().to_string()))
        .collect()
}

/// Addresses that do not resolve back to the node they were computed from.
pub fn check(documents: &DocumentSet) -> Vec<String> {
    documents
        .documents()
        .flat_map(|document| document.nodes())
        .filter_map(|node| {
            let address = compute_address(node);
            match resolve(&address, documents) {
                Ok(found) if found == node => None,
                _ => Some(address.to_string()),
            }
        })
        .collect()
}
