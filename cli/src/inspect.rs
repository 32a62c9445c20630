#![deny(missing_docs)]

//! # Inspect Command
//!
//! Loads documents and prints the HTTP protocol collections found in them:
//! operation groups, responses, results, parameters, headers,
//! authentications, requirements and connections.
//!
//! Every declaration is rebuilt from its node; failures are reported inline
//! and make the command fail once all sections are printed.

use crate::error::{CliError, CliResult};
use crate::loader::load_documents;
use adl_core::model::{
    Authentication, AuthenticationRequirement, Connection, Header, OperationResult, Response,
    ResponseCollection,
};
use adl_core::{AppResult, Declaration, DocumentSet, HttpProtocol, OperationGroup, Parameter};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::warn;

/// Arguments for the inspect command.
#[derive(clap::Args, Debug, Clone)]
pub struct InspectArgs {
    /// Document files or directories to load.
    #[clap(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Executes the inspect command.
pub fn execute(args: &InspectArgs) -> CliResult<()> {
    let documents = load_documents(&args.paths)?;
    let stdout = io::stdout();
    let failures = report(&documents, &mut stdout.lock())?;
    if failures > 0 {
        return Err(CliError::General(format!(
            "{} declaration(s) could not be read",
            failures
        )));
    }
    Ok(())
}

/// Writes every collection to `out`, returning the number of failed declarations.
pub fn report(documents: &DocumentSet, out: &mut impl Write) -> CliResult<usize> {
    let http = HttpProtocol::new();
    let mut failures = 0;

    failures += section(
        out,
        "Operation groups",
        documents,
        &http.operation_groups(documents),
        |group: OperationGroup| {
            let operations: Vec<&str> = group.operations.iter().map(|op| op.name.as_str()).collect();
            format!("operations: {}", operations.join(", "))
        },
    )?;
    failures += section(
        out,
        "Response collections",
        documents,
        &http.response_collections(documents),
        |collection: ResponseCollection| {
            let codes: Vec<&str> = collection
                .responses
                .iter()
                .map(|response| response.status_code.as_deref().unwrap_or("?"))
                .collect();
            format!("status codes: {}", codes.join(", "))
        },
    )?;
    failures += section(
        out,
        "Responses",
        documents,
        &http.responses(documents),
        |response: Response| {
            format!(
                "status: {}, body: {}",
                response.status_code.as_deref().unwrap_or("?"),
                response.body.as_deref().unwrap_or("-")
            )
        },
    )?;
    failures += section(
        out,
        "Results",
        documents,
        &http.results(documents),
        |result: OperationResult| match result.body {
            Some(body) => format!("body: {}", body),
            None => format!("fields: {}", result.fields.join(", ")),
        },
    )?;
    failures += section(
        out,
        "Parameters",
        documents,
        &http.parameters(documents),
        |parameter: Parameter| {
            format!(
                "{} '{}': {}",
                parameter.source,
                parameter.wire_name,
                parameter.type_name.as_deref().unwrap_or("-")
            )
        },
    )?;
    failures += section(
        out,
        "Headers",
        documents,
        &http.headers(documents),
        |header: Header| {
            format!(
                "'{}': {}",
                header.wire_name,
                header.type_name.as_deref().unwrap_or("-")
            )
        },
    )?;
    failures += section(
        out,
        "Authentications",
        documents,
        &http.declared_authentications(documents),
        |auth: Authentication| auth.authentication_type().to_string(),
    )?;
    failures += section(
        out,
        "Authentication requirements",
        documents,
        &http.declared_requirements(documents),
        |requirement: AuthenticationRequirement| {
            let references: Vec<String> = requirement
                .authentications
                .iter()
                .map(|reference| {
                    let name = reference.authentication.name().unwrap_or("<inline>");
                    if reference.scopes.is_empty() {
                        name.to_string()
                    } else {
                        format!("{} [{}]", name, reference.scopes.join(" "))
                    }
                })
                .collect();
            references.join(" AND ")
        },
    )?;
    failures += section(
        out,
        "Connections",
        documents,
        &http.declared_connections(documents),
        |connection: Connection| connection.url,
    )?;

    Ok(failures)
}

fn section<T>(
    out: &mut impl Write,
    title: &str,
    documents: &DocumentSet,
    declarations: &[Declaration<T>],
    summarize: impl Fn(T) -> String,
) -> CliResult<usize> {
    writeln!(out, "{} ({})", title, declarations.len())?;
    let mut failures = 0;
    for declaration in declarations {
        let value: AppResult<T> = declaration.value(documents);
        match value {
            Ok(value) => writeln!(out, "  {}  {}", declaration.address(), summarize(value))?,
            Err(err) => {
                warn!(declaration = %declaration.address(), error = %err, "unreadable declaration");
                writeln!(out, "  {}  ! {}", declaration.address(), err)?;
                failures += 1;
            }
        }
    }
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adl_core::parse_document;

    const API: &str = r#"
declarations:
  - kind: interface
    name: Pets
    children:
      - { kind: operation, name: listPets }
      - { kind: operation, name: getPet }
  - kind: interface
    name: broken
    tags: { authentication: [] }
    children:
      - { kind: member, name: type, value: kerberos }
  - kind: interface
    name: main
    tags: { connection: [] }
    children:
      - { kind: member, name: url, value: "https://api.example.com" }
"#;

    #[test]
    fn test_report_lists_sections_and_failures() {
        let documents: DocumentSet = [parse_document("api.yaml", API).unwrap()]
            .into_iter()
            .collect();
        let mut out = Vec::new();
        let failures = report(&documents, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(failures, 1);
        assert!(text.contains("Operation groups (1)\n  api.yaml/Pets  operations: listPets, getPet\n"));
        assert!(text.contains("Connections (1)\n  api.yaml/main  https://api.example.com\n"));
        assert!(text.contains("  api.yaml/broken  ! Invalid declaration at 'api.yaml/broken'"));
    }
}
