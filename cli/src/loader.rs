#![deny(missing_docs)]

//! # Document Loading
//!
//! Expands command-line paths (files or directories) into document files and
//! parses them into a `DocumentSet`. Each document is identified by its path.

use crate::error::{CliError, CliResult};
use adl_core::{load_file, DocumentSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Expands directories (recursively, sorted) and keeps explicit files as given.
pub fn collect_files(paths: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && is_document(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(CliError::General(format!("Path not found: {:?}", path)));
        }
    }
    debug!(count = files.len(), "collected document files");
    Ok(files)
}

/// Loads every document under `paths` into one set.
pub fn load_documents(paths: &[PathBuf]) -> CliResult<DocumentSet> {
    let mut documents = DocumentSet::new();
    for file in collect_files(paths)? {
        let document = load_file(&file)?;
        info!(document = %document.id(), nodes = document.node_count(), "loaded");
        documents.insert(document);
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collects_documents_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.yaml"), "declarations: []").unwrap();
        fs::write(dir.path().join("nested/a.JSON"), r#"{"declarations": []}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|file| file.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.yaml", "a.JSON"]);

        let documents = load_documents(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(documents.len(), 2);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            collect_files(&[missing]),
            Err(CliError::General(_))
        ));
    }
}
