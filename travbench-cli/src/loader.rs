//! Query Loader
//!
//! Reads a query directory:
//!
//! ```text
//! queries/
//!   discover-1.sparql     queries separated by blank lines; set "discover-1"
//!   discover-1.json       optional metadata for the same set
//!   short-2.txt
//! ```
//!
//! A metadata file has exactly one array-valued top-level field. Every other
//! top-level field is a scalar that is copied into each element of that
//! array, giving one metadata record per query.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use travbench_core::{Query, QuerySet};

/// Extensions recognised as query files
const QUERY_EXTENSIONS: &[&str] = &["sparql", "rq", "txt"];

/// One metadata record per query
pub type MetadataRecord = Map<String, Value>;

/// Errors while loading a query directory
#[derive(Debug, Error)]
pub enum LoadError {
    /// Filesystem access failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A metadata file is not JSON
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        /// Offending file
        path: PathBuf,
        /// Decoder error
        source: serde_json::Error,
    },

    /// A metadata file does not have exactly one array field
    #[error("Malformed metadata in {}: expected exactly one array field, found {array_fields}", .path.display())]
    MalformedMetadata {
        /// Offending file
        path: PathBuf,
        /// Number of array-valued top-level fields found
        array_fields: usize,
    },
}

fn io_error(path: &Path) -> impl Fn(std::io::Error) -> LoadError + '_ {
    move |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Files in `dir` with one of `extensions`, sorted by file name, keyed by stem
fn files_with(dir: &Path, extensions: &[&str]) -> Result<Vec<(String, PathBuf)>, LoadError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e));
        if !matches || !path.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), path.clone()));
        }
    }
    files.sort();
    Ok(files)
}

/// Split a query file into queries on blank lines
pub fn split_queries(content: &str) -> Vec<String> {
    let mut queries = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                queries.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        queries.push(current.join("\n"));
    }
    queries
}

/// Query texts per set, sets ordered by file name
pub fn load_queries(dir: &Path) -> Result<Vec<(String, Vec<String>)>, LoadError> {
    files_with(dir, QUERY_EXTENSIONS)?
        .into_iter()
        .map(|(name, path)| {
            let content = fs::read_to_string(&path).map_err(io_error(&path))?;
            let queries = split_queries(&content);
            debug!(set = %name, queries = queries.len(), "loaded query set");
            Ok((name, queries))
        })
        .collect()
}

/// Expand one metadata document into per-query records
pub fn expand_metadata(path: &Path, document: Value) -> Result<Vec<MetadataRecord>, LoadError> {
    let object = match document {
        Value::Object(object) => object,
        _ => {
            return Err(LoadError::MalformedMetadata {
                path: path.to_path_buf(),
                array_fields: 0,
            });
        }
    };

    let (arrays, scalars): (Vec<_>, Vec<_>) =
        object.into_iter().partition(|(_, value)| value.is_array());
    if arrays.len() != 1 {
        return Err(LoadError::MalformedMetadata {
            path: path.to_path_buf(),
            array_fields: arrays.len(),
        });
    }

    let Some((field, Value::Array(elements))) = arrays.into_iter().next() else {
        return Err(LoadError::MalformedMetadata {
            path: path.to_path_buf(),
            array_fields: 0,
        });
    };

    Ok(elements
        .into_iter()
        .map(|element| {
            let mut record: MetadataRecord = scalars.iter().cloned().collect();
            match element {
                Value::Object(entries) => record.extend(entries),
                other => {
                    record.insert(field.clone(), other);
                }
            }
            record
        })
        .collect())
}

/// Metadata records per set name
pub fn load_queries_metadata(dir: &Path) -> Result<HashMap<String, Vec<MetadataRecord>>, LoadError> {
    files_with(dir, &["json"])?
        .into_iter()
        .map(|(name, path)| {
            let content = fs::read_to_string(&path).map_err(io_error(&path))?;
            let document: Value =
                serde_json::from_str(&content).map_err(|source| LoadError::Json {
                    path: path.clone(),
                    source,
                })?;
            Ok((name, expand_metadata(&path, document)?))
        })
        .collect()
}

/// Query sets with templates taken from each query's metadata record
pub fn load_workload(dir: &Path) -> Result<Vec<QuerySet>, LoadError> {
    let metadata = load_queries_metadata(dir)?;
    Ok(load_queries(dir)?
        .into_iter()
        .map(|(name, texts)| {
            let records = metadata.get(&name);
            let queries = texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| {
                    let template = records
                        .and_then(|r| r.get(i))
                        .and_then(|r| r.get("template"))
                        .and_then(Value::as_str);
                    match template {
                        Some(t) => Query::new(text).with_template(t),
                        None => Query::new(text),
                    }
                })
                .collect();
            QuerySet { name, queries }
        })
        .collect())
}
