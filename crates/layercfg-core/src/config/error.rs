//! Config file load errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the config file
///
/// These are never recoverable for a program that declared a config file:
/// callers are expected to abort.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open config file '{path}': {source}", path = .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config file '{path}': {source}", path = .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process config file '{path}': {source}", path = .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to process inline config: {0}")]
    Inline(#[source] serde_json::Error),
}

impl LoadError {
    /// Path of the file that failed, if the document came from a file
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            LoadError::Open { path, .. }
            | LoadError::Read { path, .. }
            | LoadError::Parse { path, .. } => Some(path),
            LoadError::Inline(_) => None,
        }
    }
}
