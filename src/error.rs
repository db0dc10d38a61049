//
//  error.rs
//  Graft
//
//  Created by hak (tharun)
//

use std::path::PathBuf;

/// Errors raised by graph analysis, mutation, and artifact writes.
///
/// The `Display` text of each variant is what ends up in the `error`
/// field of a command envelope.
#[derive(Debug, thiserror::Error)]
pub enum GraftError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Host operation failed: {0}")]
    Host(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraftError {
    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            name: name.into(),
        }
    }

    /// Missing or empty required parameter.
    pub fn missing(param: &str) -> Self {
        Self::InvalidInput(format!("Missing '{}' parameter", param))
    }
}

pub type Result<T> = std::result::Result<T, GraftError>;
