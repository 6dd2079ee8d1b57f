//! Error types for signature inference.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for the analysis and rendering pipeline.
#[derive(Error, Debug)]
pub enum SignatureError {
    /// No usable sample was supplied.
    #[error("nothing to compare: no usable samples were collected")]
    EmptyInput,

    /// Probe length must cover at least one byte.
    #[error("invalid probe length: {0} (must be at least 1)")]
    InvalidProbeLength(usize),

    /// Requested output format is not one of hex, json or regex.
    #[error("unsupported output format: '{name}' (expected hex, json or regex)")]
    UnsupportedFormat { name: String },

    /// JSON encoding failed.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a sample failed after the file passed its checks.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SignatureError>;
