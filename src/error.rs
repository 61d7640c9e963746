use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems detected before any request is sent.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid target URL '{url}': {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to read wordlist {path}: {source}")]
    Wordlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read blacklist {path}: {source}")]
    Blacklist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid exclude regex: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A probe that kept failing at the transport level after every retry.
#[derive(Error, Debug, Clone)]
#[error("{url} failed after {attempts} attempt(s): {message}")]
pub struct ProbeError {
    pub url: String,
    pub attempts: u32,
    pub message: String,
}
