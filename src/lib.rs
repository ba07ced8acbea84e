//! VIA-Harvest: a polite document harvester for the environmental-assessment registry
//!
//! This crate walks the registry's keyword search, follows every result to its
//! detail page and documentation listings, and downloads each listed document
//! into a deterministic folder layout, skipping files that are already on disk.

pub mod config;
pub mod crawler;
pub mod download;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for VIA-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Document from {url} has no usable filename")]
    EmptyFilename { url: String },

    #[error("Search keyword cannot be empty")]
    EmptyKeyword,

    #[error("Download folder name cannot be empty")]
    EmptyFolder,

    #[error("Invalid project id: '{0}'")]
    InvalidProjectId(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

impl HarvestError {
    /// Returns true if the error came from the network layer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Timeout { .. }
                | Self::HttpStatus { .. }
                | Self::Reqwest(_)
        )
    }

    /// Returns true if the error came from the local filesystem
    pub fn is_filesystem(&self) -> bool {
        matches!(self, Self::Filesystem { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern in config: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL cannot carry a query: {0}")]
    CannotBeABase(String),
}

/// Result type alias for VIA-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Harvester, SearchType};
pub use download::{DownloadOutcome, Downloader};
pub use state::Termination;
pub use url::{sanitize_filename, LinkSet, ProjectId};
