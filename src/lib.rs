//! Leadscope: authenticated lead-listing collector
//!
//! This crate crawls a broker portal's paginated lead listings for a set of
//! configured specialists, deduplicates leads by identity, and produces
//! per-(region, broker, status) counts plus optional full detail rows.

pub mod auth;
pub mod config;
pub mod crawler;
pub mod job;
pub mod output;
pub mod scheduler;
pub mod text;

use thiserror::Error;

/// Main error type for leadscope operations
#[derive(Debug, Error)]
pub enum LeadscopeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] auth::AuthError),

    #[error("Crawl failed for specialist '{specialist}': {source}")]
    Crawl {
        specialist: String,
        source: crawler::DriveError,
    },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors
///
/// All of these are fatal at startup; a run never starts from a partially
/// valid configuration or specialist list.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to parse specialists JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Specialist list is empty")]
    NoSpecialists,

    #[error("Specialist '{name}' has an invalid listing URL: {reason}")]
    BadListingUrl { name: String, reason: String },
}
