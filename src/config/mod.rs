//! Configuration module for leadscope
//!
//! Run-time configuration (credentials, browser flags, timeouts, output
//! paths) comes from a TOML file; the specialist list comes from a separate
//! JSON document so operators can edit it without touching credentials.
//!
//! # Example
//!
//! ```no_run
//! use leadscope::config::{load_config, load_specialists};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("leadscope.toml")).unwrap();
//! let specialists = load_specialists(Path::new("specialists.json")).unwrap();
//! println!("{} specialists, page cap {}", specialists.len(), config.crawl.page_cap);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlConfig, DriverMode, OutputConfig, PortalConfig, Specialist,
    SpecialistsFile, TimeoutConfig,
};

// Re-export parser functions
pub use parser::{load_config, load_specialists};

pub use validation::{validate_config, validate_specialists};
