//! Shape validation for configuration and specialist input
//!
//! Validation is intentionally shallow: credentials present, timeouts
//! non-zero, specialist list non-empty with parseable listing URLs. Anything
//! deeper (whether the URLs actually resolve, whether the OTP is current) is
//! the run's job to find out.

use crate::config::types::{Config, Specialist};
use crate::ConfigError;
use url::Url;

/// Validates the loaded configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.portal.email.trim().is_empty() {
        return Err(ConfigError::Validation(
            "portal.email must not be empty".to_string(),
        ));
    }
    if config.portal.password.trim().is_empty() {
        return Err(ConfigError::Validation(
            "portal.password must not be empty".to_string(),
        ));
    }
    if config.crawl.page_cap == 0 {
        return Err(ConfigError::Validation(
            "crawl.page_cap must be at least 1".to_string(),
        ));
    }
    if config.timeouts.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "timeouts.poll_interval_ms must be at least 1".to_string(),
        ));
    }
    if config.timeouts.watchdog_secs == 0 {
        return Err(ConfigError::Validation(
            "timeouts.watchdog_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Validates the specialist list: non-empty, every listing URL parseable
pub fn validate_specialists(specialists: &[Specialist]) -> Result<(), ConfigError> {
    if specialists.is_empty() {
        return Err(ConfigError::NoSpecialists);
    }

    for specialist in specialists {
        if specialist.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "specialist name must not be empty".to_string(),
            ));
        }
        if let Err(e) = Url::parse(&specialist.listing_url) {
            return Err(ConfigError::BadListingUrl {
                name: specialist.name.clone(),
                reason: e.to_string(),
            });
        }
    }

    Ok(())
}
