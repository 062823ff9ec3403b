//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, paths non-empty)
//! - Validate admin settings when the admin API is enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ReproxConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ReproxConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &ReproxConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.discovery.host_label.trim().is_empty() {
        errors.push(ValidationError::new("discovery.host_label", "must not be empty"));
    }
    if config.proxy.binary.trim().is_empty() {
        errors.push(ValidationError::new("proxy.binary", "must not be empty"));
    }
    if config.proxy.config_path.file_name().is_none() {
        errors.push(ValidationError::new("proxy.config_path", "must name a file"));
    }
    if config.certs.live_dir.as_os_str().is_empty() {
        errors.push(ValidationError::new("certs.live_dir", "must not be empty"));
    }
    if config.certs.acme_binary.trim().is_empty() {
        errors.push(ValidationError::new("certs.acme_binary", "must not be empty"));
    }
    if config.certs.openssl_binary.trim().is_empty() {
        errors.push(ValidationError::new("certs.openssl_binary", "must not be empty"));
    }
    if config.certs.self_signed_days == 0 {
        errors.push(ValidationError::new("certs.self_signed_days", "must be at least 1"));
    }

    let schedule = &config.schedule;
    if schedule.poll_interval_secs == 0 {
        errors.push(ValidationError::new("schedule.poll_interval_secs", "must be greater than 0"));
    }
    if schedule.renewal_interval_secs == 0 {
        errors.push(ValidationError::new("schedule.renewal_interval_secs", "must be greater than 0"));
    }
    if schedule.renewal_retry_base_secs == 0 {
        errors.push(ValidationError::new("schedule.renewal_retry_base_secs", "must be greater than 0"));
    }
    if schedule.renewal_retry_max_secs < schedule.renewal_retry_base_secs {
        errors.push(ValidationError::new(
            "schedule.renewal_retry_max_secs",
            "must not be smaller than renewal_retry_base_secs",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "admin.bind_address",
                format!("'{}' is not a socket address", config.admin.bind_address),
            ));
        }
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::new("admin.api_key", "required when admin is enabled"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ReproxConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ReproxConfig::default();
        config.schedule.poll_interval_secs = 0;
        config.discovery.host_label = " ".to_string();
        config.admin.enabled = true;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"schedule.poll_interval_secs"));
        assert!(fields.contains(&"discovery.host_label"));
        assert!(fields.contains(&"admin.api_key"));
    }

    #[test]
    fn test_retry_bounds() {
        let mut config = ReproxConfig::default();
        config.schedule.renewal_retry_max_secs = 10;
        config.schedule.renewal_retry_base_secs = 60;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "schedule.renewal_retry_max_secs");
    }
}
