//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, thresholds non-negative)
//! - Check allow-list entries are bare domains
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::GateConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
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

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a configuration for values that deserialize fine but cannot work.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let rl = &config.rate_limit;
    if rl.daily_limit == 0 {
        errors.push(ValidationError::new("rate_limit.daily_limit", "must be greater than 0"));
    }
    if rl.hourly_limit == 0 {
        errors.push(ValidationError::new("rate_limit.hourly_limit", "must be greater than 0"));
    }
    if rl.hourly_limit > rl.daily_limit {
        errors.push(ValidationError::new(
            "rate_limit.hourly_limit",
            format!("{} exceeds daily_limit {}", rl.hourly_limit, rl.daily_limit),
        ));
    }

    let alerts = &config.alerts;
    if !alerts.max_daily_cost_usd.is_finite() || alerts.max_daily_cost_usd < 0.0 {
        errors.push(ValidationError::new(
            "alerts.max_daily_cost_usd",
            "must be a non-negative number",
        ));
    }

    let v = &config.validation;
    if v.allowed_domains.is_empty() {
        errors.push(ValidationError::new("validation.allowed_domains", "must not be empty"));
    }
    for domain in &v.allowed_domains {
        if domain.is_empty() || domain.contains("://") || domain.contains('/') {
            errors.push(ValidationError::new(
                "validation.allowed_domains",
                format!("'{}' is not a bare domain", domain),
            ));
        }
    }
    for (field, value) in [
        ("validation.max_note_length", v.max_note_length),
        ("validation.max_tag_count", v.max_tag_count),
        ("validation.max_tag_length", v.max_tag_length),
        ("validation.max_content_size", v.max_content_size),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    let backend = &config.backend;
    match url::Url::parse(&backend.url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        Ok(parsed) => errors.push(ValidationError::new(
            "backend.url",
            format!("unsupported scheme '{}'", parsed.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("backend.url", e.to_string())),
    }
    if backend.timeout_secs == 0 {
        errors.push(ValidationError::new("backend.timeout_secs", "must be greater than 0"));
    }
    if config.listener.request_timeout_secs <= backend.timeout_secs {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            format!(
                "{} must exceed backend.timeout_secs {}",
                config.listener.request_timeout_secs, backend.timeout_secs
            ),
        ));
    }
    if !backend.estimated_cost_usd.is_finite() || backend.estimated_cost_usd < 0.0 {
        errors.push(ValidationError::new(
            "backend.estimated_cost_usd",
            "must be a non-negative number",
        ));
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
        assert!(validate_config(&GateConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = GateConfig::default();
        config.rate_limit.daily_limit = 0;
        config.validation.allowed_domains = vec!["https://github.com".into()];
        config.backend.url = "not a url".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"rate_limit.daily_limit"));
        assert!(fields.contains(&"rate_limit.hourly_limit"));
        assert!(fields.contains(&"validation.allowed_domains"));
        assert!(fields.contains(&"backend.url"));
    }

    #[test]
    fn test_rejects_non_http_backend() {
        let mut config = GateConfig::default();
        config.backend.url = "ftp://archive.local".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("ftp"));
    }

    #[test]
    fn test_request_timeout_must_outlast_backend_call() {
        let mut config = GateConfig::default();
        config.listener.request_timeout_secs = 120;
        config.backend.timeout_secs = 120;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "listener.request_timeout_secs");
    }
}
