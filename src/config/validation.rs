//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the callback template can produce an absolute http(s) URL
//! - Check a bind host is given (names are resolved at bind time)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AdapterConfig → Result<(), Vec<ValidationError>>
//! - Runs before the listener binds

use thiserror::Error;

use crate::config::schema::AdapterConfig;
use crate::resolution::callback::{CallbackUrl, PORT_PLACEHOLDER};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("callbackURLTemplate is required")]
    MissingCallbackTemplate,

    #[error("callbackURLTemplate must contain the ':port' placeholder")]
    MissingPortPlaceholder,

    #[error("callbackURLTemplate is not a valid URL: {0}")]
    InvalidCallbackTemplate(String),

    #[error("callbackURLTemplate must use http or https, got '{0}'")]
    UnsupportedCallbackScheme(String),

    #[error("host must not be empty")]
    EmptyHost,
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &AdapterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let template = config.callback_url_template.trim();
    if template.is_empty() {
        errors.push(ValidationError::MissingCallbackTemplate);
    } else if !template.contains(PORT_PLACEHOLDER) {
        errors.push(ValidationError::MissingPortPlaceholder);
    } else {
        // Any real port will do; only the shape of the URL matters here.
        match CallbackUrl::from_template(template, 1) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    errors.push(ValidationError::UnsupportedCallbackScheme(
                        url.scheme().to_string(),
                    ));
                }
            }
            Err(e) => errors.push(ValidationError::InvalidCallbackTemplate(e.to_string())),
        }
    }

    if config.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
