//! Configuration loading from the launch argument.

use thiserror::Error;

use crate::config::schema::AdapterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from a JSON object.
pub fn load_config(raw: &str) -> Result<AdapterConfig, ConfigError> {
    let config: AdapterConfig = serde_json::from_str(raw)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn loads_launch_object() {
        let config = load_config(
            r#"{
                "port": 4545,
                "callbackURLTemplate": "http://localhost:2525/imposters/:port/_requests",
                "defaultResponse": { "statusCode": 404, "headers": { "x-stub": "default" } },
                "loglevel": "debug",
                "customField": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.port, Some(4545));
        assert_eq!(config.loglevel, LogLevel::Debug);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.response_defaults().status_code, Some(404));
    }

    #[test]
    fn minimal_object_uses_defaults() {
        let config =
            load_config(r#"{ "callbackURLTemplate": "http://127.0.0.1:2525/:port" }"#).unwrap();
        assert_eq!(config.bind_port(), 0);
        assert_eq!(config.loglevel, LogLevel::Info);
        assert!(config.default_response.is_none());
    }

    #[test]
    fn host_name_is_accepted() {
        let config = load_config(
            r#"{"port":0,"host":"localhost","callbackURLTemplate":"http://localhost:2525/imposters/:port/_requests"}"#,
        )
        .unwrap();
        assert_eq!(config.host, "localhost");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(load_config("{ port: 1"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            load_config(r#"{ "callbackURLTemplate": "http://x/:port", "loglevel": "verbose" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn semantic_problems_are_validation_errors() {
        let err = load_config(r#"{ "port": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert_eq!(
            err.to_string(),
            "Validation failed: callbackURLTemplate is required"
        );
    }
}
