//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { name: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { name, value } => {
                write!(f, "Invalid value for {}: `{}`", name, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Load and validate configuration from a TOML file, applying process env overrides.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config = parse_config(&content)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Default configuration with process env overrides, validated.
pub fn default_config() -> Result<ProxyConfig, ConfigError> {
    let mut config = ProxyConfig::default();
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML document. Missing sections and fields fall back to defaults.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(PORT_ENV) {
        let port = value.trim().parse::<u16>().map_err(|_| ConfigError::Env {
            name: PORT_ENV,
            value: value.clone(),
        })?;
        config.listener.set_port(port);
        tracing::debug!(port, "Listen port overridden from environment");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_document_keeps_defaults() {
        let config = parse_config(
            r#"
            [forwarder]
            timeout_ms = 2500

            [envelope]
            content_type = "application/json"
            "#,
        )
        .unwrap();

        assert_eq!(config.forwarder.timeout_ms, 2500);
        assert_eq!(config.forwarder.max_redirects, 10);
        assert_eq!(config.envelope.content_type, "application/json");
        assert_eq!(config.envelope.failure_status, 502);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let err = parse_config("[forwarder]\ntimeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_port_override() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, |name| {
            (name == PORT_ENV).then(|| "8123".to_string())
        })
        .unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8123");
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = ProxyConfig::default();
        let err = apply_env_overrides(&mut config, |_| Some("eighty".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PORT: `eighty`");
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("api-proxy-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[listener]\nbind_address = \"127.0.0.1:0\"\n").unwrap();

        let config = load_config(&path);
        fs::remove_file(&path).unwrap();

        // PORT may be set in the test environment; only the host is asserted.
        assert!(config.unwrap().listener.bind_address.starts_with("127.0.0.1:"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
