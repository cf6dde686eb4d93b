//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ForwarderConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
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

impl std::error::Error for ConfigError {}

/// Load, override from the environment, and validate the configuration.
///
/// Resolution order for every field: env var → config file → built-in default.
pub fn load_config(path: Option<&Path>) -> Result<ForwarderConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => ForwarderConfig::default(),
    };

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `TARGET_URL` and `PORT` env overrides onto a loaded config.
pub fn apply_env_overrides(config: &mut ForwarderConfig) {
    if let Ok(url) = std::env::var("TARGET_URL") {
        if !url.is_empty() {
            config.target.url = url;
        }
    }

    if let Ok(port) = std::env::var("PORT") {
        match port.parse::<u16>() {
            Ok(port) => {
                let host = config
                    .listener
                    .bind_address
                    .rsplit_once(':')
                    .map(|(host, _)| host.to_string())
                    .unwrap_or_else(|| "0.0.0.0".to_string());
                config.listener.bind_address = format!("{}:{}", host, port);
            }
            Err(_) => {
                tracing::warn!(value = %port, "Ignoring invalid PORT value");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test for both vars: env is process-global and tests run in parallel.
    #[test]
    fn env_vars_override_file_values() {
        std::env::set_var("TARGET_URL", "https://env.example.com/hook");
        std::env::set_var("PORT", "4100");

        let config = load_config(None).unwrap();
        assert_eq!(config.target.url, "https://env.example.com/hook");
        assert_eq!(config.listener.bind_address, "0.0.0.0:4100");

        std::env::remove_var("TARGET_URL");
        std::env::remove_var("PORT");
    }
}
