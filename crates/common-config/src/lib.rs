//! Shared configuration helpers for the gateway services.
//!
//! Every service describes its settings as a `#[serde(default)]` struct
//! implementing [`ServiceConfig`]. [`load`] starts from the defaults, layers
//! an optional YAML file on top, and finally applies environment overrides.

use std::env;
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Suffix appended to [`ServiceConfig::PREFIX`] to locate the YAML file.
pub const CONFIG_PATH_SUFFIX: &str = "CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A service configuration that can be loaded from file and environment.
pub trait ServiceConfig: DeserializeOwned + Default {
    /// Environment variable prefix, e.g. `RESOURCE_GATEWAY_`.
    const PREFIX: &'static str;

    /// Overwrite fields from `{prefix}*` environment variables.
    fn apply_environment_overrides(&mut self, prefix: &str);
}

/// Load a service configuration.
///
/// When `{PREFIX}CONFIG` is set it must point at a readable YAML file.
pub fn load<T: ServiceConfig>() -> Result<T, ConfigError> {
    let path_var = format!("{}{}", T::PREFIX, CONFIG_PATH_SUFFIX);
    let mut config = match env::var_os(&path_var) {
        Some(path) => from_yaml_file(PathBuf::from(path))?,
        None => T::default(),
    };
    config.apply_environment_overrides(T::PREFIX);
    Ok(config)
}

fn from_yaml_file<T: DeserializeOwned>(path: PathBuf) -> Result<T, ConfigError> {
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    serde_yaml::from_reader(BufReader::new(file))
        .map_err(|source| ConfigError::Parse { path, source })
}

/// Replace `target` with the parsed value of `var` when it is set.
///
/// Unparseable values are logged and ignored so a typo never takes a
/// service down.
pub fn env_override<T>(var: &str, target: &mut T)
where
    T: FromStr,
    T::Err: Display,
{
    if let Ok(value) = env::var(var) {
        match value.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(error) => {
                tracing::warn!(
                    %var,
                    %value,
                    %error,
                    "invalid configuration override, keeping current value"
                );
            }
        }
    }
}

/// Resolve the port for a service from an environment variable.
///
/// Falls back to the provided default when the variable is missing or cannot be
/// parsed into a `u16`.
pub fn service_port(var: &str, default: u16) -> u16 {
    let mut port = default;
    env_override(var, &mut port);
    port
}
