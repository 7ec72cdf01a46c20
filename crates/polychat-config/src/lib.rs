// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Polychat.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! let config = polychat_config::load_and_validate().expect("config errors");
//! println!("default model: {}", config.chat.default_model);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ChatConfig, GoogleConfig, HuggingFaceConfig, NvidiaConfig, PolychatConfig};
pub use validation::{validate_config, ConfigError};

/// Error returned by the high-level loading entry points.
#[derive(Debug)]
pub enum LoadError {
    /// The TOML/env layers failed to deserialize.
    Figment(Box<figment::Error>),
    /// Deserialization succeeded but values are out of range.
    Invalid(Vec<ConfigError>),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Figment(err) => write!(f, "{err}"),
            LoadError::Invalid(errors) => {
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<PolychatConfig, LoadError> {
    let config = loader::load_config().map_err(|e| LoadError::Figment(Box::new(e)))?;
    validation::validate_config(&config).map_err(LoadError::Invalid)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<PolychatConfig, LoadError> {
    let config =
        loader::load_config_from_str(toml_content).map_err(|e| LoadError::Figment(Box::new(e)))?;
    validation::validate_config(&config).map_err(LoadError::Invalid)?;
    Ok(config)
}
