// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of configuration values.

use thiserror::Error;

use crate::model::PolychatConfig;

/// A single invalid configuration value.
#[derive(Debug, Error)]
#[error("invalid config value for `{field}`: {reason}")]
pub struct ConfigError {
    pub field: String,
    pub reason: String,
}

impl ConfigError {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Validates value ranges Figment cannot express. Collects every problem
/// rather than stopping at the first.
pub fn validate_config(config: &PolychatConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    check_base_url(&mut errors, "google.base_url", &config.google.base_url);
    check_base_url(
        &mut errors,
        "huggingface.base_url",
        &config.huggingface.base_url,
    );
    check_base_url(&mut errors, "nvidia.base_url", &config.nvidia.base_url);

    check_temperature(
        &mut errors,
        "huggingface.temperature",
        config.huggingface.temperature,
    );
    check_temperature(&mut errors, "nvidia.temperature", config.nvidia.temperature);

    if config.huggingface.max_tokens == 0 {
        errors.push(ConfigError::new("huggingface.max_tokens", "must be > 0"));
    }
    if config.nvidia.max_tokens == 0 {
        errors.push(ConfigError::new("nvidia.max_tokens", "must be > 0"));
    }
    if config.chat.default_model.is_empty() {
        errors.push(ConfigError::new("chat.default_model", "must not be empty"));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_base_url(errors: &mut Vec<ConfigError>, field: &str, url: &str) {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        errors.push(ConfigError::new(field, "must be an http(s) URL"));
    }
}

fn check_temperature(errors: &mut Vec<ConfigError>, field: &str, value: f32) {
    if !(0.0..=2.0).contains(&value) {
        errors.push(ConfigError::new(field, "must be between 0.0 and 2.0"));
    }
}
