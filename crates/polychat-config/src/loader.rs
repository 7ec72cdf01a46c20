// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./polychat.toml` >
//! `~/.config/polychat/polychat.toml` > `/etc/polychat/polychat.toml`,
//! with environment variable overrides via the `POLYCHAT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without a wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PolychatConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/polychat/polychat.toml` (system-wide)
/// 3. `~/.config/polychat/polychat.toml` (user XDG config)
/// 4. `./polychat.toml` (local directory)
/// 5. `POLYCHAT_*` environment variables
pub fn load_config() -> Result<PolychatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PolychatConfig::default()))
        .merge(Toml::file("/etc/polychat/polychat.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("polychat/polychat.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("polychat.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PolychatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PolychatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PolychatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PolychatConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `POLYCHAT_GOOGLE_API_KEY` must map to
/// `google.api_key`, not `google.api.key`.
fn env_provider() -> Env {
    Env::prefixed("POLYCHAT_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped,
        // e.g. POLYCHAT_GOOGLE_API_KEY -> "google_api_key".
        let mapped = key
            .as_str()
            .replacen("google_", "google.", 1)
            .replacen("huggingface_", "huggingface.", 1)
            .replacen("nvidia_", "nvidia.", 1)
            .replacen("chat_", "chat.", 1);
        mapped.into()
    })
}
