// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so unrecognized keys
//! are rejected at startup rather than silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Polychat configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; API keys may instead come from provider-specific env vars.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolychatConfig {
    /// Google Gemini API settings.
    #[serde(default)]
    pub google: GoogleConfig,

    /// Hugging Face Inference settings.
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,

    /// NVIDIA NIM settings.
    #[serde(default)]
    pub nvidia: NvidiaConfig,

    /// Chat lifecycle settings.
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Google Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleConfig {
    /// API key. `None` falls back to the `GOOGLE_API_KEY` env var.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API.
    #[serde(default = "default_google_base_url")]
    pub base_url: String,

    /// Model used for title generation.
    #[serde(default = "default_title_model")]
    pub title_model: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_google_base_url(),
            title_model: default_title_model(),
        }
    }
}

fn default_google_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_title_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Hugging Face Inference configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HuggingFaceConfig {
    /// API token. `None` falls back to the `HF_API_TOKEN` env var.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Base URL of the OpenAI-compatible router.
    #[serde(default = "default_huggingface_base_url")]
    pub base_url: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_hf_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature for chat completions.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_huggingface_base_url(),
            max_tokens: default_hf_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_huggingface_base_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_hf_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

/// NVIDIA NIM configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NvidiaConfig {
    /// API key. `None` falls back to the `NVIDIA_API_KEY` env var.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible NIM endpoint.
    #[serde(default = "default_nvidia_base_url")]
    pub base_url: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_nvidia_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature for chat completions.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for NvidiaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_nvidia_base_url(),
            max_tokens: default_nvidia_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_nvidia_base_url() -> String {
    "https://integrate.api.nvidia.com/v1".to_string()
}

fn default_nvidia_max_tokens() -> u32 {
    1024
}

/// Chat lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Model selected for new chats.
    #[serde(default = "default_chat_model")]
    pub default_model: String,

    /// Title used when title generation fails.
    #[serde(default = "default_fallback_title")]
    pub fallback_title: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_model: default_chat_model(),
            fallback_title: default_fallback_title(),
        }
    }
}

fn default_chat_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_fallback_title() -> String {
    "New Chat".to_string()
}
