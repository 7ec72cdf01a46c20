// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The static model catalog: every model the application offers, with
//! its provider, context window, and capability flags. Immutable after
//! process start.

use crate::types::{LLMModel, ModelFeatures, ProviderKind};

/// All models offered to callers. Ordering is display order.
pub const MODELS: &[LLMModel] = &[
    LLMModel {
        id: "gemini-2.0-flash",
        name: "Gemini 2.0 Flash",
        provider: ProviderKind::Google,
        category: "chat",
        context_length: 1_048_576,
        features: ModelFeatures::multimodal(Some(8_192)),
    },
    LLMModel {
        id: "gemini-2.5-flash-preview-05-20",
        name: "Gemini 2.5 Flash Preview",
        provider: ProviderKind::Google,
        category: "chat",
        context_length: 1_048_576,
        features: ModelFeatures::multimodal(Some(65_536)),
    },
    LLMModel {
        id: "gemini-2.0-flash-preview-image-generation",
        name: "Gemini 2.0 Flash Image Generation",
        provider: ProviderKind::Google,
        category: "image-generation",
        context_length: 32_768,
        features: ModelFeatures::image_generation(),
    },
    LLMModel {
        id: "meta/llama-3.1-8b-instruct",
        name: "Llama 3.1 8B Instruct",
        provider: ProviderKind::Nvidia,
        category: "chat",
        context_length: 131_072,
        features: ModelFeatures::text(Some(4_096)),
    },
    LLMModel {
        id: "meta/llama-3.2-11b-vision-instruct",
        name: "Llama 3.2 11B Vision",
        provider: ProviderKind::Nvidia,
        category: "vision",
        context_length: 131_072,
        features: ModelFeatures::multimodal(Some(4_096)),
    },
    LLMModel {
        id: "microsoft/phi-3-vision-128k-instruct",
        name: "Phi-3 Vision 128K",
        provider: ProviderKind::Nvidia,
        category: "vision",
        context_length: 131_072,
        features: ModelFeatures::multimodal(Some(4_096)),
    },
    LLMModel {
        id: "mistralai/Mistral-7B-Instruct-v0.3",
        name: "Mistral 7B Instruct",
        provider: ProviderKind::HuggingFace,
        category: "chat",
        context_length: 32_768,
        features: ModelFeatures::text(Some(4_096)),
    },
    LLMModel {
        id: "HuggingFaceH4/zephyr-7b-beta",
        name: "Zephyr 7B Beta",
        provider: ProviderKind::HuggingFace,
        category: "chat",
        context_length: 32_768,
        features: ModelFeatures::text(Some(4_096)),
    },
];

/// Looks up a catalog entry by model id.
pub fn find(model_id: &str) -> Option<&'static LLMModel> {
    MODELS.iter().find(|m| m.id == model_id)
}
