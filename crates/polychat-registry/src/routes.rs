// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model-id routing rules.
//!
//! Routing is an explicit ordered list of (predicate, provider) rules,
//! evaluated first-match-wins. The ordering is load-bearing: the
//! community-hub rule must run before the default fallback but after
//! first-party namespaces have been claimed by the hosted-inference
//! rule's predicate, otherwise first-party models would be misrouted.

use polychat_core::ProviderKind;
use tracing::debug;

/// A resolved route: which adapter to use and the model id to pass it.
/// Routing is identity-preserving except for the `hf-`/`nv-` aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub provider: ProviderKind,
    pub actual_model_id: String,
}

/// One routing rule.
struct RouteRule {
    name: &'static str,
    matches: fn(&str) -> bool,
    provider: ProviderKind,
    strip_prefix: Option<&'static str>,
}

/// Namespaces served by the hosted-inference (NVIDIA) catalog rather
/// than the community hub.
const FIRST_PARTY_NAMESPACES: &[&str] = &["meta", "microsoft", "stabilityai"];

fn is_google_model(id: &str) -> bool {
    id.starts_with("gemini")
}

/// Path-style ids whose namespace is not first-party belong to the hub.
fn is_hub_model(id: &str) -> bool {
    match id.split_once('/') {
        Some((namespace, _)) => !FIRST_PARTY_NAMESPACES.contains(&namespace),
        None => false,
    }
}

fn is_hosted_inference_model(id: &str) -> bool {
    matches!(id.split_once('/'), Some((namespace, _)) if FIRST_PARTY_NAMESPACES.contains(&namespace))
        || id.contains("nvidia")
        || id.contains("nim-")
}

fn has_hf_alias(id: &str) -> bool {
    id.starts_with("hf-")
}

fn has_nv_alias(id: &str) -> bool {
    id.starts_with("nv-")
}

/// Evaluated top to bottom; the first matching rule wins.
const ROUTE_RULES: &[RouteRule] = &[
    RouteRule {
        name: "google-namespace",
        matches: is_google_model,
        provider: ProviderKind::Google,
        strip_prefix: None,
    },
    RouteRule {
        name: "community-hub",
        matches: is_hub_model,
        provider: ProviderKind::HuggingFace,
        strip_prefix: None,
    },
    RouteRule {
        name: "hosted-inference",
        matches: is_hosted_inference_model,
        provider: ProviderKind::Nvidia,
        strip_prefix: None,
    },
    RouteRule {
        name: "hf-alias",
        matches: has_hf_alias,
        provider: ProviderKind::HuggingFace,
        strip_prefix: Some("hf-"),
    },
    RouteRule {
        name: "nv-alias",
        matches: has_nv_alias,
        provider: ProviderKind::Nvidia,
        strip_prefix: Some("nv-"),
    },
];

/// Resolves a model id to its provider. Never fails: unmatched ids fall
/// back to the default (Google) adapter with the id passed verbatim.
pub fn resolve(model_id: &str) -> Route {
    for rule in ROUTE_RULES {
        if (rule.matches)(model_id) {
            let actual_model_id = match rule.strip_prefix {
                Some(prefix) => model_id
                    .strip_prefix(prefix)
                    .unwrap_or(model_id)
                    .to_string(),
                None => model_id.to_string(),
            };
            debug!(rule = rule.name, provider = %rule.provider, model = %actual_model_id, "route resolved");
            return Route {
                provider: rule.provider,
                actual_model_id,
            };
        }
    }

    debug!(model = model_id, "no rule matched, defaulting to Google");
    Route {
        provider: ProviderKind::Google,
        actual_model_id: model_id.to_string(),
    }
}
