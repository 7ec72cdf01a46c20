// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model-id routing and the provider registry facade.
//!
//! [`routes::resolve`] maps a model identifier to a provider through an
//! explicit ordered rule list; [`ProviderRegistry`] holds one singleton
//! adapter per provider and delegates the shared capability contract to
//! whichever adapter a model id resolves to.

pub mod registry;
pub mod routes;

pub use registry::ProviderRegistry;
pub use routes::{resolve, Route};
