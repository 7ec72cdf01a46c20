// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Polychat integration tests: a scriptable mock
//! provider adapter and an in-memory chat store.

pub mod memory_store;
pub mod mock_adapter;

pub use memory_store::MemoryStore;
pub use mock_adapter::{MockAdapter, ScriptedSend};
