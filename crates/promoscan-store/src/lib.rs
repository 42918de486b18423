// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable storage for the Promoscan harvester.
//!
//! A single-writer JSON store: the orchestrator owns the only handle,
//! appends deduplicated promotion records, and flushes after every
//! accepted record so a crash loses at most the in-flight message.

pub mod store;

pub use store::PromotionStore;
