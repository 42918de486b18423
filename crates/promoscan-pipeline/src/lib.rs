// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Harvest orchestration for the Promoscan pipeline.
//!
//! Wires the source adapters, content processing, and the store into one
//! sequential run with request pacing and layered failure isolation.

pub mod pace;
pub mod run;

pub use pace::Pacer;
pub use run::{Harvester, RunReport};
