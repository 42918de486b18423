// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message content processing for the Promoscan harvester.
//!
//! Everything between a fetched [`promoscan_core::RawMessage`] and an
//! assembled promotion record: body normalization, link extraction,
//! media download planning, and description synthesis. All of it is
//! pure and total — no I/O, no failure paths that abort a message.

pub mod describe;
pub mod links;
pub mod media;
pub mod normalize;

pub use describe::synthesize;
pub use links::extract_links;
pub use media::{MediaPlan, plan_media};
pub use normalize::{INVALID_SUBJECT, NO_SUBJECT, NormalizedText, normalize};
