// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Promoscan promotional-content harvester.
//!
//! Defines the shared data model (raw messages, promotions, checkpoints),
//! the error taxonomy, the keyword filter, and the [`MessageSource`]
//! adapter trait implemented by the mailbox and channel adapters.

pub mod error;
pub mod keyword;
pub mod source;
pub mod types;

pub use error::PromoscanError;
pub use keyword::KeywordSet;
pub use source::MessageSource;
pub use types::{
    BodyPart, Checkpoint, ContentKind, DedupKey, MediaKind, MediaRef, Promotion, RawMessage,
    ScanWindow, SourceKind,
};
