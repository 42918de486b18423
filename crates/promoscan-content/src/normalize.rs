// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Body normalization for raw messages.
//!
//! Converts a possibly-multipart, possibly-HTML message into one plain
//! text string. Normalization always succeeds: undecodable bytes degrade
//! through lossy UTF-8, unparseable HTML degrades to the plain part, and
//! the worst case is an empty string, never an abort.

use promoscan_core::{ContentKind, RawMessage};

/// Subject sentinel for messages without a subject header.
pub const NO_SUBJECT: &str = "No Subject";

/// Subject sentinel for subject headers with malformed encoding.
pub const INVALID_SUBJECT: &str = "Invalid Subject";

/// The normalized view of a message: display-cased originals plus
/// lower-cased views for keyword matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub subject: String,
    pub body: String,
    pub subject_lower: String,
    pub body_lower: String,
}

impl NormalizedText {
    /// Keyword-matching scope for mail sources: subject and body
    /// concatenated, lower-cased.
    pub fn mail_scope(&self) -> String {
        format!("{} {}", self.subject_lower, self.body_lower)
    }
}

/// Normalizes a raw message into plain text.
///
/// When both plain and HTML parts are present, text stripped from the
/// HTML part wins only if it comes out non-empty; otherwise the plain
/// part is used. Idempotent up to whitespace collapsing.
pub fn normalize(msg: &RawMessage) -> NormalizedText {
    let mut plain = String::new();
    let mut html = String::new();

    for part in &msg.body_parts {
        let text = String::from_utf8_lossy(&part.bytes);
        match part.kind {
            ContentKind::Plain if plain.is_empty() => plain = text.into_owned(),
            ContentKind::Html if html.is_empty() => html = text.into_owned(),
            _ => {}
        }
    }

    let stripped = if html.is_empty() {
        String::new()
    } else {
        collapse(&html2text::from_read(html.as_bytes(), 200).unwrap_or_default())
    };

    let body = if stripped.is_empty() {
        collapse(&plain)
    } else {
        stripped
    };

    let subject = msg
        .subject
        .clone()
        .unwrap_or_else(|| NO_SUBJECT.to_string());

    NormalizedText {
        subject_lower: subject.to_lowercase(),
        body_lower: body.to_lowercase(),
        subject,
        body,
    }
}

/// Collapses all whitespace runs to single spaces and trims the ends.
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
