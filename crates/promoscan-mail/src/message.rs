// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RFC 822 payload parsing into the uniform [`RawMessage`] record.
//!
//! Decoding is best-effort throughout: a missing subject header maps to
//! the `"No Subject"` sentinel (by leaving the field empty for the
//! normalizer), a structurally malformed one to `"Invalid Subject"`,
//! and an unparseable date falls back to the IMAP INTERNALDATE, then to
//! the Unix epoch. Only a payload that mail-parser rejects outright is
//! reported as corrupt.

use chrono::{DateTime, FixedOffset};
use mail_parser::{MessageParser, MimeHeaders};

use promoscan_content::INVALID_SUBJECT;
use promoscan_core::{BodyPart, MediaKind, MediaRef, PromoscanError, RawMessage, SourceKind};

/// Sender sentinel when the From header is absent or undecodable.
pub const UNKNOWN_SENDER: &str = "Unknown Sender";

/// Parses one fetched RFC 822 payload into a [`RawMessage`].
///
/// `fallback_date` is the IMAP INTERNALDATE of the fetch, used when the
/// Date header is missing or unparseable.
pub fn parse_raw_message(
    source_id: &str,
    sequence: u32,
    raw: &[u8],
    fallback_date: Option<DateTime<FixedOffset>>,
) -> Result<RawMessage, PromoscanError> {
    let message_id = sequence.to_string();
    let parsed = MessageParser::default().parse(raw).ok_or_else(|| {
        PromoscanError::CorruptMessage {
            message_id: message_id.clone(),
            reason: "unparseable RFC822 payload".into(),
        }
    })?;

    let subject = decode_subject(parsed.subject(), parsed.header_raw("Subject").is_some());

    let sender = parsed
        .from()
        .and_then(|from| from.first())
        .and_then(|addr| addr.address().map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_SENDER.to_string());

    let timestamp = parsed
        .date()
        .and_then(|date| DateTime::from_timestamp(date.to_timestamp(), 0))
        .map(|date| date.fixed_offset())
        .or(fallback_date)
        .unwrap_or_else(epoch);

    let mut body_parts = Vec::new();
    if let Some(part) = parsed.text_bodies().next() {
        body_parts.push(BodyPart::plain(part.contents()));
    }
    if let Some(part) = parsed.html_bodies().next() {
        body_parts.push(BodyPart::html(part.contents()));
    }

    let media_refs = parsed
        .attachments()
        .enumerate()
        .map(|(index, part)| MediaRef {
            file_id: index.to_string(),
            kind: match part.content_type() {
                Some(ctype) if ctype.ctype().eq_ignore_ascii_case("image") => MediaKind::Photo,
                _ => MediaKind::Other,
            },
        })
        .collect();

    Ok(RawMessage {
        source_kind: SourceKind::Mail,
        source_id: source_id.to_string(),
        message_id,
        timestamp,
        sender_or_title: sender,
        subject,
        body_parts,
        media_refs,
    })
}

/// Maps the decoded subject and the raw header's presence to the stored
/// field: the decoded text as-is, the `"Invalid Subject"` sentinel when
/// the header exists but its encoded words did not decode, `None` when
/// no Subject header was sent at all.
fn decode_subject(decoded: Option<&str>, header_present: bool) -> Option<String> {
    match decoded {
        Some(subject) => Some(subject.to_string()),
        None if header_present => Some(INVALID_SUBJECT.to_string()),
        None => None,
    }
}

/// Extracts the bytes of the attachment at `index` from a raw payload.
pub fn attachment_bytes(raw: &[u8], index: usize) -> Option<Vec<u8>> {
    let parsed = MessageParser::default().parse(raw)?;
    parsed
        .attachments()
        .nth(index)
        .map(|part| part.contents().to_vec())
}

fn epoch() -> DateTime<FixedOffset> {
    DateTime::from_timestamp(0, 0)
        .expect("epoch is representable")
        .fixed_offset()
}
