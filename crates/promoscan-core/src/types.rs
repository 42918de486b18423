// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the source adapters, the pipeline, and the store.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which kind of external provider a message came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceKind {
    Mail,
    Channel,
}

/// Content kind of a single message body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Plain,
    Html,
}

/// One body part of a raw message, bytes left undecoded until
/// normalization.
#[derive(Debug, Clone)]
pub struct BodyPart {
    pub kind: ContentKind,
    pub bytes: Vec<u8>,
}

impl BodyPart {
    pub fn plain(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: ContentKind::Plain,
            bytes: bytes.into(),
        }
    }

    pub fn html(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: ContentKind::Html,
            bytes: bytes.into(),
        }
    }
}

/// Media classification, decided once by the source adapter and consumed
/// uniformly downstream. A message without media refs is the "none" case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Other,
}

/// An opaque reference to a media object held by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Provider-side identifier used to fetch the bytes.
    pub file_id: String,
    pub kind: MediaKind,
}

/// A message as retrieved from a source, before any normalization.
///
/// Immutable once fetched; owned exclusively by the pipeline invocation
/// that fetched it.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub source_kind: SourceKind,
    /// Source identifier: `@channel` name or mailbox account label.
    pub source_id: String,
    /// Provider-side message identifier (IMAP sequence number, post id).
    pub message_id: String,
    pub timestamp: DateTime<FixedOffset>,
    /// Channel title for channel posts, sender address for mail.
    pub sender_or_title: String,
    /// Mail subject; `None` for channel posts.
    pub subject: Option<String>,
    pub body_parts: Vec<BodyPart>,
    pub media_refs: Vec<MediaRef>,
}

impl RawMessage {
    /// Whether the adapter tagged any attached media as a photo.
    pub fn has_photo(&self) -> bool {
        self.media_refs.iter().any(|m| m.kind == MediaKind::Photo)
    }
}

/// The filtered, enriched output record representing one qualifying
/// message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub source: SourceKind,
    pub channel_or_sender: String,
    pub post_or_message_id: String,
    /// Always carries an explicit offset; serialized as RFC 3339.
    pub date: DateTime<FixedOffset>,
    pub text: String,
    /// Non-empty by construction: a promotion exists only if the keyword
    /// filter matched. Order follows the configured keyword list.
    pub keywords_matched: Vec<String>,
    pub links: Vec<String>,
    pub media_paths: Vec<String>,
    pub description: String,
}

impl Promotion {
    /// Identity under which duplicate records are suppressed by the store.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            source: self.source,
            channel_or_sender: self.channel_or_sender.clone(),
            post_or_message_id: self.post_or_message_id.clone(),
        }
    }
}

/// Deduplication key for [`Promotion`] records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub source: SourceKind,
    pub channel_or_sender: String,
    pub post_or_message_id: String,
}

/// Persisted per-source cursor marking ingestion progress.
///
/// Mail sources track the last seen message id, channel sources the last
/// seen post date; one shape keeps the store schema stable across kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_date: Option<DateTime<FixedOffset>>,
}

impl Checkpoint {
    /// Advances the cursor past one consumed message.
    ///
    /// Both fields move together and only for a strictly newer
    /// timestamp, so after a newest-first scan the cursor describes one
    /// message: the newest one consumed.
    pub fn advance(&mut self, message_id: &str, date: DateTime<FixedOffset>) {
        match self.last_date {
            Some(seen) if seen >= date => {}
            _ => {
                self.last_id = Some(message_id.to_string());
                self.last_date = Some(date);
            }
        }
    }
}

/// The bounded recency range within which a source is scanned per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanWindow {
    /// Newest N messages (mail sources).
    Count(usize),
    /// Messages no older than N elapsed days (channel sources).
    Days(i64),
}

impl ScanWindow {
    /// The date cutoff implied by this window, if it is time-bounded.
    ///
    /// Enumeration must stop as soon as a fetched message is strictly
    /// older than the returned instant.
    pub fn cutoff(&self, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        match self {
            ScanWindow::Count(_) => None,
            ScanWindow::Days(days) => Some(now - Duration::days(*days)),
        }
    }

    /// The message-count bound implied by this window, if any.
    pub fn count_limit(&self) -> Option<usize> {
        match self {
            ScanWindow::Count(n) => Some(*n),
            ScanWindow::Days(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn source_kind_round_trips_display_and_serde() {
        assert_eq!(SourceKind::Mail.to_string(), "mail");
        assert_eq!(SourceKind::Channel.to_string(), "channel");
        assert_eq!(SourceKind::from_str("channel").unwrap(), SourceKind::Channel);

        let json = serde_json::to_string(&SourceKind::Mail).unwrap();
        assert_eq!(json, "\"mail\"");
    }

    #[test]
    fn promotion_serializes_expected_field_set() {
        let promo = Promotion {
            source: SourceKind::Channel,
            channel_or_sender: "@kpcosm".into(),
            post_or_message_id: "120".into(),
            date: date("2026-07-01T10:00:00+03:00"),
            text: "Скидка 20% на кремы".into(),
            keywords_matched: vec!["скидка".into()],
            links: vec![],
            media_paths: vec![],
            description: "Скидка from @kpcosm".into(),
        };

        let value = serde_json::to_value(&promo).unwrap();
        let obj = value.as_object().unwrap();
        for field in [
            "source",
            "channel_or_sender",
            "post_or_message_id",
            "date",
            "text",
            "keywords_matched",
            "links",
            "media_paths",
            "description",
        ] {
            assert!(obj.contains_key(field), "missing field {field}");
        }
        assert_eq!(obj.len(), 9);
        assert_eq!(obj["date"], "2026-07-01T10:00:00+03:00");
    }

    #[test]
    fn dedup_key_ignores_payload_fields() {
        let mut a = Promotion {
            source: SourceKind::Mail,
            channel_or_sender: "shop@example.com".into(),
            post_or_message_id: "17".into(),
            date: date("2026-06-01T00:00:00+00:00"),
            text: "sale".into(),
            keywords_matched: vec!["sale".into()],
            links: vec![],
            media_paths: vec![],
            description: "Sale from shop@example.com".into(),
        };
        let key_a = a.dedup_key();
        a.text = "different body".into();
        assert_eq!(key_a, a.dedup_key());
    }

    #[test]
    fn checkpoint_advance_keeps_newest_date() {
        let mut cp = Checkpoint::default();
        cp.advance("5", date("2026-06-05T00:00:00+00:00"));
        cp.advance("4", date("2026-06-04T00:00:00+00:00"));
        assert_eq!(cp.last_id.as_deref(), Some("5"));
        assert_eq!(cp.last_date, Some(date("2026-06-05T00:00:00+00:00")));
    }

    #[test]
    fn checkpoint_fields_always_describe_one_message() {
        // Newest-first consumption: older messages must not split the
        // cursor across two messages.
        let mut cp = Checkpoint::default();
        cp.advance("30", date("2026-06-30T00:00:00+00:00"));
        cp.advance("20", date("2026-06-20T00:00:00+00:00"));
        cp.advance("10", date("2026-06-10T00:00:00+00:00"));
        assert_eq!(cp.last_id.as_deref(), Some("30"));
        assert_eq!(cp.last_date, Some(date("2026-06-30T00:00:00+00:00")));

        // A genuinely newer message moves both fields.
        cp.advance("40", date("2026-07-01T00:00:00+00:00"));
        assert_eq!(cp.last_id.as_deref(), Some("40"));
        assert_eq!(cp.last_date, Some(date("2026-07-01T00:00:00+00:00")));
    }

    #[test]
    fn window_cutoff_only_for_day_bounds() {
        let now = date("2026-07-31T12:00:00+00:00");
        assert_eq!(ScanWindow::Count(50).cutoff(now), None);
        assert_eq!(
            ScanWindow::Days(30).cutoff(now),
            Some(date("2026-07-01T12:00:00+00:00"))
        );
        assert_eq!(ScanWindow::Count(50).count_limit(), Some(50));
        assert_eq!(ScanWindow::Days(30).count_limit(), None);
    }

    #[test]
    fn has_photo_reflects_adapter_tagging() {
        let mut msg = RawMessage {
            source_kind: SourceKind::Channel,
            source_id: "@x".into(),
            message_id: "1".into(),
            timestamp: date("2026-07-01T00:00:00+00:00"),
            sender_or_title: "X".into(),
            subject: None,
            body_parts: vec![],
            media_refs: vec![MediaRef {
                file_id: "f1".into(),
                kind: MediaKind::Other,
            }],
        };
        assert!(!msg.has_photo());
        msg.media_refs.push(MediaRef {
            file_id: "f2".into(),
            kind: MediaKind::Photo,
        });
        assert!(msg.has_photo());
    }
}
