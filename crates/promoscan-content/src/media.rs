// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media download planning.
//!
//! Target paths are derived deterministically from the source identifier
//! and message id, so re-runs plan the same paths and resuming never
//! scatters duplicates.

use std::path::{Path, PathBuf};

use promoscan_core::{MediaKind, MediaRef, RawMessage};

/// One planned download: which ref to fetch and where the bytes go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPlan {
    pub media: MediaRef,
    pub target_path: PathBuf,
}

/// Plans downloads for a message's photo refs, in ref order.
///
/// The first photo maps to `{source_identifier}_{message_id}.jpg`,
/// subsequent ones get an index suffix. Non-photo media is not planned;
/// the adapter tagged it once and downstream treats it uniformly as
/// not-downloadable promotional payload.
pub fn plan_media(msg: &RawMessage, media_dir: &Path) -> Vec<MediaPlan> {
    let ident = sanitize(&msg.source_id);
    msg.media_refs
        .iter()
        .filter(|m| m.kind == MediaKind::Photo)
        .enumerate()
        .map(|(index, media)| {
            let file = if index == 0 {
                format!("{ident}_{}.jpg", msg.message_id)
            } else {
                format!("{ident}_{}_{index}.jpg", msg.message_id)
            };
            MediaPlan {
                media: media.clone(),
                target_path: media_dir.join(file),
            }
        })
        .collect()
}

/// Makes a source identifier filesystem-safe: the `@` prefix goes, and
/// anything outside `[A-Za-z0-9._-]` becomes `_`.
fn sanitize(source_id: &str) -> String {
    source_id
        .trim_start_matches('@')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use promoscan_core::{MediaKind, SourceKind};

    fn message(source_id: &str, message_id: &str, refs: Vec<MediaRef>) -> RawMessage {
        RawMessage {
            source_kind: SourceKind::Channel,
            source_id: source_id.into(),
            message_id: message_id.into(),
            timestamp: chrono::DateTime::parse_from_rfc3339("2026-07-01T00:00:00+00:00").unwrap(),
            sender_or_title: "Title".into(),
            subject: None,
            body_parts: vec![],
            media_refs: refs,
        }
    }

    fn photo(id: &str) -> MediaRef {
        MediaRef {
            file_id: id.into(),
            kind: MediaKind::Photo,
        }
    }

    #[test]
    fn single_photo_gets_deterministic_path() {
        let msg = message("@kpcosm", "120", vec![photo("f1")]);
        let plans = plan_media(&msg, Path::new("media"));
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].target_path, Path::new("media/kpcosm_120.jpg"));
    }

    #[test]
    fn replanning_is_idempotent() {
        let msg = message("@kpcosm", "120", vec![photo("f1"), photo("f2")]);
        let first = plan_media(&msg, Path::new("media"));
        let second = plan_media(&msg, Path::new("media"));
        assert_eq!(first, second);
        assert_eq!(second[1].target_path, Path::new("media/kpcosm_120_1.jpg"));
    }

    #[test]
    fn non_photo_refs_are_not_planned() {
        let msg = message(
            "@kpcosm",
            "7",
            vec![
                MediaRef {
                    file_id: "doc".into(),
                    kind: MediaKind::Other,
                },
                photo("f1"),
            ],
        );
        let plans = plan_media(&msg, Path::new("media"));
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].media.file_id, "f1");
    }

    #[test]
    fn identifiers_are_sanitized_for_the_filesystem() {
        let msg = message("@weird/channel name", "3", vec![photo("f1")]);
        let plans = plan_media(&msg, Path::new("media"));
        assert_eq!(
            plans[0].target_path,
            Path::new("media/weird_channel_name_3.jpg")
        );
    }

    #[test]
    fn no_media_means_empty_plan() {
        let msg = message("@kpcosm", "9", vec![]);
        assert!(plan_media(&msg, Path::new("media")).is_empty());
    }
}
