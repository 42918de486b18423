// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The incremental promotion store.
//!
//! All writes go through the orchestrator's single logical thread; the
//! store itself only guarantees that each flush lands atomically
//! (write-temp-then-rename), so a crash leaves either the previous or
//! the new state on disk, never a torn file.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use promoscan_core::{Checkpoint, DedupKey, Promotion, PromoscanError};

/// Deduplicating, atomically-persisted store for promotion records and
/// per-source checkpoints.
///
/// The promotions file is exactly one pretty-printed UTF-8 JSON array
/// with non-ASCII characters left unescaped; checkpoints live in a
/// sidecar JSON object keyed by source identifier.
#[derive(Debug)]
pub struct PromotionStore {
    output_path: PathBuf,
    checkpoint_path: PathBuf,
    records: Vec<Promotion>,
    seen: HashSet<DedupKey>,
    checkpoints: BTreeMap<String, Checkpoint>,
}

impl PromotionStore {
    /// Loads previously persisted records and checkpoints.
    ///
    /// Missing files mean a fresh store; files that exist but fail to
    /// parse are a persistence error, since atomic flushes should never
    /// leave a torn file behind.
    pub fn load(
        output_path: impl Into<PathBuf>,
        checkpoint_path: impl Into<PathBuf>,
    ) -> Result<Self, PromoscanError> {
        let output_path = output_path.into();
        let checkpoint_path = checkpoint_path.into();

        let records: Vec<Promotion> = read_json_or_default(&output_path)?;
        let checkpoints: BTreeMap<String, Checkpoint> = read_json_or_default(&checkpoint_path)?;

        let seen = records.iter().map(Promotion::dedup_key).collect();
        debug!(
            records = records.len(),
            checkpoints = checkpoints.len(),
            path = %output_path.display(),
            "loaded promotion store"
        );

        Ok(Self {
            output_path,
            checkpoint_path,
            records,
            seen,
            checkpoints,
        })
    }

    /// Appends a record unless its dedup key is already present.
    ///
    /// Returns `true` if the record was added; a duplicate is a no-op
    /// returning `false`. The caller decides when to [`flush`].
    ///
    /// [`flush`]: PromotionStore::flush
    pub fn append(&mut self, promotion: Promotion) -> bool {
        if !self.seen.insert(promotion.dedup_key()) {
            debug!(
                id = %promotion.post_or_message_id,
                channel = %promotion.channel_or_sender,
                "duplicate promotion skipped"
            );
            return false;
        }
        self.records.push(promotion);
        true
    }

    /// Durably writes records and checkpoints, each via its own
    /// write-temp-then-rename.
    pub fn flush(&self) -> Result<(), PromoscanError> {
        let records_json =
            serde_json::to_string_pretty(&self.records).map_err(PromoscanError::persistence)?;
        write_atomic(&self.output_path, &records_json)?;

        let checkpoints_json =
            serde_json::to_string_pretty(&self.checkpoints).map_err(PromoscanError::persistence)?;
        write_atomic(&self.checkpoint_path, &checkpoints_json)?;
        Ok(())
    }

    pub fn checkpoint(&self, source_id: &str) -> Option<&Checkpoint> {
        self.checkpoints.get(source_id)
    }

    pub fn set_checkpoint(&mut self, source_id: impl Into<String>, checkpoint: Checkpoint) {
        self.checkpoints.insert(source_id.into(), checkpoint);
    }

    pub fn records(&self) -> &[Promotion] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read_json_or_default<T>(path: &Path) -> Result<T, PromoscanError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).map_err(PromoscanError::persistence),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(err) => Err(PromoscanError::persistence(err)),
    }
}

/// Writes `content` to a temp file in the target's directory, then
/// renames it over `path`. The rename keeps the replacement atomic on
/// the same filesystem.
fn write_atomic(path: &Path, content: &str) -> Result<(), PromoscanError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(PromoscanError::persistence)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(PromoscanError::persistence)?;
    tmp.write_all(content.as_bytes())
        .map_err(PromoscanError::persistence)?;
    tmp.as_file()
        .sync_all()
        .map_err(PromoscanError::persistence)?;
    tmp.persist(path)
        .map_err(|err| PromoscanError::persistence(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use promoscan_core::SourceKind;

    fn promotion(id: &str, channel: &str) -> Promotion {
        Promotion {
            source: SourceKind::Channel,
            channel_or_sender: channel.into(),
            post_or_message_id: id.into(),
            date: chrono::DateTime::parse_from_rfc3339("2026-07-01T10:00:00+03:00").unwrap(),
            text: "Скидка 20% на кремы".into(),
            keywords_matched: vec!["скидка".into()],
            links: vec!["https://shop.example.com".into()],
            media_paths: vec![],
            description: "20% on кремы".into(),
        }
    }

    fn paths(dir: &tempfile::TempDir) -> (PathBuf, PathBuf) {
        (
            dir.path().join("promotions.json"),
            dir.path().join("checkpoints.json"),
        )
    }

    #[test]
    fn missing_files_load_as_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let (out, cp) = paths(&dir);
        let store = PromotionStore::load(out, cp).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_append_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (out, cp) = paths(&dir);
        let mut store = PromotionStore::load(out, cp).unwrap();

        assert!(store.append(promotion("120", "@kpcosm")));
        assert!(!store.append(promotion("120", "@kpcosm")));
        assert!(store.append(promotion("120", "@other")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn flush_then_load_round_trips_records_and_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let (out, cp) = paths(&dir);

        let mut store = PromotionStore::load(&out, &cp).unwrap();
        store.append(promotion("120", "@kpcosm"));
        store.set_checkpoint(
            "@kpcosm",
            Checkpoint {
                last_id: Some("120".into()),
                last_date: None,
            },
        );
        store.flush().unwrap();

        let reloaded = PromotionStore::load(&out, &cp).unwrap();
        assert_eq!(reloaded.records(), store.records());
        assert_eq!(
            reloaded.checkpoint("@kpcosm").unwrap().last_id.as_deref(),
            Some("120")
        );
    }

    #[test]
    fn reload_suppresses_duplicates_from_previous_runs() {
        let dir = tempfile::tempdir().unwrap();
        let (out, cp) = paths(&dir);

        let mut store = PromotionStore::load(&out, &cp).unwrap();
        store.append(promotion("120", "@kpcosm"));
        store.flush().unwrap();

        // Second invocation over the same window.
        let mut store = PromotionStore::load(&out, &cp).unwrap();
        assert!(!store.append(promotion("120", "@kpcosm")));
        store.flush().unwrap();

        let final_store = PromotionStore::load(&out, &cp).unwrap();
        assert_eq!(final_store.len(), 1);
    }

    #[test]
    fn output_is_pretty_printed_with_unescaped_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let (out, cp) = paths(&dir);

        let mut store = PromotionStore::load(&out, &cp).unwrap();
        store.append(promotion("120", "@kpcosm"));
        store.flush().unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert!(content.starts_with("["));
        assert!(content.contains("\n  "), "expected pretty indentation");
        assert!(content.contains("Скидка"), "non-ASCII must stay unescaped");
        assert!(!content.contains("\\u"), "no unicode escapes expected");
    }

    #[test]
    fn corrupt_records_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let (out, cp) = paths(&dir);
        std::fs::write(&out, "[{\"source\": \"channel\",").unwrap();

        let err = PromotionStore::load(&out, &cp).unwrap_err();
        assert!(matches!(err, PromoscanError::Persistence { .. }));
    }

    #[test]
    fn flush_replaces_rather_than_appends_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let (out, cp) = paths(&dir);

        let mut store = PromotionStore::load(&out, &cp).unwrap();
        store.append(promotion("1", "@a"));
        store.flush().unwrap();
        store.append(promotion("2", "@a"));
        store.flush().unwrap();

        let records: Vec<Promotion> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn interrupted_run_recovers_flushed_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let (out, cp) = paths(&dir);

        let mut store = PromotionStore::load(&out, &cp).unwrap();
        store.append(promotion("1", "@a"));
        store.flush().unwrap();
        // Record 2 appended but never flushed: the "in-flight" loss
        // bounded by the flush-per-record policy.
        store.append(promotion("2", "@a"));
        drop(store);

        let recovered = PromotionStore::load(&out, &cp).unwrap();
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered.records()[0].post_or_message_id, "1");
    }
}
