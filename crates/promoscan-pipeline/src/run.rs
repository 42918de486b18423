// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The harvest orchestrator.
//!
//! Sources are scanned sequentially, newest-first within each source.
//! Failure isolation is layered: a source that cannot be opened is
//! abandoned while the run continues, a message that cannot be parsed is
//! skipped while its source continues, and a media object that cannot be
//! fetched degrades only that record's `media_paths`. Accepted records
//! are flushed one at a time, so an interruption loses at most the
//! message in flight.

use std::path::Path;

use tracing::{debug, error, info, warn};

use promoscan_config::PromoscanConfig;
use promoscan_content::{normalize, plan_media, synthesize};
use promoscan_core::{
    Checkpoint, KeywordSet, MessageSource, Promotion, PromoscanError, RawMessage, ScanWindow,
    SourceKind,
};
use promoscan_store::PromotionStore;

use crate::pace::Pacer;

/// Outcome counters for one harvest run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Records newly accepted and persisted.
    pub accepted: usize,
    /// Messages whose dedup key was already in the store.
    pub duplicates: usize,
    /// Messages the keyword filter rejected.
    pub skipped: usize,
    /// Messages dropped as unparseable.
    pub corrupt: usize,
    /// Textless posts carrying a photo, logged as candidates.
    pub media_only: usize,
    /// Labels of sources abandoned mid-run.
    pub failed_sources: Vec<String>,
}

/// Drives one harvest over a set of sources into a store.
pub struct Harvester {
    config: PromoscanConfig,
    keywords: KeywordSet,
    pacer: Pacer,
}

impl Harvester {
    pub fn new(config: PromoscanConfig) -> Self {
        let keywords = KeywordSet::new(&config.harvest.keywords);
        let pacer = Pacer::new(&config.pacing);
        Self {
            config,
            keywords,
            pacer,
        }
    }

    /// Runs the harvest to completion.
    ///
    /// Individual source and message failures are absorbed into the
    /// report; only a store that cannot be flushed at the end of the run
    /// fails the invocation.
    pub async fn run(
        &self,
        sources: &mut [Box<dyn MessageSource>],
        store: &mut PromotionStore,
    ) -> Result<RunReport, PromoscanError> {
        let mut report = RunReport::default();

        let total = sources.len();
        for (position, source) in sources.iter_mut().enumerate() {
            let label = source.display_label();
            info!(source = %label, "scanning source");
            self.harvest_source(source.as_mut(), store, &mut report)
                .await;

            if position + 1 < total {
                self.pacer.between_sources().await;
            }
        }

        // Final flush catches anything a mid-run persistence failure
        // left in memory.
        store.flush()?;
        info!(
            accepted = report.accepted,
            duplicates = report.duplicates,
            skipped = report.skipped,
            failed_sources = report.failed_sources.len(),
            "harvest complete"
        );
        Ok(report)
    }

    /// Scans one source end to end. Never propagates: every failure mode
    /// lands in the report.
    async fn harvest_source(
        &self,
        source: &mut dyn MessageSource,
        store: &mut PromotionStore,
        report: &mut RunReport,
    ) {
        let label = source.display_label();
        let window = self.window_for(source.kind());
        let checkpoint = store.checkpoint(source.identifier()).cloned();

        loop {
            match source.open(&window, checkpoint.as_ref()).await {
                Ok(()) => break,
                Err(PromoscanError::Throttled { retry_after }) => {
                    warn!(source = %label, ?retry_after, "throttled while opening source");
                    self.pacer.backoff(retry_after).await;
                }
                Err(err) => {
                    warn!(source = %label, error = %err, "source unavailable, moving on");
                    report.failed_sources.push(label);
                    return;
                }
            }
        }

        let mut cursor = checkpoint.unwrap_or_default();
        loop {
            let message = match source.next_message().await {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(PromoscanError::Throttled { retry_after }) => {
                    warn!(source = %label, ?retry_after, "throttled mid-scan, backing off");
                    self.pacer.backoff(retry_after).await;
                    continue;
                }
                Err(PromoscanError::CorruptMessage { message_id, reason }) => {
                    warn!(source = %label, message_id, reason, "skipping corrupt message");
                    report.corrupt += 1;
                    continue;
                }
                Err(err) => {
                    error!(source = %label, error = %err, "source failed mid-scan, abandoning it");
                    report.failed_sources.push(label.clone());
                    break;
                }
            };

            // The cursor covers the message before processing, so the
            // per-record flush persists records and checkpoint together
            // and a crash loses at most this in-flight message.
            cursor.advance(&message.message_id, message.timestamp);
            store.set_checkpoint(source.identifier().to_string(), cursor.clone());
            self.process_message(source, &message, store, report).await;
            self.pacer.between_messages().await;
        }

        if let Err(err) = store.flush() {
            error!(source = %label, error = %err, "checkpoint flush failed, run continues");
        }

        if let Err(err) = source.close().await {
            warn!(source = %label, error = %err, "source close failed");
        }
    }

    /// Filters, enriches, and persists one message.
    async fn process_message(
        &self,
        source: &mut dyn MessageSource,
        message: &RawMessage,
        store: &mut PromotionStore,
        report: &mut RunReport,
    ) {
        let normalized = normalize(message);

        // Mail matches against subject and body together, but an empty
        // body never qualifies regardless of subject. Channels match
        // against post text only.
        let haystack = match message.source_kind {
            SourceKind::Mail if normalized.body.is_empty() => String::new(),
            SourceKind::Mail => normalized.mail_scope(),
            SourceKind::Channel => normalized.body_lower.clone(),
        };

        let matched = self.keywords.matches(&haystack);
        if matched.is_empty() {
            if normalized.body.is_empty() && message.has_photo() {
                info!(
                    source = %message.source_id,
                    message_id = %message.message_id,
                    "media-only post with no searchable text, possible promotional image"
                );
                report.media_only += 1;
            }
            debug!(message_id = %message.message_id, "no keyword match, skipping");
            report.skipped += 1;
            return;
        }

        let links = promoscan_content::extract_links(&normalized.body);
        let media_paths = self.download_media(source, message).await;

        let text = match message.source_kind {
            SourceKind::Mail => truncate_chars(&normalized.body, self.config.mail.body_limit),
            SourceKind::Channel => normalized.body.clone(),
        };

        let description = synthesize(
            &normalized.body,
            &matched,
            &source.display_label(),
            self.config.harvest.description_max_len,
        );

        let promotion = Promotion {
            source: message.source_kind,
            channel_or_sender: match message.source_kind {
                SourceKind::Channel => source.identifier().to_string(),
                SourceKind::Mail => message.sender_or_title.clone(),
            },
            post_or_message_id: message.message_id.clone(),
            date: message.timestamp,
            text,
            keywords_matched: matched,
            links,
            media_paths,
            description,
        };

        if store.append(promotion) {
            report.accepted += 1;
            if let Err(err) = store.flush() {
                error!(error = %err, "record flush failed, retrying at end of run");
            }
        } else {
            report.duplicates += 1;
        }
    }

    /// Downloads the planned media for one message, degrading per file.
    async fn download_media(
        &self,
        source: &mut dyn MessageSource,
        message: &RawMessage,
    ) -> Vec<String> {
        let media_dir = Path::new(&self.config.harvest.media_dir);
        let mut paths = Vec::new();

        for plan in plan_media(message, media_dir) {
            if !self.config.harvest.redownload_media && plan.target_path.exists() {
                debug!(path = %plan.target_path.display(), "media already on disk, reusing");
                paths.push(plan.target_path.display().to_string());
                continue;
            }

            let bytes = loop {
                match source.fetch_media(&message.message_id, &plan.media).await {
                    Ok(bytes) => break Some(bytes),
                    Err(PromoscanError::Throttled { retry_after }) => {
                        warn!(file_id = %plan.media.file_id, ?retry_after, "media fetch throttled");
                        self.pacer.backoff(retry_after).await;
                    }
                    Err(err) => {
                        warn!(
                            file_id = %plan.media.file_id,
                            error = %err,
                            "media fetch failed, record continues without it"
                        );
                        break None;
                    }
                }
            };

            let Some(bytes) = bytes else { continue };
            match write_media(&plan.target_path, &bytes) {
                Ok(()) => paths.push(plan.target_path.display().to_string()),
                Err(err) => {
                    warn!(path = %plan.target_path.display(), error = %err, "media write failed");
                }
            }
        }

        paths
    }

    fn window_for(&self, kind: SourceKind) -> ScanWindow {
        match kind {
            SourceKind::Mail => ScanWindow::Count(self.config.mail.lookback_count),
            SourceKind::Channel => ScanWindow::Days(self.config.telegram.lookback_days),
        }
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        text.chars().take(limit).collect()
    }
}

fn write_media(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "скидка на всё";
        assert_eq!(truncate_chars(text, 6), "скидка");
        assert_eq!(truncate_chars(text, 100), text);
    }

    #[test]
    fn window_follows_source_kind() {
        let harvester = Harvester::new(PromoscanConfig::default());
        assert_eq!(harvester.window_for(SourceKind::Mail), ScanWindow::Count(50));
        assert_eq!(
            harvester.window_for(SourceKind::Channel),
            ScanWindow::Days(30)
        );
    }
}
