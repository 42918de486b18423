// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The mailbox [`MessageSource`] implementation.
//!
//! Scans the newest N messages of one folder per run, newest-first.
//! Raw payloads of messages that carry attachments are cached for the
//! lifetime of the scan so `fetch_media` can extract attachment bytes
//! without a second round-trip.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, warn};

use promoscan_core::{
    Checkpoint, MediaRef, MessageSource, PromoscanError, RawMessage, ScanWindow, SourceKind,
};

use crate::message::{attachment_bytes, parse_raw_message};
use crate::session::MailSession;

/// Connection settings for one mailbox source.
#[derive(Debug, Clone)]
pub struct MailSourceConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub folder: String,
}

/// IMAP mailbox source. One scoped session per `open`/`close` pair.
pub struct MailSource {
    config: MailSourceConfig,
    session: Option<MailSession>,
    /// Remaining sequence numbers to fetch, newest first.
    pending: Vec<u32>,
    cutoff: Option<chrono::DateTime<chrono::FixedOffset>>,
    /// Raw payloads kept for attachment extraction, by message id.
    raw_cache: HashMap<String, Vec<u8>>,
}

impl MailSource {
    pub fn new(config: MailSourceConfig) -> Self {
        Self {
            config,
            session: None,
            pending: Vec::new(),
            cutoff: None,
            raw_cache: HashMap::new(),
        }
    }
}

#[async_trait]
impl MessageSource for MailSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Mail
    }

    fn identifier(&self) -> &str {
        &self.config.username
    }

    fn display_label(&self) -> String {
        self.config.username.clone()
    }

    async fn open(
        &mut self,
        window: &ScanWindow,
        _checkpoint: Option<&Checkpoint>,
    ) -> Result<(), PromoscanError> {
        let mut session = MailSession::connect(
            &self.config.host,
            self.config.port,
            &self.config.username,
            &self.config.password,
            &self.config.folder,
        )
        .await?;

        let mut ids = session.search_all().await?;
        if let Some(limit) = window.count_limit() {
            ids.truncate(limit);
        }
        // Checkpoints are advisory for mail: sequence numbers are
        // folder-relative and may be reassigned, so the window is
        // re-derived each run and the store's dedup key absorbs overlap.
        debug!(
            folder = %self.config.folder,
            candidates = ids.len(),
            "mailbox window resolved"
        );

        self.cutoff = window.cutoff(chrono::Utc::now().fixed_offset());
        // Popped from the back, so keep oldest-last ordering reversed.
        ids.reverse();
        self.pending = ids;
        self.session = Some(session);
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Option<RawMessage>, PromoscanError> {
        let session = self.session.as_mut().ok_or_else(|| {
            PromoscanError::Internal("next_message called before open".into())
        })?;

        let Some(sequence) = self.pending.pop() else {
            return Ok(None);
        };

        let fetched = match session.fetch(sequence).await {
            Ok(fetched) => fetched,
            Err(err @ PromoscanError::CorruptMessage { .. }) => return Err(err),
            Err(err) => {
                // Connection-level failure: put the id back so a retry
                // after reopen would resume here, then fail the source.
                self.pending.push(sequence);
                return Err(err);
            }
        };

        let message = parse_raw_message(
            &self.config.username,
            fetched.sequence,
            &fetched.raw,
            fetched.internal_date,
        )?;

        if let Some(cutoff) = self.cutoff
            && message.timestamp < cutoff
        {
            debug!(sequence, "reached window cutoff, stopping mailbox scan");
            self.pending.clear();
            return Ok(None);
        }

        if !message.media_refs.is_empty() {
            self.raw_cache
                .insert(message.message_id.clone(), fetched.raw);
        }

        Ok(Some(message))
    }

    async fn fetch_media(
        &mut self,
        message_id: &str,
        media: &MediaRef,
    ) -> Result<Vec<u8>, PromoscanError> {
        let raw = self
            .raw_cache
            .get(message_id)
            .ok_or_else(|| PromoscanError::MediaFetch {
                file_id: media.file_id.clone(),
                reason: format!("no cached payload for message {message_id}"),
            })?;

        let index: usize =
            media
                .file_id
                .parse()
                .map_err(|_| PromoscanError::MediaFetch {
                    file_id: media.file_id.clone(),
                    reason: "mail media refs are attachment indexes".into(),
                })?;

        attachment_bytes(raw, index).ok_or_else(|| PromoscanError::MediaFetch {
            file_id: media.file_id.clone(),
            reason: format!("attachment {index} not found in message {message_id}"),
        })
    }

    async fn close(&mut self) -> Result<(), PromoscanError> {
        self.pending.clear();
        self.raw_cache.clear();
        if let Some(session) = self.session.take()
            && let Err(err) = session.logout().await
        {
            warn!(error = %err, "IMAP logout failed");
        }
        Ok(())
    }
}
