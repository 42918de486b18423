// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The channel [`MessageSource`] implementation.
//!
//! Pages backwards through a channel's history newest-first, stopping as
//! soon as a post falls strictly outside the scan window. Throttling
//! surfaces before any cursor movement, so a retry after the provider's
//! wait resumes at exactly the same post.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use tracing::debug;

use promoscan_core::{
    BodyPart, Checkpoint, MediaKind, MediaRef, MessageSource, PromoscanError, RawMessage,
    ScanWindow, SourceKind,
};

use crate::client::{ChannelClient, ChannelPost};

/// One Telegram-style channel source.
pub struct TelegramSource {
    client: Arc<dyn ChannelClient>,
    channel: String,
    /// `@channel`, the stable identifier used in records and checkpoints.
    ident: String,
    page_size: usize,
    title: Option<String>,
    cutoff: Option<DateTime<FixedOffset>>,
    /// Posts fetched but not yet handed out, newest first.
    buffer: VecDeque<ChannelPost>,
    /// Pagination cursor: fetch posts older than this id next.
    before_id: Option<i64>,
    exhausted: bool,
}

impl TelegramSource {
    pub fn new(client: Arc<dyn ChannelClient>, channel: impl Into<String>, page_size: usize) -> Self {
        let channel = channel.into();
        let ident = format!("@{channel}");
        Self {
            client,
            channel,
            ident,
            page_size,
            title: None,
            cutoff: None,
            buffer: VecDeque::new(),
            before_id: None,
            exhausted: false,
        }
    }

    fn post_to_message(&self, post: &ChannelPost) -> RawMessage {
        let timestamp = Utc
            .timestamp_opt(post.date, 0)
            .single()
            .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
            .fixed_offset();

        let body_parts = post
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| vec![BodyPart::plain(t.as_bytes().to_vec())])
            .unwrap_or_default();

        let mut media_refs = Vec::new();
        // The last photo size variant is the largest rendition.
        if let Some(size) = post.photo.as_ref().and_then(|sizes| sizes.last()) {
            media_refs.push(MediaRef {
                file_id: size.file_id.clone(),
                kind: MediaKind::Photo,
            });
        }
        if let Some(doc) = &post.document {
            media_refs.push(MediaRef {
                file_id: doc.file_id.clone(),
                kind: MediaKind::Other,
            });
        }

        RawMessage {
            source_kind: SourceKind::Channel,
            source_id: self.ident.clone(),
            message_id: post.id.to_string(),
            timestamp,
            sender_or_title: self.title.clone().unwrap_or_else(|| self.ident.clone()),
            subject: None,
            body_parts,
            media_refs,
        }
    }

    /// Refills the buffer with the next page. Leaves the cursor untouched
    /// on failure so the same page is re-requested after a backoff.
    async fn fill_buffer(&mut self) -> Result<(), PromoscanError> {
        if self.exhausted {
            return Ok(());
        }

        let page = self
            .client
            .history_page(&self.channel, self.before_id, self.page_size)
            .await?;

        if page.is_empty() || page.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.before_id = Some(last.id);
        }
        debug!(channel = %self.ident, fetched = page.len(), "history page fetched");
        self.buffer.extend(page);
        Ok(())
    }
}

#[async_trait]
impl MessageSource for TelegramSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Channel
    }

    fn identifier(&self) -> &str {
        &self.ident
    }

    fn display_label(&self) -> String {
        match &self.title {
            Some(title) => format!("{title} ({})", self.ident),
            None => self.ident.clone(),
        }
    }

    async fn open(
        &mut self,
        window: &ScanWindow,
        checkpoint: Option<&Checkpoint>,
    ) -> Result<(), PromoscanError> {
        let info = self.client.resolve_channel(&self.channel).await?;
        self.title = info.title;

        // The effective cutoff is the newer of the window boundary and
        // the last harvested timestamp, so re-runs only cover new posts.
        let window_cutoff = window.cutoff(Utc::now().fixed_offset());
        let checkpoint_cutoff = checkpoint.and_then(|c| c.last_date);
        self.cutoff = match (window_cutoff, checkpoint_cutoff) {
            (Some(w), Some(c)) => Some(w.max(c)),
            (w, c) => w.or(c),
        };

        self.buffer.clear();
        self.before_id = None;
        self.exhausted = false;
        debug!(channel = %self.ident, cutoff = ?self.cutoff, "channel scan opened");
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Option<RawMessage>, PromoscanError> {
        if self.buffer.is_empty() {
            self.fill_buffer().await?;
        }

        let Some(post) = self.buffer.pop_front() else {
            return Ok(None);
        };

        let message = self.post_to_message(&post);
        if let Some(cutoff) = self.cutoff
            && message.timestamp < cutoff
        {
            debug!(channel = %self.ident, post = post.id, "reached window cutoff");
            self.buffer.clear();
            self.exhausted = true;
            return Ok(None);
        }

        Ok(Some(message))
    }

    async fn fetch_media(
        &mut self,
        _message_id: &str,
        media: &MediaRef,
    ) -> Result<Vec<u8>, PromoscanError> {
        self.client
            .download_media(&media.file_id)
            .await
            .map_err(|err| match err {
                throttled @ PromoscanError::Throttled { .. } => throttled,
                other => PromoscanError::MediaFetch {
                    file_id: media.file_id.clone(),
                    reason: other.to_string(),
                },
            })
    }

    async fn close(&mut self) -> Result<(), PromoscanError> {
        self.buffer.clear();
        self.before_id = None;
        self.exhausted = false;
        Ok(())
    }
}
