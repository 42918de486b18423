// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source adapter trait implemented by the mailbox and channel adapters.

use async_trait::async_trait;

use crate::error::PromoscanError;
use crate::types::{Checkpoint, MediaRef, RawMessage, ScanWindow, SourceKind};

/// Uniform capability over one message source.
///
/// A source holds its own scoped session: `open` acquires it, `close`
/// releases it, and nothing is shared across sources. The message
/// sequence is newest-first, finite, and restartable per invocation; it
/// is not resumable mid-sequence across `open` calls.
#[async_trait]
pub trait MessageSource: Send {
    fn kind(&self) -> SourceKind;

    /// Stable source identifier (`@channel` name, mailbox account label).
    /// Also the prefix of deterministic media target paths.
    fn identifier(&self) -> &str;

    /// Human-readable label used in synthesized descriptions (channel
    /// title once resolved, otherwise the identifier).
    fn display_label(&self) -> String;

    /// Acquires the provider session and positions the scan at the
    /// newest message inside `window`.
    ///
    /// Errors map to [`PromoscanError::SourceUnavailable`]; the
    /// orchestrator then abandons this source and continues with the
    /// next one.
    async fn open(
        &mut self,
        window: &ScanWindow,
        checkpoint: Option<&Checkpoint>,
    ) -> Result<(), PromoscanError>;

    /// Pulls the next message, newest-first.
    ///
    /// Returns `Ok(None)` once the window is exhausted — adapters MUST
    /// stop as soon as a fetched message's timestamp is strictly older
    /// than the window cutoff, since provider history may be unbounded.
    ///
    /// A [`PromoscanError::Throttled`] return leaves the cursor in
    /// place: after the backoff wait the same call yields the message
    /// that was throttled. [`PromoscanError::CorruptMessage`] consumes
    /// the cursor position so the scan can continue past it.
    async fn next_message(&mut self) -> Result<Option<RawMessage>, PromoscanError>;

    /// Fetches the bytes behind one media ref of a previously yielded
    /// message. Failure degrades only that message's `media_paths`.
    async fn fetch_media(
        &mut self,
        message_id: &str,
        media: &MediaRef,
    ) -> Result<Vec<u8>, PromoscanError>;

    /// Releases the provider session. Best-effort; errors are reported
    /// but the run continues.
    async fn close(&mut self) -> Result<(), PromoscanError>;
}
