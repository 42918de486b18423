// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped IMAP session over rustls.
//!
//! One `MailSession` per source per run: acquired in `open`, released in
//! `close`. Connection and authentication failures surface as
//! [`PromoscanError::SourceUnavailable`], which abandons this source
//! while the run continues with the others.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use futures::TryStreamExt;
use rustls_pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use promoscan_core::PromoscanError;

type TlsStream = tokio_rustls::client::TlsStream<TcpStream>;

/// One fetched message: sequence number, RFC 822 payload, INTERNALDATE.
pub struct FetchedMail {
    pub sequence: u32,
    pub raw: Vec<u8>,
    pub internal_date: Option<DateTime<FixedOffset>>,
}

/// An authenticated IMAP session with a folder selected.
pub struct MailSession {
    session: async_imap::Session<TlsStream>,
}

impl MailSession {
    /// Connects over TLS, logs in, and selects `folder`.
    pub async fn connect(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        folder: &str,
    ) -> Result<Self, PromoscanError> {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        let connector = TlsConnector::from(Arc::new(tls_config));

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| PromoscanError::unavailable(format!("invalid IMAP host {host}"), e))?;

        let tcp = TcpStream::connect((host, port))
            .await
            .map_err(|e| PromoscanError::unavailable(format!("cannot reach {host}:{port}"), e))?;
        let tls = connector
            .connect(server_name, tcp)
            .await
            .map_err(|e| PromoscanError::unavailable(format!("TLS handshake with {host}"), e))?;

        let client = async_imap::Client::new(tls);
        let mut session = client
            .login(username, password)
            .await
            .map_err(|(e, _)| PromoscanError::unavailable("IMAP login rejected", e))?;

        session
            .select(folder)
            .await
            .map_err(|e| PromoscanError::unavailable(format!("cannot select folder {folder}"), e))?;

        debug!(host, folder, "IMAP session established");
        Ok(Self { session })
    }

    /// Returns all message sequence numbers in the selected folder,
    /// newest first.
    pub async fn search_all(&mut self) -> Result<Vec<u32>, PromoscanError> {
        let ids = self
            .session
            .search("ALL")
            .await
            .map_err(|e| PromoscanError::unavailable("IMAP search failed", e))?;

        let mut sorted: Vec<u32> = ids.into_iter().collect();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        Ok(sorted)
    }

    /// Fetches one message's RFC 822 payload and INTERNALDATE.
    ///
    /// A fetch that comes back empty is a per-message corruption, not a
    /// session failure.
    pub async fn fetch(&mut self, sequence: u32) -> Result<FetchedMail, PromoscanError> {
        let fetches: Vec<async_imap::types::Fetch> = self
            .session
            .fetch(sequence.to_string(), "(RFC822 INTERNALDATE)")
            .await
            .map_err(|e| PromoscanError::unavailable("IMAP fetch failed", e))?
            .try_collect()
            .await
            .map_err(|e| PromoscanError::unavailable("IMAP fetch stream failed", e))?;

        let fetch = fetches
            .into_iter()
            .next()
            .ok_or_else(|| PromoscanError::CorruptMessage {
                message_id: sequence.to_string(),
                reason: "server returned no data for sequence".into(),
            })?;

        let raw = fetch
            .body()
            .ok_or_else(|| PromoscanError::CorruptMessage {
                message_id: sequence.to_string(),
                reason: "fetch response has no body".into(),
            })?
            .to_vec();

        Ok(FetchedMail {
            sequence,
            raw,
            internal_date: fetch.internal_date(),
        })
    }

    /// Logs out, releasing the session. Best-effort.
    pub async fn logout(mut self) -> Result<(), PromoscanError> {
        self.session
            .logout()
            .await
            .map_err(|e| PromoscanError::unavailable("IMAP logout failed", e))
    }
}
