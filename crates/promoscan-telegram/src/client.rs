// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed HTTP client for the channel history gateway.
//!
//! The gateway speaks the Bot API JSON envelope (`ok` / `result` /
//! `error_code` / `parameters.retry_after`) and adds a windowed
//! `getChatHistory` method the hosted Bot API lacks. Throttling replies
//! (429 with `retry_after`) map to [`PromoscanError::Throttled`] so the
//! pacer can honor the provider's wait verbatim.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use promoscan_core::PromoscanError;

/// Resolved channel metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatInfo {
    #[serde(default)]
    pub title: Option<String>,
}

/// One channel post as returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelPost {
    #[serde(rename = "message_id")]
    pub id: i64,
    /// Unix timestamp, UTC.
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
    /// Photo size variants; the last entry is the largest.
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub document: Option<DocumentMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentMeta {
    pub file_id: String,
}

/// Narrow collaborator interface over the channel provider.
///
/// One implementation talks to the real gateway; tests substitute an
/// in-memory fake, which is how the pipeline stays testable without a
/// network.
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// Resolves a channel username to its metadata. An unknown or
    /// inaccessible channel is unavailable — for that channel only.
    async fn resolve_channel(&self, channel: &str) -> Result<ChatInfo, PromoscanError>;

    /// Returns up to `limit` posts older than `before_id` (or the newest
    /// posts when `None`), newest first.
    async fn history_page(
        &self,
        channel: &str,
        before_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<ChannelPost>, PromoscanError>;

    /// Downloads one media object by file id.
    async fn download_media(&self, file_id: &str) -> Result<Vec<u8>, PromoscanError>;
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    file_path: String,
}

/// [`ChannelClient`] over HTTP.
pub struct HttpChannelClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpChannelClient {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<T, PromoscanError> {
        let mut request = self
            .http
            .get(format!("{}/{method}", self.base_url))
            .query(query);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PromoscanError::unavailable(format!("gateway request {method}"), e))?;

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| PromoscanError::unavailable(format!("gateway response {method}"), e))?;

        if envelope.ok {
            return envelope.result.ok_or_else(|| {
                PromoscanError::SourceUnavailable {
                    reason: format!("gateway {method} returned ok without a result"),
                    source: None,
                }
            });
        }

        if envelope.error_code == Some(429)
            && let Some(retry_after) = envelope.parameters.and_then(|p| p.retry_after)
        {
            debug!(method, retry_after, "gateway throttled the request");
            return Err(PromoscanError::Throttled {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        Err(PromoscanError::SourceUnavailable {
            reason: envelope
                .description
                .unwrap_or_else(|| format!("gateway {method} failed")),
            source: None,
        })
    }
}

#[async_trait]
impl ChannelClient for HttpChannelClient {
    async fn resolve_channel(&self, channel: &str) -> Result<ChatInfo, PromoscanError> {
        self.call("getChat", &[("chat_id", format!("@{channel}"))])
            .await
    }

    async fn history_page(
        &self,
        channel: &str,
        before_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<ChannelPost>, PromoscanError> {
        let mut query = vec![
            ("chat_id", format!("@{channel}")),
            ("limit", limit.to_string()),
        ];
        if let Some(id) = before_id {
            query.push(("before_id", id.to_string()));
        }
        self.call("getChatHistory", &query).await
    }

    async fn download_media(&self, file_id: &str) -> Result<Vec<u8>, PromoscanError> {
        let info: FileInfo = self
            .call("getFile", &[("file_id", file_id.to_string())])
            .await?;

        let mut request = self
            .http
            .get(format!("{}/file/{}", self.base_url, info.file_path));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PromoscanError::unavailable("media download request", e))?;
        if !response.status().is_success() {
            return Err(PromoscanError::MediaFetch {
                file_id: file_id.to_string(),
                reason: format!("media download returned {}", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PromoscanError::unavailable("media download body", e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn resolve_channel_parses_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getChat"))
            .and(query_param("chat_id", "@kpcosm"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": { "title": "KP Cosmetics" }
            })))
            .mount(&server)
            .await;

        let client = HttpChannelClient::new(server.uri(), None);
        let info = client.resolve_channel("kpcosm").await.unwrap();
        assert_eq!(info.title.as_deref(), Some("KP Cosmetics"));
    }

    #[tokio::test]
    async fn history_page_parses_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getChatHistory"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {
                        "message_id": 120,
                        "date": 1_785_000_000i64,
                        "text": "Скидка 20%",
                        "photo": [{ "file_id": "small" }, { "file_id": "big" }]
                    },
                    { "message_id": 119, "date": 1_784_900_000i64 }
                ]
            })))
            .mount(&server)
            .await;

        let client = HttpChannelClient::new(server.uri(), None);
        let posts = client.history_page("kpcosm", None, 100).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, 120);
        assert_eq!(posts[0].text.as_deref(), Some("Скидка 20%"));
        assert_eq!(posts[0].photo.as_ref().unwrap().last().unwrap().file_id, "big");
        assert!(posts[1].text.is_none());
    }

    #[tokio::test]
    async fn throttle_reply_maps_to_throttled_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getChatHistory"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 429,
                "description": "Too Many Requests: retry after 30",
                "parameters": { "retry_after": 30 }
            })))
            .mount(&server)
            .await;

        let client = HttpChannelClient::new(server.uri(), None);
        let err = client.history_page("kpcosm", None, 100).await.unwrap_err();
        match err {
            PromoscanError::Throttled { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(30));
            }
            other => panic!("expected Throttled, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_channel_is_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getChat"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let client = HttpChannelClient::new(server.uri(), None);
        let err = client.resolve_channel("nosuch").await.unwrap_err();
        assert!(err.is_source_fatal());
        assert!(err.to_string().contains("chat not found"));
    }

    #[tokio::test]
    async fn download_media_follows_file_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getFile"))
            .and(query_param("file_id", "big"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": { "file_path": "photos/big.jpg" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/file/photos/big.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpegbytes".to_vec()))
            .mount(&server)
            .await;

        let client = HttpChannelClient::new(server.uri(), None);
        let bytes = client.download_media("big").await.unwrap();
        assert_eq!(bytes, b"jpegbytes");
    }
}
