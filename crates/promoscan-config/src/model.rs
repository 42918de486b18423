// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Promoscan harvester.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so unrecognized keys
//! are rejected at startup with an actionable diagnostic.

use serde::{Deserialize, Serialize};

/// Top-level Promoscan configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections default to sensible values; a run
/// only touches the network for sources that are actually configured.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromoscanConfig {
    /// Keyword set, output paths, and general harvest behavior.
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// IMAP mailbox source settings.
    #[serde(default)]
    pub mail: MailConfig,

    /// Telegram channel source settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Inter-message and inter-source pacing delays.
    #[serde(default)]
    pub pacing: PacingConfig,
}

/// General harvest behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HarvestConfig {
    /// Ordered keyword list used by the filter gate. Matching is
    /// case-insensitive substring containment.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Upper bound on synthesized description length, in characters.
    #[serde(default = "default_description_max_len")]
    pub description_max_len: usize,

    /// Path of the persisted promotions JSON array.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Path of the per-source checkpoint sidecar.
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: String,

    /// Directory where fetched media is stored.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,

    /// Re-attempt media downloads even when the deterministic target
    /// path already exists. Disable for idempotent resume.
    #[serde(default = "default_true")]
    pub redownload_media: bool,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            description_max_len: default_description_max_len(),
            output_path: default_output_path(),
            checkpoint_path: default_checkpoint_path(),
            media_dir: default_media_dir(),
            redownload_media: true,
            log_level: default_log_level(),
        }
    }
}

/// IMAP mailbox source configuration. `host = None` disables the source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    /// IMAP server hostname. `None` disables the mail source.
    #[serde(default)]
    pub host: Option<String>,

    /// IMAPS port.
    #[serde(default = "default_imap_port")]
    pub port: u16,

    /// Account username. Required when `host` is set.
    #[serde(default)]
    pub username: Option<String>,

    /// Account password. Required when `host` is set.
    #[serde(default)]
    pub password: Option<String>,

    /// Mailbox folder to scan.
    #[serde(default = "default_folder")]
    pub folder: String,

    /// Newest-N message window per run.
    #[serde(default = "default_lookback_count")]
    pub lookback_count: usize,

    /// Persisted body text is truncated to this many characters.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl MailConfig {
    pub fn enabled(&self) -> bool {
        self.host.is_some()
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_imap_port(),
            username: None,
            password: None,
            folder: default_folder(),
            lookback_count: default_lookback_count(),
            body_limit: default_body_limit(),
        }
    }
}

/// Telegram channel source configuration. An empty channel list disables
/// the source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Base URL of the Bot-API-compatible history gateway. Required when
    /// any channels are configured.
    #[serde(default)]
    pub gateway_url: Option<String>,

    /// API token presented to the gateway.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Channel usernames to scan, without the `@` prefix.
    #[serde(default)]
    pub channels: Vec<String>,

    /// Elapsed-days window per run.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// History page size per gateway request.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl TelegramConfig {
    pub fn enabled(&self) -> bool {
        !self.channels.is_empty()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            api_token: None,
            channels: Vec::new(),
            lookback_days: default_lookback_days(),
            page_size: default_page_size(),
        }
    }
}

/// Pacing delay ranges, in seconds. Delays are drawn uniformly from
/// `[min, max]` to avoid bulk-access patterns.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PacingConfig {
    #[serde(default = "default_message_delay_min")]
    pub message_delay_min_secs: f64,

    #[serde(default = "default_message_delay_max")]
    pub message_delay_max_secs: f64,

    #[serde(default = "default_source_delay_min")]
    pub source_delay_min_secs: f64,

    #[serde(default = "default_source_delay_max")]
    pub source_delay_max_secs: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            message_delay_min_secs: default_message_delay_min(),
            message_delay_max_secs: default_message_delay_max(),
            source_delay_min_secs: default_source_delay_min(),
            source_delay_max_secs: default_source_delay_max(),
        }
    }
}

/// The promotional vocabulary the harvester was originally deployed
/// with: ten Russian and ten English terms.
fn default_keywords() -> Vec<String> {
    [
        "акция",
        "скидка",
        "спецпредложение",
        "распродажа",
        "промокод",
        "предложение",
        "выгода",
        "бонус",
        "подарок",
        "снижение",
        "discount",
        "sale",
        "offer",
        "promo",
        "deal",
        "coupon",
        "special",
        "save",
        "clearance",
        "bargain",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_description_max_len() -> usize {
    100
}

fn default_output_path() -> String {
    "promotions.json".to_string()
}

fn default_checkpoint_path() -> String {
    "checkpoints.json".to_string()
}

fn default_media_dir() -> String {
    "media".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_imap_port() -> u16 {
    993
}

fn default_folder() -> String {
    "INBOX".to_string()
}

fn default_lookback_count() -> usize {
    50
}

fn default_body_limit() -> usize {
    500
}

fn default_lookback_days() -> i64 {
    30
}

fn default_page_size() -> usize {
    100
}

fn default_message_delay_min() -> f64 {
    1.0
}

fn default_message_delay_max() -> f64 {
    3.0
}

fn default_source_delay_min() -> f64 {
    2.0
}

fn default_source_delay_max() -> f64 {
    5.0
}
