// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy `./promoscan.toml` >
//! `~/.config/promoscan/promoscan.toml` > `/etc/promoscan/promoscan.toml`
//! with environment variable overrides via the `PROMOSCAN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PromoscanConfig;

/// Load configuration from the standard XDG hierarchy with env var
/// overrides. Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/promoscan/promoscan.toml`
/// 3. `~/.config/promoscan/promoscan.toml`
/// 4. `./promoscan.toml`
/// 5. `PROMOSCAN_*` environment variables
pub fn load_config() -> Result<PromoscanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PromoscanConfig::default()))
        .merge(Toml::file("/etc/promoscan/promoscan.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("promoscan/promoscan.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("promoscan.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no XDG lookup).
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PromoscanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PromoscanConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PromoscanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PromoscanConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that keys which
/// themselves contain underscores stay intact:
/// `PROMOSCAN_MAIL_LOOKBACK_COUNT` must map to `mail.lookback_count`,
/// not `mail.lookback.count`.
fn env_provider() -> Env {
    Env::prefixed("PROMOSCAN_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("harvest_", "harvest.", 1)
            .replacen("mail_", "mail.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("pacing_", "pacing.", 1);
        mapped.into()
    })
}
