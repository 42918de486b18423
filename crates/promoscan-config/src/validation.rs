// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: credential pairing,
//! sane delay ranges, non-empty paths. Runs before any network access so
//! a broken config aborts the whole run up front.

use crate::diagnostic::ConfigError;
use crate::model::PromoscanConfig;

/// Validate a deserialized configuration.
///
/// Collects all violations instead of failing fast, so the operator sees
/// every problem in one pass.
pub fn validate_config(config: &PromoscanConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.harvest.keywords.iter().all(|k| k.trim().is_empty()) {
        errors.push(validation(
            "harvest.keywords must contain at least one non-empty term",
        ));
    }

    // Three characters are reserved for the ellipsis marker.
    if config.harvest.description_max_len < 4 {
        errors.push(validation(format!(
            "harvest.description_max_len must be at least 4, got {}",
            config.harvest.description_max_len
        )));
    }

    for (key, value) in [
        ("harvest.output_path", &config.harvest.output_path),
        ("harvest.checkpoint_path", &config.harvest.checkpoint_path),
        ("harvest.media_dir", &config.harvest.media_dir),
    ] {
        if value.trim().is_empty() {
            errors.push(validation(format!("{key} must not be empty")));
        }
    }

    if config.mail.enabled() {
        if config.mail.username.as_deref().unwrap_or("").is_empty() {
            errors.push(validation(
                "mail.username is required when mail.host is set",
            ));
        }
        if config.mail.password.as_deref().unwrap_or("").is_empty() {
            errors.push(validation(
                "mail.password is required when mail.host is set",
            ));
        }
        if config.mail.lookback_count == 0 {
            errors.push(validation("mail.lookback_count must be at least 1"));
        }
    }

    if config.telegram.enabled() {
        if config.telegram.gateway_url.as_deref().unwrap_or("").is_empty() {
            errors.push(validation(
                "telegram.gateway_url is required when telegram.channels is set",
            ));
        }
        if config.telegram.lookback_days < 1 {
            errors.push(validation(format!(
                "telegram.lookback_days must be at least 1, got {}",
                config.telegram.lookback_days
            )));
        }
        if config.telegram.page_size == 0 {
            errors.push(validation("telegram.page_size must be at least 1"));
        }
    }

    for (label, min, max) in [
        (
            "pacing.message_delay",
            config.pacing.message_delay_min_secs,
            config.pacing.message_delay_max_secs,
        ),
        (
            "pacing.source_delay",
            config.pacing.source_delay_min_secs,
            config.pacing.source_delay_max_secs,
        ),
    ] {
        if min < 0.0 || max < 0.0 {
            errors.push(validation(format!("{label} range must be non-negative")));
        }
        if min > max {
            errors.push(validation(format!(
                "{label}_min_secs ({min}) must not exceed {label}_max_secs ({max})"
            )));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn validation(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}
