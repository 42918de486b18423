// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request pacing.
//!
//! Inter-message and inter-source delays are drawn uniformly from
//! configured ranges so the harvester's access pattern does not look like
//! bulk scraping. Provider-directed backoff is different: when a source
//! says how long to wait, that duration is honored verbatim, with no
//! jitter added and nothing shaved off.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use promoscan_config::PacingConfig;

/// Draws and sleeps the pipeline's pacing delays.
#[derive(Debug, Clone)]
pub struct Pacer {
    message_range: (f64, f64),
    source_range: (f64, f64),
}

impl Pacer {
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            message_range: (config.message_delay_min_secs, config.message_delay_max_secs),
            source_range: (config.source_delay_min_secs, config.source_delay_max_secs),
        }
    }

    /// Sleeps a uniform random delay between two messages of one source.
    pub async fn between_messages(&self) {
        sleep_uniform(self.message_range).await;
    }

    /// Sleeps a uniform random delay between two sources.
    pub async fn between_sources(&self) {
        sleep_uniform(self.source_range).await;
    }

    /// Sleeps exactly the provider-directed wait.
    pub async fn backoff(&self, retry_after: Duration) {
        debug!(wait_secs = retry_after.as_secs_f64(), "honoring provider backoff");
        tokio::time::sleep(retry_after).await;
    }
}

async fn sleep_uniform((min, max): (f64, f64)) {
    // The rng handle must not live across the await.
    let secs = if min >= max {
        min
    } else {
        rand::thread_rng().gen_range(min..=max)
    };
    if secs > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }
}
