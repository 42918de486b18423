// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Promoscan - promotional content harvester.
//!
//! This is the binary entry point for the Promoscan CLI.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use promoscan_config::PromoscanConfig;
use promoscan_core::MessageSource;
use promoscan_mail::{MailSource, MailSourceConfig};
use promoscan_pipeline::Harvester;
use promoscan_store::PromotionStore;
use promoscan_telegram::{HttpChannelClient, TelegramSource};

/// Promoscan - promotional content harvester for mailboxes and channels.
#[derive(Parser, Debug)]
#[command(name = "promoscan", version, about, long_about = None)]
struct Cli {
    /// Explicit configuration file; the XDG hierarchy is used otherwise.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan all configured sources once and persist matches (default).
    Run,
    /// Print the effective configuration and exit.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration problems are terminal before any network is touched.
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            promoscan_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            if let Err(code) = run_harvest(&config).await {
                std::process::exit(code);
            }
        }
        Commands::Config => match toml::to_string_pretty(&config) {
            Ok(rendered) => print!("{rendered}"),
            Err(err) => {
                eprintln!("promoscan: cannot render config: {err}");
                std::process::exit(1);
            }
        },
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<PromoscanConfig, Vec<promoscan_config::ConfigError>> {
    match path {
        Some(path) => promoscan_config::load_and_validate_path(path),
        None => promoscan_config::load_and_validate(),
    }
}

fn init_logging(config: &PromoscanConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.harvest.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_harvest(config: &PromoscanConfig) -> Result<(), i32> {
    let mut sources = build_sources(config);
    if sources.is_empty() {
        eprintln!("promoscan: no sources configured; set [mail] or [telegram] in the config");
        return Err(2);
    }

    let mut store = match PromotionStore::load(
        &config.harvest.output_path,
        &config.harvest.checkpoint_path,
    ) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("promoscan: cannot open store: {err}");
            return Err(1);
        }
    };
    info!(
        existing = store.len(),
        sources = sources.len(),
        "starting harvest"
    );

    let harvester = Harvester::new(config.clone());
    match harvester.run(&mut sources, &mut store).await {
        Ok(report) => {
            println!(
                "promoscan: {} new, {} duplicates, {} skipped ({} total on record)",
                report.accepted,
                report.duplicates,
                report.skipped,
                store.len()
            );
            if !report.failed_sources.is_empty() {
                eprintln!(
                    "promoscan: {} source(s) failed: {}",
                    report.failed_sources.len(),
                    report.failed_sources.join(", ")
                );
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("promoscan: harvest failed: {err}");
            Err(1)
        }
    }
}

/// Builds the source list from the configuration: the mailbox first when
/// enabled, then one source per configured channel.
fn build_sources(config: &PromoscanConfig) -> Vec<Box<dyn MessageSource>> {
    let mut sources: Vec<Box<dyn MessageSource>> = Vec::new();

    if config.mail.enabled()
        && let (Some(host), Some(username), Some(password)) = (
            config.mail.host.clone(),
            config.mail.username.clone(),
            config.mail.password.clone(),
        )
    {
        sources.push(Box::new(MailSource::new(MailSourceConfig {
            host,
            port: config.mail.port,
            username,
            password,
            folder: config.mail.folder.clone(),
        })));
    }

    if config.telegram.enabled()
        && let Some(gateway_url) = &config.telegram.gateway_url
    {
        let client = Arc::new(HttpChannelClient::new(
            gateway_url.clone(),
            config.telegram.api_token.clone(),
        ));
        for channel in &config.telegram.channels {
            sources.push(Box::new(TelegramSource::new(
                Arc::clone(&client) as Arc<dyn promoscan_telegram::ChannelClient>,
                channel.clone(),
                config.telegram.page_size,
            )));
        }
    }

    sources
}
