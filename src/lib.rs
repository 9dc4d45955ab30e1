// bibavail - CLI wiring for the availability resolution pipeline
//
// Loads config, builds the Alma client and resolver, and prints each
// record's terminal status to stdout as its batch completes.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use bibavail_client::AlmaClient;
use bibavail_config::RuntimeConfig;
use bibavail_resolve::{RenderOutcome, RenderSink, Resolver, ResolverConfig, Target};

pub mod init;

#[derive(Parser, Debug)]
#[command(
    name = "bibavail",
    about = "Resolve real-time ILS availability for catalog records"
)]
pub struct Cli {
    /// Record ids (MMS ids) to resolve
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Override the Alma API gateway base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the API key (defaults to the ALMA_API_KEY env var)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Override record ids per upstream request
    #[arg(long)]
    pub batch_size: Option<usize>,
}

/// Prints one line per record as it reaches a terminal state.
struct ConsoleSink;

impl RenderSink for ConsoleSink {
    fn render(&self, handle: &str, outcome: RenderOutcome) {
        let text = outcome
            .display_text()
            .replace(bibavail_core::format::HOLDINGS_SEPARATOR, "; ");
        println!("{handle}\t{text}");
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = RuntimeConfig::load().context("failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.alma.base_url = base_url;
    }
    if let Some(api_key) = cli.api_key {
        config.alma.api_key = api_key;
    }
    if let Some(batch_size) = cli.batch_size {
        config.resolve.batch_size = batch_size;
    }
    config.validate()?;

    if config.alma.api_key.is_empty() {
        warn!("no API key configured; set ALMA_API_KEY or pass --api-key");
    }

    let client = AlmaClient::new(
        &config.alma.base_url,
        config.alma.api_key.clone(),
        config.resolve.request_timeout(),
    )?;
    let resolver = Resolver::new(
        Arc::new(client),
        ResolverConfig {
            batch_size: config.resolve.batch_size,
            max_attempts: config.resolve.max_attempts,
            poll_interval: config.resolve.poll_interval(),
            max_wait: config.resolve.max_wait(),
        },
    );

    info!(records = cli.ids.len(), "resolving availability");
    let targets: Vec<Target> = cli.ids.iter().map(Target::single).collect();
    let summary = resolver.resolve(targets, Arc::new(ConsoleSink)).await;

    info!(
        rendered = summary.rendered,
        no_status = summary.no_status,
        error_loading = summary.error_loading,
        skipped_bibs = summary.skipped_bibs,
        "resolution complete"
    );
    for err in &summary.errors {
        error!(error = %err, "availability service error");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_ids_and_overrides() {
        let cli = Cli::try_parse_from([
            "bibavail",
            "9912345",
            "9967890",
            "--batch-size",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.ids.len(), 2);
        assert_eq!(cli.batch_size, Some(5));
        assert!(cli.base_url.is_none());
    }

    #[test]
    fn cli_requires_at_least_one_id() {
        assert!(Cli::try_parse_from(["bibavail"]).is_err());
    }
}
