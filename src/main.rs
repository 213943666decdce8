// Main entry point - Dependency injection and one-shot dashboard run
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::{DashboardService, DashboardTarget};
use crate::infrastructure::cloudwatch_repository::CloudWatchRepository;
use crate::infrastructure::config::load_config;
use crate::presentation::cli::Cli;
use crate::presentation::output::print_body;

fn init_tracing() {
    // stdout carries the dashboard body, so logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("celery_dashboard=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    // Load configuration
    let mut config = load_config().context("Failed to load configuration")?;
    if let Some(region) = cli.region {
        config.aws.region = region;
    }

    // Create repository (infrastructure layer)
    let repository = Arc::new(CloudWatchRepository::connect(&config.aws).await);

    // Create service (application layer)
    let service = DashboardService::new(repository, config.retry.policy(), config.layout);
    let target = DashboardTarget::new(&cli.environment, &cli.deploy, &config.aws.region);

    tracing::info!(
        dashboard = %target.dashboard_name(),
        region = %target.region,
        "Generating dashboard"
    );

    let dashboard = service
        .build(&target)
        .await
        .context("Failed to look up dashboard metrics")?;

    print_body(&dashboard)?;

    if cli.dry_run {
        tracing::info!(dashboard = %dashboard.name, "Dry run, not publishing");
        return Ok(());
    }

    service
        .publish(&dashboard)
        .await
        .with_context(|| format!("Failed to publish dashboard {}", dashboard.name))?;

    Ok(())
}
