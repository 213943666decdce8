// Command line arguments
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "celery-dashboard")]
#[command(about = "Generate and publish the CloudWatch queues dashboard for a deployment")]
#[command(version)]
pub struct Cli {
    /// Environment name (e.g. prod, stage)
    #[arg(short, long)]
    pub environment: String,

    /// Deployment (i.e. edx or edge)
    #[arg(short, long)]
    pub deploy: String,

    /// AWS region for the widgets and API calls; overrides configuration
    #[arg(long)]
    pub region: Option<String>,

    /// Print the dashboard body without publishing it
    #[arg(long)]
    pub dry_run: bool,
}
