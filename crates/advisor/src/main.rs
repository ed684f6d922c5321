use std::path::PathBuf;

use advisor::commands::{self, Pick};
use advisor::config::{Config, Overrides};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "advisor")]
#[command(
  about = "Advisor - FinOps recommendation review\nFetch cost recommendations, pick the ones worth a closer look and ask the AI Assistant for advice"
)]
#[command(version)]
struct Cli {
  /// Backend base URL
  #[arg(long, global = true, env = "ADVISOR_API_URL")]
  base_url: Option<String>,

  /// Per-request timeout in seconds (no timeout when unset)
  #[arg(long, global = true, env = "ADVISOR_TIMEOUT_SECS")]
  timeout_secs: Option<u64>,

  /// Configuration file path
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Wrap output at this many columns
  #[arg(long, global = true)]
  width: Option<usize>,

  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

/// Filter arguments shared by list and analyze
#[derive(Args)]
struct FilterArgs {
  /// Only show recommendations from this source (e.g. "Azure API")
  #[arg(short, long, default_value = "")]
  source: String,
  /// Case-insensitive text to search for
  #[arg(short = 'q', long, default_value = "")]
  search: String,
}

#[derive(Subcommand)]
enum Command {
  /// Fetch recommendations and print the filtered list
  List {
    #[command(flatten)]
    filter: FilterArgs,
    /// Expand recommendation N to show advice and details
    #[arg(short, long)]
    expand: Option<usize>,
  },
  /// Send recommendations to the AI Assistant and print the advice
  Analyze {
    #[command(flatten)]
    filter: FilterArgs,
    /// Send every recommendation in the filtered list
    #[arg(short, long, conflicts_with = "positions")]
    all: bool,
    /// Recommendation numbers as shown by `list`
    #[arg(required_unless_present = "all")]
    positions: Vec<usize>,
  },
  /// Interactive dashboard session
  Session,
}

fn init_logging(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("advisor=debug,info")
    } else {
      EnvFilter::new("error")
    }
  });

  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

async fn handle(command: Command, config: &Config) -> Result<()> {
  match command {
    Command::List { filter, expand } => {
      commands::list_recommendations(config, &filter.source, &filter.search, expand).await
    }
    Command::Analyze { filter, all, positions } => {
      let pick = if all { Pick::All } else { Pick::Positions(positions) };
      commands::analyze_recommendations(config, &filter.source, &filter.search, pick).await
    }
    Command::Session => commands::interactive_session(config).await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let cwd = std::env::current_dir()?;
  let config = Config::discover(cli.config.as_deref(), &cwd)?.apply(Overrides {
    base_url: cli.base_url,
    timeout_secs: cli.timeout_secs,
    width: cli.width,
  })?;
  tracing::debug!(base_url = %config.api.base_url, "configuration resolved");

  handle(cli.command, &config).await
}
