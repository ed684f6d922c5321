use std::io::{self, Write};

use anyhow::{anyhow, bail, Result};
use colored::*;

use crate::client::{HttpClient, RecommendationApi};
use crate::config::Config;
use crate::dashboard::{Dashboard, Operation, Status};
use crate::display::{render_dashboard, render_entry, summary_line, RowState};
use crate::output;
use crate::session::run_session;

/// Which records `analyze` should send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
  All,
  Positions(Vec<usize>),
}

fn client(config: &Config) -> Result<HttpClient> {
  Ok(HttpClient::with_config(&config.api)?)
}

/// Fetch, apply the filter and surface any status message. Fails when the
/// fetch ended in an error.
async fn load<A>(dashboard: &mut Dashboard, api: &A, source: &str, search: &str) -> Result<()>
where
  A: RecommendationApi + ?Sized,
{
  output::report_status(&Status::Loading(Operation::Fetch));
  let result = dashboard.fetch(api).await;
  output::report_status(dashboard.status());
  if let Err(err) = result {
    return Err(anyhow!(err));
  }

  dashboard.set_source_filter(source);
  dashboard.set_search_query(search);
  Ok(())
}

/// Print the filtered recommendation list
pub async fn list_recommendations(
  config: &Config,
  source: &str,
  search: &str,
  expand: Option<usize>,
) -> Result<()> {
  let api = client(config)?;
  list_with(&api, config, source, search, expand).await
}

pub async fn list_with<A>(
  api: &A,
  config: &Config,
  source: &str,
  search: &str,
  expand: Option<usize>,
) -> Result<()>
where
  A: RecommendationApi + ?Sized,
{
  let mut dashboard = Dashboard::new();
  load(&mut dashboard, api, source, search).await?;

  if let Some(position) = expand {
    match dashboard.id_at_position(position) {
      Some(id) => dashboard.toggle_expand(id),
      None => output::warn(&format!("No recommendation {position} in the current view")),
    }
  }

  print!("{}", render_dashboard(&dashboard, config.display.width));
  Ok(())
}

/// Fetch, select, send for analysis and print the records that got advice
pub async fn analyze_recommendations(
  config: &Config,
  source: &str,
  search: &str,
  pick: Pick,
) -> Result<()> {
  let api = client(config)?;
  analyze_with(&api, config, source, search, pick).await
}

pub async fn analyze_with<A>(
  api: &A,
  config: &Config,
  source: &str,
  search: &str,
  pick: Pick,
) -> Result<()>
where
  A: RecommendationApi + ?Sized,
{
  let mut dashboard = Dashboard::new();
  load(&mut dashboard, api, source, search).await?;

  match pick {
    Pick::All => dashboard.select_all(),
    Pick::Positions(positions) => {
      for position in positions {
        match dashboard.id_at_position(position) {
          Some(id) if !dashboard.selection().contains(id) => {
            dashboard.toggle_selection(id);
          }
          Some(_) => {}
          None => output::warn(&format!("No recommendation {position} in the current view")),
        }
      }
    }
  }

  let selected: Vec<_> = dashboard.selection().iter().collect();
  if selected.is_empty() {
    bail!("nothing selected for analysis");
  }
  output::info(&format!("Sending {} recommendation(s) to the AI Assistant", selected.len()));

  let summary = match dashboard.send_selected(api).await {
    Ok(summary) => summary,
    Err(err) if err.is_user_visible() => {
      output::report_status(dashboard.status());
      return Err(anyhow!(err));
    }
    Err(err) => bail!(err),
  };
  output::success(&format!(
    "Received advice for {} of {} recommendations",
    summary.merged, summary.sent
  ));

  let width = config.display.width;
  for (i, entry) in dashboard.view().iter().enumerate() {
    if !selected.contains(&entry.id()) {
      continue;
    }
    tracing::debug!(record = %summary_line(&entry.recommendation), "printing advice");
    let state = RowState { position: i + 1, selected: true, expanded: true };
    print!("{}", render_entry(entry, state, width));
  }

  Ok(())
}

/// Interactive session on stdin/stdout
pub async fn interactive_session(config: &Config) -> Result<()> {
  let api = client(config)?;
  let mut dashboard = Dashboard::new();

  println!("{} connected to {}", "advisor".bold(), config.api.base_url.cyan());
  let stdin = io::stdin();
  let mut stdout = io::stdout();
  run_session(&mut dashboard, &api, stdin.lock(), &mut stdout, config.display.width).await?;
  stdout.flush()?;
  Ok(())
}
