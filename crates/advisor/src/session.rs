//! Interactive dashboard session driven by line commands

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::client::RecommendationApi;
use crate::dashboard::Dashboard;
use crate::display::render_dashboard;

pub const HELP: &str = "\
Commands:
  fetch             fetch recommendations for review
  source [NAME]     filter by source (Azure API, SQL DB, Log Analytics); no name clears
  search [TEXT]     search recommendations; no text clears
  toggle N          select or deselect recommendation N
  all               select all shown recommendations, or clear if all are selected
  send              send selected recommendations for AI analysis
  expand N          expand or collapse recommendation N
  panel             expand or collapse the results panel
  show              print the dashboard
  status            print selection and filter state
  help              show this help
  quit              leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
  Fetch,
  Source(String),
  Search(String),
  Toggle(usize),
  All,
  Send,
  Expand(usize),
  Panel,
  Show,
  Status,
  Help,
  Quit,
}

impl SessionCommand {
  /// Parse one input line; blank lines yield `Ok(None)`
  pub fn parse(line: &str) -> Result<Option<Self>, String> {
    let line = line.trim();
    if line.is_empty() {
      return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
      Some((word, rest)) => (word, rest.trim()),
      None => (line, ""),
    };

    let position = |name: &str| -> Result<usize, String> {
      rest.parse::<usize>().map_err(|_| format!("usage: {name} N (N is the recommendation number)"))
    };

    let command = match word.to_lowercase().as_str() {
      "fetch" => SessionCommand::Fetch,
      "source" | "filter" => SessionCommand::Source(rest.to_string()),
      "search" => SessionCommand::Search(rest.to_string()),
      "toggle" | "select" => SessionCommand::Toggle(position("toggle")?),
      "all" => SessionCommand::All,
      "send" | "analyze" => SessionCommand::Send,
      "expand" => SessionCommand::Expand(position("expand")?),
      "panel" => SessionCommand::Panel,
      "show" | "ls" => SessionCommand::Show,
      "status" => SessionCommand::Status,
      "help" | "?" => SessionCommand::Help,
      "quit" | "exit" | "q" => SessionCommand::Quit,
      other => return Err(format!("unknown command '{other}', type 'help' for a list")),
    };

    Ok(Some(command))
  }
}

/// Run the read-eval-print loop until `quit` or end of input
pub async fn run_session<A, R, W>(
  dashboard: &mut Dashboard,
  api: &A,
  input: R,
  out: &mut W,
  width: usize,
) -> Result<()>
where
  A: RecommendationApi + ?Sized,
  R: BufRead,
  W: Write,
{
  writeln!(out, "Type 'help' for commands.")?;
  write!(out, "advisor> ")?;
  out.flush()?;

  for line in input.lines() {
    let line = line?;
    match SessionCommand::parse(&line) {
      Ok(Some(SessionCommand::Quit)) => break,
      Ok(Some(command)) => execute(dashboard, api, command, out, width).await?,
      Ok(None) => {}
      Err(message) => writeln!(out, "{message}")?,
    }
    write!(out, "advisor> ")?;
    out.flush()?;
  }

  writeln!(out)?;
  Ok(())
}

async fn execute<A, W>(
  dashboard: &mut Dashboard,
  api: &A,
  command: SessionCommand,
  out: &mut W,
  width: usize,
) -> Result<()>
where
  A: RecommendationApi + ?Sized,
  W: Write,
{
  match command {
    SessionCommand::Fetch => {
      // failures are already reflected in the status message
      if let Err(err) = dashboard.fetch(api).await {
        tracing::debug!(error = %err, "fetch failed");
      }
      write!(out, "{}", render_dashboard(dashboard, width))?;
    }
    SessionCommand::Source(source) => {
      dashboard.set_source_filter(source);
      write!(out, "{}", render_dashboard(dashboard, width))?;
    }
    SessionCommand::Search(query) => {
      dashboard.set_search_query(query);
      write!(out, "{}", render_dashboard(dashboard, width))?;
    }
    SessionCommand::Toggle(position) => match dashboard.id_at_position(position) {
      Some(id) => {
        let selected = dashboard.toggle_selection(id);
        let verb = if selected { "Selected" } else { "Deselected" };
        writeln!(out, "{verb} recommendation {position} ({} selected)", dashboard.selection().len())?;
      }
      None => writeln!(out, "No recommendation {position} in the current view")?,
    },
    SessionCommand::All => {
      dashboard.select_all();
      writeln!(out, "{} selected", dashboard.selection().len())?;
    }
    SessionCommand::Send => match dashboard.send_selected(api).await {
      Ok(summary) => {
        writeln!(out, "Received advice for {} of {} recommendations", summary.merged, summary.sent)?;
        write!(out, "{}", render_dashboard(dashboard, width))?;
      }
      Err(err) if err.is_user_visible() => write!(out, "{}", render_dashboard(dashboard, width))?,
      Err(_) => {}
    },
    SessionCommand::Expand(position) => match dashboard.id_at_position(position) {
      Some(id) => {
        dashboard.toggle_expand(id);
        write!(out, "{}", render_dashboard(dashboard, width))?;
      }
      None => writeln!(out, "No recommendation {position} in the current view")?,
    },
    SessionCommand::Panel => {
      dashboard.toggle_results_panel();
      write!(out, "{}", render_dashboard(dashboard, width))?;
    }
    SessionCommand::Show => write!(out, "{}", render_dashboard(dashboard, width))?,
    SessionCommand::Status => {
      let filter = dashboard.filter();
      writeln!(
        out,
        "{} loaded, {} shown, {} selected, source '{}', search '{}'",
        dashboard.store().len(),
        dashboard.view().len(),
        dashboard.selection().len(),
        filter.source,
        filter.query
      )?;
    }
    SessionCommand::Help => writeln!(out, "{HELP}")?,
    SessionCommand::Quit => {}
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_commands() {
    assert_eq!(SessionCommand::parse("  "), Ok(None));
    assert_eq!(SessionCommand::parse("fetch"), Ok(Some(SessionCommand::Fetch)));
    assert_eq!(
      SessionCommand::parse("source Azure API"),
      Ok(Some(SessionCommand::Source("Azure API".to_string())))
    );
    assert_eq!(SessionCommand::parse("source"), Ok(Some(SessionCommand::Source(String::new()))));
    assert_eq!(SessionCommand::parse("TOGGLE 3"), Ok(Some(SessionCommand::Toggle(3))));
    assert_eq!(SessionCommand::parse("q"), Ok(Some(SessionCommand::Quit)));
  }

  #[test]
  fn test_parse_rejects_bad_input() {
    assert!(SessionCommand::parse("toggle x").is_err());
    assert!(SessionCommand::parse("expand").is_err());
    assert!(SessionCommand::parse("dance").unwrap_err().contains("unknown command"));
  }
}
