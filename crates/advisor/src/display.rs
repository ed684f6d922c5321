//! Display formatting for the recommendation list
//!
//! Everything renders into a `String` so the session loop and one-shot
//! commands share the same output and tests can inspect it.

use colored::*;

use crate::dashboard::Dashboard;
use crate::markup::{parse_advice, AdviceLine, Span};
use crate::model::{scalar_text, Recommendation, SourceDetails};
use crate::output::banner_line;
use crate::store::Entry;

pub const NO_ADVICE: &str = "No advice available";
const NA: &str = "N/A";
const INDENT: &str = "    ";

fn or_na(value: Option<&str>) -> &str {
  value.filter(|v| !v.is_empty()).unwrap_or(NA)
}

/// Per-row rendering switches
#[derive(Debug, Clone, Copy)]
pub struct RowState {
  pub position: usize,
  pub selected: bool,
  pub expanded: bool,
}

/// Render the whole dashboard: message, filter bar and (when the results
/// panel is open) the filtered list.
pub fn render_dashboard(dashboard: &Dashboard, width: usize) -> String {
  let mut out = String::new();
  out.push_str(&format!("{}\n", "AI Assistant Assessment".bold()));
  out.push_str(&format!("{}\n", banner_line(width, '=')));

  if let Some(message) = dashboard.status().message() {
    out.push_str(&format!("{}\n", message.red()));
  }

  if dashboard.store().is_empty() {
    return out;
  }

  let filter = dashboard.filter();
  let view = dashboard.view();
  let source = if filter.source.is_empty() { "All Sources" } else { filter.source.as_str() };
  out.push_str(&format!(
    "Source: {} | Search: {} | Selected: {} | Select All: [{}]\n",
    source.cyan(),
    if filter.query.is_empty() { "-".dimmed().to_string() } else { filter.query.yellow().to_string() },
    dashboard.selection().len(),
    if dashboard.all_selected() { "x" } else { " " },
  ));

  let arrow = if dashboard.expansion().results_open() { "▾" } else { "▸" };
  out.push_str(&format!(
    "{} {} ({} of {} shown)\n",
    arrow,
    "Assessment Results".bold(),
    view.len(),
    dashboard.store().len()
  ));

  if !dashboard.expansion().results_open() {
    return out;
  }

  out.push_str(&format!("{}\n", banner_line(width, '-')));
  for (i, entry) in view.iter().enumerate() {
    let state = RowState {
      position: i + 1,
      selected: dashboard.selection().contains(entry.id()),
      expanded: dashboard.expansion().is_expanded(entry.id()),
    };
    out.push_str(&render_entry(entry, state, width));
  }

  out
}

/// One list row; expanded rows include advice and source-specific details
pub fn render_entry(entry: &Entry, state: RowState, width: usize) -> String {
  let rec = &entry.recommendation;
  let normalized = &entry.normalized;
  let mut out = String::new();

  let checkbox = if state.selected { "[x]" } else { "[ ]" };
  let marker = if state.expanded { "▾" } else { "▸" };
  out.push_str(&format!(
    "{} {} {} {} - {} {}: {} {} {}\n",
    checkbox,
    marker,
    "Subscription:".bold(),
    or_na(normalized.subscription_id.as_deref()),
    "Recommendation".bold(),
    state.position,
    or_na(rec.category.as_deref()),
    "Source:".bold(),
    or_na(rec.source_label()),
  ));
  out.push_str(&format!(
    "{INDENT}{} {}\n",
    "Impact:".bold(),
    rec.impact.as_deref().unwrap_or("Unknown")
  ));
  out.push_str(&format!(
    "{INDENT}{} {}\n",
    "Problem:".bold(),
    normalized.problem.as_deref().unwrap_or("No problem description available")
  ));

  if state.expanded {
    out.push_str(&format!("{INDENT}{}\n", "AI Advice:".bold()));
    for line in render_advice(rec.advice.as_deref().unwrap_or(NO_ADVICE), width, 6) {
      out.push_str(&format!("{line}\n"));
    }
    out.push_str(&render_properties(entry));
  }

  out.push('\n');
  out
}

/// Advice text with emphasis in bold and list items bulleted, wrapped so that
/// no line exceeds `width` visible columns.
pub fn render_advice(advice: &str, width: usize, indent: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for line in parse_advice(advice) {
    let (lead, hang) = match &line {
      AdviceLine::ListItem(_) => (format!("{}• ", " ".repeat(indent)), " ".repeat(indent + 2)),
      AdviceLine::Paragraph(_) => (" ".repeat(indent), " ".repeat(indent)),
    };

    let words = styled_words(line.spans());
    if words.is_empty() {
      lines.push(String::new());
      continue;
    }
    lines.extend(wrap_words(&words, width, &lead, &hang));
  }

  lines
}

fn styled_words(spans: &[Span]) -> Vec<(&str, bool)> {
  spans
    .iter()
    .flat_map(|span| {
      let (text, emphasized) = match span {
        Span::Plain(text) => (text.as_str(), false),
        Span::Emphasis(text) => (text.as_str(), true),
      };
      text.split_whitespace().map(move |word| (word, emphasized))
    })
    .collect()
}

/// Greedy word wrap measured on visible characters, styling applied after
fn wrap_words(words: &[(&str, bool)], width: usize, lead: &str, hang: &str) -> Vec<String> {
  let mut lines = Vec::new();
  let mut current = lead.to_string();
  let mut visible = lead.chars().count();
  let mut empty = true;

  for (word, emphasized) in words {
    let len = word.chars().count();
    if !empty && visible + 1 + len > width {
      lines.push(std::mem::replace(&mut current, hang.to_string()));
      visible = hang.chars().count();
      empty = true;
    }
    if !empty {
      current.push(' ');
      visible += 1;
    }
    if *emphasized {
      current.push_str(&word.bold().to_string());
    } else {
      current.push_str(word);
    }
    visible += len;
    empty = false;
  }

  if !empty {
    lines.push(current);
  }
  lines
}

/// Source-specific details block
pub fn render_properties(entry: &Entry) -> String {
  let rec = &entry.recommendation;
  let normalized = &entry.normalized;
  let mut out = String::new();

  match &rec.details {
    SourceDetails::SqlDb(sql) => {
      out.push_str(&format!("{INDENT}{}\n", "Additional SQL DB Information:".bold()));
      property(&mut out, "Instance Name", sql.instance.as_deref());
      property(&mut out, "Generated Date", sql.generated_date.as_deref());
      property(&mut out, "Fit Score", sql.fit_score.as_deref());
      property(&mut out, "Subscription ID", rec.subscription_id.as_deref());
    }
    SourceDetails::LogAnalytics(la) => {
      out.push_str(&format!("{INDENT}{}\n", "Log Analytics Details:".bold()));
      property(&mut out, "Recommendation", Some(normalized.recommendation_name.as_str()));
      property(&mut out, "Resource Group", la.resource_group.as_deref());
      property(&mut out, "Resource Type", la.resource_type.as_deref());
      property(&mut out, "Resource ID", normalized.resource_id.as_deref());
      property(&mut out, "Generated Date", normalized.generated_date.as_deref());
      property(&mut out, "Fit Score", normalized.fit_score.as_deref());
      property(&mut out, "Savings Amount", normalized.savings_amount.as_deref());
    }
    SourceDetails::AzureApi(azure) => {
      extended_properties(&mut out, azure.extended_properties.iter());
    }
    SourceDetails::Unrecognized { .. } => {
      if let Some(serde_json::Value::Object(props)) = rec.extra().get("extended_properties") {
        extended_properties(&mut out, props.iter());
      }
    }
  }

  out
}

fn property(out: &mut String, label: &str, value: Option<&str>) {
  out.push_str(&format!("{INDENT}  {} {}\n", format!("{label}:").bold(), or_na(value)));
}

fn extended_properties<'a>(
  out: &mut String,
  props: impl ExactSizeIterator<Item = (&'a String, &'a serde_json::Value)>,
) {
  if props.len() == 0 {
    return;
  }
  out.push_str(&format!("{INDENT}{}\n", "Extended Properties:".bold()));
  for (key, value) in props {
    let text = scalar_text(value).unwrap_or_else(|| value.to_string());
    out.push_str(&format!("{INDENT}  {} {}\n", format!("{key}:").bold(), text));
  }
}

/// One-line summary used after an analysis round trip
pub fn summary_line(rec: &Recommendation) -> String {
  format!(
    "{} ({})",
    rec.category.as_deref().unwrap_or(NA),
    rec.source_label().unwrap_or(NA)
  )
}
