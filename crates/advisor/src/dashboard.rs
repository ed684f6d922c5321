//! Dashboard state: the store plus filter, selection, expansion and a single
//! status value driving what the user sees.
//!
//! Status moves `Idle -> Loading(op) -> {Ready, Empty, Failed}` for every
//! request. User-visible messages live only in the status, so a new request
//! always replaces the previous message. Conditions that only indicate a
//! caller mistake (nothing selected, selection not in view) are logged and
//! leave the status alone.

use std::fmt;

use thiserror::Error;

use crate::advice::merge_advice;
use crate::client::{ClientError, RecommendationApi};
use crate::model::Recommendation;
use crate::selection::Selection;
use crate::store::{Entry, EntryId, Store};
use crate::view::Filter;

pub const NO_RECOMMENDATIONS: &str = "No recommendations available.";
pub const FETCH_FAILED: &str = "Failed to fetch recommendations. Please try again later.";
pub const ANALYZE_FAILED: &str = "Failed to query the AI Assistant. Please try again later.";

#[derive(Error, Debug)]
pub enum ActionError {
  #[error("no recommendations selected")]
  NoSelection,

  #[error("empty analysis request: no selected recommendation is in the current view")]
  EmptyAnalysisRequest,

  #[error(transparent)]
  Request(#[from] ClientError),
}

impl ActionError {
  /// Whether this ends up in front of the user (as opposed to the log only)
  pub fn is_user_visible(&self) -> bool {
    matches!(self, ActionError::Request(_))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Fetch,
  Analyze,
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operation::Fetch => write!(f, "fetching recommendations"),
      Operation::Analyze => write!(f, "querying the AI Assistant"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
  #[default]
  Idle,
  Loading(Operation),
  Ready,
  /// Fetch succeeded with nothing to show
  Empty,
  Failed(String),
}

impl Status {
  /// The single message shown to the user, if any
  pub fn message(&self) -> Option<&str> {
    match self {
      Status::Empty => Some(NO_RECOMMENDATIONS),
      Status::Failed(message) => Some(message.as_str()),
      Status::Idle | Status::Loading(_) | Status::Ready => None,
    }
  }
}

/// Which record is expanded and whether the results panel is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
  expanded: Option<EntryId>,
  results_open: bool,
}

impl Default for Expansion {
  fn default() -> Self {
    Self { expanded: None, results_open: true }
  }
}

impl Expansion {
  pub fn toggle(&mut self, id: EntryId) {
    self.expanded = if self.expanded == Some(id) { None } else { Some(id) };
  }

  pub fn collapse(&mut self) {
    self.expanded = None;
  }

  pub fn is_expanded(&self, id: EntryId) -> bool {
    self.expanded == Some(id)
  }

  pub fn expanded(&self) -> Option<EntryId> {
    self.expanded
  }

  pub fn toggle_results(&mut self) {
    self.results_open = !self.results_open;
  }

  pub fn results_open(&self) -> bool {
    self.results_open
  }
}

/// Outcome of a successful analysis round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSummary {
  pub sent: usize,
  pub merged: usize,
}

#[derive(Debug, Default)]
pub struct Dashboard {
  status: Status,
  store: Store,
  filter: Filter,
  selection: Selection,
  expansion: Expansion,
}

impl Dashboard {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn status(&self) -> &Status {
    &self.status
  }

  pub fn store(&self) -> &Store {
    &self.store
  }

  pub fn filter(&self) -> &Filter {
    &self.filter
  }

  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  pub fn expansion(&self) -> &Expansion {
    &self.expansion
  }

  pub fn set_source_filter(&mut self, source: impl Into<String>) {
    self.filter.source = source.into();
  }

  pub fn set_search_query(&mut self, query: impl Into<String>) {
    self.filter.query = query.into();
  }

  /// The filtered view, in store order
  pub fn view(&self) -> Vec<&Entry> {
    self.filter.apply(self.store.entries())
  }

  pub fn view_ids(&self) -> Vec<EntryId> {
    self.view().iter().map(|e| e.id()).collect()
  }

  /// Id of the record shown as "Recommendation `position`" (1-based)
  pub fn id_at_position(&self, position: usize) -> Option<EntryId> {
    position.checked_sub(1).and_then(|i| self.view().get(i).map(|e| e.id()))
  }

  pub fn toggle_selection(&mut self, id: EntryId) -> bool {
    self.selection.toggle(id)
  }

  pub fn select_all(&mut self) {
    let view = self.view_ids();
    self.selection.select_all(&view);
  }

  pub fn all_selected(&self) -> bool {
    self.selection.all_selected(&self.view_ids())
  }

  pub fn toggle_expand(&mut self, id: EntryId) {
    self.expansion.toggle(id);
  }

  pub fn toggle_results_panel(&mut self) {
    self.expansion.toggle_results();
  }

  /// Clear everything, load a fresh batch and normalize it. Selection and
  /// expansion refer to the old batch, so they are reset as well.
  pub async fn fetch<A>(&mut self, api: &A) -> Result<usize, ActionError>
  where
    A: RecommendationApi + ?Sized,
  {
    self.status = Status::Loading(Operation::Fetch);
    self.store.clear();
    self.selection.clear();
    self.expansion.collapse();

    match api.fetch_recommendations().await {
      Ok(recommendations) if recommendations.is_empty() => {
        tracing::info!("backend returned no recommendations");
        self.status = Status::Empty;
        Ok(0)
      }
      Ok(recommendations) => {
        let count = recommendations.len();
        self.store.replace(recommendations);
        tracing::info!(count, "loaded recommendations");
        self.status = Status::Ready;
        Ok(count)
      }
      Err(err) => {
        tracing::error!(error = %err, "error fetching recommendations");
        self.status = Status::Failed(FETCH_FAILED.to_string());
        Err(err.into())
      }
    }
  }

  /// Send the selected records that are visible in the current view for
  /// analysis and merge the returned advice back by uuid.
  pub async fn send_selected<A>(&mut self, api: &A) -> Result<AnalysisSummary, ActionError>
  where
    A: RecommendationApi + ?Sized,
  {
    if self.selection.is_empty() {
      tracing::warn!("analysis requested with no recommendations selected");
      return Err(ActionError::NoSelection);
    }

    let targets: Vec<EntryId> =
      self.view_ids().into_iter().filter(|id| self.selection.contains(*id)).collect();
    if targets.is_empty() {
      tracing::warn!(
        selected = self.selection.len(),
        "analysis request is empty: selected recommendations are not in the current view"
      );
      return Err(ActionError::EmptyAnalysisRequest);
    }

    self.status = Status::Loading(Operation::Analyze);

    let mut outgoing: Vec<Recommendation> = Vec::with_capacity(targets.len());
    for id in &targets {
      self.store.ensure_uuid(*id);
      if let Some(entry) = self.store.get(*id) {
        outgoing.push(entry.recommendation.clone());
      }
    }

    match api.analyze(&outgoing).await {
      Ok(entries) => {
        let merged = merge_advice(&mut self.store, &entries);
        tracing::info!(sent = outgoing.len(), merged, "merged advice");
        self.status = Status::Ready;
        Ok(AnalysisSummary { sent: outgoing.len(), merged })
      }
      Err(err) => {
        tracing::error!(error = %err, "error querying AI Assistant");
        self.status = Status::Failed(ANALYZE_FAILED.to_string());
        Err(err.into())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::advice::AdviceEntry;
  use async_trait::async_trait;
  use serde_json::{json, Value};
  use std::sync::Mutex;

  /// In-memory backend that records what it was asked
  struct FakeBackend {
    records: Vec<Value>,
    fail_fetch: bool,
    fail_analyze: bool,
    advice: String,
    analyze_calls: Mutex<Vec<Vec<Recommendation>>>,
  }

  impl FakeBackend {
    fn new(records: Vec<Value>) -> Self {
      Self {
        records,
        fail_fetch: false,
        fail_analyze: false,
        advice: "Resize to **B2s**".to_string(),
        analyze_calls: Mutex::new(Vec::new()),
      }
    }

    fn analyze_call_count(&self) -> usize {
      self.analyze_calls.lock().unwrap().len()
    }

    fn status_error() -> ClientError {
      ClientError::Status { url: "http://fake".into(), status: 503, body: "down".into() }
    }
  }

  #[async_trait]
  impl RecommendationApi for FakeBackend {
    async fn fetch_recommendations(&self) -> Result<Vec<Recommendation>, ClientError> {
      if self.fail_fetch {
        return Err(Self::status_error());
      }
      Ok(self.records.iter().cloned().map(|v| Recommendation::try_from(v).unwrap()).collect())
    }

    async fn analyze(
      &self,
      recommendations: &[Recommendation],
    ) -> Result<Vec<AdviceEntry>, ClientError> {
      self.analyze_calls.lock().unwrap().push(recommendations.to_vec());
      if self.fail_analyze {
        return Err(Self::status_error());
      }
      Ok(
        recommendations
          .iter()
          .filter_map(|r| r.uuid.clone())
          .map(|uuid| AdviceEntry::new(uuid, self.advice.clone()))
          .collect(),
      )
    }
  }

  fn sample() -> Vec<Value> {
    vec![
      json!({ "source": "Azure API", "subscription_id": "s1", "category": "Cost" }),
      json!({ "source": "SQL DB", "category": "Performance", "Instance": "sql-01" }),
      json!({ "source": "Log Analytics", "category": "Cost", "RecommendationName": "Idle IP" }),
    ]
  }

  #[tokio::test]
  async fn test_fetch_normalizes_records() {
    let backend = FakeBackend::new(vec![sample().remove(0)]);
    let mut dashboard = Dashboard::new();

    let count = dashboard.fetch(&backend).await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(dashboard.status(), &Status::Ready);
    let entry = &dashboard.store().entries()[0];
    assert_eq!(entry.normalized.recommendation_name, "Unnamed Recommendation");
    assert_eq!(entry.normalized.subscription_id.as_deref(), Some("s1"));
  }

  #[tokio::test]
  async fn test_empty_fetch_shows_message_not_error() {
    let backend = FakeBackend::new(Vec::new());
    let mut dashboard = Dashboard::new();

    assert_eq!(dashboard.fetch(&backend).await.unwrap(), 0);
    assert_eq!(dashboard.status(), &Status::Empty);
    assert_eq!(dashboard.status().message(), Some("No recommendations available."));
    assert!(dashboard.store().is_empty());
  }

  #[tokio::test]
  async fn test_fetch_failure_sets_generic_message() {
    let mut backend = FakeBackend::new(sample());
    let mut dashboard = Dashboard::new();
    dashboard.fetch(&backend).await.unwrap();

    backend.fail_fetch = true;
    let err = dashboard.fetch(&backend).await.unwrap_err();

    assert!(err.is_user_visible());
    assert_eq!(dashboard.status().message(), Some(FETCH_FAILED));
    assert!(dashboard.store().is_empty());
  }

  #[tokio::test]
  async fn test_refetch_clears_selection_and_expansion() {
    let backend = FakeBackend::new(sample());
    let mut dashboard = Dashboard::new();
    dashboard.fetch(&backend).await.unwrap();
    let id = dashboard.id_at_position(1).unwrap();
    dashboard.toggle_selection(id);
    dashboard.toggle_expand(id);

    dashboard.fetch(&backend).await.unwrap();

    assert!(dashboard.selection().is_empty());
    assert_eq!(dashboard.expansion().expanded(), None);
  }

  #[tokio::test]
  async fn test_send_without_selection_makes_no_call() {
    let backend = FakeBackend::new(sample());
    let mut dashboard = Dashboard::new();
    dashboard.fetch(&backend).await.unwrap();

    let err = dashboard.send_selected(&backend).await.unwrap_err();

    assert!(matches!(err, ActionError::NoSelection));
    assert!(!err.is_user_visible());
    assert_eq!(backend.analyze_call_count(), 0);
    assert_eq!(dashboard.status().message(), None);
  }

  #[tokio::test]
  async fn test_send_with_selection_hidden_by_filter_is_empty_request() {
    let backend = FakeBackend::new(sample());
    let mut dashboard = Dashboard::new();
    dashboard.fetch(&backend).await.unwrap();
    let sql = dashboard.id_at_position(2).unwrap();
    dashboard.toggle_selection(sql);

    dashboard.set_source_filter("Azure API");
    let err = dashboard.send_selected(&backend).await.unwrap_err();

    assert!(matches!(err, ActionError::EmptyAnalysisRequest));
    assert_eq!(backend.analyze_call_count(), 0);
    assert_eq!(dashboard.status(), &Status::Ready);
  }

  #[tokio::test]
  async fn test_selection_survives_filter_changes() {
    let backend = FakeBackend::new(sample());
    let mut dashboard = Dashboard::new();
    dashboard.fetch(&backend).await.unwrap();
    let la = dashboard.id_at_position(3).unwrap();
    dashboard.toggle_selection(la);

    dashboard.set_source_filter("Log Analytics");
    assert_eq!(dashboard.id_at_position(1), Some(la));
    dashboard.set_source_filter("");

    let summary = dashboard.send_selected(&backend).await.unwrap();
    assert_eq!(summary, AnalysisSummary { sent: 1, merged: 1 });

    let calls = backend.analyze_calls.lock().unwrap();
    assert_eq!(calls[0][0].source_label(), Some("Log Analytics"));
  }

  #[tokio::test]
  async fn test_send_assigns_uuids_and_merges_advice() {
    let backend = FakeBackend::new(sample());
    let mut dashboard = Dashboard::new();
    dashboard.fetch(&backend).await.unwrap();
    dashboard.select_all();

    let summary = dashboard.send_selected(&backend).await.unwrap();

    assert_eq!(summary.sent, 3);
    assert_eq!(summary.merged, 3);
    assert_eq!(dashboard.status(), &Status::Ready);
    for entry in dashboard.store().entries() {
      assert!(entry.recommendation.uuid.as_deref().is_some_and(|u| !u.is_empty()));
      assert_eq!(entry.recommendation.advice.as_deref(), Some("Resize to **B2s**"));
    }
  }

  #[tokio::test]
  async fn test_send_failure_keeps_selection_and_store() {
    let mut backend = FakeBackend::new(sample());
    let mut dashboard = Dashboard::new();
    dashboard.fetch(&backend).await.unwrap();
    dashboard.select_all();

    backend.fail_analyze = true;
    let err = dashboard.send_selected(&backend).await.unwrap_err();

    assert!(err.is_user_visible());
    assert_eq!(dashboard.status().message(), Some(ANALYZE_FAILED));
    assert_eq!(dashboard.selection().len(), 3);
    assert_eq!(dashboard.store().len(), 3);
    assert!(dashboard.store().entries().iter().all(|e| e.recommendation.advice.is_none()));
  }

  #[tokio::test]
  async fn test_select_all_toggles_against_view() {
    let backend = FakeBackend::new(sample());
    let mut dashboard = Dashboard::new();
    dashboard.fetch(&backend).await.unwrap();

    dashboard.set_search_query("cost");
    dashboard.select_all();
    assert_eq!(dashboard.selection().len(), 2);
    assert!(dashboard.all_selected());

    dashboard.select_all();
    assert!(dashboard.selection().is_empty());
  }

  #[test]
  fn test_expansion_toggles() {
    let mut dashboard = Dashboard::new();
    let mut store = Store::new();
    store.replace(vec![Recommendation::try_from(json!({})).unwrap()]);
    let id = store.entries()[0].id();

    assert!(dashboard.expansion().results_open());
    dashboard.toggle_results_panel();
    assert!(!dashboard.expansion().results_open());

    dashboard.toggle_expand(id);
    assert!(dashboard.expansion().is_expanded(id));
    dashboard.toggle_expand(id);
    assert!(!dashboard.expansion().is_expanded(id));
  }

  #[test]
  fn test_position_lookup_is_one_based() {
    let dashboard = Dashboard::new();
    assert_eq!(dashboard.id_at_position(0), None);
    assert_eq!(dashboard.id_at_position(1), None);
  }
}
