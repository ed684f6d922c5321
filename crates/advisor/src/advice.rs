//! Analysis request payload and merging returned advice into the store

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Recommendation;
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct AnalysisRequest<'a> {
  pub recommendations: &'a [Recommendation],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdviceTarget {
  #[serde(default)]
  pub uuid: Option<String>,
}

/// One element of the analysis response: `{"recommendation": {"uuid"}, "advice"}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdviceEntry {
  #[serde(default)]
  pub recommendation: AdviceTarget,
  #[serde(default)]
  pub advice: Option<String>,
}

impl AdviceEntry {
  pub fn new(uuid: impl Into<String>, advice: impl Into<String>) -> Self {
    Self {
      recommendation: AdviceTarget { uuid: Some(uuid.into()) },
      advice: Some(advice.into()),
    }
  }

  /// Lenient decode of a single entry; anything off-shape is dropped
  pub fn from_value(value: Value) -> Option<Self> {
    match serde_json::from_value::<AdviceEntry>(value) {
      Ok(entry) if entry.recommendation.uuid.is_some() && entry.advice.is_some() => Some(entry),
      Ok(_) | Err(_) => None,
    }
  }

  fn uuid(&self) -> Option<&str> {
    self.recommendation.uuid.as_deref()
  }
}

/// Decode the response array, skipping entries without a uuid and advice
pub fn decode_entries(values: Vec<Value>) -> Vec<AdviceEntry> {
  let total = values.len();
  let entries: Vec<AdviceEntry> = values.into_iter().filter_map(AdviceEntry::from_value).collect();
  if entries.len() < total {
    tracing::debug!(skipped = total - entries.len(), "ignored malformed advice entries");
  }
  entries
}

/// Copy advice onto every stored record whose uuid matches an entry.
/// Only `advice` is touched; the first matching entry wins. Returns how many
/// records were updated.
pub fn merge_advice(store: &mut Store, entries: &[AdviceEntry]) -> usize {
  let mut merged = 0;

  for entry in store.entries_mut() {
    let Some(uuid) = entry.recommendation.uuid.as_deref() else {
      continue;
    };

    if let Some(advice) = entries.iter().find(|e| e.uuid() == Some(uuid)).and_then(|e| e.advice.clone())
    {
      entry.recommendation.advice = Some(advice);
      merged += 1;
    }
  }

  merged
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn store_with(values: Vec<Value>) -> Store {
    let mut store = Store::new();
    store.replace(values.into_iter().map(|v| Recommendation::try_from(v).unwrap()).collect());
    store
  }

  #[test]
  fn test_merge_updates_only_matching_records() {
    let mut store = store_with(vec![
      json!({ "uuid": "a", "category": "Cost", "advice": "old" }),
      json!({ "uuid": "b", "category": "Cost", "advice": "keep me" }),
      json!({ "category": "No uuid" }),
    ]);
    let before = store.entries()[1].recommendation.clone();

    let merged = merge_advice(&mut store, &[AdviceEntry::new("a", "new advice")]);

    assert_eq!(merged, 1);
    assert_eq!(store.entries()[0].recommendation.advice.as_deref(), Some("new advice"));
    assert_eq!(store.entries()[0].recommendation.category.as_deref(), Some("Cost"));
    assert_eq!(store.entries()[1].recommendation, before);
    assert_eq!(store.entries()[2].recommendation.advice, None);
  }

  #[test]
  fn test_first_matching_entry_wins() {
    let mut store = store_with(vec![json!({ "uuid": "a" })]);
    merge_advice(&mut store, &[AdviceEntry::new("a", "first"), AdviceEntry::new("a", "second")]);
    assert_eq!(store.entries()[0].recommendation.advice.as_deref(), Some("first"));
  }

  #[test]
  fn test_decode_skips_malformed_entries() {
    let entries = decode_entries(vec![
      json!({ "recommendation": { "uuid": "a" }, "advice": "ok" }),
      json!({ "advice": "no target" }),
      json!({ "recommendation": "not an object", "advice": "bad" }),
      json!(42),
    ]);

    assert_eq!(entries, vec![AdviceEntry::new("a", "ok")]);
  }

  #[test]
  fn test_request_body_shape() {
    let recs = vec![Recommendation::try_from(json!({ "source": "SQL DB", "uuid": "u1" })).unwrap()];
    let body = serde_json::to_value(AnalysisRequest { recommendations: &recs }).unwrap();

    assert_eq!(body["recommendations"][0]["uuid"], "u1");
    assert_eq!(body["recommendations"][0]["source"], "SQL DB");
  }
}
