//! Source filter and free-text search over the store

use std::borrow::Cow;

use crate::model::{scalar_text, Recommendation, SourceDetails};
use crate::store::Entry;

/// The two filter inputs. Empty strings disable the corresponding predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
  pub source: String,
  pub query: String,
}

impl Filter {
  pub fn new(source: impl Into<String>, query: impl Into<String>) -> Self {
    Self { source: source.into(), query: query.into() }
  }

  pub fn matches(&self, rec: &Recommendation) -> bool {
    self.matches_source(rec) && self.matches_query(rec)
  }

  fn matches_source(&self, rec: &Recommendation) -> bool {
    self.source.is_empty() || rec.source_label() == Some(self.source.as_str())
  }

  fn matches_query(&self, rec: &Recommendation) -> bool {
    if self.query.is_empty() {
      return true;
    }

    let needle = self.query.to_lowercase();
    search_fields(rec).iter().any(|field| field.to_lowercase().contains(&needle))
  }

  /// Matching entries in store order
  pub fn apply<'a>(&self, entries: &'a [Entry]) -> Vec<&'a Entry> {
    entries.iter().filter(|entry| self.matches(&entry.recommendation)).collect()
  }
}

/// Every text a search query is tested against for this record
pub fn search_fields(rec: &Recommendation) -> Vec<Cow<'_, str>> {
  let mut fields: Vec<Cow<'_, str>> = [&rec.category, &rec.impact, &rec.advice]
    .into_iter()
    .filter_map(|v| v.as_deref())
    .map(Cow::Borrowed)
    .collect();

  if let Some(problem) = rec.problem() {
    fields.push(Cow::Owned(problem));
  }

  match &rec.details {
    SourceDetails::AzureApi(azure) => {
      fields.extend(azure.extended_properties.values().filter_map(scalar_text).map(Cow::Owned));
    }
    SourceDetails::LogAnalytics(la) => {
      fields.extend(
        [
          &la.recommendation_name,
          &la.solution,
          &la.resource_id,
          &la.resource_group,
          &la.resource_type,
          &la.subscription_id,
          &la.time_generated,
        ]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .map(Cow::Borrowed),
      );
    }
    SourceDetails::SqlDb(sql) => {
      fields.extend(
        [&sql.instance, &sql.recommendation_name, &sql.solution]
          .into_iter()
          .filter_map(|v| v.as_deref())
          .map(Cow::Borrowed),
      );
    }
    SourceDetails::Unrecognized { source } => {
      if let Some(source) = source {
        fields.push(Cow::Borrowed(source.as_str()));
      }
      fields.extend(
        ["recommendation_name", "solution"]
          .into_iter()
          .filter_map(|k| rec.extra_text(k))
          .map(Cow::Owned),
      );
    }
  }

  fields
}
