//! Recommendation records as delivered by the review endpoint.
//!
//! The backend returns heterogeneous JSON objects whose shape depends on the
//! `source` tag. Each record is parsed into a [`Recommendation`] carrying the
//! common fields plus a [`SourceDetails`] variant for the source-specific
//! ones. The original object is kept untouched and is what gets written back
//! out when the record is sent for analysis, so the analysis endpoint sees the
//! full record with only `uuid` and `advice` updated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const AZURE_API: &str = "Azure API";
pub const SQL_DB: &str = "SQL DB";
pub const LOG_ANALYTICS: &str = "Log Analytics";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
  #[error("recommendation must be a JSON object, got {kind}")]
  NotAnObject { kind: &'static str },
}

/// Which backend subsystem produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
  AzureApi,
  SqlDb,
  LogAnalytics,
  Unrecognized,
}

impl Source {
  pub fn from_label(label: &str) -> Self {
    match label {
      AZURE_API => Source::AzureApi,
      SQL_DB => Source::SqlDb,
      LOG_ANALYTICS => Source::LogAnalytics,
      _ => Source::Unrecognized,
    }
  }

  /// Wire label for the known sources
  pub fn label(&self) -> Option<&'static str> {
    match self {
      Source::AzureApi => Some(AZURE_API),
      Source::SqlDb => Some(SQL_DB),
      Source::LogAnalytics => Some(LOG_ANALYTICS),
      Source::Unrecognized => None,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortDescription {
  pub problem: Option<String>,
  pub solution: Option<String>,
}

/// Azure Advisor API record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AzureApiDetails {
  pub short_description: Option<ShortDescription>,
  /// Free-form properties, kept in wire order
  pub extended_properties: Map<String, Value>,
  pub resource_id: Option<String>,
  pub last_updated: Option<String>,
}

impl AzureApiDetails {
  pub fn property(&self, key: &str) -> Option<String> {
    self.extended_properties.get(key).and_then(scalar_text)
  }
}

/// SQL DB right-sizing record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlDbDetails {
  pub instance: Option<String>,
  pub generated_date: Option<String>,
  pub fit_score: Option<String>,
  pub subscription_guid: Option<String>,
  pub recommendation_name: Option<String>,
  pub problem: Option<String>,
  pub solution: Option<String>,
  pub savings_amount: Option<String>,
  pub resource_id: Option<String>,
}

/// Log Analytics query row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogAnalyticsDetails {
  pub recommendation_name: Option<String>,
  pub problem: Option<String>,
  pub solution: Option<String>,
  pub time_generated: Option<String>,
  pub fit_score: Option<String>,
  pub savings_amount: Option<String>,
  pub resource_id: Option<String>,
  pub resource_group: Option<String>,
  pub resource_type: Option<String>,
  pub subscription_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceDetails {
  AzureApi(AzureApiDetails),
  SqlDb(SqlDbDetails),
  LogAnalytics(LogAnalyticsDetails),
  /// Anything else, including a missing `source`. Nothing is extracted; the
  /// record stays exactly as received.
  Unrecognized { source: Option<String> },
}

/// One cost recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Recommendation {
  /// Correlation token for analysis responses, assigned on first send
  pub uuid: Option<String>,
  pub category: Option<String>,
  pub impact: Option<String>,
  pub subscription_id: Option<String>,
  pub advice: Option<String>,
  pub details: SourceDetails,
  /// Keys not consumed by the typed fields
  extra: Map<String, Value>,
  /// The object exactly as received
  raw: Map<String, Value>,
}

impl Recommendation {
  pub fn source(&self) -> Source {
    match &self.details {
      SourceDetails::AzureApi(_) => Source::AzureApi,
      SourceDetails::SqlDb(_) => Source::SqlDb,
      SourceDetails::LogAnalytics(_) => Source::LogAnalytics,
      SourceDetails::Unrecognized { .. } => Source::Unrecognized,
    }
  }

  /// The `source` tag as it appeared on the wire
  pub fn source_label(&self) -> Option<&str> {
    match &self.details {
      SourceDetails::Unrecognized { source } => source.as_deref(),
      _ => self.source().label(),
    }
  }

  /// Problem description, wherever this source keeps it
  pub fn problem(&self) -> Option<String> {
    match &self.details {
      SourceDetails::AzureApi(azure) => {
        azure.short_description.as_ref().and_then(|d| d.problem.clone())
      }
      SourceDetails::SqlDb(sql) => sql.problem.clone().or_else(|| self.nested_problem()),
      SourceDetails::LogAnalytics(la) => la.problem.clone(),
      SourceDetails::Unrecognized { .. } => {
        self.nested_problem().or_else(|| self.extra_text("problem"))
      }
    }
  }

  /// Unmodelled key, rendered as text when it is a scalar
  pub fn extra_text(&self, key: &str) -> Option<String> {
    self.extra.get(key).and_then(scalar_text)
  }

  pub fn extra(&self) -> &Map<String, Value> {
    &self.extra
  }

  fn nested_problem(&self) -> Option<String> {
    self.extra.get("short_description").and_then(|d| d.get("problem")).and_then(scalar_text)
  }
}

impl TryFrom<Value> for Recommendation {
  type Error = RecordError;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    let mut map = match value {
      Value::Object(map) => map,
      other => return Err(RecordError::NotAnObject { kind: json_kind(&other) }),
    };
    let raw = map.clone();

    let source = take_text(&mut map, "source");
    let uuid = take_text(&mut map, "uuid").filter(|u| !u.is_empty());
    let category = take_text(&mut map, "category");
    let impact = take_text(&mut map, "impact");
    let subscription_id = take_text(&mut map, "subscription_id");
    let advice = take_text(&mut map, "advice");

    let details = match source.as_deref().map(Source::from_label) {
      Some(Source::AzureApi) => SourceDetails::AzureApi(take_azure(&mut map)),
      Some(Source::SqlDb) => SourceDetails::SqlDb(take_sql_db(&mut map)),
      Some(Source::LogAnalytics) => SourceDetails::LogAnalytics(take_log_analytics(&mut map)),
      Some(Source::Unrecognized) | None => SourceDetails::Unrecognized { source },
    };

    Ok(Self { uuid, category, impact, subscription_id, advice, details, extra: map, raw })
  }
}

impl From<Recommendation> for Value {
  /// The record as received, with the current `uuid` and `advice` written
  /// over it. The typed fields are a read-only view and are not written back.
  fn from(rec: Recommendation) -> Self {
    let mut map = rec.raw;
    put(&mut map, "uuid", rec.uuid);
    put(&mut map, "advice", rec.advice);
    Value::Object(map)
  }
}

fn take_azure(map: &mut Map<String, Value>) -> AzureApiDetails {
  let short_description = take_object(map, "short_description").map(|mut nested| ShortDescription {
    problem: take_text(&mut nested, "problem"),
    solution: take_text(&mut nested, "solution"),
  });
  let extended_properties = take_object(map, "extended_properties").unwrap_or_default();

  AzureApiDetails {
    short_description,
    extended_properties,
    resource_id: take_text(map, "resource_id"),
    last_updated: take_text(map, "last_updated"),
  }
}

fn take_sql_db(map: &mut Map<String, Value>) -> SqlDbDetails {
  SqlDbDetails {
    instance: take_text(map, "Instance"),
    generated_date: take_text(map, "generated_date"),
    fit_score: take_text(map, "fit_score"),
    subscription_guid: take_text(map, "SubscriptionGuid"),
    recommendation_name: take_text(map, "recommendation_name"),
    problem: take_text(map, "problem"),
    solution: take_text(map, "solution"),
    savings_amount: take_text(map, "savingsAmount"),
    resource_id: take_text(map, "resource_id"),
  }
}

fn take_log_analytics(map: &mut Map<String, Value>) -> LogAnalyticsDetails {
  LogAnalyticsDetails {
    recommendation_name: take_text(map, "RecommendationName"),
    problem: take_text(map, "Problem"),
    solution: take_text(map, "Solution"),
    time_generated: take_text(map, "TimeGenerated"),
    fit_score: take_text(map, "FitScore"),
    savings_amount: take_text(map, "SavingsAmount"),
    resource_id: take_text(map, "ResourceId"),
    resource_group: take_text(map, "ResourceGroup"),
    resource_type: take_text(map, "ResourceType"),
    subscription_id: take_text(map, "SubscriptionId"),
  }
}

/// Remove `key` if it holds a scalar (or null) and return it as text.
/// Arrays and objects are left in place.
fn take_text(map: &mut Map<String, Value>, key: &str) -> Option<String> {
  if matches!(map.get(key)?, Value::Array(_) | Value::Object(_)) {
    return None;
  }
  map.shift_remove(key).as_ref().and_then(scalar_text)
}

/// Remove `key` only if it holds an object
fn take_object(map: &mut Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
  if !matches!(map.get(key)?, Value::Object(_)) {
    return None;
  }
  match map.shift_remove(key)? {
    Value::Object(object) => Some(object),
    _ => None,
  }
}

/// Text form of a scalar JSON value; `None` for null and containers
pub fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Null | Value::Array(_) | Value::Object(_) => None,
  }
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<String>) {
  if let Some(value) = value {
    map.insert(key.to_string(), Value::String(value));
  }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
