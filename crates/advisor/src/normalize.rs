//! Canonical display shape for recommendations.
//!
//! Each source names things differently; `normalize` maps them onto one set
//! of fields so listing code never has to branch on the source.

use serde::Serialize;

use crate::model::{Recommendation, SourceDetails};

pub const UNNAMED: &str = "Unnamed Recommendation";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Normalized {
  pub recommendation_name: String,
  pub impact: Option<String>,
  pub problem: Option<String>,
  pub solution: Option<String>,
  pub generated_date: Option<String>,
  pub fit_score: Option<String>,
  #[serde(rename = "savingsAmount")]
  pub savings_amount: Option<String>,
  pub resource_id: Option<String>,
  pub subscription_id: Option<String>,
}

pub fn normalize(rec: &Recommendation) -> Normalized {
  let mut normalized = match &rec.details {
    SourceDetails::AzureApi(azure) => {
      let desc = azure.short_description.as_ref();
      Normalized {
        recommendation_name: desc
          .and_then(|d| d.problem.clone())
          .unwrap_or_else(|| UNNAMED.to_string()),
        problem: desc.and_then(|d| d.problem.clone()),
        solution: desc.and_then(|d| d.solution.clone()),
        generated_date: azure.last_updated.clone(),
        fit_score: None,
        savings_amount: azure
          .property("savingsAmount")
          .or_else(|| azure.property("annualSavingsAmount")),
        resource_id: azure
          .resource_id
          .clone()
          .or_else(|| azure.property("ResourceId"))
          .or_else(|| azure.property("resourceId")),
        subscription_id: azure.property("subid").or_else(|| rec.subscription_id.clone()),
        impact: None,
      }
    }
    SourceDetails::LogAnalytics(la) => Normalized {
      recommendation_name: la.recommendation_name.clone().unwrap_or_else(|| UNNAMED.to_string()),
      problem: la.problem.clone(),
      solution: la.solution.clone(),
      generated_date: la.time_generated.clone(),
      fit_score: la.fit_score.clone(),
      savings_amount: la.savings_amount.clone(),
      resource_id: la.resource_id.clone(),
      subscription_id: la.subscription_id.clone().or_else(|| rec.subscription_id.clone()),
      impact: None,
    },
    SourceDetails::SqlDb(sql) => Normalized {
      recommendation_name: sql.recommendation_name.clone().unwrap_or_else(|| UNNAMED.to_string()),
      problem: rec.problem(),
      solution: sql.solution.clone(),
      generated_date: sql.generated_date.clone(),
      fit_score: sql.fit_score.clone(),
      savings_amount: sql.savings_amount.clone(),
      resource_id: sql.resource_id.clone(),
      subscription_id: rec.subscription_id.clone().or_else(|| sql.subscription_guid.clone()),
      impact: None,
    },
    SourceDetails::Unrecognized { .. } => Normalized {
      recommendation_name: rec
        .extra_text("recommendation_name")
        .unwrap_or_else(|| UNNAMED.to_string()),
      problem: rec.problem(),
      solution: rec.extra_text("solution"),
      generated_date: rec.extra_text("generated_date"),
      fit_score: rec.extra_text("fit_score"),
      savings_amount: rec.extra_text("savingsAmount"),
      resource_id: rec.extra_text("resource_id"),
      subscription_id: rec.subscription_id.clone(),
      impact: None,
    },
  };

  normalized.impact = rec.impact.clone();
  normalized
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn rec(value: serde_json::Value) -> Recommendation {
    Recommendation::try_from(value).unwrap()
  }

  #[test]
  fn test_azure_without_description_gets_fallback_name() {
    let normalized =
      normalize(&rec(json!({ "source": "Azure API", "subscription_id": "s1", "category": "Cost" })));

    assert_eq!(normalized.recommendation_name, UNNAMED);
    assert_eq!(normalized.subscription_id.as_deref(), Some("s1"));
    assert_eq!(normalized.problem, None);
  }

  #[test]
  fn test_azure_mapping() {
    let normalized = normalize(&rec(json!({
      "source": "Azure API",
      "impact": "Medium",
      "subscription_id": "outer",
      "last_updated": "2024-05-01",
      "short_description": { "problem": "Right-size VM", "solution": "Use B2s" },
      "extended_properties": {
        "subid": "inner",
        "annualSavingsAmount": "1200",
        "ResourceId": "/subscriptions/inner/vm1"
      }
    })));

    assert_eq!(normalized.recommendation_name, "Right-size VM");
    assert_eq!(normalized.impact.as_deref(), Some("Medium"));
    assert_eq!(normalized.solution.as_deref(), Some("Use B2s"));
    assert_eq!(normalized.generated_date.as_deref(), Some("2024-05-01"));
    assert_eq!(normalized.savings_amount.as_deref(), Some("1200"));
    assert_eq!(normalized.resource_id.as_deref(), Some("/subscriptions/inner/vm1"));
    assert_eq!(normalized.subscription_id.as_deref(), Some("inner"));
  }

  #[test]
  fn test_log_analytics_mapping() {
    let normalized = normalize(&rec(json!({
      "source": "Log Analytics",
      "RecommendationName": "Delete unattached disk",
      "Problem": "Disk has no owner",
      "TimeGenerated": "2024-06-02T10:00:00Z",
      "FitScore": 5,
      "SavingsAmount": 30,
      "ResourceId": "/disks/d1",
      "subscription_id": "s9"
    })));

    assert_eq!(normalized.recommendation_name, "Delete unattached disk");
    assert_eq!(normalized.problem.as_deref(), Some("Disk has no owner"));
    assert_eq!(normalized.generated_date.as_deref(), Some("2024-06-02T10:00:00Z"));
    assert_eq!(normalized.fit_score.as_deref(), Some("5"));
    assert_eq!(normalized.savings_amount.as_deref(), Some("30"));
    assert_eq!(normalized.subscription_id.as_deref(), Some("s9"));
  }

  #[test]
  fn test_sql_db_falls_back_to_subscription_guid() {
    let normalized =
      normalize(&rec(json!({ "source": "SQL DB", "SubscriptionGuid": "g1", "fit_score": "3" })));

    assert_eq!(normalized.subscription_id.as_deref(), Some("g1"));
    assert_eq!(normalized.fit_score.as_deref(), Some("3"));
  }

  #[test]
  fn test_unrecognized_reads_canonical_keys() {
    let normalized = normalize(&rec(json!({
      "source": "Something Else",
      "recommendation_name": "Already canonical",
      "resource_id": "r1",
      "savingsAmount": "10"
    })));

    assert_eq!(normalized.recommendation_name, "Already canonical");
    assert_eq!(normalized.resource_id.as_deref(), Some("r1"));
    assert_eq!(normalized.savings_amount.as_deref(), Some("10"));
  }

  #[test]
  fn test_serializes_savings_amount_in_wire_case() {
    let value = serde_json::to_value(Normalized::default()).unwrap();
    assert!(value.get("savingsAmount").is_some());
  }
}
