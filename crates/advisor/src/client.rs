//! HTTP client for the recommendations backend
//!
//! Two endpoints: the review list and the AI analysis call. The dashboard
//! only talks to [`RecommendationApi`], so tests can swap in a fake.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::advice::{decode_entries, AdviceEntry, AnalysisRequest};
use crate::model::Recommendation;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const REVIEW_PATH: &str = "api/review-recommendations";
pub const ANALYZE_PATH: &str = "api/analyze-recommendations";

#[derive(Error, Debug)]
pub enum ClientError {
  #[error("invalid base URL '{url}': {source}")]
  InvalidUrl { url: String, source: url::ParseError },

  #[error("failed to build HTTP client: {0}")]
  Build(reqwest::Error),

  #[error("request to {url} failed: {source}")]
  Transport { url: String, source: reqwest::Error },

  #[error("{url} returned HTTP {status}: {body}")]
  Status { url: String, status: u16, body: String },

  #[error("could not decode response from {url}: {source}")]
  Decode { url: String, source: serde_json::Error },
}

/// Configuration for the recommendations HTTP client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
  /// Backend root, e.g. "http://localhost:5000"
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Per-request timeout; unset means wait indefinitely
  #[serde(default)]
  pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self { base_url: default_base_url(), timeout_secs: None }
  }
}

#[async_trait]
pub trait RecommendationApi {
  /// `GET /api/review-recommendations`
  async fn fetch_recommendations(&self) -> Result<Vec<Recommendation>, ClientError>;

  /// `POST /api/analyze-recommendations`
  async fn analyze(&self, recommendations: &[Recommendation])
    -> Result<Vec<AdviceEntry>, ClientError>;
}

pub struct HttpClient {
  client: Client,
  review_url: Url,
  analyze_url: Url,
}

impl HttpClient {
  pub fn with_config(config: &ClientConfig) -> Result<Self, ClientError> {
    let base = base_url(&config.base_url)?;
    let join = |path: &str| {
      base.join(path).map_err(|source| ClientError::InvalidUrl { url: config.base_url.clone(), source })
    };
    let review_url = join(REVIEW_PATH)?;
    let analyze_url = join(ANALYZE_PATH)?;

    let mut builder = Client::builder();
    // zero means no timeout
    if let Some(secs) = config.timeout_secs.filter(|secs| *secs > 0) {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build().map_err(ClientError::Build)?;

    Ok(Self { client, review_url, analyze_url })
  }

  pub fn review_url(&self) -> &Url {
    &self.review_url
  }

  pub fn analyze_url(&self) -> &Url {
    &self.analyze_url
  }

  async fn read_json<T: serde::de::DeserializeOwned>(
    url: &Url,
    response: reqwest::Response,
  ) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response
      .bytes()
      .await
      .map_err(|source| ClientError::Transport { url: url.to_string(), source })?;

    if !status.is_success() {
      return Err(ClientError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
      });
    }

    serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode { url: url.to_string(), source })
  }
}

#[async_trait]
impl RecommendationApi for HttpClient {
  async fn fetch_recommendations(&self) -> Result<Vec<Recommendation>, ClientError> {
    tracing::debug!(url = %self.review_url, "fetching recommendations");
    let response = self
      .client
      .get(self.review_url.clone())
      .send()
      .await
      .map_err(|source| ClientError::Transport { url: self.review_url.to_string(), source })?;

    Self::read_json(&self.review_url, response).await
  }

  async fn analyze(
    &self,
    recommendations: &[Recommendation],
  ) -> Result<Vec<AdviceEntry>, ClientError> {
    tracing::debug!(url = %self.analyze_url, count = recommendations.len(), "requesting advice");
    let response = self
      .client
      .post(self.analyze_url.clone())
      .json(&AnalysisRequest { recommendations })
      .send()
      .await
      .map_err(|source| ClientError::Transport { url: self.analyze_url.to_string(), source })?;

    let values: Vec<Value> = Self::read_json(&self.analyze_url, response).await?;
    Ok(decode_entries(values))
  }
}

/// Parse the base URL, making sure it ends in `/` so endpoint paths append
/// rather than replace the last segment.
fn base_url(raw: &str) -> Result<Url, ClientError> {
  let with_slash = if raw.ends_with('/') { raw.to_string() } else { format!("{raw}/") };
  Url::parse(&with_slash).map_err(|source| ClientError::InvalidUrl { url: raw.to_string(), source })
}
