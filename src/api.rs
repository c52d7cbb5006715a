use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::ApiError;
use crate::report::types::{AnalysisReport, AnalysisSummary};

pub type SiteId = i64;
pub type AnalysisId = i64;

/// Client for the audit producer's REST surface. Constructed from a base
/// URL and passed explicitly to whoever needs it; there is no ambient
/// global client.
pub struct AnalysisApi {
    client: reqwest::Client,
    base_url: Url,
}

impl AnalysisApi {
    pub fn new(base_url: Url) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .expect("failed to build reqwest client");
        Self::with_client(base_url, client)
    }

    /// Use a pre-built client (shared pool, custom timeouts).
    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Ask the producer to start an analysis run for `site_id`.
    pub async fn trigger_run(&self, site_id: SiteId) -> Result<TriggerReceipt, ApiError> {
        let url = self.url(&format!("/api/v1/analysis/{}", site_id));
        let resp = self.client.post(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(server_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    /// Fetch the current progress record. 404 means the producer has not
    /// created one yet, which is distinct from a hard error.
    pub async fn fetch_progress(&self, site_id: SiteId) -> Result<JobProgress, ApiError> {
        let url = self.url(&format!("/api/v1/analysis/{}/progress", site_id));
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(ApiError::NotFound);
        }
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(server_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    /// Fetch the most recent full report. 404 means no report exists yet.
    pub async fn fetch_latest_report(&self, site_id: SiteId) -> Result<AnalysisReport, ApiError> {
        let url = self.url(&format!("/api/v1/analysis/{}/latest", site_id));
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(ApiError::NotFound);
        }
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(server_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    /// Fetch past analysis summaries, most recent first.
    pub async fn fetch_history(
        &self,
        site_id: SiteId,
        limit: u32,
    ) -> Result<Vec<AnalysisSummary>, ApiError> {
        let url = self.url(&format!("/api/v1/analysis/{}/history?limit={}", site_id, limit));
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(server_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

/// Mine a human-readable reason out of an error body. FastAPI-style
/// backends use `detail`; fall back to other common keys, then to the
/// raw body.
fn server_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("detail")
                .or_else(|| v.get("error"))
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str().map(|s| s.to_string()))
        })
        .unwrap_or_else(|| body.trim().to_string());
    ApiError::Server { status, message }
}

/// Producer acknowledgement for a trigger call.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub analysis_id: Option<AnalysisId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// One observation of the producer's progress record. Only `status` is
/// required; a body without it is malformed and the poll is retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    pub status: JobStatus,
    #[serde(default)]
    pub progress_percentage: u8,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub steps_completed: Option<Vec<String>>,
    #[serde(default)]
    pub total_steps: Option<u32>,
    #[serde(default)]
    pub analysis_id: Option<AnalysisId>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
