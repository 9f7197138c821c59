//! Scoring service client
//!
//! Two request/response contracts: upload a dataset, then fetch the scored
//! records. [`HttpScoringService`] speaks them over blocking HTTP; tests
//! substitute their own [`ScoringService`].

use crate::{ResultRecord, ResultSet};
use anyhow::{bail, Context};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Which request of a cycle failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Fetch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Upload => write!(f, "upload"),
            Stage::Fetch => write!(f, "fetch results"),
        }
    }
}

/// Coarse failure class; both are handled the same way by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    MalformedResponse,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Transport => write!(f, "transport"),
            ErrorCategory::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("cannot read dataset {}: {source}", path.display())]
    Dataset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} request failed: {reason}")]
    Transport { stage: Stage, reason: String },

    #[error("{stage} request returned HTTP {status}: {body}")]
    Status {
        stage: Stage,
        status: u16,
        body: String,
    },

    #[error("{stage} response is malformed: {reason}")]
    Malformed { stage: Stage, reason: String },
}

impl ServiceError {
    pub fn stage(&self) -> Stage {
        match self {
            ServiceError::Dataset { .. } => Stage::Upload,
            ServiceError::Transport { stage, .. }
            | ServiceError::Status { stage, .. }
            | ServiceError::Malformed { stage, .. } => *stage,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::Malformed { .. } => ErrorCategory::MalformedResponse,
            _ => ErrorCategory::Transport,
        }
    }
}

/// Upload acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadAck {
    /// Server-supplied status text, `None` when absent or empty
    pub message: Option<String>,
}

/// The remote scorer
pub trait ScoringService {
    /// Submit the dataset file
    fn upload(&mut self, dataset: &Path) -> Result<UploadAck, ServiceError>;

    /// Fetch the records scored from the most recent upload
    fn fetch_results(&mut self) -> Result<ResultSet, ServiceError>;
}

/// Blocking HTTP client for `{base}/upload` and `{base}/recommendations`
#[derive(Debug, Clone)]
pub struct HttpScoringService {
    client: Client,
    base_url: String,
}

impl HttpScoringService {
    /// Create a client for `base_url`; a trailing `/` is ignored
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let url = reqwest::Url::parse(trimmed)
            .with_context(|| format!("Invalid service address: {}", base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("Unsupported scheme in service address: {}", base_url);
        }

        // No request timeout: a hung service leaves the cycle waiting
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl ScoringService for HttpScoringService {
    fn upload(&mut self, dataset: &Path) -> Result<UploadAck, ServiceError> {
        let bytes = std::fs::read(dataset).map_err(|source| ServiceError::Dataset {
            path: dataset.to_path_buf(),
            source,
        })?;
        let file_name = dataset
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset.csv".to_string());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let url = self.endpoint("upload");
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| ServiceError::Transport {
                stage: Stage::Upload,
                reason: e.to_string(),
            })?;

        let body = read_body(Stage::Upload, response)?;
        parse_upload_ack(&body)
    }

    fn fetch_results(&mut self) -> Result<ResultSet, ServiceError> {
        let url = self.endpoint("recommendations");
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ServiceError::Transport {
                stage: Stage::Fetch,
                reason: e.to_string(),
            })?;

        let body = read_body(Stage::Fetch, response)?;
        parse_results(&body)
    }
}

/// Read the body of a response, rejecting non-success statuses
fn read_body(stage: Stage, response: Response) -> Result<String, ServiceError> {
    let status = response.status();
    let body = response.text().map_err(|e| ServiceError::Transport {
        stage,
        reason: e.to_string(),
    })?;

    if !status.is_success() {
        return Err(ServiceError::Status {
            stage,
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Decode the upload acknowledgement. Any JSON value is accepted; only a
/// non-empty string `message` is kept.
pub fn parse_upload_ack(body: &str) -> Result<UploadAck, ServiceError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ServiceError::Malformed {
            stage: Stage::Upload,
            reason: e.to_string(),
        })?;

    let message = value
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    Ok(UploadAck { message })
}

#[derive(Deserialize)]
struct WireResults {
    recommendations: Vec<WireRecord>,
}

#[derive(Deserialize)]
struct WireRecord {
    #[serde(rename = "Ten_doanh_nghiep")]
    name: String,
    #[serde(rename = "Z_score")]
    score: f64,
    #[serde(rename = "Danh_gia_rui_ro")]
    risk_label: String,
    #[serde(rename = "Khuyen_nghi_vay")]
    recommendation: String,
}

/// Decode the results body into a ResultSet, keeping server order
pub fn parse_results(body: &str) -> Result<ResultSet, ServiceError> {
    let wire: WireResults = serde_json::from_str(body).map_err(|e| ServiceError::Malformed {
        stage: Stage::Fetch,
        reason: e.to_string(),
    })?;

    let records = wire
        .recommendations
        .into_iter()
        .map(|r| ResultRecord::new(r.name, r.score, r.risk_label, r.recommendation))
        .collect::<Vec<_>>();

    Ok(ResultSet::new(records))
}
