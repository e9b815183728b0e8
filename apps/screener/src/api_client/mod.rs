/// API Client — the single point of entry for calls to the resume analysis service.
///
/// The dashboard and upload flows only see it through the [`CandidateSource`]
/// and [`ResumeUploader`] traits, so either can be swapped for a fake.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::ClientError;
use crate::models::{CandidateId, CandidateRecord, ResumeFile, UploadResponse};

/// Supplies the candidate list the dashboard aggregates.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, ClientError>;
}

/// Submits one resume (plus optional job description) for analysis.
#[async_trait]
pub trait ResumeUploader: Send + Sync {
    async fn upload(
        &self,
        file: &ResumeFile,
        job_description: Option<&str>,
    ) -> Result<UploadResponse, ClientError>;
}

#[derive(Debug, Deserialize)]
struct CandidatesEnvelope {
    #[serde(default)]
    candidates: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct CandidateEnvelope {
    candidate: CandidateRecord,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    error: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// HTTP client for the analysis service.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        upload_timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(request_timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.api_url.clone(),
            config.request_timeout,
            config.upload_timeout,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /api/candidates
    pub async fn list_candidates(&self) -> Result<Vec<CandidateRecord>, ClientError> {
        let response = self.client.get(self.url("/api/candidates")).send().await?;
        let body = check_status(response).await?.bytes().await?;
        let envelope: CandidatesEnvelope = serde_json::from_slice(&body)?;
        let candidates: Vec<CandidateRecord> = envelope
            .candidates
            .unwrap_or_default()
            .into_iter()
            .map(CandidateRecord::from_json)
            .collect();
        debug!("Fetched {} candidates", candidates.len());
        Ok(candidates)
    }

    /// GET /api/candidates/:id
    pub async fn get_candidate(&self, id: &CandidateId) -> Result<CandidateRecord, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/api/candidates/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("Candidate {id}")));
        }
        let body = check_status(response).await?.bytes().await?;
        let envelope: CandidateEnvelope = serde_json::from_slice(&body)?;
        Ok(envelope.candidate)
    }

    /// POST /api/upload (multipart). A blank job description is not sent.
    pub async fn upload_resume(
        &self,
        file: &ResumeFile,
        job_description: Option<&str>,
    ) -> Result<UploadResponse, ClientError> {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(file.mime_type())?;
        let mut form = multipart::Form::new().part("file", part);
        if let Some(jd) = job_description.map(str::trim).filter(|jd| !jd.is_empty()) {
            form = form.text("job_description", jd.to_string());
        }

        debug!(
            "Uploading '{}' ({} bytes, job description: {})",
            file.file_name,
            file.bytes.len(),
            job_description.is_some()
        );

        let response = self
            .client
            .post(self.url("/api/upload"))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await?;
        let body = check_status(response).await?.bytes().await?;
        let upload = UploadResponse::from_body(&body);
        if upload.candidate_id.is_none() {
            warn!("Upload succeeded but the response carried no candidate id");
        }
        Ok(upload)
    }

    /// GET /api/health
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.client.get(self.url("/api/health")).send().await?;
        let body = check_status(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Turns a non-2xx response into `ClientError::Api`, preferring the
/// service's `{"error": "..."}` message over the raw body.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("Analysis service returned {}: {}", status, body);
    let message = serde_json::from_str::<ServiceError>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CandidateSource for ApiClient {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, ClientError> {
        self.list_candidates().await
    }
}

#[async_trait]
impl ResumeUploader for ApiClient {
    async fn upload(
        &self,
        file: &ResumeFile,
        job_description: Option<&str>,
    ) -> Result<UploadResponse, ClientError> {
        self.upload_resume(file, job_description).await
    }
}
