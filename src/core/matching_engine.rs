// src/core/matching_engine.rs
//! Client for the resume matching engine.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::info;

use crate::core::config_manager::EngineConfig;
use crate::core::service_client::{segment_path, ServiceClient};
use crate::document::ResumeDocument;
use crate::error::{ClientError, ClientResult};
use crate::scoring::ScoreScale;
use crate::types::{JobDetails, JobId, MatchJobsResponse, MoreJobsRequest, MoreJobsResponse};

const MATCH_JOBS_ENDPOINT: &str = "/match-jobs";
const MORE_JOBS_ENDPOINT: &str = "/more-jobs";
const JOB_DETAILS_ENDPOINT: &str = "/job-details";

/// Multipart field the engine reads the resume from.
const RESUME_FIELD: &str = "resume";

#[async_trait]
pub trait MatchingEngine: Send + Sync {
    async fn match_jobs(&self, document: &ResumeDocument) -> ClientResult<MatchJobsResponse>;

    async fn more_jobs(&self, request: &MoreJobsRequest) -> ClientResult<MoreJobsResponse>;

    async fn job_details(&self, id: &JobId) -> ClientResult<JobDetails>;

    /// Scale of `similarity_score` in this engine's payloads.
    fn score_scale(&self) -> ScoreScale {
        ScoreScale::Percent
    }
}

pub struct HttpMatchingEngine {
    http: ServiceClient,
    score_scale: ScoreScale,
}

impl HttpMatchingEngine {
    pub fn new(config: &EngineConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: ServiceClient::new("matching engine", &config.base_url, config.timeout_seconds)?,
            score_scale: config.score_scale,
        })
    }
}

#[async_trait]
impl MatchingEngine for HttpMatchingEngine {
    async fn match_jobs(&self, document: &ResumeDocument) -> ClientResult<MatchJobsResponse> {
        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(&document.content_type)
            .map_err(|e| ClientError::validation(format!("Invalid document type: {}", e)))?;
        let form = Form::new().part(RESUME_FIELD, part);

        info!(
            file = %document.file_name,
            size_mb = %format!("{:.2}", document.size_mb()),
            "Sending resume to matching engine: {}",
            self.http.url(MATCH_JOBS_ENDPOINT)
        );

        let response: MatchJobsResponse = self
            .http
            .send_json(self.http.post(MATCH_JOBS_ENDPOINT).multipart(form), MATCH_JOBS_ENDPOINT)
            .await?;

        info!(
            matched = response.matched_jobs.len(),
            analyzed = response.total_jobs_analyzed,
            has_more = response.has_more_jobs,
            "Matching engine responded"
        );
        Ok(response)
    }

    async fn more_jobs(&self, request: &MoreJobsRequest) -> ClientResult<MoreJobsResponse> {
        info!(page = request.page, per_page = request.per_page, "Requesting more jobs");
        self.http
            .send_json(self.http.post(MORE_JOBS_ENDPOINT).json(request), MORE_JOBS_ENDPOINT)
            .await
    }

    async fn job_details(&self, id: &JobId) -> ClientResult<JobDetails> {
        let path = segment_path(JOB_DETAILS_ENDPOINT, &[id.to_string().as_str()])?;
        self.http.send_json(self.http.get(&path), &path).await
    }

    fn score_scale(&self) -> ScoreScale {
        self.score_scale
    }
}
