use serde::{Deserialize, Serialize};

use crate::types::job::{null_as_default, JobCandidate, JobId};

// ===== Matching engine payloads =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchJobsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub matched_jobs: Vec<JobCandidate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resume_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_jobs_analyzed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords_used: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_more_jobs: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoreJobsRequest {
    pub keywords: String,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoreJobsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<JobCandidate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_more: bool,
}

/// Extended description bundle returned by `GET /job-details/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub detailed_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_info: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employment_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience_level: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub posted_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub application_deadline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub benefits: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills_required: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
}

// ===== Persistence service payloads =====

/// Body of `POST /api/jobs/save`. The service reads the matching engine's
/// snake_case keys and takes the external id as a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveJobRequest<'a> {
    pub id: String,
    pub title: &'a str,
    pub company: &'a str,
    pub location: &'a str,
    pub description: &'a str,
    pub requirements: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl<'a> From<&'a JobCandidate> for SaveJobRequest<'a> {
    fn from(job: &'a JobCandidate) -> Self {
        Self {
            id: job.id.to_string(),
            title: &job.title,
            company: &job.company,
            location: &job.location,
            description: &job.description,
            requirements: &job.requirements,
            source: job.source.as_deref(),
            job_url: job.job_url.as_deref(),
            apply_url: job.apply_url.as_deref(),
            similarity_score: job.raw_score,
        }
    }
}

/// `{ message }` / `{ error }` acknowledgment bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreMessage {
    pub message: Option<String>,
    pub error: Option<String>,
    #[serde(rename = "jobId")]
    pub job_id: Option<JobId>,
}

impl StoreMessage {
    pub fn reports_already_saved(&self) -> bool {
        self.message
            .iter()
            .chain(self.error.iter())
            .any(|text| mentions_already_saved(text))
    }
}

pub(crate) fn mentions_already_saved(text: &str) -> bool {
    text.to_lowercase().contains("already saved")
}
