// src/types/job.rs
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::scoring::{MatchScore, ScoreBand};

/// Job identifier as the producer sent it. Numbers and strings are kept
/// apart so the value goes back out in its original JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(i64),
    Text(String),
}

impl JobId {
    /// Parse user input: digits become a numeric id, anything else text.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => JobId::Number(n),
            Err(_) => JobId::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Number(n) => write!(f, "{}", n),
            JobId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for JobId {
    fn from(value: i64) -> Self {
        JobId::Number(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        JobId::Text(value.to_string())
    }
}

/// A job posting annotated with its relevance score and session-local state.
///
/// Accepts both the matching engine's snake_case payloads and the
/// persistence service's camelCase ones. Serializes camelCase; the save
/// call sends [`crate::types::SaveJobRequest`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCandidate {
    pub id: JobId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requirements: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, alias = "job_url", skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(default, alias = "apply_url", skip_serializing_if = "Option::is_none")]
    pub apply_url: Option<String>,
    #[serde(
        default,
        rename = "similarityScore",
        alias = "similarity_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub saved: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub applied: bool,
    #[serde(
        default,
        alias = "applied_date",
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "saved_date",
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_date: Option<DateTime<Utc>>,
    /// Canonical score, attached by [`crate::scoring::ingest`].
    #[serde(skip)]
    pub score: Option<MatchScore>,
}

impl JobCandidate {
    pub fn new(id: impl Into<JobId>, title: &str, company: &str) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            company: company.to_string(),
            location: String::new(),
            description: String::new(),
            requirements: String::new(),
            source: None,
            job_url: None,
            apply_url: None,
            raw_score: None,
            saved: false,
            applied: false,
            applied_date: None,
            saved_date: None,
            score: None,
        }
    }

    /// Link to open for "apply": a distinct apply URL wins, then the posting
    /// URL. `None` means no external application link exists.
    pub fn application_link(&self) -> Option<&str> {
        let job_url = self.job_url.as_deref().filter(|url| !url.trim().is_empty());
        let apply_url = self.apply_url.as_deref().filter(|url| !url.trim().is_empty());

        match (apply_url, job_url) {
            (Some(apply), Some(job)) if apply != job => Some(apply),
            (Some(apply), None) => Some(apply),
            (_, job) => job,
        }
    }

    pub fn classification(&self) -> Option<ScoreBand> {
        self.score.map(|score| score.band())
    }

    pub(crate) fn record_applied(&mut self, at: DateTime<Utc>) {
        self.applied = true;
        self.applied_date = Some(at);
    }
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_timestamp(text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", text))),
    }
}

/// RFC 3339, or a zone-less local timestamp read as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_engine_payload_snake_case() {
        let job: JobCandidate = serde_json::from_value(json!({
            "id": "bdjobs_7",
            "title": "Backend Engineer",
            "company": "Acme",
            "location": "Dhaka",
            "description": "Build services",
            "requirements": "Rust",
            "source": "BDJobs",
            "job_url": "https://jobs.example/7",
            "apply_url": "https://jobs.example/7/apply",
            "similarity_score": 82.5
        }))
        .unwrap();

        assert_eq!(job.id, JobId::Text("bdjobs_7".to_string()));
        assert_eq!(job.raw_score, Some(82.5));
        assert_eq!(job.apply_url.as_deref(), Some("https://jobs.example/7/apply"));
        assert!(!job.saved);
        assert!(job.score.is_none());
    }

    #[test]
    fn test_store_payload_camel_case_with_nulls() {
        let job: JobCandidate = serde_json::from_value(json!({
            "id": 12,
            "title": "Data Analyst",
            "company": null,
            "jobUrl": "https://jobs.example/12",
            "similarityScore": 64.0,
            "applied": true,
            "appliedDate": "2024-05-02T09:30:00",
            "savedDate": "2024-05-01T08:00:00.123",
            "keywords": "sql python"
        }))
        .unwrap();

        assert_eq!(job.id, JobId::Number(12));
        assert_eq!(job.company, "");
        assert!(job.applied);
        assert_eq!(
            job.applied_date.unwrap().to_rfc3339(),
            "2024-05-02T09:30:00+00:00"
        );
        assert!(job.saved_date.is_some());
    }

    #[test]
    fn test_serializes_camel_case_and_keeps_id_form() {
        let mut job = JobCandidate::new(5, "Engineer", "Acme");
        job.job_url = Some("https://jobs.example/5".to_string());
        job.raw_score = Some(71.0);

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["id"], json!(5));
        assert_eq!(value["jobUrl"], json!("https://jobs.example/5"));
        assert_eq!(value["similarityScore"], json!(71.0));
        assert!(value.get("applyUrl").is_none());
        assert!(value.get("score").is_none());
    }

    #[test]
    fn test_application_link_prefers_distinct_apply_url() {
        let mut job = JobCandidate::new(1, "Engineer", "Acme");
        assert_eq!(job.application_link(), None);

        job.job_url = Some("https://jobs.example/1".to_string());
        assert_eq!(job.application_link(), Some("https://jobs.example/1"));

        job.apply_url = Some("https://jobs.example/1".to_string());
        assert_eq!(job.application_link(), Some("https://jobs.example/1"));

        job.apply_url = Some("https://apply.example/1".to_string());
        assert_eq!(job.application_link(), Some("https://apply.example/1"));

        job.job_url = None;
        assert_eq!(job.application_link(), Some("https://apply.example/1"));
    }

    #[test]
    fn test_job_id_parse() {
        assert_eq!(JobId::parse("42"), JobId::Number(42));
        assert_eq!(JobId::parse(" linkedin_2 "), JobId::Text("linkedin_2".to_string()));
        assert_eq!(JobId::parse("42").to_string(), "42");
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let result: Result<JobCandidate, _> = serde_json::from_value(json!({
            "id": 1,
            "appliedDate": "yesterday"
        }));
        assert!(result.is_err());
    }
}
