// src/job_details.rs
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::core::deadline;
use crate::core::{JobStore, MatchingEngine};
use crate::error::ClientResult;
use crate::notice::Notices;
use crate::scoring;
use crate::types::{JobCandidate, JobDetails, JobId};

/// On-demand lookups. Nothing is cached and no list is touched.
pub struct JobDetailFetcher {
    engine: Arc<dyn MatchingEngine>,
    store: Arc<dyn JobStore>,
    notices: Notices,
    operation_timeout: Duration,
}

impl JobDetailFetcher {
    pub fn new(
        engine: Arc<dyn MatchingEngine>,
        store: Arc<dyn JobStore>,
        notices: Notices,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            store,
            notices,
            operation_timeout,
        }
    }

    /// Extended description bundle from the matching engine.
    pub async fn fetch_details(&self, id: &JobId) -> ClientResult<JobDetails> {
        debug!(job_id = %id, "Fetching job details");
        let result = deadline::within(
            self.operation_timeout,
            "matching engine",
            "job details",
            self.engine.job_details(id),
        )
        .await;

        result.inspect_err(|e| {
            error!(job_id = %id, "Failed to load job details: {}", e);
            self.notices.error("Failed to load job details. Please try again.");
        })
    }

    /// A single public posting from the persistence service.
    pub async fn fetch_posting(&self, id: &JobId) -> ClientResult<JobCandidate> {
        let mut posting = deadline::within(
            self.operation_timeout,
            "job store",
            "job posting",
            self.store.get_job(id),
        )
        .await
        .inspect_err(|e| {
            error!(job_id = %id, "Failed to load job posting: {}", e);
            self.notices.error(e.to_string());
        })?;

        scoring::ingest(std::slice::from_mut(&mut posting), self.store.score_scale());
        Ok(posting)
    }

    /// Every public posting, in server order.
    pub async fn list_postings(&self) -> ClientResult<Vec<JobCandidate>> {
        let mut postings = deadline::within(
            self.operation_timeout,
            "job store",
            "job listing",
            self.store.list_jobs(),
        )
        .await
        .inspect_err(|e| {
            error!("Failed to list job postings: {}", e);
            self.notices.error(e.to_string());
        })?;

        scoring::ingest(&mut postings, self.store.score_scale());
        debug!(count = postings.len(), "Listed job postings");
        Ok(postings)
    }
}
