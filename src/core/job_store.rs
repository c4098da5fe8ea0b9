// src/core/job_store.rs
//! Client for the job persistence service.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::auth::Identity;
use crate::core::config_manager::{StoreConfig, StoreRoutes};
use crate::core::service_client::{segment_path, ServiceClient};
use crate::error::{ClientError, ClientResult};
use crate::scoring::ScoreScale;
use crate::types::response::mentions_already_saved;
use crate::types::{JobCandidate, JobId, SaveJobRequest, StoreMessage};

const JOBS_ENDPOINT: &str = "/api/jobs";
const SAVE_ENDPOINT: &str = "/api/jobs/save";
const SAVED_ENDPOINT: &str = "/api/jobs/saved";

/// How the service acknowledged a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAck {
    Saved,
    AlreadySaved,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Public postings; no credential.
    async fn list_jobs(&self) -> ClientResult<Vec<JobCandidate>>;

    async fn get_job(&self, id: &JobId) -> ClientResult<JobCandidate>;

    async fn save_job(&self, job: &JobCandidate, identity: &Identity) -> ClientResult<SaveAck>;

    async fn saved_jobs(&self, identity: &Identity) -> ClientResult<Vec<JobCandidate>>;

    async fn delete_saved(&self, id: &JobId, identity: &Identity) -> ClientResult<()>;

    async fn mark_applied(&self, id: &JobId, identity: &Identity) -> ClientResult<()>;

    /// Scale of `similarityScore` in this service's payloads.
    fn score_scale(&self) -> ScoreScale {
        ScoreScale::Percent
    }
}

pub struct HttpJobStore {
    http: ServiceClient,
    routes: StoreRoutes,
    score_scale: ScoreScale,
}

impl HttpJobStore {
    pub fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: ServiceClient::new("job store", &config.base_url, config.timeout_seconds)?,
            routes: config.routes,
            score_scale: config.score_scale,
        })
    }

    fn delete_path(&self, id: &JobId) -> ClientResult<String> {
        let id = id.to_string();
        match self.routes {
            StoreRoutes::Saved => segment_path(SAVED_ENDPOINT, &[id.as_str()]),
            StoreRoutes::Direct => segment_path(JOBS_ENDPOINT, &[id.as_str()]),
        }
    }

    fn apply_path(&self, id: &JobId) -> ClientResult<String> {
        let id = id.to_string();
        match self.routes {
            StoreRoutes::Saved => segment_path(SAVED_ENDPOINT, &[id.as_str(), "apply"]),
            StoreRoutes::Direct => segment_path(JOBS_ENDPOINT, &[id.as_str(), "apply"]),
        }
    }
}

#[async_trait]
impl JobStore for HttpJobStore {
    async fn list_jobs(&self) -> ClientResult<Vec<JobCandidate>> {
        self.http
            .send_json(self.http.get(JOBS_ENDPOINT), JOBS_ENDPOINT)
            .await
    }

    async fn get_job(&self, id: &JobId) -> ClientResult<JobCandidate> {
        let path = segment_path(JOBS_ENDPOINT, &[id.to_string().as_str()])?;
        self.http.send_json(self.http.get(&path), &path).await
    }

    async fn save_job(&self, job: &JobCandidate, identity: &Identity) -> ClientResult<SaveAck> {
        info!(job_id = %job.id, title = %job.title, "Saving job to profile");

        let request = self
            .http
            .post(SAVE_ENDPOINT)
            .header("Authorization", identity.authorization_header())
            .json(&SaveJobRequest::from(job));

        match self.http.send_ack::<StoreMessage>(request, SAVE_ENDPOINT).await {
            Ok(ack) if ack.reports_already_saved() => Ok(SaveAck::AlreadySaved),
            Ok(_) => Ok(SaveAck::Saved),
            Err(ClientError::Upstream { status: Some(409), .. }) => Ok(SaveAck::AlreadySaved),
            Err(ClientError::Upstream { message, .. }) if mentions_already_saved(&message) => {
                debug!(job_id = %job.id, "Store rejected save as duplicate: {}", message);
                Ok(SaveAck::AlreadySaved)
            }
            Err(e) => Err(e),
        }
    }

    async fn saved_jobs(&self, identity: &Identity) -> ClientResult<Vec<JobCandidate>> {
        let request = self
            .http
            .get(SAVED_ENDPOINT)
            .header("Authorization", identity.authorization_header());
        self.http.send_json(request, SAVED_ENDPOINT).await
    }

    async fn delete_saved(&self, id: &JobId, identity: &Identity) -> ClientResult<()> {
        let path = self.delete_path(id)?;
        let request = self
            .http
            .delete(&path)
            .header("Authorization", identity.authorization_header());
        self.http.send_ack::<StoreMessage>(request, &path).await?;
        Ok(())
    }

    async fn mark_applied(&self, id: &JobId, identity: &Identity) -> ClientResult<()> {
        let path = self.apply_path(id)?;
        let request = match self.routes {
            StoreRoutes::Saved => self.http.put(&path),
            StoreRoutes::Direct => self.http.post(&path),
        };
        let request = request.header("Authorization", identity.authorization_header());
        self.http.send_ack::<StoreMessage>(request, &path).await?;
        Ok(())
    }

    fn score_scale(&self) -> ScoreScale {
        self.score_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config_manager::StoreConfig;

    #[test]
    fn test_delete_path_follows_route_family() {
        let mut config = StoreConfig::default();
        let store = HttpJobStore::new(&config).unwrap();
        assert_eq!(store.delete_path(&JobId::Number(4)).unwrap(), "/api/jobs/saved/4");
        assert_eq!(store.apply_path(&JobId::Number(4)).unwrap(), "/api/jobs/saved/4/apply");

        config.routes = StoreRoutes::Direct;
        let store = HttpJobStore::new(&config).unwrap();
        assert_eq!(store.delete_path(&JobId::Number(4)).unwrap(), "/api/jobs/4");
        assert_eq!(store.apply_path(&JobId::Number(4)).unwrap(), "/api/jobs/4/apply");
    }

    #[test]
    fn test_text_ids_stay_inside_their_segment() {
        let store = HttpJobStore::new(&StoreConfig::default()).unwrap();
        let id = JobId::Text("li/123?ref=x#top".to_string());
        assert_eq!(
            store.delete_path(&id).unwrap(),
            "/api/jobs/saved/li%2F123%3Fref=x%23top"
        );
        assert_eq!(
            store.apply_path(&id).unwrap(),
            "/api/jobs/saved/li%2F123%3Fref=x%23top/apply"
        );
    }
}
