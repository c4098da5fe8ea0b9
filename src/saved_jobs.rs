// src/saved_jobs.rs
//! The signed-in user's saved jobs, and the actions that change them.

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::action_set::{ActionKind, ActionSet};
use crate::auth::{self, Identity};
use crate::core::deadline;
use crate::core::{JobStore, SaveAck};
use crate::error::{ClientError, ClientResult};
use crate::interaction::{self, Confirmer, LinkOpener};
use crate::notice::Notices;
use crate::scoring;
use crate::session::MatchingSession;
use crate::types::{JobCandidate, JobId};

const STORE: &str = "job store";

pub const SAVED_NOTICE: &str = "Job saved to your profile! You can view it in your dashboard.";
pub const ALREADY_SAVED_NOTICE: &str = "This job is already saved to your profile";
pub const REMOVE_PROMPT: &str = "Are you sure you want to remove this job from your saved list?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRejection {
    InProgress,
    AlreadySaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
    Rejected(SaveRejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    InProgress,
}

#[derive(Debug)]
pub struct ApplyOutcome {
    /// URL handed to the opener, if any.
    pub opened: Option<String>,
    /// The detached apply-mark call; `None` when one was already running.
    pub bookkeeping: Option<JoinHandle<()>>,
}

pub struct SavedJobCollection {
    store: Arc<dyn JobStore>,
    notices: Notices,
    actions: ActionSet,
    items: Mutex<Vec<JobCandidate>>,
    operation_timeout: Duration,
    stale: AtomicBool,
    disposed: AtomicBool,
}

impl SavedJobCollection {
    pub fn new(store: Arc<dyn JobStore>, notices: Notices, operation_timeout: Duration) -> Self {
        Self {
            store,
            notices,
            actions: ActionSet::new(),
            items: Mutex::new(Vec::new()),
            operation_timeout,
            stale: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    /// Replace the collection with the server's list. Returns how many
    /// items it now holds.
    pub async fn fetch(&self, identity: Option<&Identity>) -> ClientResult<usize> {
        let Some(identity) = auth::usable(identity) else {
            self.items.lock().clear();
            self.notices.error("Please login to view saved jobs");
            return Err(ClientError::AuthRequired);
        };

        debug!(user = %identity.display_name(), "Fetching saved jobs");
        let result = deadline::within(
            self.operation_timeout,
            STORE,
            "saved jobs",
            self.store.saved_jobs(identity),
        )
        .await;

        let mut jobs = match result {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Failed to load saved jobs: {}", e);
                if let Some(notices) = self.live_notices() {
                    notices.error("Failed to load saved jobs");
                }
                return Err(e);
            }
        };

        scoring::ingest(&mut jobs, self.store.score_scale());
        for job in jobs.iter_mut() {
            job.saved = true;
        }
        let count = jobs.len();

        if self.is_disposed() {
            return Ok(count);
        }
        *self.items.lock() = jobs;
        self.stale.store(false, Ordering::Release);
        info!(count, "Saved jobs loaded");
        Ok(count)
    }

    /// Save a matched candidate to the user's profile. On success the
    /// session's copy is flagged `saved` and this collection goes stale.
    pub async fn save(
        &self,
        session: &MatchingSession,
        job: &JobCandidate,
        identity: Option<&Identity>,
    ) -> ClientResult<SaveOutcome> {
        let Some(identity) = auth::usable(identity) else {
            self.notices.error("Please login to save jobs to your profile");
            return Err(ClientError::AuthRequired);
        };

        let already_saved = job.saved || session.candidate(&job.id).is_some_and(|c| c.saved);
        if already_saved {
            self.notices.info(ALREADY_SAVED_NOTICE);
            return Ok(SaveOutcome::Rejected(SaveRejection::AlreadySaved));
        }

        let Some(_saving) = self.actions.acquire(ActionKind::Saving, &job.id) else {
            debug!(job_id = %job.id, "Save already in progress");
            self.notices.info("This job is already being saved");
            return Ok(SaveOutcome::Rejected(SaveRejection::InProgress));
        };

        let result = deadline::within(
            self.operation_timeout,
            STORE,
            "save job",
            self.store.save_job(job, identity),
        )
        .await;

        let ack = match result {
            Ok(ack) => ack,
            Err(e) => {
                error!(job_id = %job.id, "Failed to save job: {}", e);
                if let Some(notices) = self.live_notices() {
                    notices.error(e.to_string());
                }
                return Err(e);
            }
        };

        session.mark_saved(&job.id);
        let notices = self.live_notices();
        if notices.is_some() {
            self.stale.store(true, Ordering::Release);
        }

        match ack {
            SaveAck::Saved => {
                info!(job_id = %job.id, "Job saved");
                if let Some(notices) = notices {
                    notices.success(SAVED_NOTICE);
                }
                Ok(SaveOutcome::Saved)
            }
            SaveAck::AlreadySaved => {
                if let Some(notices) = notices {
                    notices.info(ALREADY_SAVED_NOTICE);
                }
                Ok(SaveOutcome::AlreadySaved)
            }
        }
    }

    /// Remove a saved job after the user confirms.
    pub async fn delete(
        &self,
        id: &JobId,
        identity: Option<&Identity>,
        confirmer: &dyn Confirmer,
    ) -> ClientResult<DeleteOutcome> {
        let Some(identity) = auth::usable(identity) else {
            self.notices.error(ClientError::AuthRequired.to_string());
            return Err(ClientError::AuthRequired);
        };

        if self.actions.is_active(ActionKind::Deleting, id) {
            return Ok(DeleteOutcome::InProgress);
        }

        if !confirmer.confirm(REMOVE_PROMPT) {
            debug!(job_id = %id, "Removal declined");
            return Ok(DeleteOutcome::Cancelled);
        }

        let Some(_deleting) = self.actions.acquire(ActionKind::Deleting, id) else {
            return Ok(DeleteOutcome::InProgress);
        };

        let result = deadline::within(
            self.operation_timeout,
            STORE,
            "delete saved job",
            self.store.delete_saved(id, identity),
        )
        .await;

        if let Err(e) = result {
            error!(job_id = %id, "Failed to remove job: {}", e);
            if let Some(notices) = self.live_notices() {
                notices.error("Failed to remove job");
            }
            return Err(e);
        }

        info!(job_id = %id, "Saved job removed");
        if let Some(notices) = self.live_notices() {
            self.items.lock().retain(|job| &job.id != id);
            notices.success("Job removed from saved list");
        }
        Ok(DeleteOutcome::Deleted)
    }

    /// Record the application and open its link. The apply-mark call runs
    /// detached; the local item is updated without waiting for it, and a
    /// late failure is only logged.
    pub fn mark_applied(
        &self,
        job: &JobCandidate,
        identity: Option<&Identity>,
        opener: &dyn LinkOpener,
    ) -> ClientResult<ApplyOutcome> {
        let Some(identity) = auth::usable(identity) else {
            self.notices.error(ClientError::AuthRequired.to_string());
            return Err(ClientError::AuthRequired);
        };

        let bookkeeping = match self.actions.acquire(ActionKind::Applying, &job.id) {
            Some(applying) => {
                let store = Arc::clone(&self.store);
                let identity = identity.clone();
                let limit = self.operation_timeout;
                Some(tokio::spawn(async move {
                    let id = applying.id().clone();
                    let call = store.mark_applied(&id, &identity);
                    match deadline::within(limit, STORE, "mark applied", call).await {
                        Ok(()) => debug!(job_id = %id, "Application recorded"),
                        Err(e) => warn!(job_id = %id, "Failed to record application: {}", e),
                    }
                    drop(applying);
                }))
            }
            None => {
                debug!(job_id = %job.id, "Apply-mark already in flight");
                None
            }
        };

        if !self.is_disposed() {
            let now = Utc::now();
            for item in self.items.lock().iter_mut().filter(|item| item.id == job.id) {
                item.record_applied(now);
            }
        }

        let opened = interaction::open_application_link(job, opener, &self.notices);
        Ok(ApplyOutcome {
            opened,
            bookkeeping,
        })
    }

    pub fn invalidate(&self) {
        self.stale.store(true, Ordering::Release);
    }

    /// Set after a save from the matching view; cleared by `fetch`.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    pub fn items(&self) -> Vec<JobCandidate> {
        self.items.lock().clone()
    }

    pub fn item(&self, id: &JobId) -> Option<JobCandidate> {
        self.items.lock().iter().find(|job| &job.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Notices for results that resolve after an await; `None` once disposed.
    fn live_notices(&self) -> Option<&Notices> {
        (!self.is_disposed()).then_some(&self.notices)
    }
}
