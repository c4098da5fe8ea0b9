// src/test_support.rs
//! Scripted collaborators for in-crate tests.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::auth::{Claims, Identity};
use crate::core::{JobStore, MatchingEngine, SaveAck};
use crate::document::ResumeDocument;
use crate::error::{ClientError, ClientResult};
use crate::interaction::{Confirmer, LinkOpener};
use crate::scoring::ScoreScale;
use crate::types::{JobCandidate, JobDetails, JobId, MatchJobsResponse, MoreJobsRequest, MoreJobsResponse};

pub fn candidate(id: i64, score: f64) -> JobCandidate {
    let mut job = JobCandidate::new(id, &format!("Engineer {}", id), "Acme");
    job.job_url = Some(format!("https://jobs.example/{}", id));
    job.raw_score = Some(score);
    job
}

/// `count` candidates with ids `1..=count` and descending scores.
pub fn match_response(count: i64, total: u64, has_more: bool, keywords: &str) -> MatchJobsResponse {
    MatchJobsResponse {
        matched_jobs: (1..=count).map(|id| candidate(id, 90.0 - id as f64)).collect(),
        resume_text: "Senior Rust engineer with ten years of backend experience".to_string(),
        total_jobs_analyzed: total,
        keywords_used: keywords.to_string(),
        has_more_jobs: has_more,
    }
}

pub fn pdf() -> ResumeDocument {
    ResumeDocument::new("resume.pdf", "application/pdf", b"%PDF-1.4 test".to_vec())
}

fn token_with_exp(exp: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    let claims = Claims {
        sub: Some("user-1".to_string()),
        email: Some("ada@example.com".to_string()),
        name: None,
        exp: Some(exp),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test")).unwrap()
}

pub fn identity() -> Identity {
    Identity::from_token(token_with_exp(Utc::now().timestamp() + 3600)).unwrap()
}

pub fn expired_identity() -> Identity {
    Identity::from_token(token_with_exp(Utc::now().timestamp() - 60)).unwrap()
}

async fn pass(gate: &Option<Arc<Notify>>) {
    if let Some(gate) = gate {
        gate.notified().await;
    }
}

fn missing(what: &str) -> ClientError {
    ClientError::upstream(Some(500), format!("no scripted {} response", what))
}

#[derive(Default)]
pub struct FakeEngine {
    matches: Mutex<VecDeque<ClientResult<MatchJobsResponse>>>,
    mores: Mutex<VecDeque<ClientResult<MoreJobsResponse>>>,
    details: Mutex<VecDeque<ClientResult<JobDetails>>>,
    more_requests: Mutex<Vec<MoreJobsRequest>>,
    match_calls: AtomicUsize,
    more_calls: AtomicUsize,
    details_calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
    scale: ScoreScale,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every match/more call until the gate is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_scale(mut self, scale: ScoreScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn push_match(&self, response: ClientResult<MatchJobsResponse>) {
        self.matches.lock().push_back(response);
    }

    pub fn push_more(&self, response: ClientResult<MoreJobsResponse>) {
        self.mores.lock().push_back(response);
    }

    pub fn push_details(&self, response: ClientResult<JobDetails>) {
        self.details.lock().push_back(response);
    }

    pub fn match_calls(&self) -> usize {
        self.match_calls.load(Ordering::SeqCst)
    }

    pub fn more_calls(&self) -> usize {
        self.more_calls.load(Ordering::SeqCst)
    }

    pub fn details_calls(&self) -> usize {
        self.details_calls.load(Ordering::SeqCst)
    }

    pub fn more_requests(&self) -> Vec<MoreJobsRequest> {
        self.more_requests.lock().clone()
    }
}

#[async_trait]
impl MatchingEngine for FakeEngine {
    async fn match_jobs(&self, _document: &ResumeDocument) -> ClientResult<MatchJobsResponse> {
        let response = self.matches.lock().pop_front();
        self.match_calls.fetch_add(1, Ordering::SeqCst);
        pass(&self.gate).await;
        response.unwrap_or_else(|| Err(missing("match")))
    }

    async fn more_jobs(&self, request: &MoreJobsRequest) -> ClientResult<MoreJobsResponse> {
        let response = self.mores.lock().pop_front();
        self.more_requests.lock().push(request.clone());
        self.more_calls.fetch_add(1, Ordering::SeqCst);
        pass(&self.gate).await;
        response.unwrap_or_else(|| Err(missing("more")))
    }

    async fn job_details(&self, _id: &JobId) -> ClientResult<JobDetails> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(missing("details")))
    }

    fn score_scale(&self) -> ScoreScale {
        self.scale
    }
}

/// Unscripted calls succeed: saves ack as new, deletes and applies return
/// `Ok`, listings are empty.
#[derive(Default)]
pub struct FakeStore {
    listings: Mutex<VecDeque<ClientResult<Vec<JobCandidate>>>>,
    postings: Mutex<VecDeque<ClientResult<JobCandidate>>>,
    saved: Mutex<VecDeque<ClientResult<Vec<JobCandidate>>>>,
    saves: Mutex<VecDeque<ClientResult<SaveAck>>>,
    deletes: Mutex<VecDeque<ClientResult<()>>>,
    applies: Mutex<VecDeque<ClientResult<()>>>,
    saved_calls: AtomicUsize,
    save_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    apply_calls: AtomicUsize,
    tokens: Mutex<Vec<String>>,
    save_gate: Option<Arc<Notify>>,
    delete_gate: Option<Arc<Notify>>,
    apply_gate: Option<Arc<Notify>>,
    scale: ScoreScale,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_save_gate(mut self, gate: Arc<Notify>) -> Self {
        self.save_gate = Some(gate);
        self
    }

    pub fn with_delete_gate(mut self, gate: Arc<Notify>) -> Self {
        self.delete_gate = Some(gate);
        self
    }

    pub fn with_apply_gate(mut self, gate: Arc<Notify>) -> Self {
        self.apply_gate = Some(gate);
        self
    }

    pub fn with_scale(mut self, scale: ScoreScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn push_listing(&self, response: ClientResult<Vec<JobCandidate>>) {
        self.listings.lock().push_back(response);
    }

    pub fn push_posting(&self, response: ClientResult<JobCandidate>) {
        self.postings.lock().push_back(response);
    }

    pub fn push_saved(&self, response: ClientResult<Vec<JobCandidate>>) {
        self.saved.lock().push_back(response);
    }

    pub fn push_save(&self, response: ClientResult<SaveAck>) {
        self.saves.lock().push_back(response);
    }

    pub fn push_delete(&self, response: ClientResult<()>) {
        self.deletes.lock().push_back(response);
    }

    pub fn push_apply(&self, response: ClientResult<()>) {
        self.applies.lock().push_back(response);
    }

    pub fn saved_calls(&self) -> usize {
        self.saved_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    /// Tokens presented on authorized calls, in order.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().clone()
    }

    fn record(&self, identity: &Identity) {
        self.tokens.lock().push(identity.token().to_string());
    }
}

#[async_trait]
impl JobStore for FakeStore {
    async fn list_jobs(&self) -> ClientResult<Vec<JobCandidate>> {
        self.listings.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_job(&self, id: &JobId) -> ClientResult<JobCandidate> {
        self.postings
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::upstream(Some(404), format!("Job {} not found", id))))
    }

    async fn save_job(&self, _job: &JobCandidate, identity: &Identity) -> ClientResult<SaveAck> {
        self.record(identity);
        let response = self.saves.lock().pop_front();
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        pass(&self.save_gate).await;
        response.unwrap_or(Ok(SaveAck::Saved))
    }

    async fn saved_jobs(&self, identity: &Identity) -> ClientResult<Vec<JobCandidate>> {
        self.record(identity);
        self.saved_calls.fetch_add(1, Ordering::SeqCst);
        self.saved.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn delete_saved(&self, _id: &JobId, identity: &Identity) -> ClientResult<()> {
        self.record(identity);
        let response = self.deletes.lock().pop_front();
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        pass(&self.delete_gate).await;
        response.unwrap_or(Ok(()))
    }

    async fn mark_applied(&self, _id: &JobId, identity: &Identity) -> ClientResult<()> {
        self.record(identity);
        let response = self.applies.lock().pop_front();
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        pass(&self.apply_gate).await;
        response.unwrap_or(Ok(()))
    }

    fn score_scale(&self) -> ScoreScale {
        self.scale
    }
}

#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingOpener {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("no browser available");
        }
        self.opened.lock().push(url.to_string());
        Ok(())
    }
}

pub struct ScriptedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }
}
