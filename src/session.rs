// src/session.rs
//! Resume matching session: upload, match, paginate.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config_manager::SessionConfig;
use crate::core::deadline;
use crate::core::MatchingEngine;
use crate::document::ResumeDocument;
use crate::error::{ClientError, ClientResult};
use crate::interaction::{self, LinkOpener};
use crate::notice::Notices;
use crate::scoring;
use crate::types::{JobCandidate, JobId, MoreJobsRequest};
use crate::utils;

const ENGINE: &str = "matching engine";

#[derive(Debug, Default)]
struct SessionState {
    candidates: Vec<JobCandidate>,
    keywords: String,
    total_analyzed: u64,
    has_more: bool,
    resume_preview: String,
    /// Last page received; the initial match is page 1.
    page: u32,
    no_matches: bool,
    /// Bumped on every submission; responses from older ones are dropped.
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    pub matched: usize,
    pub total_analyzed: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(MatchSummary),
    /// A newer submission or disposal overtook this one; nothing applied.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreSkip {
    NoKeywords,
    InProgress,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadMoreOutcome {
    Appended { added: usize, has_more: bool },
    Skipped(LoadMoreSkip),
    Discarded,
}

pub struct MatchingSession {
    id: Uuid,
    engine: Arc<dyn MatchingEngine>,
    config: SessionConfig,
    notices: Notices,
    state: Mutex<SessionState>,
    submissions: AtomicUsize,
    loading_more: AtomicBool,
    disposed: AtomicBool,
}

impl MatchingSession {
    pub fn new(engine: Arc<dyn MatchingEngine>, config: SessionConfig, notices: Notices) -> Self {
        let id = Uuid::new_v4();
        debug!(session = %id, "Matching session created");
        Self {
            id,
            engine,
            config,
            notices,
            state: Mutex::new(SessionState::default()),
            submissions: AtomicUsize::new(0),
            loading_more: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Submit a resume. Resets the session, then populates it from the
    /// engine's answer.
    pub async fn submit_document(&self, document: ResumeDocument) -> ClientResult<MatchOutcome> {
        if !document.is_pdf() {
            self.notices.error("Please select a PDF file");
            return Err(ClientError::validation(format!(
                "unsupported document type: {}",
                document.content_type
            )));
        }

        let generation = {
            let mut state = self.state.lock();
            let generation = state.generation + 1;
            *state = SessionState {
                generation,
                ..SessionState::default()
            };
            generation
        };

        info!(
            session = %self.id,
            file = %document.file_name,
            size_mb = %format!("{:.2}", document.size_mb()),
            "Submitting resume"
        );

        let result = {
            let _submitting = Counter::enter(&self.submissions);
            deadline::within(
                self.config.operation_timeout(),
                ENGINE,
                "match jobs",
                self.engine.match_jobs(&document),
            )
            .await
        };

        let mut response = match result {
            Ok(response) => response,
            Err(e) => {
                if self.accepts(generation) {
                    self.notices.error(e.to_string());
                }
                return Err(e);
            }
        };

        scoring::ingest(&mut response.matched_jobs, self.engine.score_scale());
        let summary = MatchSummary {
            matched: response.matched_jobs.len(),
            total_analyzed: response.total_jobs_analyzed,
            has_more: response.has_more_jobs,
        };

        {
            let mut state = self.state.lock();
            if self.is_disposed() || state.generation != generation {
                debug!(session = %self.id, generation, "Dropping superseded match response");
                return Ok(MatchOutcome::Discarded);
            }
            state.no_matches = response.matched_jobs.is_empty();
            state.candidates = response.matched_jobs;
            state.total_analyzed = response.total_jobs_analyzed;
            state.keywords = response.keywords_used;
            state.has_more = response.has_more_jobs;
            state.resume_preview = utils::preview(&response.resume_text, self.config.preview_chars);
            state.page = 1;
        }

        if summary.matched == 0 {
            self.notices.warn(
                "No matching jobs found. There may be no jobs available yet, or the resume \
                 content doesn't match any open positions.",
            );
        }

        info!(
            session = %self.id,
            matched = summary.matched,
            analyzed = summary.total_analyzed,
            has_more = summary.has_more,
            "Resume matched"
        );
        Ok(MatchOutcome::Matched(summary))
    }

    /// Fetch the next page for the stored keywords and append it.
    /// Overlapping calls are ignored, not queued.
    pub async fn load_more(&self) -> ClientResult<LoadMoreOutcome> {
        let (keywords, next_page, generation) = {
            let state = self.state.lock();
            (state.keywords.clone(), state.page + 1, state.generation)
        };

        if keywords.is_empty() {
            debug!(session = %self.id, "No keywords yet, nothing to load");
            return Ok(LoadMoreOutcome::Skipped(LoadMoreSkip::NoKeywords));
        }

        let Some(_loading) = Flag::raise(&self.loading_more) else {
            debug!(session = %self.id, "Load more already in progress");
            return Ok(LoadMoreOutcome::Skipped(LoadMoreSkip::InProgress));
        };

        let request = MoreJobsRequest {
            keywords,
            page: next_page,
            per_page: self.config.per_page,
        };

        let result = deadline::within(
            self.config.operation_timeout(),
            ENGINE,
            "more jobs",
            self.engine.more_jobs(&request),
        )
        .await;

        let mut page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!(session = %self.id, page = next_page, "Failed to load more jobs: {}", e);
                if self.accepts(generation) {
                    self.notices.error("Failed to load more jobs. Please try again.");
                }
                return Err(e);
            }
        };

        scoring::ingest(&mut page.jobs, self.engine.score_scale());
        let added = page.jobs.len();
        {
            let mut state = self.state.lock();
            if self.is_disposed() || state.generation != generation {
                debug!(session = %self.id, page = next_page, "Dropping page for a superseded submission");
                return Ok(LoadMoreOutcome::Discarded);
            }
            state.candidates.extend(page.jobs);
            state.has_more = page.has_more;
            state.page = next_page;
        }

        info!(session = %self.id, page = next_page, added, has_more = page.has_more, "Loaded more jobs");
        Ok(LoadMoreOutcome::Appended {
            added,
            has_more: page.has_more,
        })
    }

    /// "Apply now" from the results view: open the link, no bookkeeping.
    pub fn open_application(&self, id: &JobId, opener: &dyn LinkOpener) -> Option<String> {
        let Some(candidate) = self.candidate(id) else {
            self.notices.error(format!("Job {} is not in the current results", id));
            return None;
        };
        interaction::open_application_link(&candidate, opener, &self.notices)
    }

    /// Annotate every copy of `id` as saved. Returns whether any matched.
    pub(crate) fn mark_saved(&self, id: &JobId) -> bool {
        if self.is_disposed() {
            return false;
        }
        let mut state = self.state.lock();
        let mut found = false;
        for candidate in state.candidates.iter_mut().filter(|c| &c.id == id) {
            candidate.saved = true;
            found = true;
        }
        found
    }

    pub fn candidates(&self) -> Vec<JobCandidate> {
        self.state.lock().candidates.clone()
    }

    pub fn candidate(&self, id: &JobId) -> Option<JobCandidate> {
        self.state
            .lock()
            .candidates
            .iter()
            .find(|c| &c.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().candidates.is_empty()
    }

    pub fn keywords(&self) -> String {
        self.state.lock().keywords.clone()
    }

    pub fn total_analyzed(&self) -> u64 {
        self.state.lock().total_analyzed
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().has_more
    }

    pub fn resume_preview(&self) -> String {
        self.state.lock().resume_preview.clone()
    }

    pub fn no_matches(&self) -> bool {
        self.state.lock().no_matches
    }

    pub fn page(&self) -> u32 {
        self.state.lock().page
    }

    pub fn is_submitting(&self) -> bool {
        self.submissions.load(Ordering::Acquire) > 0
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more.load(Ordering::Acquire)
    }

    /// Stop applying results. Calls already in flight still run to completion.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        debug!(session = %self.id, "Matching session disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn accepts(&self, generation: u64) -> bool {
        !self.is_disposed() && self.state.lock().generation == generation
    }
}

/// Raised while held; `raise` fails if already raised.
struct Flag<'a>(&'a AtomicBool);

impl<'a> Flag<'a> {
    fn raise(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Flag(flag))
    }
}

impl Drop for Flag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Counter<'a>(&'a AtomicUsize);

impl<'a> Counter<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Counter(counter)
    }
}

impl Drop for Counter<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
