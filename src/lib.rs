//! Client core for a resume-driven job recommender: matching sessions,
//! saved-job management and the collaborator clients behind them.

pub mod action_set;
pub mod auth;
pub mod cli;
pub mod core;
pub mod document;
pub mod error;
pub mod interaction;
pub mod job_details;
pub mod notice;
pub mod saved_jobs;
pub mod scoring;
pub mod session;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use action_set::{ActionGuard, ActionKind, ActionSet};
pub use auth::Identity;
pub use document::ResumeDocument;
pub use error::{ClientError, ClientResult};
pub use job_details::JobDetailFetcher;
pub use notice::{Notice, NoticeLevel, Notices};
pub use saved_jobs::{ApplyOutcome, DeleteOutcome, SaveOutcome, SavedJobCollection};
pub use scoring::{MatchScore, ScoreBand, ScoreScale};
pub use session::{LoadMoreOutcome, MatchOutcome, MatchingSession};
pub use types::{JobCandidate, JobId};
