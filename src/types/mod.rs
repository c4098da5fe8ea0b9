// src/types/mod.rs
//! Wire and domain types shared by the session, the collection and the clients

pub mod job;
pub mod response;

pub use job::{JobCandidate, JobId};
pub use response::{
    JobDetails, MatchJobsResponse, MoreJobsRequest, MoreJobsResponse, SaveJobRequest,
    StoreMessage,
};
