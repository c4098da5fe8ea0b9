// src/core/mod.rs
//! Collaborator clients and the plumbing they share

pub mod config_manager;
pub mod deadline;
pub mod job_store;
pub mod matching_engine;
pub mod service_client;

pub use config_manager::ConfigManager;
pub use job_store::{HttpJobStore, JobStore, SaveAck};
pub use matching_engine::{HttpMatchingEngine, MatchingEngine};
pub use service_client::ServiceClient;
