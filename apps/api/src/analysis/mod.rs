//! Asynchronous analysis pipeline: dispatcher, workers, parser and poller,
//! plus the per-kind prompt builders, local models and fallbacks.

pub mod career_path;
pub mod dispatcher;
pub mod handlers;
pub mod heatmap;
pub mod integrity;
pub mod parser;
pub mod poller;
pub mod prompts;
pub mod quantification;
pub mod request;
pub mod skill_gap;
pub mod tailoring;
pub mod worker;
