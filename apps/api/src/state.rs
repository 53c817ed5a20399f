use std::sync::Arc;

use crate::agent::ResumeAgent;
use crate::analysis::dispatcher::JobDispatcher;
use crate::analysis::poller::StatusPoller;
use crate::analysis::worker::WorkerContext;
use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::storage::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Resume Store. Postgres in production, in-memory without a `DATABASE_URL`.
    pub store: Arc<dyn ResumeStore>,
    pub dispatcher: JobDispatcher,
    pub poller: StatusPoller,
    pub agent: ResumeAgent,
    pub config: Config,
}

impl AppState {
    /// Wires the pipeline around one store and one gateway. Spawns the worker
    /// pool, so it must be called inside a Tokio runtime.
    pub fn new(config: Config, store: Arc<dyn ResumeStore>, gateway: Arc<dyn TextGenerator>) -> Self {
        let dispatcher = JobDispatcher::spawn(WorkerContext {
            store: store.clone(),
            gateway: gateway.clone(),
            settings: config.analysis.clone(),
        });
        let poller = StatusPoller::new(
            store.clone(),
            dispatcher.registry(),
            config.analysis.poll_window_max,
        );

        Self {
            store,
            dispatcher,
            poller,
            agent: ResumeAgent::new(gateway),
            config,
        }
    }
}
