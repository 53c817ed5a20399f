//! Status Poller: authorization-checked reads of a single slot.
//!
//! `wait` re-reads the slot on a fixed interval until it settles or the window
//! elapses. It never cancels or otherwise touches the run itself.
//!
//! A slot whose key is still in the dispatcher's in-flight registry reads
//! `processing`, even if the store already holds the previous run's terminal
//! state. The registry is checked before the store read, so an unregistered
//! slot is never older than the last acknowledged start.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use crate::analysis::dispatcher::InFlightRegistry;
use crate::auth::{load_owned_resume, CallerId};
use crate::errors::AppError;
use crate::models::analysis::{AnalysisKind, AnalysisSlot, AnalysisStatus};
use crate::storage::{ResumeStore, StoreError};

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The slot reached `completed` or `failed`.
    Settled(AnalysisSlot),
    /// The window elapsed first. The slot is returned as last read.
    TimedOut(AnalysisSlot),
}

impl PollOutcome {
    pub fn into_slot(self) -> AnalysisSlot {
        match self {
            PollOutcome::Settled(slot) | PollOutcome::TimedOut(slot) => slot,
        }
    }
}

#[derive(Clone)]
pub struct StatusPoller {
    store: Arc<dyn ResumeStore>,
    in_flight: Arc<InFlightRegistry>,
    window_max: Duration,
}

impl StatusPoller {
    pub fn new(
        store: Arc<dyn ResumeStore>,
        in_flight: Arc<InFlightRegistry>,
        window_max: Duration,
    ) -> Self {
        Self {
            store,
            in_flight,
            window_max,
        }
    }

    /// The slot as currently observable, including `pending` and `processing`.
    pub async fn get(
        &self,
        caller: CallerId,
        resume_id: Uuid,
        kind: AnalysisKind,
    ) -> Result<AnalysisSlot, AppError> {
        load_owned_resume(self.store.as_ref(), caller, resume_id).await?;
        Ok(self.read(resume_id, kind).await?)
    }

    async fn read(&self, resume_id: Uuid, kind: AnalysisKind) -> Result<AnalysisSlot, StoreError> {
        let in_flight = self.in_flight.is_running((resume_id, kind));
        let mut slot = self.store.load_slot(resume_id, kind).await?;
        if in_flight {
            slot.status = AnalysisStatus::Processing;
        }
        Ok(slot)
    }

    /// Polls until the slot is terminal or `window` (capped at the configured
    /// maximum) has elapsed.
    pub async fn wait(
        &self,
        caller: CallerId,
        resume_id: Uuid,
        kind: AnalysisKind,
        window: Duration,
    ) -> Result<PollOutcome, AppError> {
        let deadline = Instant::now() + window.min(self.window_max);
        let mut slot = self.get(caller, resume_id, kind).await?;

        loop {
            if slot.status.is_terminal() {
                return Ok(PollOutcome::Settled(slot));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(PollOutcome::TimedOut(slot));
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
            slot = self.read(resume_id, kind).await?;
        }
    }
}
