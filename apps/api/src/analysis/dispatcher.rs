//! Job Dispatcher: admission, the in-flight registry and the bounded worker pool.
//!
//! `start` checks ownership, reserves a place in the bounded job queue, marks the
//! slot `processing` and returns without waiting for the run. A pool loop pulls
//! jobs off the queue, gated by a semaphore sized to the worker count.
//!
//! At most one run per `(resume_id, kind)` is in flight. A start that arrives
//! while its slot is running is parked as that slot's single pending rerun; a
//! newer start replaces an older parked one. The pool task that finishes a run
//! picks the rerun up directly, so the most recently admitted request is always
//! the last writer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::analysis::request::AnalysisRequest;
use crate::analysis::worker::{run_analysis, AnalysisJob, SlotKey, WorkerContext};
use crate::auth::{load_owned_resume, CallerId};
use crate::errors::AppError;
use crate::models::analysis::{AnalysisStatus, SlotWrite};
use crate::storage::ResumeStore;

// ────────────────────────────────────────────────────────────────────────────
// In-flight registry
// ────────────────────────────────────────────────────────────────────────────

/// Slots with a run in progress, each with at most one parked rerun.
///
/// Shared with the poller: a registered slot reads `processing` whatever the
/// store holds, which covers the gap between a run's terminal write and the
/// pickup of its parked rerun.
#[derive(Default)]
pub struct InFlightRegistry {
    running: Mutex<HashMap<SlotKey, Option<AnalysisJob>>>,
}

impl InFlightRegistry {
    /// Returns the job back if its slot was idle and it should run now.
    /// Otherwise the job is parked as the slot's rerun and `None` is returned.
    fn admit(&self, job: AnalysisJob) -> Option<AnalysisJob> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        match running.get_mut(&job.key()) {
            Some(parked) => {
                *parked = Some(job);
                None
            }
            None => {
                running.insert(job.key(), None);
                Some(job)
            }
        }
    }

    /// Ends the current run for `key`. A parked rerun is handed back and the slot
    /// stays registered as running; otherwise the slot is released.
    fn finish(&self, key: SlotKey) -> Option<AnalysisJob> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        match running.get_mut(&key).and_then(Option::take) {
            Some(next) => Some(next),
            None => {
                running.remove(&key);
                None
            }
        }
    }

    /// True while `key` has a run executing or queued, parked reruns included.
    pub fn is_running(&self, key: SlotKey) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct JobDispatcher {
    store: Arc<dyn ResumeStore>,
    queue: mpsc::Sender<AnalysisJob>,
    registry: Arc<InFlightRegistry>,
}

impl JobDispatcher {
    /// Starts the pool loop on the current runtime and returns the handle used to submit jobs.
    pub fn spawn(ctx: WorkerContext) -> Self {
        let (queue, jobs) = mpsc::channel(ctx.settings.queue_capacity.max(1));
        let registry = Arc::new(InFlightRegistry::default());
        let store = ctx.store.clone();

        tokio::spawn(pool_loop(jobs, ctx, registry.clone()));

        Self {
            store,
            queue,
            registry,
        }
    }

    /// The registry of running slots, for readers that must not report a
    /// superseded result as settled.
    pub fn registry(&self) -> Arc<InFlightRegistry> {
        self.registry.clone()
    }

    /// Accepts an analysis request. On success the slot reads `processing` and the
    /// run has been scheduled; its outcome is only visible by polling.
    pub async fn start(
        &self,
        caller: CallerId,
        resume_id: Uuid,
        request: AnalysisRequest,
    ) -> Result<AnalysisStatus, AppError> {
        let resume = load_owned_resume(self.store.as_ref(), caller, resume_id).await?;
        let kind = request.kind();

        let permit = self.queue.try_reserve().map_err(|e| match e {
            TrySendError::Full(()) => {
                warn!(%resume_id, %kind, "Analysis queue full, rejecting request");
                AppError::Busy
            }
            TrySendError::Closed(()) => AppError::Internal(anyhow!("analysis worker pool has stopped")),
        })?;

        let job = AnalysisJob {
            resume_id,
            request,
            snapshot: resume.content,
        };
        let key = job.key();

        let Some(job) = self.registry.admit(job) else {
            debug!(%resume_id, %kind, "Slot already running, rerun parked");
            // No store write here: the rerun may already be running and a late
            // `processing` would clobber its result. Readers consult the registry.
            return Ok(AnalysisStatus::Processing);
        };

        if let Err(e) = self.store.write_slot(resume_id, SlotWrite::Processing(kind)).await {
            // A rerun parked meanwhile was already acknowledged, so it still gets to run.
            if let Some(parked) = self.registry.finish(key) {
                permit.send(parked);
            }
            return Err(e.into());
        }

        permit.send(job);
        info!(%resume_id, %kind, "Analysis accepted");
        Ok(AnalysisStatus::Processing)
    }
}

async fn pool_loop(
    mut jobs: mpsc::Receiver<AnalysisJob>,
    ctx: WorkerContext,
    registry: Arc<InFlightRegistry>,
) {
    let workers = Arc::new(Semaphore::new(ctx.settings.workers.max(1)));

    loop {
        let permit = match workers.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let Some(job) = jobs.recv().await else {
            debug!("Analysis queue closed, pool loop exiting");
            break;
        };

        let ctx = ctx.clone();
        let registry = registry.clone();
        tokio::spawn(async move {
            drive_slot(&ctx, &registry, job).await;
            drop(permit);
        });
    }
}

/// Runs a job, then any reruns parked on its slot while it was running.
async fn drive_slot(ctx: &WorkerContext, registry: &InFlightRegistry, mut job: AnalysisJob) {
    loop {
        let key = job.key();
        run_analysis(ctx, &job).await;

        let Some(next) = registry.finish(key) else {
            return;
        };
        if let Err(e) = ctx
            .store
            .write_slot(next.resume_id, SlotWrite::Processing(next.kind()))
            .await
        {
            error!(resume_id = %next.resume_id, kind = %next.kind(), error = %e, "Failed to mark rerun processing");
        }
        job = next;
    }
}
