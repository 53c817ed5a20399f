//! Shared fixtures for unit tests: seeded resumes, scripted gateways and a
//! store that can hold a terminal write open.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};
use uuid::Uuid;

use crate::config::Config;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::analysis::{AnalysisKind, AnalysisSlot, SlotWrite};
use crate::models::resume::{Experience, Resume, ResumeContent, Skill};
use crate::state::AppState;
use crate::storage::{InMemoryResumeStore, ResumeStore, StoreError};

pub fn sample_content() -> ResumeContent {
    ResumeContent {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        job_title: "Software Engineer".to_string(),
        summary: "Backend engineer".to_string(),
        experience: vec![Experience {
            title: "Engineer".to_string(),
            company_name: "Analytical Engines".to_string(),
            work_summary: "• Did X\n• Did Y".to_string(),
            ..Default::default()
        }],
        skills: vec![Skill {
            name: "SQL".to_string(),
            rating: Some(4),
        }],
        ..Default::default()
    }
}

pub async fn seed_resume(store: &InMemoryResumeStore, owner: Uuid) -> Uuid {
    seed_resume_with(store, owner, sample_content()).await
}

pub async fn seed_resume_with(
    store: &InMemoryResumeStore,
    owner: Uuid,
    content: ResumeContent,
) -> Uuid {
    let id = Uuid::new_v4();
    store
        .insert(Resume {
            id,
            user_id: owner,
            title: "Test resume".to_string(),
            content,
        })
        .await;
    id
}

/// Answers every prompt with the same reply, or fails every call.
pub struct ScriptedGateway {
    reply: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received so far, system text included.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGateway {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: "upstream unavailable".to_string(),
        })
    }
}

/// Holds every call until the test releases it.
pub struct GatedGateway {
    reply: String,
    release: Semaphore,
    entered: Notify,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl GatedGateway {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            release: Semaphore::new(0),
            entered: Notify::new(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Lets `n` held or future calls return.
    pub fn release(&self, n: usize) {
        self.release.add_permits(n);
    }

    /// Resolves once a call has reached the gateway.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl TextGenerator for GatedGateway {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        self.entered.notify_one();
        let permit = self
            .release
            .acquire()
            .await
            .map_err(|_| LlmError::EmptyContent)?;
        permit.forget();
        Ok(self.reply.clone())
    }
}

/// Delegates to an in-memory store, but holds every `Completed` write open
/// after applying it until the test releases it.
pub struct HeldCompletionStore {
    inner: Arc<InMemoryResumeStore>,
    completed: Notify,
    release: Semaphore,
}

impl HeldCompletionStore {
    pub fn new(inner: Arc<InMemoryResumeStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            completed: Notify::new(),
            release: Semaphore::new(0),
        })
    }

    /// Resolves once a `Completed` write has been applied.
    pub async fn completed(&self) {
        self.completed.notified().await;
    }

    /// Lets `n` held or future `Completed` writes return.
    pub fn release(&self, n: usize) {
        self.release.add_permits(n);
    }
}

#[async_trait]
impl ResumeStore for HeldCompletionStore {
    async fn load_resume(&self, resume_id: Uuid) -> Result<Option<Resume>, StoreError> {
        self.inner.load_resume(resume_id).await
    }

    async fn load_slot(&self, resume_id: Uuid, kind: AnalysisKind) -> Result<AnalysisSlot, StoreError> {
        self.inner.load_slot(resume_id, kind).await
    }

    async fn write_slot(&self, resume_id: Uuid, write: SlotWrite) -> Result<(), StoreError> {
        let held = matches!(write, SlotWrite::Completed(_));
        self.inner.write_slot(resume_id, write).await?;
        if held {
            self.completed.notify_one();
            if let Ok(permit) = self.release.acquire().await {
                permit.forget();
            }
        }
        Ok(())
    }
}

/// App state over an in-memory store with instant heuristics.
pub fn test_state(gateway: Arc<dyn TextGenerator>) -> (AppState, Arc<InMemoryResumeStore>) {
    let store = Arc::new(InMemoryResumeStore::new());
    let state = AppState::new(Config::for_tests(), store.clone(), gateway);
    (state, store)
}
