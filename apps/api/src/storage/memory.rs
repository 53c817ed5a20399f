use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::analysis::{AnalysisKind, AnalysisSlot, SlotWrite};
use crate::models::resume::Resume;
use crate::storage::{ResumeStore, StoreError};

struct StoredResume {
    resume: Resume,
    slots: HashMap<AnalysisKind, AnalysisSlot>,
}

/// Process-local store used when no `DATABASE_URL` is configured, and by tests.
/// Local runs populate it from a JSON seed file at startup.
#[derive(Default)]
pub struct InMemoryResumeStore {
    resumes: RwLock<HashMap<Uuid, StoredResume>>,
}

impl InMemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a resume. Existing slots for the same id are kept.
    pub async fn insert(&self, resume: Resume) {
        let mut resumes = self.resumes.write().await;
        match resumes.get_mut(&resume.id) {
            Some(stored) => stored.resume = resume,
            None => {
                resumes.insert(
                    resume.id,
                    StoredResume {
                        resume,
                        slots: HashMap::new(),
                    },
                );
            }
        }
    }

    /// Inserts every resume of a JSON array and returns how many were loaded.
    /// Nothing is inserted when the document does not parse.
    pub async fn seed_from_json(&self, json: &str) -> Result<usize, serde_json::Error> {
        let resumes: Vec<Resume> = serde_json::from_str(json)?;
        let count = resumes.len();
        for resume in resumes {
            self.insert(resume).await;
        }
        Ok(count)
    }

    #[cfg(test)]
    pub async fn remove(&self, resume_id: Uuid) -> bool {
        self.resumes.write().await.remove(&resume_id).is_some()
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn load_resume(&self, resume_id: Uuid) -> Result<Option<Resume>, StoreError> {
        Ok(self
            .resumes
            .read()
            .await
            .get(&resume_id)
            .map(|stored| stored.resume.clone()))
    }

    async fn load_slot(
        &self,
        resume_id: Uuid,
        kind: AnalysisKind,
    ) -> Result<AnalysisSlot, StoreError> {
        Ok(self
            .resumes
            .read()
            .await
            .get(&resume_id)
            .and_then(|stored| stored.slots.get(&kind).cloned())
            .unwrap_or_else(|| AnalysisSlot::pending(kind)))
    }

    async fn write_slot(&self, resume_id: Uuid, write: SlotWrite) -> Result<(), StoreError> {
        let mut resumes = self.resumes.write().await;
        let stored = resumes
            .get_mut(&resume_id)
            .ok_or(StoreError::ResumeMissing(resume_id))?;
        let kind = write.kind();
        stored
            .slots
            .entry(kind)
            .or_insert_with(|| AnalysisSlot::pending(kind))
            .apply(write, Utc::now());
        Ok(())
    }
}
