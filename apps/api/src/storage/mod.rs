//! Resume Store: the durable per-user document the analysis pipeline reads
//! snapshots from and writes slot outcomes to.
//!
//! Resume CRUD lives elsewhere; this trait only exposes what the pipeline needs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::analysis::{AnalysisKind, AnalysisSlot, SlotWrite};
use crate::models::resume::Resume;

pub use memory::InMemoryResumeStore;
pub use postgres::PgResumeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("resume {0} no longer exists")]
    ResumeMissing(Uuid),

    #[error("corrupt slot row: {0}")]
    Corrupt(String),
}

/// Storage seam for the analysis pipeline.
///
/// Carried in `AppState` as `Arc<dyn ResumeStore>`. Every slot write touches
/// exactly one `(resume_id, kind)` slot and is applied atomically.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn load_resume(&self, resume_id: Uuid) -> Result<Option<Resume>, StoreError>;

    /// Returns the slot as stored. A slot that was never written reads as `pending`.
    async fn load_slot(
        &self,
        resume_id: Uuid,
        kind: AnalysisKind,
    ) -> Result<AnalysisSlot, StoreError>;

    async fn write_slot(&self, resume_id: Uuid, write: SlotWrite) -> Result<(), StoreError>;
}
