use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::analysis::{AnalysisKind, AnalysisResult, AnalysisSlot, AnalysisStatus, SlotWrite};
use crate::models::resume::{Resume, ResumeRow};
use crate::storage::{ResumeStore, StoreError};

/// Postgres-backed store. Each slot is one row in `resume_analyses`, so a slot
/// write is a single-row upsert and never overwrites a sibling slot.
#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SlotRow {
    status: String,
    result: Option<Json<AnalysisResult>>,
    last_analyzed: Option<DateTime<Utc>>,
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn load_resume(&self, resume_id: Uuid) -> Result<Option<Resume>, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            "SELECT id, user_id, title, content FROM resumes WHERE id = $1",
        )
        .bind(resume_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Resume::from))
    }

    async fn load_slot(
        &self,
        resume_id: Uuid,
        kind: AnalysisKind,
    ) -> Result<AnalysisSlot, StoreError> {
        let row = sqlx::query_as::<_, SlotRow>(
            "SELECT status, result, last_analyzed FROM resume_analyses WHERE resume_id = $1 AND kind = $2",
        )
        .bind(resume_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(AnalysisSlot::pending(kind));
        };

        let status = row
            .status
            .parse::<AnalysisStatus>()
            .map_err(StoreError::Corrupt)?;

        Ok(AnalysisSlot {
            kind,
            status,
            result: row.result.map(|r| r.0),
            last_analyzed: row.last_analyzed,
        })
    }

    async fn write_slot(&self, resume_id: Uuid, write: SlotWrite) -> Result<(), StoreError> {
        let kind = write.kind();
        let (status, result) = match write {
            SlotWrite::Processing(_) => (AnalysisStatus::Processing, None),
            SlotWrite::Failed(_) => (AnalysisStatus::Failed, None),
            SlotWrite::Completed(result) => (AnalysisStatus::Completed, Some(result)),
        };

        match result {
            // Status only: result and last_analyzed stay as they were.
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO resume_analyses (resume_id, kind, status)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (resume_id, kind)
                    DO UPDATE SET status = EXCLUDED.status, updated_at = now()
                    "#,
                )
                .bind(resume_id)
                .bind(kind.as_str())
                .bind(status.as_str())
                .execute(&self.pool)
                .await?;
            }
            Some(result) => {
                sqlx::query(
                    r#"
                    INSERT INTO resume_analyses (resume_id, kind, status, result, last_analyzed)
                    VALUES ($1, $2, $3, $4, now())
                    ON CONFLICT (resume_id, kind)
                    DO UPDATE SET status = EXCLUDED.status,
                                  result = EXCLUDED.result,
                                  last_analyzed = EXCLUDED.last_analyzed,
                                  updated_at = now()
                    "#,
                )
                .bind(resume_id)
                .bind(kind.as_str())
                .bind(status.as_str())
                .bind(Json(result))
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }
}
