//! Axum route handlers for the chat agent and the direct job-match score.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::agent::ats::{self, AtsReport};
use crate::agent::AgentReply;
use crate::auth::{load_owned_resume, CallerId};
use crate::errors::{AppError, AppJson};
use crate::models::analysis::{AnalysisKind, AnalysisResult, AnalysisStatus};
use crate::state::AppState;
use crate::storage::ResumeStore;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub resume_id: Option<Uuid>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AtsMatchRequest {
    pub resume_id: Option<Uuid>,
    #[serde(default)]
    pub job_description: String,
}

/// POST /api/v1/agent/chat
///
/// Lets the model pick one tool for the message and returns that tool's output.
/// Read-only with respect to the resume.
pub async fn handle_chat(
    State(state): State<AppState>,
    caller: CallerId,
    AppJson(request): AppJson<ChatRequest>,
) -> Result<Json<AgentReply>, AppError> {
    let resume_id = request
        .resume_id
        .ok_or_else(|| AppError::Validation("resume_id is required".to_string()))?;
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let resume = load_owned_resume(state.store.as_ref(), caller, resume_id).await?;
    let analyses = completed_analyses(state.store.as_ref(), resume_id).await?;
    let reply = state
        .agent
        .respond(&request.message, &resume.content, &analyses)
        .await?;

    Ok(Json(reply))
}

/// POST /api/v1/ats-match
///
/// Scores the caller's resume against a job description. Computed locally and
/// answered synchronously; nothing is stored.
pub async fn handle_ats_match(
    State(state): State<AppState>,
    caller: CallerId,
    AppJson(request): AppJson<AtsMatchRequest>,
) -> Result<Json<AtsReport>, AppError> {
    let resume_id = request
        .resume_id
        .ok_or_else(|| AppError::Validation("resume_id is required".to_string()))?;
    let job_description = request.job_description.trim();
    if job_description.is_empty() {
        return Err(AppError::Validation("job_description cannot be empty".to_string()));
    }

    let resume = load_owned_resume(state.store.as_ref(), caller, resume_id).await?;
    Ok(Json(ats::score(&resume.content, job_description)))
}

/// Results of every slot that currently reads `completed`, in kind order.
async fn completed_analyses(
    store: &dyn ResumeStore,
    resume_id: Uuid,
) -> Result<Vec<AnalysisResult>, AppError> {
    let mut analyses = Vec::new();
    for kind in AnalysisKind::ALL {
        let slot = store.load_slot(resume_id, kind).await?;
        if slot.status == AnalysisStatus::Completed {
            analyses.extend(slot.result);
        }
    }
    Ok(analyses)
}
