//! Axum route handlers for the six analysis route pairs.

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::analysis::poller::PollOutcome;
use crate::analysis::request::{AnalysisRequest, StartAnalysisBody};
use crate::auth::CallerId;
use crate::errors::{AppError, AppJson};
use crate::models::analysis::{AnalysisKind, AnalysisSlot, AnalysisStatus};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StartAnalysisResponse {
    pub resume_id: Uuid,
    pub kind: AnalysisKind,
    pub status: AnalysisStatus,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub id: Uuid,
    /// Optional long-poll window in milliseconds.
    pub wait_ms: Option<u64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyses/:kind
///
/// Validates the body, checks ownership and schedules the run. Answers 202 as
/// soon as the slot reads `processing`.
pub async fn handle_start_analysis(
    State(state): State<AppState>,
    caller: CallerId,
    Path(kind): Path<AnalysisKind>,
    AppJson(body): AppJson<StartAnalysisBody>,
) -> Result<(StatusCode, Json<StartAnalysisResponse>), AppError> {
    let (resume_id, request) = AnalysisRequest::from_body(kind, body)?;
    let status = state.dispatcher.start(caller, resume_id, request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(StartAnalysisResponse {
            resume_id,
            kind,
            status,
        }),
    ))
}

/// GET /api/v1/analyses/:kind?id=<resume_id>[&wait_ms=N]
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    caller: CallerId,
    Path(kind): Path<AnalysisKind>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<AnalysisSlot>, AppError> {
    let slot = match query.wait_ms.filter(|ms| *ms > 0) {
        None => state.poller.get(caller, query.id, kind).await?,
        Some(ms) => {
            let outcome = state
                .poller
                .wait(caller, query.id, kind, Duration::from_millis(ms))
                .await?;
            if let PollOutcome::TimedOut(slot) = &outcome {
                debug!(resume_id = %query.id, %kind, status = slot.status.as_str(), "Poll window elapsed");
            }
            outcome.into_slot()
        }
    };
    Ok(Json(slot))
}
