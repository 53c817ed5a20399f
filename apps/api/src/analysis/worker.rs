//! Analysis Worker: one run of one analysis kind, end to end.
//!
//! The dispatcher has already set the slot to `processing`. A run builds its
//! input from the resume snapshot taken at dispatch time, calls the gateway at
//! most once, parses the reply and writes exactly one terminal state:
//!
//! - gateway transport failure → `failed`, no retry;
//! - parse failure → the kind's documented fallback, still `completed`;
//! - storage failure on the final write → logged, the slot stays `processing`.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::request::AnalysisRequest;
use crate::analysis::{career_path, heatmap, integrity, quantification, skill_gap, tailoring};
use crate::config::AnalysisSettings;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::analysis::{
    AnalysisKind, AnalysisResult, QuantificationResult, SlotWrite, TailoringResult,
};
use crate::models::resume::ResumeContent;
use crate::storage::ResumeStore;

/// Identifies the single slot a job writes to.
pub type SlotKey = (Uuid, AnalysisKind);

/// Everything a run needs, captured when the request was accepted.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub resume_id: Uuid,
    pub request: AnalysisRequest,
    pub snapshot: ResumeContent,
}

impl AnalysisJob {
    pub fn kind(&self) -> AnalysisKind {
        self.request.kind()
    }

    pub fn key(&self) -> SlotKey {
        (self.resume_id, self.kind())
    }
}

/// Shared collaborators handed to every run.
#[derive(Clone)]
pub struct WorkerContext {
    pub store: Arc<dyn ResumeStore>,
    pub gateway: Arc<dyn TextGenerator>,
    pub settings: AnalysisSettings,
}

/// Runs the job and records its terminal state on the slot.
pub async fn run_analysis(ctx: &WorkerContext, job: &AnalysisJob) {
    let kind = job.kind();
    info!(resume_id = %job.resume_id, %kind, gateway = kind.uses_gateway(), "Analysis started");

    let write = match compute(ctx, job).await {
        Ok(result) => SlotWrite::Completed(result),
        Err(e) => {
            warn!(resume_id = %job.resume_id, %kind, error = %e, "Gateway call failed, marking analysis failed");
            SlotWrite::Failed(kind)
        }
    };
    let completed = matches!(write, SlotWrite::Completed(_));

    match ctx.store.write_slot(job.resume_id, write).await {
        Ok(()) => info!(resume_id = %job.resume_id, %kind, completed, "Analysis finished"),
        Err(e) => error!(resume_id = %job.resume_id, %kind, error = %e, "Failed to record analysis outcome"),
    }
}

/// Produces the result for one run. Only a gateway failure is an error.
async fn compute(ctx: &WorkerContext, job: &AnalysisJob) -> Result<AnalysisResult, LlmError> {
    let content = &job.snapshot;

    match &job.request {
        AnalysisRequest::SkillGap { target_role } => {
            tokio::time::sleep(ctx.settings.skill_gap_delay).await;
            let mut rng = StdRng::from_entropy();
            Ok(AnalysisResult::SkillGap(skill_gap::analyze(content, target_role, &mut rng)))
        }

        AnalysisRequest::Heatmap => {
            tokio::time::sleep(ctx.settings.heatmap_delay).await;
            Ok(AnalysisResult::Heatmap(heatmap::analyze(content)))
        }

        AnalysisRequest::RagTailoring { job_description } => {
            let bullets = tailoring::extract_bullets(content);
            if bullets.is_empty() {
                return Ok(AnalysisResult::RagTailoring(TailoringResult::default()));
            }
            let text = ctx
                .gateway
                .generate(&tailoring::build_prompt(job_description, &bullets))
                .await?;
            let result = tailoring::assemble(&bullets, &text, job_description).unwrap_or_else(|e| {
                warn!(resume_id = %job.resume_id, error = %e, "Unreadable tailoring output, storing no bullets");
                TailoringResult::default()
            });
            Ok(AnalysisResult::RagTailoring(result))
        }

        AnalysisRequest::Quantification { bullets } => {
            if bullets.is_empty() {
                return Ok(AnalysisResult::Quantification(QuantificationResult::default()));
            }
            let text = ctx.gateway.generate(&quantification::build_prompt(bullets)).await?;
            let result = quantification::assemble(bullets, &text).unwrap_or_else(|e| {
                warn!(resume_id = %job.resume_id, error = %e, "Unreadable quantification output, storing no bullets");
                QuantificationResult::default()
            });
            Ok(AnalysisResult::Quantification(result))
        }

        AnalysisRequest::CareerPath => {
            let profile = career_path::CareerProfile::from_resume(content);
            let text = ctx.gateway.generate(&career_path::build_prompt(&profile)).await?;
            let result = match career_path::parse_prediction(&text) {
                Ok(prediction) => prediction,
                Err(e) => {
                    warn!(resume_id = %job.resume_id, error = %e, "Unreadable career-path output, using fallback prediction");
                    career_path::fallback_prediction(&profile)
                }
            };
            Ok(AnalysisResult::CareerPath(result))
        }

        AnalysisRequest::Integrity => {
            let text = ctx.gateway.generate(&integrity::build_prompt(content)).await?;
            let result = match integrity::parse_report(&text) {
                Ok(report) => report,
                Err(e) => {
                    warn!(resume_id = %job.resume_id, error = %e, "Unreadable integrity output, using heuristic audit");
                    integrity::heuristic_report(content)
                }
            };
            Ok(AnalysisResult::Integrity(result))
        }
    }
}
