//! Chat tool agent.
//!
//! The gateway picks one tool for a chat message; the decision is decoded into
//! the closed `ToolCall` union, so an unknown tool name is rejected at decode
//! time rather than looked up at run time. Dispatch is a total `match`. The
//! agent reads the resume and its completed analyses but never writes either.

pub mod ats;
pub mod handlers;
pub mod prompts;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::agent::ats::AtsReport;
use crate::agent::prompts::{AGENT_SYSTEM_PROMPT, REWRITE_PROMPT_TEMPLATE};
use crate::analysis::parser::{self, ParseError};
use crate::analysis::skill_gap::{self, DEFAULT_TARGET_ROLE};
use crate::errors::AppError;
use crate::llm_client::prompts::fill_template;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::analysis::{AnalysisResult, SkillGapResult};
use crate::models::resume::ResumeContent;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("gateway call failed: {0}")]
    Gateway(#[from] LlmError),

    #[error("no tool decision in model output: {0}")]
    NoDecision(#[from] ParseError),

    #[error("invalid tool call: {0}")]
    InvalidTool(#[from] serde_json::Error),
}

impl From<AgentError> for AppError {
    fn from(e: AgentError) -> Self {
        match e {
            AgentError::Gateway(e) => AppError::Llm(e.to_string()),
            other => AppError::UnprocessableEntity(other.to_string()),
        }
    }
}

/// The closed set of tools the model may choose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum ToolCall {
    RewriteResumeSection {
        text: String,
        #[serde(alias = "targetRole")]
        target_role: String,
    },
    AtsMatch {
        #[serde(alias = "jobDescription")]
        job_description: String,
    },
    SkillGapAnalysis {
        #[serde(default, alias = "targetRole")]
        target_role: Option<String>,
    },
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::RewriteResumeSection { .. } => "rewrite_resume_section",
            ToolCall::AtsMatch { .. } => "ats_match",
            ToolCall::SkillGapAnalysis { .. } => "skill_gap_analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolOutput {
    Rewrite { before: String, after: String },
    AtsMatch(AtsReport),
    SkillGap(SkillGapResult),
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReply {
    pub agent_decision: &'static str,
    pub result: ToolOutput,
}

#[derive(Clone)]
pub struct ResumeAgent {
    gateway: Arc<dyn TextGenerator>,
}

impl ResumeAgent {
    pub fn new(gateway: Arc<dyn TextGenerator>) -> Self {
        Self { gateway }
    }

    /// `analyses` are the completed slot results shown to the model as context.
    pub async fn respond(
        &self,
        message: &str,
        resume: &ResumeContent,
        analyses: &[AnalysisResult],
    ) -> Result<AgentReply, AgentError> {
        let call = self.decide(message, resume, analyses).await?;
        info!(tool = call.name(), "Agent selected tool");
        let agent_decision = call.name();
        let result = self.execute(call, resume).await?;
        Ok(AgentReply {
            agent_decision,
            result,
        })
    }

    /// Asks the gateway which tool to run and decodes its answer.
    pub async fn decide(
        &self,
        message: &str,
        resume: &ResumeContent,
        analyses: &[AnalysisResult],
    ) -> Result<ToolCall, AgentError> {
        let context = resume_context(resume, analyses);
        let system = fill_template(AGENT_SYSTEM_PROMPT, &[("resume_context", &context)]);
        let text = self.gateway.generate_with_system(&system, message).await?;
        let decision = parser::first_object(&text)?;
        Ok(serde_json::from_value(Value::Object(decision))?)
    }

    pub async fn execute(
        &self,
        call: ToolCall,
        resume: &ResumeContent,
    ) -> Result<ToolOutput, AgentError> {
        match call {
            ToolCall::RewriteResumeSection { text, target_role } => {
                let prompt = fill_template(
                    REWRITE_PROMPT_TEMPLATE,
                    &[("target_role", &target_role), ("text", &text)],
                );
                let after = self.gateway.generate(&prompt).await?;
                Ok(ToolOutput::Rewrite {
                    before: text,
                    after: after.trim().to_string(),
                })
            }
            ToolCall::AtsMatch { job_description } => {
                Ok(ToolOutput::AtsMatch(ats::score(resume, &job_description)))
            }
            ToolCall::SkillGapAnalysis { target_role } => {
                let role = target_role
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| DEFAULT_TARGET_ROLE.to_string());
                let mut rng = StdRng::from_entropy();
                Ok(ToolOutput::SkillGap(skill_gap::analyze(resume, &role, &mut rng)))
            }
        }
    }
}

/// Plain-text summary of the resume handed to the model alongside the tool
/// list, followed by one block per completed analysis.
fn resume_context(resume: &ResumeContent, analyses: &[AnalysisResult]) -> String {
    let experience = resume
        .experience
        .iter()
        .map(|e| e.work_summary.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let projects = resume
        .projects
        .iter()
        .map(|p| format!("{}: {} (Tech: {})", p.project_name, p.project_summary, p.tech_stack))
        .collect::<Vec<_>>()
        .join("\n");
    let mut context = format!(
        "Summary:\n{}\n\nExperience:\n{}\n\nSkills:\n{}\n\nProjects:\n{}\n",
        resume.summary,
        experience,
        resume.skill_names().join(", "),
        projects
    );
    for analysis in analyses {
        context.push('\n');
        context.push_str(&analysis_context(analysis));
    }
    context
}

fn analysis_context(analysis: &AnalysisResult) -> String {
    match analysis {
        AnalysisResult::SkillGap(r) => format!(
            "Skill Gap Analysis:\nTarget Role: {}\nMissing Skills: {}\nTarget Match: {}%\n",
            r.target_role,
            r.missing_skills.join(", "),
            r.target_match
        ),
        AnalysisResult::Heatmap(r) => {
            let path = r
                .eye_movement_path
                .iter()
                .map(|stop| format!("{:?}: {}s", stop.section, stop.duration_secs).to_lowercase())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Resume Heatmap:\nEye Movement Path: {path}\nFormatting Score: {}\n",
                r.formatting_score
            )
        }
        AnalysisResult::RagTailoring(r) => {
            let bullets = r
                .tailored_bullet_points
                .iter()
                .map(|b| format!("Original: {}, Tailored: {}", b.original, b.tailored))
                .collect::<Vec<_>>()
                .join("\n");
            format!("Tailored Bullet Points:\n{bullets}\n")
        }
        AnalysisResult::Quantification(r) => {
            let bullets = r
                .quantified_bullet_points
                .iter()
                .map(|b| format!("Original: {}, Quantified: {}", b.original, b.quantified))
                .collect::<Vec<_>>()
                .join("\n");
            format!("Quantified Bullet Points:\n{bullets}\n")
        }
        AnalysisResult::CareerPath(r) => {
            let roles = r
                .predicted_paths
                .iter()
                .map(|p| p.role.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Career Path:\nPredicted Roles: {roles}\nSkill Gaps: {}\nTimeline: {}\n",
                r.skill_gaps.join(", "),
                r.timeline
            )
        }
        AnalysisResult::Integrity(r) => {
            let issues = r
                .inconsistencies
                .iter()
                .map(|i| i.description.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Integrity Check:\nKeyword Stuffing Score: {}\nInconsistencies: {issues}\nOverall Score: {}\n",
                optional_score(r.keyword_stuffing_score),
                optional_score(r.overall_score)
            )
        }
    }
}

fn optional_score(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}
