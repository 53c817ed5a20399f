//! Analysis slots: the per-type status + result sub-records stored on each resume.
//!
//! A slot is only ever written through a `SlotWrite`, which names exactly one kind,
//! so a write for one analysis type can never touch another type's fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Kinds and statuses
// ────────────────────────────────────────────────────────────────────────────

/// The closed set of analysis types. One slot per kind per resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    SkillGap,
    Heatmap,
    RagTailoring,
    Quantification,
    CareerPath,
    Integrity,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 6] = [
        AnalysisKind::SkillGap,
        AnalysisKind::Heatmap,
        AnalysisKind::RagTailoring,
        AnalysisKind::Quantification,
        AnalysisKind::CareerPath,
        AnalysisKind::Integrity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::SkillGap => "skill-gap",
            AnalysisKind::Heatmap => "heatmap",
            AnalysisKind::RagTailoring => "rag-tailoring",
            AnalysisKind::Quantification => "quantification",
            AnalysisKind::CareerPath => "career-path",
            AnalysisKind::Integrity => "integrity",
        }
    }

    /// Whether a run of this kind makes a call to the text-generation gateway.
    pub fn uses_gateway(&self) -> bool {
        !matches!(self, AnalysisKind::SkillGap | AnalysisKind::Heatmap)
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown analysis kind '{s}'"))
    }
}

/// Slot lifecycle: `pending → processing → {completed | failed}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisStatus::Completed | AnalysisStatus::Failed)
    }
}

impl FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AnalysisStatus::Pending),
            "processing" => Ok(AnalysisStatus::Processing),
            "completed" => Ok(AnalysisStatus::Completed),
            "failed" => Ok(AnalysisStatus::Failed),
            other => Err(format!("unknown analysis status '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-type results
// ────────────────────────────────────────────────────────────────────────────

/// Where a model-backed result came from. Surfaced so callers can tell a
/// degraded heuristic answer from a model answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGapResult {
    pub target_role: String,
    /// Top missing skills, most in-demand first.
    pub missing_skills: Vec<String>,
    pub target_match: u8,
}

/// Resume sections in recruiter reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSection {
    Personal,
    Summary,
    Experience,
    Skills,
    Education,
    Projects,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingStop {
    pub section: ResumeSection,
    pub duration_secs: u32,
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapResult {
    pub eye_movement_path: Vec<ReadingStop>,
    pub formatting_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredBullet {
    pub original: String,
    pub tailored: String,
    pub job_description_excerpt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TailoringResult {
    pub tailored_bullet_points: Vec<TailoredBullet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantifiedBullet {
    pub original: String,
    pub quantified: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantificationResult {
    pub quantified_bullet_points: Vec<QuantifiedBullet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedPath {
    pub role: String,
    /// As reported by the model. Not range-checked.
    pub confidence: Option<f64>,
    pub reasoning: String,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerPathResult {
    pub predicted_paths: Vec<PredictedPath>,
    pub skill_gaps: Vec<String>,
    pub timeline: String,
    pub source: ResultSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inconsistency {
    /// keyword_stuffing | date_inconsistency | generic_content | other; free text from the model.
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityResult {
    pub keyword_stuffing_score: Option<f64>,
    pub inconsistencies: Vec<Inconsistency>,
    pub overall_score: Option<f64>,
    pub source: ResultSource,
}

/// A completed result for exactly one analysis kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AnalysisResult {
    SkillGap(SkillGapResult),
    Heatmap(HeatmapResult),
    RagTailoring(TailoringResult),
    Quantification(QuantificationResult),
    CareerPath(CareerPathResult),
    Integrity(IntegrityResult),
}

impl AnalysisResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisResult::SkillGap(_) => AnalysisKind::SkillGap,
            AnalysisResult::Heatmap(_) => AnalysisKind::Heatmap,
            AnalysisResult::RagTailoring(_) => AnalysisKind::RagTailoring,
            AnalysisResult::Quantification(_) => AnalysisKind::Quantification,
            AnalysisResult::CareerPath(_) => AnalysisKind::CareerPath,
            AnalysisResult::Integrity(_) => AnalysisKind::Integrity,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Slots
// ────────────────────────────────────────────────────────────────────────────

/// The status + result sub-record for one analysis kind on one resume.
///
/// `result` is only meaningful when `status == Completed`. A failed run leaves
/// the previous result and `last_analyzed` in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSlot {
    pub kind: AnalysisKind,
    pub status: AnalysisStatus,
    pub result: Option<AnalysisResult>,
    pub last_analyzed: Option<DateTime<Utc>>,
}

impl AnalysisSlot {
    pub fn pending(kind: AnalysisKind) -> Self {
        Self {
            kind,
            status: AnalysisStatus::Pending,
            result: None,
            last_analyzed: None,
        }
    }

    /// Applies a write in place. Callers guarantee `write.kind() == self.kind`.
    pub fn apply(&mut self, write: SlotWrite, now: DateTime<Utc>) {
        match write {
            SlotWrite::Processing(_) => self.status = AnalysisStatus::Processing,
            SlotWrite::Failed(_) => self.status = AnalysisStatus::Failed,
            SlotWrite::Completed(result) => {
                self.status = AnalysisStatus::Completed;
                self.result = Some(result);
                self.last_analyzed = Some(now);
            }
        }
    }
}

/// A single-slot mutation. The only way slot state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotWrite {
    /// Set by the dispatcher before a run is scheduled.
    Processing(AnalysisKind),
    /// Status only; result fields are left stale.
    Failed(AnalysisKind),
    /// Status, result and `last_analyzed` together.
    Completed(AnalysisResult),
}

impl SlotWrite {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            SlotWrite::Processing(kind) | SlotWrite::Failed(kind) => *kind,
            SlotWrite::Completed(result) => result.kind(),
        }
    }
}
