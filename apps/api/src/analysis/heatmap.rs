//! Recruiter-attention heatmap: a fixed reading model, no gateway call.
//!
//! Present sections are listed in reading order with a constant dwell time and
//! priority rank. The formatting score is a weighted presence sum capped at 100.

use crate::models::analysis::{HeatmapResult, ReadingStop, ResumeSection};
use crate::models::resume::ResumeContent;

const BASE_FORMATTING_SCORE: u32 = 50;
const MAX_FORMATTING_SCORE: u32 = 100;

impl ResumeSection {
    pub const READING_ORDER: [ResumeSection; 6] = [
        ResumeSection::Personal,
        ResumeSection::Summary,
        ResumeSection::Experience,
        ResumeSection::Skills,
        ResumeSection::Education,
        ResumeSection::Projects,
    ];

    /// Estimated recruiter dwell time in seconds.
    pub fn reading_secs(self) -> u32 {
        match self {
            ResumeSection::Personal => 8,
            ResumeSection::Summary => 15,
            ResumeSection::Experience => 25,
            ResumeSection::Skills => 12,
            ResumeSection::Education => 10,
            ResumeSection::Projects => 8,
        }
    }

    pub fn priority(self) -> u8 {
        match self {
            ResumeSection::Personal => 1,
            ResumeSection::Summary => 2,
            ResumeSection::Experience => 3,
            ResumeSection::Skills => 4,
            ResumeSection::Education => 5,
            ResumeSection::Projects => 6,
        }
    }

    fn is_present(self, content: &ResumeContent) -> bool {
        match self {
            ResumeSection::Personal => {
                !content.first_name.trim().is_empty()
                    || !content.last_name.trim().is_empty()
                    || !content.job_title.trim().is_empty()
            }
            ResumeSection::Summary => !content.summary.trim().is_empty(),
            ResumeSection::Experience => !content.experience.is_empty(),
            ResumeSection::Skills => !content.skills.is_empty(),
            ResumeSection::Education => !content.education.is_empty(),
            ResumeSection::Projects => !content.projects.is_empty(),
        }
    }

    /// Formatting points this section earns. Personal details only count with a full name.
    fn formatting_points(self, content: &ResumeContent) -> u32 {
        match self {
            ResumeSection::Personal if content.has_name() => 10,
            ResumeSection::Personal => 0,
            section if !section.is_present(content) => 0,
            ResumeSection::Summary => 15,
            ResumeSection::Experience => 15,
            ResumeSection::Skills => 10,
            ResumeSection::Education => 10,
            ResumeSection::Projects => 5,
        }
    }
}

pub fn analyze(content: &ResumeContent) -> HeatmapResult {
    let eye_movement_path = ResumeSection::READING_ORDER
        .into_iter()
        .filter(|section| section.is_present(content))
        .map(|section| ReadingStop {
            section,
            duration_secs: section.reading_secs(),
            priority: section.priority(),
        })
        .collect();

    let formatting_score = ResumeSection::READING_ORDER
        .into_iter()
        .map(|section| section.formatting_points(content))
        .sum::<u32>()
        + BASE_FORMATTING_SCORE;

    HeatmapResult {
        eye_movement_path,
        formatting_score: formatting_score.min(MAX_FORMATTING_SCORE),
    }
}
