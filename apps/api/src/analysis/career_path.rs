//! Career-path prediction. The model answers with a JSON object; anything
//! unreadable falls back to a single "Senior <role>" guess.

use serde_json::{Map, Value};

use crate::analysis::parser::{self, ParseError};
use crate::analysis::prompts::CAREER_PATH_PROMPT_TEMPLATE;
use crate::llm_client::prompts::{fill_template, JSON_OBJECT_INSTRUCTION};
use crate::models::analysis::{CareerPathResult, PredictedPath, ResultSource};
use crate::models::resume::ResumeContent;

const UNKNOWN_ROLE: &str = "Unknown";
const FALLBACK_CONFIDENCE: f64 = 75.0;
const FALLBACK_TIMELINE: &str = "2-3 years";

/// The resume facts the prompt and the fallback are built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CareerProfile {
    pub current_role: String,
    pub experience_count: usize,
    pub skills: Vec<String>,
    pub degrees: Vec<String>,
}

impl CareerProfile {
    pub fn from_resume(content: &ResumeContent) -> Self {
        let role = content.job_title.trim();
        Self {
            current_role: if role.is_empty() { UNKNOWN_ROLE.to_string() } else { role.to_string() },
            experience_count: content.experience.len(),
            skills: content.skill_names(),
            degrees: content
                .education
                .iter()
                .map(|e| e.degree.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }
}

pub fn build_prompt(profile: &CareerProfile) -> String {
    fill_template(
        CAREER_PATH_PROMPT_TEMPLATE,
        &[
            ("format_instruction", JSON_OBJECT_INSTRUCTION),
            ("experience_count", &profile.experience_count.to_string()),
            ("current_role", &profile.current_role),
            ("skills", &profile.skills.join(", ")),
            ("education", &profile.degrees.join(", ")),
        ],
    )
}

pub fn parse_prediction(text: &str) -> Result<CareerPathResult, ParseError> {
    let object = parser::first_object(text)?;
    Ok(CareerPathResult {
        predicted_paths: read_paths(object.get("predictedPaths")),
        skill_gaps: parser::string_list(object.get("skillGaps")),
        timeline: parser::text(object.get("timeline")),
        source: ResultSource::Model,
    })
}

fn read_paths(value: Option<&Value>) -> Vec<PredictedPath> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(read_path)
        .collect()
}

fn read_path(path: &Map<String, Value>) -> PredictedPath {
    PredictedPath {
        role: parser::text(path.get("role")),
        confidence: parser::number(path.get("confidence")),
        reasoning: parser::text(path.get("reasoning")),
        next_steps: parser::string_list(path.get("nextSteps")),
    }
}

pub fn fallback_prediction(profile: &CareerProfile) -> CareerPathResult {
    CareerPathResult {
        predicted_paths: vec![PredictedPath {
            role: format!("Senior {}", profile.current_role),
            confidence: Some(FALLBACK_CONFIDENCE),
            reasoning: "Based on experience and skills".to_string(),
            next_steps: vec![
                "Gain more experience".to_string(),
                "Learn advanced skills".to_string(),
                "Network in the field".to_string(),
            ],
        }],
        skill_gaps: vec![
            "Advanced technical skills".to_string(),
            "Leadership skills".to_string(),
        ],
        timeline: FALLBACK_TIMELINE.to_string(),
        source: ResultSource::Fallback,
    }
}
