//! Integrity audit: keyword stuffing and date-order checks.
//!
//! The model is asked for a JSON report. When its answer cannot be read, a
//! local heuristic counts watched keywords and flags experience entries whose
//! start date is after their end date.

use chrono::NaiveDate;
use serde_json::Value;

use crate::analysis::parser::{self, ParseError};
use crate::analysis::prompts::INTEGRITY_PROMPT_TEMPLATE;
use crate::llm_client::prompts::{fill_template, JSON_OBJECT_INSTRUCTION};
use crate::models::analysis::{Inconsistency, IntegrityResult, ResultSource};
use crate::models::resume::ResumeContent;

const WATCHED_KEYWORDS: [&str; 5] = ["javascript", "python", "react", "node", "sql"];
const SKILL_REPEAT_LIMIT: usize = 3;
const EXPERIENCE_REPEAT_LIMIT: usize = 5;
const STUFFING_PENALTY: f64 = 20.0;
const INCONSISTENCY_PENALTY: f64 = 10.0;

pub fn build_prompt(content: &ResumeContent) -> String {
    let mut resume_text = format!(
        "{} {}\n{}\n",
        content.first_name, content.last_name, content.summary
    );
    for exp in &content.experience {
        resume_text.push_str(&exp.work_summary);
        resume_text.push('\n');
    }
    for skill in &content.skills {
        resume_text.push_str(&skill.name);
        resume_text.push('\n');
    }

    fill_template(
        INTEGRITY_PROMPT_TEMPLATE,
        &[
            ("format_instruction", JSON_OBJECT_INSTRUCTION),
            ("resume_text", &resume_text),
        ],
    )
}

pub fn parse_report(text: &str) -> Result<IntegrityResult, ParseError> {
    let object = parser::first_object(text)?;
    let inconsistencies = match object.get("inconsistencies") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|item| Inconsistency {
                kind: parser::text(item.get("type")),
                description: parser::text(item.get("description")),
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(IntegrityResult {
        keyword_stuffing_score: parser::number(object.get("keywordStuffingScore")),
        inconsistencies,
        overall_score: parser::number(object.get("overallScore")),
        source: ResultSource::Model,
    })
}

pub fn heuristic_report(content: &ResumeContent) -> IntegrityResult {
    let skills_text = content
        .skills
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let experience_text = content
        .experience
        .iter()
        .map(|e| e.work_summary.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut stuffing = 0.0;
    let mut inconsistencies = Vec::new();

    for keyword in WATCHED_KEYWORDS {
        let in_skills = skills_text.matches(keyword).count();
        let in_experience = experience_text.matches(keyword).count();
        if in_skills > SKILL_REPEAT_LIMIT || in_experience > EXPERIENCE_REPEAT_LIMIT {
            stuffing += STUFFING_PENALTY;
            inconsistencies.push(Inconsistency {
                kind: "keyword_stuffing".to_string(),
                description: format!(
                    "Keyword \"{keyword}\" appears excessively ({} times)",
                    in_skills + in_experience
                ),
            });
        }
    }

    for (index, exp) in content.experience.iter().enumerate() {
        let start = exp.start_date.as_deref().and_then(parse_loose_date);
        let end = exp.end_date.as_deref().and_then(parse_loose_date);
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                inconsistencies.push(Inconsistency {
                    kind: "date_inconsistency".to_string(),
                    description: format!("Experience {}: Start date is after end date", index + 1),
                });
            }
        }
    }

    let overall = (100.0 - stuffing - INCONSISTENCY_PENALTY * inconsistencies.len() as f64).max(0.0);
    IntegrityResult {
        keyword_stuffing_score: Some(stuffing),
        inconsistencies,
        overall_score: Some(overall),
        source: ResultSource::Fallback,
    }
}

/// Accepts full dates, year-month and bare years. Anything else is ignored.
fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    if let Some(date) = raw
        .get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
    {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    raw.parse::<i32>()
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
}
