//! Retrieval-augmented bullet tailoring.
//!
//! Bullets are the non-blank lines of every experience summary. The model
//! rewrites them against a job description and answers in numbered lines,
//! which are paired back with the originals by position.

use crate::analysis::parser::{self, ParseError};
use crate::analysis::prompts::{numbered_list, TAILORING_PROMPT_TEMPLATE};
use crate::llm_client::prompts::{fill_template, NUMBERED_LINES_INSTRUCTION};
use crate::models::analysis::{TailoredBullet, TailoringResult};
use crate::models::resume::ResumeContent;

const EXCERPT_CHARS: usize = 100;

pub fn extract_bullets(content: &ResumeContent) -> Vec<String> {
    content
        .experience
        .iter()
        .flat_map(|exp| exp.work_summary.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

pub fn build_prompt(job_description: &str, bullets: &[String]) -> String {
    fill_template(
        TAILORING_PROMPT_TEMPLATE,
        &[
            ("format_instruction", NUMBERED_LINES_INSTRUCTION),
            ("bullets", &numbered_list(bullets)),
            ("job_description", job_description),
        ],
    )
}

/// First 100 characters of the job description followed by `...`.
pub fn excerpt(job_description: &str) -> String {
    let head: String = job_description.chars().take(EXCERPT_CHARS).collect();
    format!("{head}...")
}

/// Pairs the model's numbered lines with the original bullets.
pub fn assemble(
    bullets: &[String],
    text: &str,
    job_description: &str,
) -> Result<TailoringResult, ParseError> {
    let lines = parser::numbered_lines(text)?;
    let excerpt = excerpt(job_description);
    let tailored_bullet_points = parser::pair_positionally(bullets, lines, |original, tailored| {
        TailoredBullet {
            original: original.to_string(),
            tailored,
            job_description_excerpt: excerpt.clone(),
        }
    });
    Ok(TailoringResult {
        tailored_bullet_points,
    })
}
