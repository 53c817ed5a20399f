//! Bullet quantification: the model adds metrics to caller-supplied bullets.

use serde::Deserialize;

use crate::analysis::parser::{self, ParseError};
use crate::analysis::prompts::{numbered_list, QUANTIFICATION_PROMPT_TEMPLATE};
use crate::llm_client::prompts::{fill_template, NUMBERED_LINES_INSTRUCTION};
use crate::models::analysis::{QuantificationResult, QuantifiedBullet};

/// Bullets as sent by the client: one newline-separated string or a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BulletInput {
    Text(String),
    List(Vec<String>),
}

impl BulletInput {
    /// Trimmed, non-blank bullets in order.
    pub fn into_bullets(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            BulletInput::Text(text) => text.lines().map(String::from).collect(),
            BulletInput::List(items) => items,
        };
        raw.into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect()
    }
}

pub fn build_prompt(bullets: &[String]) -> String {
    fill_template(
        QUANTIFICATION_PROMPT_TEMPLATE,
        &[
            ("format_instruction", NUMBERED_LINES_INSTRUCTION),
            ("bullets", &numbered_list(bullets)),
        ],
    )
}

pub fn assemble(bullets: &[String], text: &str) -> Result<QuantificationResult, ParseError> {
    let lines = parser::numbered_lines(text)?;
    Ok(QuantificationResult {
        quantified_bullet_points: parser::pair_positionally(bullets, lines, |original, quantified| {
            QuantifiedBullet {
                original: original.to_string(),
                quantified,
            }
        }),
    })
}
