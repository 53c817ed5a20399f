//! ATS keyword match: scores a resume against a job description without a model call.
//!
//! Algorithm:
//! 1. Extract keywords from the job description: lowercase word tokens, stop
//!    words and short tokens dropped, counted by frequency. Tokens in the first
//!    line (usually the title) are weighted 1.0, the rest 0.6.
//! 2. For each keyword:
//!    - exact skill-name match → strength 1.0
//!    - substring of the resume text → strength 0.6
//!    - otherwise → 0.0
//! 3. match_percentage = Σ(strength × weight) / Σ(weight) × 100
//! 4. Keywords below 0.4 are reported as missing.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::resume::ResumeContent;

const MAX_KEYWORDS: usize = 25;
const MIN_KEYWORD_LEN: usize = 3;
const TITLE_WEIGHT: f32 = 1.0;
const BODY_WEIGHT: f32 = 0.6;

const STOP_WORDS: &[&str] = &[
    "about", "across", "and", "are", "as", "at", "be", "but", "by", "can", "for", "from", "have",
    "help", "in", "into", "is", "it", "our", "of", "on", "or", "plus", "that", "the", "their",
    "this", "to", "we", "what", "who", "will", "with", "work", "you", "your", "years", "year",
    "experience", "team", "role", "strong", "ability", "skills", "required", "preferred", "must",
    "nice", "like", "looking", "join", "using", "all", "an", "has", "more", "new", "other",
    "such", "well", "within", "would", "etc", "including",
];

/// A single keyword from the job description, weighted by position and frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub frequency: u32,
    pub weighted_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub strength: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtsReport {
    pub match_percentage: u32,
    pub matched_keywords: Vec<KeywordMatch>,
    pub missing_keywords: Vec<String>,
    pub recommendation: String,
}

pub fn extract_keywords(job_description: &str) -> Vec<KeywordEntry> {
    let mut counts: HashMap<String, (u32, f32)> = HashMap::new();

    for (line_no, line) in job_description.trim().lines().enumerate() {
        let weight = if line_no == 0 { TITLE_WEIGHT } else { BODY_WEIGHT };
        for token in tokens(line) {
            let entry = counts.entry(token).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 = entry.1.max(weight);
        }
    }

    let mut keywords: Vec<KeywordEntry> = counts
        .into_iter()
        .map(|(keyword, (frequency, weight))| KeywordEntry {
            keyword,
            frequency,
            weighted_score: frequency as f32 * weight,
        })
        .collect();
    keywords.sort_by(|a, b| {
        b.weighted_score
            .total_cmp(&a.weighted_score)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    keywords.truncate(MAX_KEYWORDS);
    keywords
}

fn tokens(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.').to_lowercase())
        .filter(|t| {
            t.chars().count() >= MIN_KEYWORD_LEN
                || t.contains(|c: char| c == '+' || c == '#')
                || matches!(t.as_str(), "go" | "c" | "r")
        })
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
}

/// Flattens the resume into the lowercase text that keywords are matched against.
fn resume_text(content: &ResumeContent) -> String {
    let mut parts = vec![content.job_title.as_str(), content.summary.as_str()];
    for exp in &content.experience {
        parts.push(&exp.title);
        parts.push(&exp.work_summary);
    }
    for project in &content.projects {
        parts.push(&project.project_name);
        parts.push(&project.tech_stack);
        parts.push(&project.project_summary);
    }
    for education in &content.education {
        parts.push(&education.degree);
        parts.push(&education.major);
    }
    parts.join("\n").to_lowercase()
}

pub fn score(content: &ResumeContent, job_description: &str) -> AtsReport {
    let keywords = extract_keywords(job_description);

    if keywords.is_empty() {
        return AtsReport {
            match_percentage: 0,
            matched_keywords: vec![],
            missing_keywords: vec![],
            recommendation: "No keywords found in the job description, cannot score the match."
                .to_string(),
        };
    }

    let skills: Vec<String> = content
        .skill_names()
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();
    let text = resume_text(content);

    let mut matched_keywords = Vec::new();
    let mut missing_keywords = Vec::new();
    let mut total_weighted = 0.0_f32;
    let mut total_score = 0.0_f32;

    for entry in &keywords {
        let strength = if skills.iter().any(|s| *s == entry.keyword) {
            1.0
        } else if text.contains(&entry.keyword) {
            0.6
        } else {
            0.0
        };

        total_weighted += entry.weighted_score;
        total_score += strength * entry.weighted_score;

        if strength >= 0.4 {
            matched_keywords.push(KeywordMatch {
                keyword: entry.keyword.clone(),
                strength,
            });
        } else {
            missing_keywords.push(entry.keyword.clone());
        }
    }

    let match_percentage = if total_weighted > 0.0 {
        ((total_score / total_weighted) * 100.0).round() as u32
    } else {
        0
    };

    AtsReport {
        match_percentage,
        recommendation: build_recommendation(match_percentage, &missing_keywords),
        matched_keywords,
        missing_keywords,
    }
}

fn build_recommendation(score: u32, missing: &[String]) -> String {
    let top: Vec<&str> = missing.iter().take(3).map(String::as_str).collect();

    if score >= 80 {
        "Strong match. Your resume already covers the key requirements.".to_string()
    } else if score >= 60 {
        format!(
            "Moderate match ({score}/100). Consider working in: {}.",
            top.join(", ")
        )
    } else {
        format!(
            "Low match ({score}/100). Missing keywords: {}. Tailor your bullets before applying.",
            top.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Experience, Skill};

    fn resume(skills: &[&str], summary: &str) -> ResumeContent {
        ResumeContent {
            skills: skills
                .iter()
                .map(|s| Skill { name: s.to_string(), rating: None })
                .collect(),
            experience: vec![Experience {
                work_summary: summary.to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_keywords_skip_stop_words_and_weight_the_title() {
        let keywords = extract_keywords("Rust Engineer\nWe use rust and kafka with the team");
        let names: Vec<_> = keywords.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(names[0], "rust");
        assert!(names.contains(&"kafka"));
        assert!(!names.contains(&"the"));
        assert!(!names.contains(&"we"));
        // title 1.0, counted twice
        assert_eq!(keywords[0].frequency, 2);
        assert_eq!(keywords[0].weighted_score, 2.0);
    }

    #[test]
    fn test_symbols_in_tech_names_survive() {
        let names: Vec<_> = extract_keywords("C++ and C# developer, Node.js")
            .into_iter()
            .map(|k| k.keyword)
            .collect();
        assert!(names.contains(&"c++".to_string()));
        assert!(names.contains(&"c#".to_string()));
        assert!(names.contains(&"node.js".to_string()));
    }

    #[test]
    fn test_skill_match_scores_strong() {
        let report = score(&resume(&["Rust", "Kafka"], ""), "Rust Kafka");
        assert_eq!(report.match_percentage, 100);
        assert!(report.missing_keywords.is_empty());
        assert!(report.recommendation.contains("Strong match"));
    }

    #[test]
    fn test_text_match_scores_partial() {
        let report = score(&resume(&[], "Ran kubernetes clusters"), "Kubernetes");
        assert_eq!(report.match_percentage, 60);
        assert_eq!(report.matched_keywords[0].strength, 0.6);
    }

    #[test]
    fn test_missing_keywords_are_listed() {
        let report = score(&resume(&["Python"], ""), "Rust engineer\nrust tokio");
        assert_eq!(report.match_percentage, 0);
        assert!(report.missing_keywords.contains(&"rust".to_string()));
        assert!(report.recommendation.contains("Low match"));
    }

    #[test]
    fn test_empty_job_description_scores_zero() {
        let report = score(&resume(&["Rust"], ""), "   ");
        assert_eq!(report.match_percentage, 0);
        assert!(report.matched_keywords.is_empty());
    }
}
