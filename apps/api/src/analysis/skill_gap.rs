//! Skill-gap analysis: purely local, no gateway call.
//!
//! A synthetic sample of role-tagged postings stands in for a real job corpus.
//! The sampling is random; the ranking over a given sample is deterministic
//! (frequency descending, then name ascending).

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::analysis::SkillGapResult;
use crate::models::resume::ResumeContent;

pub const DEFAULT_TARGET_ROLE: &str = "software engineer";
/// Reported alongside every result; the sample has no notion of a real match rate.
pub const TARGET_MATCH: u8 = 90;
pub const SAMPLE_SIZE: usize = 1000;
pub const TOP_MISSING: usize = 3;
const MIN_SKILLS_PER_POSTING: usize = 5;
const MAX_SKILLS_PER_POSTING: usize = 8;

const SOFTWARE_ENGINEER_SKILLS: &[&str] = &[
    "JavaScript", "Python", "React", "Node.js", "SQL", "Git", "AWS", "Docker",
    "TypeScript", "MongoDB", "Express.js", "REST APIs", "Agile", "CI/CD",
    "Kubernetes", "Microservices", "GraphQL", "Redis", "Linux", "Testing",
];

const DATA_SCIENTIST_SKILLS: &[&str] = &[
    "Python", "R", "SQL", "Machine Learning", "Pandas", "NumPy", "Scikit-learn",
    "TensorFlow", "Statistics", "Data Visualization", "Jupyter", "Git",
    "AWS", "Tableau", "Power BI", "Hadoop", "Spark", "Deep Learning",
];

const PRODUCT_MANAGER_SKILLS: &[&str] = &[
    "Product Strategy", "Agile", "Scrum", "User Research", "Analytics",
    "SQL", "Data Analysis", "Roadmapping", "Stakeholder Management",
    "A/B Testing", "Market Research", "Prototyping", "Jira", "Figma",
];

/// One synthetic job posting.
#[derive(Debug, Clone)]
pub struct SyntheticPosting {
    pub required_skills: Vec<&'static str>,
}

/// Skill pool for a role. Unknown roles use the software engineer pool.
pub fn skill_pool(target_role: &str) -> &'static [&'static str] {
    match target_role.trim().to_lowercase().as_str() {
        "data scientist" => DATA_SCIENTIST_SKILLS,
        "product manager" => PRODUCT_MANAGER_SKILLS,
        _ => SOFTWARE_ENGINEER_SKILLS,
    }
}

/// Draws `count` postings, each requiring 5–8 distinct skills from the role pool.
pub fn sample_postings<R: Rng + ?Sized>(
    target_role: &str,
    count: usize,
    rng: &mut R,
) -> Vec<SyntheticPosting> {
    let pool = skill_pool(target_role);
    let max = MAX_SKILLS_PER_POSTING.min(pool.len());
    let min = MIN_SKILLS_PER_POSTING.min(max);

    (0..count)
        .map(|_| {
            let n = rng.gen_range(min..=max);
            SyntheticPosting {
                required_skills: pool.choose_multiple(rng, n).copied().collect(),
            }
        })
        .collect()
}

/// Ranks skills the resume lacks by how many postings ask for them.
/// Matching is case-insensitive; the pool's spelling is returned.
pub fn rank_missing_skills(
    current_skills: &[String],
    postings: &[SyntheticPosting],
    limit: usize,
) -> Vec<String> {
    let have: HashSet<String> = current_skills.iter().map(|s| s.to_lowercase()).collect();

    let mut frequency: HashMap<String, (&'static str, usize)> = HashMap::new();
    for posting in postings {
        for skill in &posting.required_skills {
            let key = skill.to_lowercase();
            if have.contains(&key) {
                continue;
            }
            frequency.entry(key).or_insert((*skill, 0)).1 += 1;
        }
    }

    let mut ranked: Vec<(&'static str, usize)> = frequency.into_values().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Runs the full analysis over a freshly drawn sample.
pub fn analyze<R: Rng + ?Sized>(
    content: &ResumeContent,
    target_role: &str,
    rng: &mut R,
) -> SkillGapResult {
    let postings = sample_postings(target_role, SAMPLE_SIZE, rng);
    SkillGapResult {
        target_role: target_role.to_string(),
        missing_skills: rank_missing_skills(&content.skill_names(), &postings, TOP_MISSING),
        target_match: TARGET_MATCH,
    }
}
