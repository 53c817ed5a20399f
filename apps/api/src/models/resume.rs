use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A resume as the analysis pipeline sees it: ownership plus the editable document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: ResumeContent,
}

/// The document body. Written by the editor, read-only to the analysis pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeContent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub summary: String,
    pub job_title: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company_name: String,
    pub city: String,
    pub state: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub currently_working: bool,
    /// Free text, usually one bullet per line.
    pub work_summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub university_name: String,
    pub degree: String,
    pub major: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub name: String,
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub project_name: String,
    pub tech_stack: String,
    pub project_summary: String,
}

impl ResumeContent {
    /// Skill names in resume order, blanks dropped.
    pub fn skill_names(&self) -> Vec<String> {
        self.skills
            .iter()
            .map(|s| s.name.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn has_name(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }
}

/// Row shape of the `resumes` table. The document lives in a JSONB column.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: Json<ResumeContent>,
}

impl From<ResumeRow> for Resume {
    fn from(row: ResumeRow) -> Self {
        Resume {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            content: row.content.0,
        }
    }
}
