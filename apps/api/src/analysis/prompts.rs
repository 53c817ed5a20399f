// All LLM prompt templates for the analysis workers.
// Output-format fragments come from llm_client::prompts.

/// RAG tailoring prompt. Replace: {job_description}, {bullets}, {format_instruction}
pub const TAILORING_PROMPT_TEMPLATE: &str = r#"You are a resume optimization expert. Given the following job description and resume bullet points, rewrite each bullet point to better align with the job requirements. Make them more impactful and include relevant keywords from the job description.

Job Description:
{job_description}

Resume Bullet Points:
{bullets}

{format_instruction}"#;

/// Quantification prompt. Replace: {bullets}, {format_instruction}
pub const QUANTIFICATION_PROMPT_TEMPLATE: &str = r#"You are a resume expert. Take these bullet points and quantify them by adding specific metrics, numbers, and measurable achievements. Make them more impactful by replacing vague statements with quantifiable results.

Bullet Points:
{bullets}

{format_instruction} Focus on adding metrics like percentages, numbers, dollar amounts, time saved, etc."#;

/// Career path prompt. Replace: {current_role}, {experience_count}, {skills}, {education}, {format_instruction}
pub const CAREER_PATH_PROMPT_TEMPLATE: &str = r#"Based on this resume data, predict potential career paths and next steps. Consider current role, experience, skills, and education.

Current Role: {current_role}
Years of Experience: {experience_count}
Skills: {skills}
Education: {education}

Please respond with a JSON object containing:
{
  "predictedPaths": [
    {
      "role": "Predicted Role",
      "confidence": 0-100,
      "reasoning": "Why this path",
      "nextSteps": ["Step 1", "Step 2", "Step 3"]
    }
  ],
  "skillGaps": ["Skill to learn", "Another skill"],
  "timeline": "Estimated time to next promotion/level"
}

{format_instruction}"#;

/// Integrity audit prompt. Replace: {resume_text}, {format_instruction}
pub const INTEGRITY_PROMPT_TEMPLATE: &str = r#"Analyze this resume for potential integrity issues that could flag it as fake in ATS systems. Look for:
1. Keyword stuffing (hidden keywords in white text, excessive repetition)
2. Inconsistencies in dates, experience, or claims
3. Overly generic or suspicious content
4. Any other red flags

Resume Content:
{resume_text}

Please respond with a JSON object:
{
  "keywordStuffingScore": 0-100,
  "inconsistencies": [
    {
      "type": "keyword_stuffing|date_inconsistency|generic_content|other",
      "description": "Description of the issue"
    }
  ],
  "overallScore": 0-100
}

{format_instruction}"#;

/// Renders bullets as "1. ...\n2. ..." for the line-oriented prompts.
pub fn numbered_list(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_list_is_one_based() {
        let items = vec!["Built API".to_string(), "Wrote docs".to_string()];
        assert_eq!(numbered_list(&items), "1. Built API\n2. Wrote docs");
        assert_eq!(numbered_list(&[]), "");
    }
}
