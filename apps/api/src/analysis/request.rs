//! Start-analysis request bodies and their per-kind validation.

use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::quantification::BulletInput;
use crate::analysis::skill_gap::DEFAULT_TARGET_ROLE;
use crate::errors::AppError;
use crate::models::analysis::AnalysisKind;

/// Body of `POST /api/v1/analyses/:kind`. Which fields are required depends on the kind.
#[derive(Debug, Default, Deserialize)]
pub struct StartAnalysisBody {
    pub resume_id: Option<Uuid>,
    pub target_role: Option<String>,
    pub job_description: Option<String>,
    pub bullet_points: Option<BulletInput>,
}

/// A validated request for one analysis kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    SkillGap { target_role: String },
    Heatmap,
    RagTailoring { job_description: String },
    Quantification { bullets: Vec<String> },
    CareerPath,
    Integrity,
}

impl AnalysisRequest {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisRequest::SkillGap { .. } => AnalysisKind::SkillGap,
            AnalysisRequest::Heatmap => AnalysisKind::Heatmap,
            AnalysisRequest::RagTailoring { .. } => AnalysisKind::RagTailoring,
            AnalysisRequest::Quantification { .. } => AnalysisKind::Quantification,
            AnalysisRequest::CareerPath => AnalysisKind::CareerPath,
            AnalysisRequest::Integrity => AnalysisKind::Integrity,
        }
    }

    /// Validates the body for `kind`. Fails before any background work is scheduled.
    pub fn from_body(kind: AnalysisKind, body: StartAnalysisBody) -> Result<(Uuid, Self), AppError> {
        let resume_id = body
            .resume_id
            .ok_or_else(|| AppError::Validation("resume_id is required".to_string()))?;

        let request = match kind {
            AnalysisKind::SkillGap => AnalysisRequest::SkillGap {
                target_role: body
                    .target_role
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| DEFAULT_TARGET_ROLE.to_string()),
            },
            AnalysisKind::Heatmap => AnalysisRequest::Heatmap,
            AnalysisKind::RagTailoring => {
                let job_description = body
                    .job_description
                    .filter(|jd| !jd.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::Validation("job_description is required".to_string())
                    })?;
                AnalysisRequest::RagTailoring { job_description }
            }
            AnalysisKind::Quantification => {
                let bullets = body
                    .bullet_points
                    .ok_or_else(|| AppError::Validation("bullet_points is required".to_string()))?
                    .into_bullets();
                AnalysisRequest::Quantification { bullets }
            }
            AnalysisKind::CareerPath => AnalysisRequest::CareerPath,
            AnalysisKind::Integrity => AnalysisRequest::Integrity,
        };

        Ok((resume_id, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> StartAnalysisBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resume_id_is_required_for_every_kind() {
        for kind in AnalysisKind::ALL {
            let err = AnalysisRequest::from_body(kind, StartAnalysisBody::default()).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{kind}");
        }
    }

    #[test]
    fn test_skill_gap_defaults_blank_role() {
        let id = Uuid::new_v4();
        let (resume_id, request) = AnalysisRequest::from_body(
            AnalysisKind::SkillGap,
            body(&format!(r#"{{"resume_id":"{id}","target_role":"  "}}"#)),
        )
        .unwrap();
        assert_eq!(resume_id, id);
        assert_eq!(
            request,
            AnalysisRequest::SkillGap {
                target_role: "software engineer".to_string()
            }
        );
    }

    #[test]
    fn test_tailoring_needs_a_job_description() {
        let id = Uuid::new_v4();
        let blank = body(&format!(r#"{{"resume_id":"{id}","job_description":" \n"}}"#));
        assert!(matches!(
            AnalysisRequest::from_body(AnalysisKind::RagTailoring, blank),
            Err(AppError::Validation(_))
        ));

        let ok = body(&format!(r#"{{"resume_id":"{id}","job_description":"Rust role"}}"#));
        let (_, request) = AnalysisRequest::from_body(AnalysisKind::RagTailoring, ok).unwrap();
        assert_eq!(request.kind(), AnalysisKind::RagTailoring);
    }

    #[test]
    fn test_quantification_needs_bullets_but_accepts_an_empty_list() {
        let id = Uuid::new_v4();
        let missing = body(&format!(r#"{{"resume_id":"{id}"}}"#));
        assert!(AnalysisRequest::from_body(AnalysisKind::Quantification, missing).is_err());

        let empty = body(&format!(r#"{{"resume_id":"{id}","bullet_points":[]}}"#));
        let (_, request) = AnalysisRequest::from_body(AnalysisKind::Quantification, empty).unwrap();
        assert_eq!(request, AnalysisRequest::Quantification { bullets: vec![] });
    }

    #[test]
    fn test_kind_round_trips_through_request() {
        let id = Uuid::new_v4();
        for kind in AnalysisKind::ALL {
            let b = body(&format!(
                r#"{{"resume_id":"{id}","job_description":"jd","bullet_points":"a"}}"#
            ));
            let (_, request) = AnalysisRequest::from_body(kind, b).unwrap();
            assert_eq!(request.kind(), kind);
        }
    }
}
