//! Caller identity and the ownership check shared by every resume-scoped route.
//!
//! Sessions are issued upstream; by the time a request reaches this service the
//! session layer has resolved it to a user id carried in `x-user-id`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::Resume;
use crate::storage::ResumeStore;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        Uuid::parse_str(raw.trim())
            .map(CallerId)
            .map_err(|_| AppError::Unauthorized)
    }
}

/// Loads a resume and checks it belongs to the caller.
pub async fn load_owned_resume(
    store: &dyn ResumeStore,
    caller: CallerId,
    resume_id: Uuid,
) -> Result<Resume, AppError> {
    let resume = store
        .load_resume(resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    if resume.user_id != caller.0 {
        return Err(AppError::Forbidden);
    }
    Ok(resume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryResumeStore;
    use crate::testing::seed_resume;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<CallerId, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CallerId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_header_is_parsed_as_uuid() {
        let id = Uuid::new_v4();
        let caller = extract(Some(&id.to_string())).await.unwrap();
        assert_eq!(caller, CallerId(id));
    }

    #[tokio::test]
    async fn test_missing_or_invalid_header_is_unauthorized() {
        assert!(matches!(extract(None).await, Err(AppError::Unauthorized)));
        assert!(matches!(extract(Some("nobody")).await, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_ownership_check() {
        let store = InMemoryResumeStore::new();
        let owner = Uuid::new_v4();
        let resume_id = seed_resume(&store, owner).await;

        let resume = load_owned_resume(&store, CallerId(owner), resume_id).await.unwrap();
        assert_eq!(resume.id, resume_id);

        let stranger = load_owned_resume(&store, CallerId(Uuid::new_v4()), resume_id).await;
        assert!(matches!(stranger, Err(AppError::Forbidden)));

        let missing = load_owned_resume(&store, CallerId(owner), Uuid::new_v4()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
