//! Caller identity for owner-scoped endpoints
//!
//! Authentication happens upstream; the gateway forwards the verified user id
//! in the `X-User-Id` header.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Id of the authenticated user making the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub i32);

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
            .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".to_string()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid X-User-Id header".to_string()))?;

        raw.trim()
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .map(CallerId)
            .ok_or_else(|| AppError::Unauthorized("Invalid X-User-Id header".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    async fn test_valid_header() {
        assert_eq!(extract(Some("42")).await.unwrap(), CallerId(42));
        assert_eq!(extract(Some(" 7 ")).await.unwrap(), CallerId(7));
    }

    #[tokio::test]
    async fn test_missing_header() {
        assert!(matches!(extract(None).await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_invalid_header() {
        assert!(matches!(extract(Some("abc")).await, Err(AppError::Unauthorized(_))));
        assert!(matches!(extract(Some("0")).await, Err(AppError::Unauthorized(_))));
        assert!(matches!(extract(Some("-3")).await, Err(AppError::Unauthorized(_))));
    }
}
