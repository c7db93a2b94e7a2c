//! Request extractors.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::ApiError;

/// The `{id}` path segment of a todo route: an integer `>= 1`.
///
/// Both a non-integer segment and an out-of-range value are rejected as a
/// 422 before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoId(pub i64);

impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        parse_id(&raw).map(TodoId)
    }
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    let id: i64 = raw.parse().map_err(|_| {
        ApiError::invalid_path("id", "Input should be a valid integer, unable to parse string as an integer")
    })?;
    if id < 1 {
        return Err(ApiError::invalid_path("id", "Input should be greater than or equal to 1"));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_integers() {
        assert_eq!(parse_id("1").unwrap(), 1);
        assert_eq!(parse_id("9001").unwrap(), 9001);
    }

    #[test]
    fn rejects_zero_and_negatives() {
        assert!(matches!(parse_id("0"), Err(ApiError::InvalidPath { name: "id", .. })));
        assert!(matches!(parse_id("-4"), Err(ApiError::InvalidPath { .. })));
    }

    #[test]
    fn rejects_non_integers() {
        assert!(matches!(parse_id("abc"), Err(ApiError::InvalidPath { .. })));
        assert!(matches!(parse_id("1.5"), Err(ApiError::InvalidPath { .. })));
    }
}
