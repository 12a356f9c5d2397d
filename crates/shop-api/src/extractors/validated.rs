//! Validated JSON extractor
//!
//! Extracts and validates JSON request bodies using the validator crate.
//! Unparseable bodies are rejected with 400, failed field rules with 422.

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::response::ApiError;

/// JSON body that passed its `Validate` rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| match e {
                JsonRejection::JsonDataError(e) => ApiError::invalid_body(e.body_text()),
                JsonRejection::JsonSyntaxError(e) => ApiError::invalid_body(e.body_text()),
                JsonRejection::MissingJsonContentType(e) => ApiError::invalid_body(e.body_text()),
                JsonRejection::BytesRejection(e) => ApiError::invalid_body(e.body_text()),
                _ => ApiError::invalid_body("Invalid JSON body"),
            })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Body that may be absent
///
/// An empty or whitespace-only body yields `None`. Anything else must parse
/// and validate exactly like [`ValidatedJson`]. The body is buffered, so
/// chunked requests without a `content-length` are handled too.
#[derive(Debug, Clone)]
pub struct OptionalValidatedJson<T>(pub Option<T>);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_body(e.body_text()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalValidatedJson(None));
        }

        let value: T = serde_json::from_slice(&body).map_err(|e| {
            ApiError::invalid_body(format!("Failed to parse the request body as JSON: {e}"))
        })?;
        value.validate()?;

        Ok(OptionalValidatedJson(Some(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Note {
        #[validate(length(min = 1))]
        text: String,
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_optional_body_absent() {
        let OptionalValidatedJson(note) =
            OptionalValidatedJson::<Note>::from_request(request("  \n"), &())
                .await
                .unwrap();
        assert!(note.is_none());
    }

    #[tokio::test]
    async fn test_optional_body_present() {
        let OptionalValidatedJson(note) =
            OptionalValidatedJson::<Note>::from_request(request(r#"{"text":"hi"}"#), &())
                .await
                .unwrap();
        assert_eq!(note.map(|n| n.text).as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_optional_body_still_validated() {
        let result =
            OptionalValidatedJson::<Note>::from_request(request(r#"{"text":""}"#), &()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let result = ValidatedJson::<Note>::from_request(request("{"), &()).await;
        assert!(result.is_err());
    }
}
