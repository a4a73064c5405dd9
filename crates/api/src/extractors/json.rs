//! JSON body extractor whose rejections use the API error body.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Drop-in for [`axum::Json`] on request bodies.
///
/// Missing fields, wrong types, malformed JSON and a missing
/// `Content-Type` all become `400 validation_error` instead of axum's
/// plain-text 4xx responses.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: String,
    }

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(value) = content_type {
            builder = builder.header(header::CONTENT_TYPE, value);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let req = request(Some("application/json"), r#"{"name":"Ada"}"#);
        let ApiJson(payload) = ApiJson::<Payload>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.name, "Ada");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let req = request(Some("application/json"), r#"{"other":1}"#);
        let error = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        match error {
            ApiError::Validation(msg) => assert!(msg.contains("name"), "{}", msg),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let req = request(Some("application/json"), "{not json");
        let error = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(error, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_validation_error() {
        let req = request(None, r#"{"name":"Ada"}"#);
        let error = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(error, ApiError::Validation(_)));
    }
}
