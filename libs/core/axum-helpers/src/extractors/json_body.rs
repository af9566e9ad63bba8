//! JSON body extractor that answers with the shared error envelope.

use crate::errors::AppError;
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

/// JSON request body.
///
/// Behaves like `axum::Json` but a missing content type, malformed JSON or
/// a body that does not match `T` is rendered as an [`AppError`] with the
/// rejection's status code and `JSON_EXTRACTION` error code.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::JsonBody;
///
/// async fn create_category(JsonBody(input): JsonBody<CreateCategory>) -> String {
///     format!("Creating category: {}", input.name)
/// }
/// ```
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(JsonBody(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Named {
        name: String,
    }

    async fn echo(JsonBody(input): JsonBody<Named>) -> String {
        input.name
    }

    async fn post_body(content_type: &str, body: &'static str) -> (StatusCode, serde_json::Value) {
        let app = Router::new().route("/", post(echo));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let (status, _) = post_body("application/json", r#"{"name":"work"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let (status, body) = post_body("application/json", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "JSON_EXTRACTION");
        assert_eq!(body["code"], 1003);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_unprocessable() {
        let (status, body) = post_body("application/json", r#"{"title":"work"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "JSON_EXTRACTION");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_rejected() {
        let (status, _) = post_body("text/plain", r#"{"name":"work"}"#).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
