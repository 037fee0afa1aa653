//! Wrappers around axum's body and query extractors that report malformed input in the same JSON
//! error shape the handlers use.

use async_trait::async_trait;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;

/// A JSON request body.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = InputRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(InputRejection::Body)?;

        Ok(Self(value))
    }
}

/// Query string parameters.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = InputRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(InputRejection::Query)?;

        Ok(Self(value))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputRejection {
    #[error("invalid request body: {0}")]
    Body(JsonRejection),

    #[error("invalid query string: {0}")]
    Query(QueryRejection),
}

impl InputRejection {
    /// Client facing description, including what the deserializer complained about.
    pub fn message(&self) -> String {
        match self {
            InputRejection::Body(err) => err.body_text(),
            InputRejection::Query(err) => err.body_text(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            InputRejection::Body(err) => err.status(),
            InputRejection::Query(err) => err.status(),
        }
    }
}

impl IntoResponse for InputRejection {
    fn into_response(self) -> Response {
        let message = self.message();
        tracing::debug!("rejected request input: {message}");

        let msg = serde_json::json!({"status": "error", "message": message});
        (self.status_code(), Json(msg)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    fn json_request(body: &'static str) -> Request {
        http::Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_valid_bodies_are_extracted() {
        let ApiJson(named) = ApiJson::<Named>::from_request(json_request(r#"{"name":"slope"}"#), &())
            .await
            .unwrap();

        assert_eq!(named.name, "slope");
    }

    #[tokio::test]
    async fn test_incomplete_bodies_are_json_errors() {
        let err = ApiJson::<Named>::from_request(json_request("{}"), &())
            .await
            .err()
            .unwrap();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let payload = response_json(response).await;
        assert_eq!(payload["status"], "error");
        assert!(payload["message"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_a_json_error() {
        let request = http::Request::post("/").body(Body::from(r#"{"name":"x"}"#)).unwrap();
        let err = ApiJson::<Named>::from_request(request, &()).await.err().unwrap();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(response_json(response).await["status"], "error");
    }

    #[tokio::test]
    async fn test_missing_query_parameters_are_json_errors() {
        let (mut parts, _) = http::Request::get("/?other=1").body(()).unwrap().into_parts();
        let err = ApiQuery::<Named>::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_json(response).await["status"], "error");
    }
}
