//! REST API module.
//!
//! Every page view is a JSON projection and every user action a mutation
//! that answers with the re-rendered projection.

mod chat;
mod classes;
mod conference;
mod dashboard;
mod profile;
mod whiteboard;

pub use chat::*;
pub use classes::*;
pub use conference::*;
pub use dashboard::*;
pub use profile::*;
pub use whiteboard::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: crate::errors::AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Current storage revision; 0 when it cannot be read.
async fn revision(state: &AppState) -> i64 {
    state.kv.revision().await.unwrap_or(0)
}

/// Wrap a handler outcome in the envelope, reporting the revision after the
/// operation ran.
async fn respond<T: Serialize>(
    state: &AppState,
    result: Result<T, crate::errors::AppError>,
) -> ApiResult<T> {
    let revision_id = revision(state).await;
    match result {
        Ok(data) => success(data, revision_id),
        Err(e) => error(e, revision_id),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use chrono::{FixedOffset, TimeZone, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::clock::FixedClock;
    use crate::conference::{MediaPolicy, SimulatedDevices};
    use crate::config::{Config, DEFAULT_WHITEBOARD_HISTORY};
    use crate::db::MemoryKvStore;
    use crate::{create_router, AppState};

    async fn state() -> AppState {
        let config = Config {
            api_psk: None,
            db_path: "unused.sqlite".into(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            utc_offset: FixedOffset::east_opt(0).unwrap(),
            public_base_url: "http://classroom.test".to_string(),
            whiteboard_history: DEFAULT_WHITEBOARD_HISTORY,
            chat_reply_delay: Duration::from_millis(10),
            media_policy: MediaPolicy::Grant,
        };
        AppState::new(
            Arc::new(MemoryKvStore::new()),
            Arc::new(SimulatedDevices::new(MediaPolicy::Grant)),
            Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 3, 14, 9, 0, 0).unwrap(),
            )),
            config,
        )
        .await
        .unwrap()
    }

    async fn call(state: &AppState, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_envelope_reports_revision() {
        let state = state().await;

        let (status, body) = call(&state, Method::GET, "/api/classes", json!(null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["revisionId"], 0);

        let (_, body) = call(
            &state,
            Method::POST,
            "/api/classes",
            json!({ "title": "Algebra", "date": "2024-03-15", "time": "10:00" }),
        )
        .await;
        assert_eq!(body["revisionId"], 1);
    }

    #[tokio::test]
    async fn test_unknown_class_is_not_found() {
        let state = state().await;

        let (status, body) = call(&state, Method::DELETE, "/api/classes/42", json!(null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_profile_blank_value_clears_key() {
        let state = state().await;

        call(
            &state,
            Method::PUT,
            "/api/profile",
            json!({ "userEmail": "sam@school.edu" }),
        )
        .await;
        let (_, body) = call(&state, Method::PUT, "/api/profile", json!({ "userEmail": " " })).await;
        assert!(body["data"]["displayName"].is_null());
        assert!(body["data"]["dateDisplay"].is_null());
    }

    #[tokio::test]
    async fn test_participant_toggle_for_unknown_id() {
        let state = state().await;

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/conference/participants/participant-1/mic",
            json!(null),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
