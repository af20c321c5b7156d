// imports used by pretty much every handler
pub use crate::server::app_state::AppState;

pub use axum::extract::{Query, State};
pub use axum::http::StatusCode;
pub use axum::{response::IntoResponse, Json};
pub use serde::{Deserialize, Serialize};
pub use std::sync::Arc;
use tracing::debug;

pub(super) fn debug_to_err_response<T: std::fmt::Debug>(
    err: T,
) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"status": "error", "message": format!("{err:?}")})),
    )
}

pub(super) fn sql_to_err_response(err: sqlx::Error) -> (StatusCode, Json<serde_json::Value>) {
    match err {
        sqlx::Error::RowNotFound => {
            debug!("Query error: Entry not found {err:?}");
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"status": "error", "message": "Entry not found"})),
            )
        }
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            debug!("Query error: duplicate entry {db_err:?}");
            (
                StatusCode::CONFLICT,
                Json(serde_json::json!({"status": "error", "message": "Entry already exists"})),
            )
        }
        _ => {
            debug!("Query error: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"status": "error", "message": err.to_string()})),
            )
        }
    }
}

pub type HandlerErr = (StatusCode, Json<serde_json::Value>);
pub type HandlerResult<T> = Result<T, HandlerErr>;

macro_rules! bad_request_json {
    ($message:expr) => {
        Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"status": "error", "message": $message})),
        ))
    };

    ($message:expr, $details:expr) => {
        Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": "error",
                "message": $message,
                "details": $details,
            })),
        ))
    };
}
pub(crate) use bad_request_json;

#[cfg(test)]
pub(super) mod testing {
    use axum::response::Response;
    use http_body_util::BodyExt;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::{
        multicut::GraphData,
        server::{app_state::DbPool, handlers::level_upload_handler, schema::create_schema},
    };

    /// A fresh in-memory database with the schema applied.
    pub async fn test_pool() -> DbPool {
        // a single connection that never expires, otherwise the in-memory database vanishes
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        create_schema(&pool).await.unwrap();
        pool
    }

    pub async fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(test_pool().await))
    }

    pub async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Inserts a level and returns its id.
    pub async fn insert_level(state: &Arc<AppState>, level: &str) -> i64 {
        let request: GraphData = serde_json::from_str(level).unwrap();
        let response = level_upload_handler(State(state.clone()), Json(request))
            .await
            .unwrap()
            .into_response();

        json_body(response).await["level_id"].as_i64().unwrap()
    }

    /// Triangle 0-1-2 plus a pendant node 3; cutting edges 0 and 1 is optimal.
    pub const TRIANGLE_LEVEL: &str = r#"{
        "Nodes": [{"Id": 0}, {"Id": 1}, {"Id": 2}, {"Id": 3}],
        "Edges": [
            {"FromNodeId": 0, "ToNodeId": 1, "Cost": -2, "OptimalCut": true},
            {"FromNodeId": 1, "ToNodeId": 2, "Cost": -1, "OptimalCut": true},
            {"FromNodeId": 0, "ToNodeId": 2, "Cost": 2},
            {"FromNodeId": 2, "ToNodeId": 3, "Cost": 1}
        ],
        "OptimalCost": -3,
        "Difficulty": 0.1,
        "Name": "triangle",
        "CreatedAt": "2025-02-01T12:00:00"
    }"#;
}
