use axum::extract::Path;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;

use super::common::*;
use crate::server::app_state::DbPool;

async fn fetch_level(id: i64, db_pool: &DbPool) -> HandlerResult<String> {
    sqlx::query_scalar::<_, String>(r#"SELECT data FROM Level WHERE lid = ? LIMIT 1"#)
        .bind(id)
        .fetch_one(db_pool)
        .await
        .map_err(sql_to_err_response)
}

pub async fn level_download_handler(
    Path(id): Path<i64>,
    State(data): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let document = fetch_level(id, data.db()).await?;

    let header_line = format!("attachment; filename=\"level{id}.json\"");
    let content_disposition = HeaderValue::from_str(&header_line).map_err(debug_to_err_response)?;

    Ok((
        [
            (CONTENT_DISPOSITION, content_disposition),
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
        ],
        document,
    ))
}
