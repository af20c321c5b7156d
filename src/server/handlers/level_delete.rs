use axum::extract::Path;
use serde_json::json;
use tracing::info;

use super::common::*;

pub async fn level_delete_handler(
    Path(id): Path<i64>,
    State(data): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let mut tx = data.db().begin().await.map_err(sql_to_err_response)?;

    let solutions = sqlx::query(r#"DELETE FROM Solution WHERE level_lid = ?"#)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(sql_to_err_response)?
        .rows_affected();

    let levels = sqlx::query(r#"DELETE FROM Level WHERE lid = ?"#)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(sql_to_err_response)?
        .rows_affected();

    if levels == 0 {
        // dropping the transaction rolls it back
        return Err(sql_to_err_response(sqlx::Error::RowNotFound));
    }

    tx.commit().await.map_err(sql_to_err_response)?;

    info!("Deleted level {id} and {solutions} solution(s)");

    Ok(Json(json!({
        "status": "ok",
        "id": id,
    })))
}

#[cfg(test)]
mod test {
    use super::super::common::testing::*;
    use super::*;

    async fn count(state: &Arc<AppState>, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(state.db())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn level_delete_handler() {
        let state = test_state().await;
        let id = insert_level(&state, TRIANGLE_LEVEL).await;

        sqlx::query(
            "INSERT INTO Solution (level_lid, player, cost, solved, solution_hash, data) VALUES (?, 'ann', 1, 0, 'x', '[3]')",
        )
        .bind(id)
        .execute(state.db())
        .await
        .unwrap();

        let response = super::level_delete_handler(Path(id), State(state.clone()))
            .await
            .unwrap()
            .into_response();
        assert!(response.status().is_success());

        assert_eq!(count(&state, "Level").await, 0);
        assert_eq!(count(&state, "Solution").await, 0);

        let (status, _) = super::level_delete_handler(Path(id), State(state))
            .await
            .err()
            .unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
