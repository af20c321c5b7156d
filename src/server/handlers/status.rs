use super::common::*;

#[derive(Serialize)]
struct Response {
    status: &'static str,
    num_levels: u64,
    num_highscores: u64,
    num_solutions: u64,
}

pub async fn status_handler(
    State(app_data): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let num_levels = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM Level")
        .fetch_one(app_data.db())
        .await
        .map_err(sql_to_err_response)? as u64;
    let num_highscores = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM Highscore")
        .fetch_one(app_data.db())
        .await
        .map_err(sql_to_err_response)? as u64;
    let num_solutions = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM Solution")
        .fetch_one(app_data.db())
        .await
        .map_err(sql_to_err_response)? as u64;

    Ok(Json(Response {
        status: "ok",
        num_levels,
        num_highscores,
        num_solutions,
    }))
}
