use super::common::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoreSubmitRequest {
    pub player: String,
    pub score: i64,
}

pub async fn score_submit_handler(
    State(data): State<Arc<AppState>>,
    Json(body): Json<ScoreSubmitRequest>,
) -> HandlerResult<impl IntoResponse> {
    let player = body.player.trim();

    if player.is_empty() {
        return bad_request_json!("Player name is required");
    }

    let score_id = sqlx::query(r#"INSERT INTO Highscore (player, score) VALUES (?, ?)"#)
        .bind(player)
        .bind(body.score)
        .execute(data.db())
        .await
        .map_err(sql_to_err_response)?
        .last_insert_rowid();

    Ok(Json(
        serde_json::json!({"status": "success", "score_id": score_id}),
    ))
}
