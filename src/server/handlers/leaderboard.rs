use axum::extract::Path;
use serde_json::json;
use tracing::debug;

use super::common::*;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct LeaderboardOptions {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub player: String,
    pub score: i64,
}

/// Best score of every player, best first.
pub async fn leaderboard_handler(
    State(data): State<Arc<AppState>>,
    Query(opts): Query<LeaderboardOptions>,
) -> HandlerResult<impl IntoResponse> {
    let limit = opts.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let entries = sqlx::query_as::<_, LeaderboardEntry>(
        r#"SELECT player, MAX(score) AS score FROM Highscore
            GROUP BY player
            ORDER BY score DESC, player ASC
            LIMIT ?"#,
    )
    .bind(limit)
    .fetch_all(data.db())
    .await
    .map_err(sql_to_err_response)?;

    Ok(Json(entries))
}

pub async fn player_rank_handler(
    Path(player): Path<String>,
    State(data): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let best = sqlx::query_scalar::<_, Option<i64>>(
        r#"SELECT MAX(score) FROM Highscore WHERE player = ?"#,
    )
    .bind(&player)
    .fetch_one(data.db())
    .await
    .map_err(sql_to_err_response)?;

    let Some(best) = best else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "Player not found"})),
        ));
    };

    let better_players = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM (
            SELECT player FROM Highscore GROUP BY player HAVING MAX(score) > ?
        )"#,
    )
    .bind(best)
    .fetch_one(data.db())
    .await
    .map_err(sql_to_err_response)?;

    debug!("Player {player:?} has best score {best} and {better_players} better players");

    Ok(Json(json!({
        "status": "ok",
        "player": player,
        "score": best,
        "rank": better_players + 1,
    })))
}
