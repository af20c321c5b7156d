use itertools::Itertools;
use sha1::{Digest, Sha1};
use tracing::{debug, info};

use super::common::*;

use crate::{
    multicut::{EdgeId, Graph, Session},
    server::app_state::DbPool,
};

#[derive(Debug, Deserialize, Serialize)]
pub struct SolutionUploadRequest {
    pub level_id: i64,
    pub player: String,
    pub cut_edges: Vec<EdgeId>,
}

async fn read_level(db: &DbPool, level_id: i64) -> HandlerResult<Graph> {
    let level_data =
        sqlx::query_scalar::<_, String>(r#"SELECT data FROM Level WHERE lid = ? LIMIT 1"#)
            .bind(level_id)
            .fetch_one(db)
            .await
            .map_err(sql_to_err_response)?;

    serde_json::from_str(&level_data).map_err(debug_to_err_response)
}

/// Hex encoded SHA-1 over the sorted edge ids; the order in which edges were cut is irrelevant.
fn solution_hash(sorted_edges: &[EdgeId]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(sorted_edges.iter().join(",").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Applies the whole cut set before labelling, so only the final partition is judged.
fn replay(mut graph: Graph, cut_edges: &[EdgeId]) -> HandlerResult<Session> {
    for &edge in cut_edges {
        match graph.edge_mut(edge) {
            Some(e) => e.is_cut = true,
            None => return bad_request_json!("Solution references unknown edge", edge),
        }
    }

    let session = Session::new(graph);

    if !session.is_valid_multicut() {
        return bad_request_json!(
            "Solution is not a valid multicut",
            session.redundant_cuts()
        );
    }

    Ok(session)
}

pub async fn solution_upload_handler(
    State(data): State<Arc<AppState>>,
    Json(body): Json<SolutionUploadRequest>,
) -> HandlerResult<impl IntoResponse> {
    let player = body.player.trim();
    if player.is_empty() {
        return bad_request_json!("Player name is required");
    }

    let duplicates: Vec<EdgeId> = body.cut_edges.iter().copied().duplicates().collect();
    if !duplicates.is_empty() {
        return bad_request_json!("Solution cuts edges more than once", duplicates);
    }

    let graph = read_level(data.db(), body.level_id).await?;
    let optimal_cost = graph.optimal_cost;
    let session = replay(graph, &body.cut_edges)?;

    let cost = session.current_score();
    // replay only returns valid multicuts
    let solved = cost == optimal_cost;

    let sorted_edges: Vec<EdgeId> = body.cut_edges.iter().copied().sorted().collect();
    let hash = solution_hash(&sorted_edges);
    let solution_data = serde_json::to_string(&sorted_edges).map_err(debug_to_err_response)?;

    let inserted = sqlx::query(
        r#"INSERT OR IGNORE INTO Solution (level_lid, player, cost, solved, solution_hash, data)
            VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(body.level_id)
    .bind(player)
    .bind(cost)
    .bind(solved)
    .bind(&hash)
    .bind(&solution_data)
    .execute(data.db())
    .await
    .map_err(sql_to_err_response)?
    .rows_affected();

    if inserted == 0 {
        debug!("Player {player:?} resubmitted solution {hash} for level {}", body.level_id);
    } else {
        info!(
            "Player {player:?} submitted solution {hash} for level {} with cost {cost} (optimal {optimal_cost})",
            body.level_id
        );
    }

    Ok(Json(serde_json::json!({
        "status": "ok",
        "cost": cost,
        "optimal_cost": optimal_cost,
        "solved": solved,
        "solution_hash": hash,
    })))
}
