use tracing::info;

use super::common::*;

use crate::multicut::{Graph, GraphData};

/// Stores a new level. Cuts and achievements in the upload are discarded so that every
/// player starts from the uncut graph.
pub async fn level_upload_handler(
    State(data): State<Arc<AppState>>,
    Json(mut body): Json<GraphData>,
) -> HandlerResult<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return bad_request_json!("Level name is required");
    }

    body.best_achieved_cost = None;
    for edge in &mut body.edges {
        edge.is_cut = false;
    }

    let graph = match Graph::try_from(body) {
        Ok(graph) => graph,
        Err(e) => return bad_request_json!("Invalid level", e.to_string()),
    };

    let level_data = serde_json::to_string(&graph).map_err(debug_to_err_response)?;

    let level_id = sqlx::query(
        r#"INSERT INTO Level (name, created_at, nodes, edges, optimal_cost, difficulty, data)
            VALUES (?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&graph.name)
    .bind(&graph.created_at)
    .bind(graph.number_of_nodes() as i64)
    .bind(graph.number_of_edges() as i64)
    .bind(graph.optimal_cost)
    .bind(graph.difficulty)
    .bind(&level_data)
    .execute(data.db())
    .await
    .map_err(sql_to_err_response)?
    .last_insert_rowid();

    info!(
        "Stored level {:?} with id {level_id} ({} nodes, {} edges)",
        graph.name,
        graph.number_of_nodes(),
        graph.number_of_edges()
    );

    Ok(Json(
        serde_json::json!({"status": "success", "level_id": level_id}),
    ))
}

#[cfg(test)]
mod test {
    use super::super::common::testing::*;
    use super::*;

    fn request(level: &str) -> GraphData {
        serde_json::from_str(level).unwrap()
    }

    #[tokio::test]
    async fn stored_level_is_uncut() {
        let state = test_state().await;

        let mut level = request(TRIANGLE_LEVEL);
        level.edges[0].is_cut = true;
        level.best_achieved_cost = Some(-2);

        let response = super::level_upload_handler(State(state.clone()), Json(level))
            .await
            .unwrap()
            .into_response();
        assert!(response.status().is_success());
        let level_id = json_body(response).await["level_id"].as_i64().unwrap();

        let (nodes, edges, level_data): (i64, i64, String) =
            sqlx::query_as("SELECT nodes, edges, data FROM Level WHERE lid = ?")
                .bind(level_id)
                .fetch_one(state.db())
                .await
                .unwrap();
        assert_eq!((nodes, edges), (4, 4));

        let graph: Graph = serde_json::from_str(&level_data).unwrap();
        assert_eq!(graph.cut_edges().count(), 0);
        assert_eq!(graph.best_achieved_cost, None);
        assert_eq!(graph.optimal_cost, -3);
    }

    #[tokio::test]
    async fn duplicates_conflict() {
        let state = test_state().await;
        insert_level(&state, TRIANGLE_LEVEL).await;

        let (status, _) =
            super::level_upload_handler(State(state), Json(request(TRIANGLE_LEVEL)))
                .await
                .err()
                .unwrap();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn invalid_graphs_are_rejected() {
        let state = test_state().await;

        let dangling = r#"{
            "Nodes": [{"Id": 0}],
            "Edges": [{"FromNodeId": 0, "ToNodeId": 7, "Cost": 1}],
            "OptimalCost": 0,
            "Name": "dangling"
        }"#;
        let (status, Json(body)) =
            super::level_upload_handler(State(state.clone()), Json(request(dangling)))
                .await
                .err()
                .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"].as_str().unwrap().contains('7'));

        let mut unnamed = request(TRIANGLE_LEVEL);
        unnamed.name = String::new();
        let (status, _) = super::level_upload_handler(State(state), Json(unnamed))
            .await
            .err()
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
