use super::{app_state::AppState, handlers::*};
use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    routing::{get, post},
    Router,
};

use std::sync::Arc;

use tower_http::{services::ServeDir, trace::TraceLayer};

async fn handle_404() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

#[rustfmt::skip]
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // needs to be mutable to allow adding routes based on feature flags
    #[allow(unused_mut)]
    let mut router = Router::new();
    #[cfg(feature = "admin-api")]
    {
        router = router
            .route("/api/levels/new", post(level_upload_handler))
            .route("/api/levels/delete/:id", get(level_delete_handler));
    }

    router = router
        .route("/api/status", get(status_handler))
        .route("/api/submit", post(score_submit_handler))
        .route("/api/leaderboard", get(leaderboard_handler))
        .route("/api/rank/:player", get(player_rank_handler))
        .route("/api/levels", get(level_list_handler))
        .route("/api/levels/download/:id", get(level_download_handler))
        .route("/api/solutions/new", post(solution_upload_handler));

    let service_404 = handle_404.into_service();
    router
        .layer(DefaultBodyLimit::max(16usize << 20))
        .layer(TraceLayer::new_for_http())
        .fallback_service(
            ServeDir::new("assets")
                .precompressed_gzip()
                .not_found_service(service_404))
        .with_state(app_state)
}
