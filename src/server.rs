use crate::{
    core::{cache::Source, leaderboard::LeaderboardRow},
    error::BoardError,
    service::LeaderboardService,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub type SharedService = Arc<LeaderboardService>;

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub source: Source,
    pub data: Vec<LeaderboardRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse {
            error: self.to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, payload).into_response()
    }
}

/// Ranked leaderboard, from the cache when it is still fresh.
pub async fn get_scores(
    State(service): State<SharedService>,
) -> Result<Json<LeaderboardResponse>, BoardError> {
    let (data, source) = service.leaderboard().await?;
    Ok(Json(LeaderboardResponse { source, data }))
}

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/api/get-scores", any(get_scores))
        .route("/api/leaderboard", any(get_scores))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
