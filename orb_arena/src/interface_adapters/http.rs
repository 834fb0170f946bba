// Plain HTTP routes alongside the WebSocket endpoint.

use crate::interface_adapters::protocol::ScoreResponse;
use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State};
use std::sync::Arc;

pub async fn score_handler(State(state): State<Arc<AppState>>) -> Json<ScoreResponse> {
    Json(ScoreResponse {
        points: state.score.points(),
    })
}
