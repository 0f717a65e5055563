//! REST surface for the leaderboard: top-N reads and score updates.
//! A successful update re-reads the top-N and hands the snapshot to the
//! broadcast fan-out; viewers never poll.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;
use crate::store::{LeaderboardEntry, StoreError};

// --- Request / Response types ---

#[derive(Debug, Deserialize)]
pub struct UpdateScoreRequest {
    pub username: String,
    pub score: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdateScoreResponse {
    pub status: &'static str,
    #[serde(rename = "newScore")]
    pub new_score: i64,
}

type ErrorResponse = (StatusCode, Json<Value>);

// --- Handlers ---

/// GET /leaderboard — Current top-N as an ordered list of {member, score}.
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ErrorResponse> {
    let entries = state.store.top_n(state.top_n).await.map_err(store_error)?;
    Ok(Json(entries))
}

/// POST /leaderboard — Apply an atomic increment (creating the member at
/// score 0 first if new), then broadcast the refreshed top-N to every
/// live viewer. Body: { "username": "...", "score": 10 }
pub async fn update_score(
    State(state): State<AppState>,
    Json(body): Json<UpdateScoreRequest>,
) -> Result<Json<UpdateScoreResponse>, ErrorResponse> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "username must not be empty" })),
        ));
    }

    // New members start at zero; the increment lands on top of it.
    state
        .store
        .create_if_absent(username, 0)
        .await
        .map_err(store_error)?;
    let new_score = state
        .store
        .increment_by(username, body.score)
        .await
        .map_err(store_error)?;

    // Re-read and hand off to the fan-out. Publish is fire-and-forget:
    // the response does not wait for any viewer delivery.
    let entries = state.store.top_n(state.top_n).await.map_err(store_error)?;
    state.broadcast.publish(Arc::new(entries));

    Ok(Json(UpdateScoreResponse {
        status: "score updated",
        new_score,
    }))
}

fn store_error(err: StoreError) -> ErrorResponse {
    tracing::error!(error = %err, "Leaderboard store operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
}
