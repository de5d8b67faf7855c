use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use bandit_core::{rank, BanditError, StatStore};

#[derive(Clone)]
pub struct AppState {
    store: StatStore,
}

pub fn build_router(store: StatStore) -> Router {
    Router::new()
        .route("/hits/{domain}", post(post_hits))
        .route("/reward/{domain}", post(post_reward))
        .route("/stat/list/{domain}", post(post_stat_list))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}

#[derive(Deserialize)]
struct HitsRequest {
    arm: String,
    #[serde(default = "one")]
    hits: i64,
}

fn one() -> i64 {
    1
}

#[derive(Deserialize)]
struct RewardRequest {
    arm: String,
    reward: f64,
}

async fn post_hits(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(body): Json<HitsRequest>,
) -> impl IntoResponse {
    match state.store.record_hit(&domain, &body.arm, body.hits).await {
        Ok(()) => {
            info!(domain = %domain, arm = %body.arm, delta = body.hits, "Recorded hits");
            (StatusCode::CREATED, Json(json!({"message": "ok"}))).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

async fn post_reward(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(body): Json<RewardRequest>,
) -> impl IntoResponse {
    match state
        .store
        .record_reward(&domain, &body.arm, body.reward)
        .await
    {
        Ok(()) => {
            info!(domain = %domain, arm = %body.arm, reward = body.reward, "Recorded reward");
            (StatusCode::CREATED, Json(json!({"message": "ok"}))).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

/// Body is a plain JSON array of arm ids. An empty candidate set is "no
/// content", not a core call; unknown or zero-hit arms are simply missing
/// from the ranked list.
async fn post_stat_list(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(arms): Json<Vec<String>>,
) -> impl IntoResponse {
    if arms.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    match state.store.batch_read(&domain, &arms).await {
        Ok(stats) => {
            let ranked = rank(&stats);
            (StatusCode::OK, Json(ranked)).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

async fn health() -> &'static str {
    "ok"
}

fn error_response(err: BanditError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        BanditError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        // Retryable by the caller once the backend is reachable again.
        BanditError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    warn!(error = %err, "Request failed");
    (status, Json(json!({"error": err.to_string()})))
}
