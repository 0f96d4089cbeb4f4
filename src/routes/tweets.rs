use crate::{
    error::Result,
    models::tweet::CreateTweetRequest,
    state::AppState,
    utils::middleware::RequireAuth,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home_feed).post(create_tweet))
        .route("/:id", get(get_tweet).delete(delete_tweet))
}

/// GET /api/tweets
///
/// The home feed: every tweet, newest first. Authenticated users only.
async fn home_feed(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    let tweets = state.feed_service.home_feed(&user).await?;

    Ok(Json(json!({
        "success": true,
        "data": tweets
    })))
}

/// POST /api/tweets
async fn create_tweet(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<CreateTweetRequest>,
) -> Result<Json<Value>> {
    let tweet = state
        .tweet_service
        .create_tweet(&user, &payload.content)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": tweet
    })))
}

/// GET /api/tweets/:id
async fn get_tweet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let tweet = state.tweet_service.get_tweet(id).await?;

    Ok(Json(json!({
        "success": true,
        "data": tweet
    })))
}

/// DELETE /api/tweets/:id
async fn delete_tweet(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    debug!("User {} deleting tweet {}", user.username, id);

    state.tweet_service.delete_tweet(&user, id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Tweet deleted successfully"
    })))
}
