use crate::{
    error::Result,
    state::AppState,
    utils::middleware::OptionalAuth,
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
        .route("/:username", get(get_profile))
        .route("/:username/following", get(get_following))
        .route("/:username/followers", get(get_followers))
}

/// GET /api/users/:username
///
/// Profile page: the user's tweets plus follow counts and, for an
/// authenticated viewer, whether they follow this profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    OptionalAuth(viewer): OptionalAuth,
) -> Result<Json<Value>> {
    debug!("Rendering profile for {}", username);

    let tweets = state.feed_service.profile_feed(&username).await?;
    let stats = state
        .feed_service
        .profile_summary(&username, viewer.as_ref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "username": username,
            "tweets": tweets,
            "stats": stats
        }
    })))
}

/// GET /api/users/:username/following
async fn get_following(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    let user = state.user_service.get_by_username(&username).await?;
    let following = state.follow_service.list_following(&user.username).await?;

    Ok(Json(json!({
        "success": true,
        "data": following
    })))
}

/// GET /api/users/:username/followers
async fn get_followers(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    let user = state.user_service.get_by_username(&username).await?;
    let followers = state.follow_service.list_followers(&user.username).await?;

    Ok(Json(json!({
        "success": true,
        "data": followers
    })))
}
