use crate::{error::Result, state::AppState, utils::middleware::RequireAuth};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/:username/follow", post(follow_user).delete(unfollow_user))
}

/// POST /api/users/:username/follow
async fn follow_user(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} following {}", user.username, username);

    let edge = state.follow_service.follow_user(&user, &username).await?;

    Ok(Json(json!({
        "success": true,
        "message": "User followed successfully",
        "data": edge
    })))
}

/// DELETE /api/users/:username/follow
async fn unfollow_user(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} unfollowing {}", user.username, username);

    state.follow_service.unfollow_user(&user, &username).await?;

    Ok(Json(json!({
        "success": true,
        "message": "User unfollowed successfully"
    })))
}
