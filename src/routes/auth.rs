use crate::{
    error::{AppError, Result},
    models::user::{LoginRequest, SignupRequest},
    state::AppState,
};
use axum::{extract::State, response::Json, routing::post, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// POST /api/auth/signup
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<Value>> {
    if !state.config.enable_registrations {
        return Err(AppError::forbidden("Registrations are disabled"));
    }

    let auth = state.auth_service.signup(payload).await?;

    Ok(Json(json!({
        "success": true,
        "data": auth
    })))
}

/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let auth = state.auth_service.login(payload).await?;

    Ok(Json(json!({
        "success": true,
        "data": auth
    })))
}
