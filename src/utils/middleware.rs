use crate::{error::AppError, models::user::User, state::AppState};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves an `Authorization: Bearer` token into a `User` request
/// extension. A missing or invalid token is not an error here; protected
/// handlers reject via the `RequireAuth` extractor instead.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next<Body>,
) -> Result<Response, AppError> {
    if let Some(auth_header) = headers.get("authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                match state.auth_service.verify_jwt(token) {
                    Ok(claims) => match state.user_service.get_by_id(&claims.sub).await {
                        Ok(Some(user)) => {
                            debug!("Authenticated user: {} ({})", user.username, user.id);
                            request.extensions_mut().insert(user);
                        }
                        Ok(None) => {
                            warn!("Token subject {} no longer exists", claims.sub);
                        }
                        Err(e) => {
                            warn!("Failed to load user for token: {}", e);
                        }
                    },
                    Err(e) => {
                        debug!("JWT verification failed: {}", e);
                    }
                }
            }
        }
    }

    Ok(next.run(request).await)
}

/// Required-identity extractor: 401 when no authenticated user is present.
pub struct RequireAuth(pub User);

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;
        Ok(RequireAuth(user))
    }
}

/// Optional-identity extractor for endpoints that render differently for
/// authenticated viewers.
pub struct OptionalAuth(pub Option<User>);

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().cloned();
        Ok(OptionalAuth(user))
    }
}
