use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::AuthError;
use crate::error::ApiError;
use crate::services::ServiceError;

/// Bearer-token authentication: verifies the token, confirms the subject
/// still exists and is enabled, then stores its `Claims` on the request.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|e| AuthError::InvalidHeader(e.to_string()))?;

    let claims = state.auth.authenticate(value)?;

    let usr = state.users.query_by_id(claims.sub).await.map_err(|e| match e {
        ServiceError::NotFound(_) => AuthError::InvalidToken(format!("unknown subject {}", claims.sub)),
        other => AuthError::Lookup(other),
    })?;
    if !usr.enabled {
        return Err(AuthError::UserDisabled.into());
    }

    tracing::debug!(user_id = %claims.sub, "authenticated");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
