use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::{error::AppError, routes::AppState};

/// Authenticated requester, resolved per request from the bearer token.
///
/// Handlers that take an `AuthUser` argument reject unauthenticated requests
/// with 401 before running.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    /// Session token the request was made with
    pub token: String,
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

        let user_id = state
            .sessions
            .resolve_session(&token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Not authorized, invalid session".to_string()))?;

        // the account may have been removed while the session was alive
        let user = state
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Not authorized, unknown user".to_string()))?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            token,
        })
    }
}
