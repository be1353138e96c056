use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::{auth::AuthUser, request_id::RequestId},
    models::{AuthResponse, LoginRequest, RegisterRequest},
    routes::{extract::AppJson, AppState},
    services::accounts,
};

/// Handler for account registration
pub async fn register(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    tracing::info!(request_id = %request_id, "Processing registration");

    let response = accounts::register(
        state.users.as_ref(),
        state.sessions.as_ref(),
        &state.config,
        request,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for login
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    tracing::info!(request_id = %request_id, "Processing login");

    let response = accounts::login(
        state.users.as_ref(),
        state.sessions.as_ref(),
        &state.config,
        request,
    )
    .await?;

    Ok(Json(response))
}

/// Handler for logout; revokes the session the request was made with
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Value>> {
    accounts::logout(state.sessions.as_ref(), &user.token).await?;
    tracing::info!(user_id = %user.id, "User logged out");
    Ok(Json(json!({ "message": "Logged out" })))
}
