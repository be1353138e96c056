use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    models::{AddToWatchlistRequest, UpdateProfileRequest, User, WatchlistEntry, WatchlistItem},
    routes::{
        extract::{AppJson, AppPath},
        AppState,
    },
    services::{
        accounts::{self, UserProfile},
        authorization, watchlist,
    },
};

/// Handler for a user's profile with their reviews
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<UserProfile>> {
    authorization::ensure_self_or_admin(&user, user_id)?;
    let profile = accounts::get_profile(
        state.users.as_ref(),
        state.reviews.as_ref(),
        state.movies.as_ref(),
        user_id,
    )
    .await?;
    Ok(Json(profile))
}

/// Handler for profile edits
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<User>> {
    authorization::ensure_self_or_admin(&user, user_id)?;
    let changes = request.validate()?;
    let updated = accounts::update_profile(state.users.as_ref(), user_id, changes).await?;
    Ok(Json(updated))
}

pub async fn get_watchlist(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<WatchlistItem>>> {
    authorization::ensure_self_or_admin(&user, user_id)?;
    let items =
        watchlist::get_watchlist(state.watchlists.as_ref(), state.movies.as_ref(), user_id)
            .await?;
    Ok(Json(items))
}

pub async fn add_to_watchlist(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(request): AppJson<AddToWatchlistRequest>,
) -> AppResult<(StatusCode, Json<WatchlistEntry>)> {
    authorization::ensure_self_or_admin(&user, user_id)?;
    let entry = watchlist::add_to_watchlist(
        state.watchlists.as_ref(),
        state.movies.as_ref(),
        state.users.as_ref(),
        user_id,
        request.movie_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((user_id, movie_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<Json<Value>> {
    authorization::ensure_self_or_admin(&user, user_id)?;
    watchlist::remove_from_watchlist(state.watchlists.as_ref(), user_id, movie_id).await?;
    Ok(Json(json!({ "message": "Movie removed from watchlist" })))
}
