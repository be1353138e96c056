use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Review, ReviewWithAuthor, SubmitReviewRequest},
    routes::{
        extract::{AppJson, AppPath},
        AppState,
    },
    services::reviews,
};

/// Handler for a movie's reviews
pub async fn list(
    State(state): State<AppState>,
    AppPath(movie_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<ReviewWithAuthor>>> {
    let listed = reviews::list_reviews(
        state.movies.as_ref(),
        state.reviews.as_ref(),
        state.users.as_ref(),
        movie_id,
    )
    .await?;
    Ok(Json(listed))
}

/// Handler for posting a review
pub async fn submit(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(movie_id): AppPath<Uuid>,
    AppJson(request): AppJson<SubmitReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = reviews::submit_review(
        state.movies.as_ref(),
        state.reviews.as_ref(),
        &user,
        movie_id,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Handler for deleting a review (author only)
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(review_id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    reviews::delete_review(
        state.movies.as_ref(),
        state.reviews.as_ref(),
        &user,
        review_id,
    )
    .await?;
    Ok(Json(json!({ "message": "Review removed" })))
}
