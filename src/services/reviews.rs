use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{MovieRepository, ReviewRepository, UserRepository},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Review, ReviewWithAuthor, SubmitReviewRequest},
    services::{authorization, catalog, rating},
};

/// Resolves author usernames for a batch of reviews
pub async fn with_authors(
    users: &dyn UserRepository,
    reviews: Vec<Review>,
) -> AppResult<Vec<ReviewWithAuthor>> {
    let mut author_ids: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors = users.get_users_by_ids(&author_ids).await?;

    Ok(reviews
        .into_iter()
        .map(|review| ReviewWithAuthor {
            username: authors
                .iter()
                .find(|u| u.id == review.user_id)
                .map(|u| u.username.clone()),
            review,
        })
        .collect())
}

/// Reviews of an existing movie, oldest first
pub async fn list_reviews(
    movies: &dyn MovieRepository,
    reviews: &dyn ReviewRepository,
    users: &dyn UserRepository,
    movie_id: Uuid,
) -> AppResult<Vec<ReviewWithAuthor>> {
    catalog::find_movie(movies, movie_id).await?;
    let movie_reviews = reviews.find_reviews_by_movie(movie_id).await?;
    with_authors(users, movie_reviews).await
}

/// Stores a review and refreshes the movie's average rating
#[instrument(skip(movies, reviews, requester, request), fields(user_id = %requester.id))]
pub async fn submit_review(
    movies: &dyn MovieRepository,
    reviews: &dyn ReviewRepository,
    requester: &AuthUser,
    movie_id: Uuid,
    request: SubmitReviewRequest,
) -> AppResult<Review> {
    let new_review = request.validate(requester.id, movie_id)?;
    catalog::find_movie(movies, movie_id).await?;

    let review = reviews.create_review(new_review).await?;
    tracing::info!(review_id = %review.id, rating = review.rating, "Review submitted");

    rating::recompute(reviews, movies, movie_id).await?;

    Ok(review)
}

/// Deletes a review written by the requester and refreshes the average rating
#[instrument(skip(movies, reviews, requester), fields(user_id = %requester.id))]
pub async fn delete_review(
    movies: &dyn MovieRepository,
    reviews: &dyn ReviewRepository,
    requester: &AuthUser,
    review_id: Uuid,
) -> AppResult<()> {
    let review = reviews
        .get_review(review_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    authorization::ensure_can_delete_review(requester, &review)?;

    if !reviews.delete_review(review_id).await? {
        return Err(AppError::NotFound("Review not found".to_string()));
    }
    tracing::info!(movie_id = %review.movie_id, "Review deleted");

    rating::recompute(reviews, movies, review.movie_id).await?;

    Ok(())
}
