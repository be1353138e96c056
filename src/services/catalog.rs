use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{MovieRepository, ReviewRepository, UserRepository},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CreateMovieRequest, Movie, MovieFilter, ReviewWithAuthor},
    services::{
        authorization,
        recommendations::{self, RankBy},
        reviews as review_service,
    },
};

/// Movie detail page payload
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetail {
    pub movie: Movie,
    pub reviews: Vec<ReviewWithAuthor>,
    pub recommendations: Vec<Movie>,
}

pub async fn find_movie(movies: &dyn MovieRepository, id: Uuid) -> AppResult<Movie> {
    movies
        .get_movie(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))
}

pub async fn list_movies(
    movies: &dyn MovieRepository,
    filter: &MovieFilter,
) -> AppResult<Vec<Movie>> {
    let listed = movies.list_movies(filter).await?;
    tracing::debug!(count = listed.len(), skip = filter.skip, "Movies listed");
    Ok(listed)
}

/// Movie with its reviews and the top recommendations
#[instrument(skip(movies, reviews, users))]
pub async fn get_movie_detail(
    movies: &dyn MovieRepository,
    reviews: &dyn ReviewRepository,
    users: &dyn UserRepository,
    id: Uuid,
    recommendation_limit: usize,
) -> AppResult<MovieDetail> {
    let movie = find_movie(movies, id).await?;

    let movie_reviews = reviews.find_reviews_by_movie(id).await?;
    let reviews = review_service::with_authors(users, movie_reviews).await?;

    let recommendations =
        recommendations::recommend_for(movies, &movie, recommendation_limit, RankBy::Rating)
            .await?;

    Ok(MovieDetail {
        movie,
        reviews,
        recommendations,
    })
}

/// Adds a movie to the catalog; administrators only
#[instrument(skip(movies, requester, request), fields(user_id = %requester.id))]
pub async fn create_movie(
    movies: &dyn MovieRepository,
    requester: &AuthUser,
    request: CreateMovieRequest,
) -> AppResult<Movie> {
    authorization::ensure_admin(requester)?;
    let new_movie = request.validate(requester.id)?;
    let movie = movies.create_movie(new_movie).await?;
    tracing::info!(movie_id = %movie.id, "Movie added to catalog");
    Ok(movie)
}

/// Removes a movie (and its reviews and watchlist entries)
#[instrument(skip(movies, requester), fields(user_id = %requester.id))]
pub async fn delete_movie(
    movies: &dyn MovieRepository,
    requester: &AuthUser,
    id: Uuid,
) -> AppResult<()> {
    let movie = find_movie(movies, id).await?;
    authorization::ensure_can_delete_movie(requester, &movie)?;

    if !movies.delete_movie(id).await? {
        return Err(AppError::NotFound("Movie not found".to_string()));
    }
    tracing::info!(movie_id = %id, "Movie deleted");
    Ok(())
}
