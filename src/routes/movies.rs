use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CreateMovieRequest, Movie, MovieFilter, MovieOrder, MAX_RATING},
    routes::{
        extract::{AppJson, AppPath, AppQuery},
        AppState,
    },
    services::catalog::{self, MovieDetail},
};

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

/// Query string of `GET /api/movies`
#[derive(Debug, Default, Deserialize)]
pub struct ListMoviesQuery {
    pub genre: Option<String>,
    pub year: Option<i32>,
    /// Minimum average rating
    pub rating: Option<f64>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub sort: Option<MovieOrder>,
}

impl ListMoviesQuery {
    pub fn into_filter(self) -> AppResult<MovieFilter> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::Validation("Page must be at least 1".to_string()));
        }

        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "Limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        if let Some(rating) = self.rating {
            if !(0.0..=f64::from(MAX_RATING)).contains(&rating) {
                return Err(AppError::Validation(format!(
                    "Rating must be between 0 and {}",
                    MAX_RATING
                )));
            }
        }

        let skip = (page - 1)
            .checked_mul(limit)
            .filter(|skip| i64::try_from(*skip).is_ok())
            .ok_or_else(|| AppError::Validation(format!("Page {} is out of range", page)))?;

        Ok(MovieFilter {
            genre: non_blank(self.genre),
            release_year: self.year,
            min_rating: self.rating,
            search: non_blank(self.search),
            skip,
            limit: Some(limit),
            order: self.sort.unwrap_or_default(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Handler for catalog listing
pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListMoviesQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let filter = query.into_filter()?;
    let movies = catalog::list_movies(state.movies.as_ref(), &filter).await?;
    Ok(Json(movies))
}

/// Handler for the movie detail page
pub async fn detail(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<MovieDetail>> {
    let detail = catalog::get_movie_detail(
        state.movies.as_ref(),
        state.reviews.as_ref(),
        state.users.as_ref(),
        id,
        state.config.recommendation_limit,
    )
    .await?;
    Ok(Json(detail))
}

/// Handler for adding a movie (admin only)
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let movie = catalog::create_movie(state.movies.as_ref(), &user, request).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Handler for removing a movie (admin or creator)
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    catalog::delete_movie(state.movies.as_ref(), &user, id).await?;
    Ok(Json(json!({ "message": "Movie removed" })))
}
