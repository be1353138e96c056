use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Movie,
    routes::{
        extract::{AppPath, AppQuery},
        AppState,
    },
    services::{
        catalog,
        recommendations::{self, RankBy, MAX_RECOMMENDATIONS},
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
    pub rank_by: Option<RankBy>,
}

impl RecommendationQuery {
    fn limit_or(&self, default: usize) -> AppResult<usize> {
        match self.limit {
            None => Ok(default),
            Some(limit) if (1..=MAX_RECOMMENDATIONS).contains(&limit) => Ok(limit),
            Some(_) => Err(AppError::Validation(format!(
                "Limit must be between 1 and {}",
                MAX_RECOMMENDATIONS
            ))),
        }
    }
}

/// Handler for similar-movie recommendations
pub async fn recommend(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<RecommendationQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let limit = query.limit_or(state.config.recommendation_limit)?;
    let target = catalog::find_movie(state.movies.as_ref(), id).await?;

    let recommended = recommendations::recommend_for(
        state.movies.as_ref(),
        &target,
        limit,
        query.rank_by.unwrap_or_default(),
    )
    .await?;

    Ok(Json(recommended))
}
