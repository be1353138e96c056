use serde::Deserialize;
use tracing::instrument;

use crate::{
    db::MovieRepository,
    error::AppResult,
    models::{Movie, MovieFilter},
};

/// Largest recommendation list a caller may ask for
pub const MAX_RECOMMENDATIONS: usize = 50;

/// Ordering applied to genre-matching candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    /// Highest average rating first
    #[default]
    Rating,
    /// Average rating closest to the target's first
    Proximity,
}

/// Ranks catalog movies similar to `target`
///
/// Candidates must differ from the target and share at least one genre tag
/// with it. They are ordered according to `rank_by` and truncated to `limit`.
/// Sorting is stable, so equally ranked movies keep their catalog order.
pub fn recommend(target: &Movie, catalog: &[Movie], limit: usize, rank_by: RankBy) -> Vec<Movie> {
    let mut candidates: Vec<&Movie> = catalog
        .iter()
        .filter(|m| m.id != target.id)
        .filter(|m| m.shares_genre_with(target))
        .collect();

    match rank_by {
        RankBy::Rating => {
            candidates.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
        }
        RankBy::Proximity => {
            let distance = |m: &Movie| (m.average_rating - target.average_rating).abs();
            candidates.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
        }
    }

    candidates.into_iter().take(limit).cloned().collect()
}

/// Loads the catalog and ranks it against `target`
#[instrument(skip(movies, target), fields(movie_id = %target.id))]
pub async fn recommend_for(
    movies: &dyn MovieRepository,
    target: &Movie,
    limit: usize,
    rank_by: RankBy,
) -> AppResult<Vec<Movie>> {
    if target.genre.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let catalog = movies.list_movies(&MovieFilter::all()).await?;
    let recommended = recommend(target, &catalog, limit, rank_by);

    tracing::debug!(
        catalog_size = catalog.len(),
        recommended = recommended.len(),
        "Recommendations ranked"
    );

    Ok(recommended)
}
