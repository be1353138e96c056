use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{MovieRepository, UserRepository, WatchlistRepository},
    error::{AppError, AppResult},
    models::{WatchlistEntry, WatchlistItem},
    services::{accounts, catalog},
};

/// A user's watchlist with every movie populated, oldest entry first
pub async fn get_watchlist(
    watchlists: &dyn WatchlistRepository,
    movies: &dyn MovieRepository,
    user_id: Uuid,
) -> AppResult<Vec<WatchlistItem>> {
    let entries = watchlists.list_watchlist(user_id).await?;
    let movie_ids: Vec<Uuid> = entries.iter().map(|e| e.movie_id).collect();
    let listed = movies.get_movies_by_ids(&movie_ids).await?;

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            listed
                .iter()
                .find(|m| m.id == entry.movie_id)
                .map(|movie| WatchlistItem {
                    id: entry.id,
                    movie: movie.clone(),
                    added_at: entry.added_at,
                })
        })
        .collect())
}

#[instrument(skip(watchlists, movies, users))]
pub async fn add_to_watchlist(
    watchlists: &dyn WatchlistRepository,
    movies: &dyn MovieRepository,
    users: &dyn UserRepository,
    user_id: Uuid,
    movie_id: Uuid,
) -> AppResult<WatchlistEntry> {
    accounts::find_user(users, user_id).await?;
    catalog::find_movie(movies, movie_id).await?;

    if watchlists.find_entry(user_id, movie_id).await?.is_some() {
        return Err(AppError::Validation("Movie already in watchlist".to_string()));
    }

    let entry = watchlists.add_entry(user_id, movie_id).await?;
    tracing::info!(entry_id = %entry.id, "Added to watchlist");
    Ok(entry)
}

#[instrument(skip(watchlists))]
pub async fn remove_from_watchlist(
    watchlists: &dyn WatchlistRepository,
    user_id: Uuid,
    movie_id: Uuid,
) -> AppResult<()> {
    let entry = watchlists
        .find_entry(user_id, movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found in watchlist".to_string()))?;

    watchlists.remove_entry(entry.id).await?;
    tracing::info!(entry_id = %entry.id, "Removed from watchlist");
    Ok(())
}
