use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Movie;

/// A movie a user marked for later viewing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct WatchlistEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub added_at: DateTime<Utc>,
}

impl WatchlistEntry {
    pub fn new(user_id: Uuid, movie_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            movie_id,
            added_at: Utc::now(),
        }
    }
}

/// Watchlist entry with its movie populated
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WatchlistItem {
    pub id: Uuid,
    pub movie: Movie,
    pub added_at: DateTime<Utc>,
}

/// Body of `POST /api/users/:id/watchlist`
#[derive(Debug, Clone, Deserialize)]
pub struct AddToWatchlistRequest {
    pub movie_id: Uuid,
}
