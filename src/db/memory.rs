use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Movie, MovieFilter, MovieOrder, NewMovie, NewReview, NewUser, Review, User,
        WatchlistEntry,
    },
};

use super::repository::{
    MovieRepository, ReviewRepository, SessionStore, UserRepository, WatchlistRepository,
};

/// Process-local record store, used by tests and `IN_MEMORY=true`
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

/// Records kept in insertion order so listings are stable
#[derive(Default)]
struct MemoryStoreInner {
    movies: Vec<Movie>,
    reviews: Vec<Review>,
    users: HashMap<Uuid, User>,
    watchlist: Vec<WatchlistEntry>,
}

impl MemoryStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MovieRepository for MemoryStore {
    async fn list_movies(&self, filter: &MovieFilter) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        let matching = inner.movies.iter().filter(|m| filter.matches(m));

        let ordered: Vec<&Movie> = match filter.order {
            MovieOrder::Oldest => matching.collect(),
            MovieOrder::Recent => matching.rev().collect(),
        };

        Ok(ordered
            .into_iter()
            .skip(filter.skip)
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn get_movie(&self, id: Uuid) -> AppResult<Option<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner.movies.iter().find(|m| m.id == id).cloned())
    }

    async fn get_movies_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner
            .movies
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn create_movie(&self, new_movie: NewMovie) -> AppResult<Movie> {
        let movie = Movie::new(new_movie);
        let mut inner = self.inner.write().await;
        inner.movies.push(movie.clone());
        Ok(movie)
    }

    async fn update_average_rating(&self, id: Uuid, value: f64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.movies.iter_mut().find(|m| m.id == id) {
            Some(movie) => {
                movie.average_rating = value;
                movie.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_movie(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.movies.len();
        inner.movies.retain(|m| m.id != id);
        if inner.movies.len() == before {
            return Ok(false);
        }
        inner.reviews.retain(|r| r.movie_id != id);
        inner.watchlist.retain(|e| e.movie_id != id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl ReviewRepository for MemoryStore {
    async fn find_reviews_by_movie(&self, movie_id: Uuid) -> AppResult<Vec<Review>> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn find_reviews_by_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_review(&self, id: Uuid) -> AppResult<Option<Review>> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn create_review(&self, new_review: NewReview) -> AppResult<Review> {
        let review = Review::new(new_review);
        let mut inner = self.inner.write().await;
        inner.reviews.push(review.clone());
        Ok(review)
    }

    async fn delete_review(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.reviews.len();
        inner.reviews.retain(|r| r.id != id);
        Ok(inner.reviews.len() != before)
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn get_users_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id))
            .cloned()
            .collect())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(AppError::Validation("User already exists".to_string()));
        }
        let user = User::new(new_user);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Validation("User already exists".to_string()));
        }
        match inner.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user.clone())
            }
            None => Err(AppError::NotFound("User not found".to_string())),
        }
    }
}

#[async_trait::async_trait]
impl WatchlistRepository for MemoryStore {
    async fn list_watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .watchlist
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_entry(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> AppResult<Option<WatchlistEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .watchlist
            .iter()
            .find(|e| e.user_id == user_id && e.movie_id == movie_id)
            .cloned())
    }

    async fn add_entry(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<WatchlistEntry> {
        let mut inner = self.inner.write().await;
        if inner
            .watchlist
            .iter()
            .any(|e| e.user_id == user_id && e.movie_id == movie_id)
        {
            return Err(AppError::Validation("Movie already in watchlist".to_string()));
        }
        let entry = WatchlistEntry::new(user_id, movie_id);
        inner.watchlist.push(entry.clone());
        Ok(entry)
    }

    async fn remove_entry(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.watchlist.len();
        inner.watchlist.retain(|e| e.id != id);
        Ok(inner.watchlist.len() != before)
    }
}

/// Process-local session store with expiry
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, (Uuid, DateTime<Utc>)>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_session(&self, token: &str, user_id: Uuid, ttl_secs: u64) -> AppResult<()> {
        let now = Utc::now();
        let expires_at = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut sessions = self.sessions.write().await;
        // abandoned sessions are never resolved again, drop them here
        sessions.retain(|_, (_, expires)| *expires > now);
        sessions.insert(token.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn resolve_session(&self, token: &str) -> AppResult<Option<Uuid>> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(Some(*user_id)),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn revoke_session(&self, token: &str) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
        Ok(())
    }
}
