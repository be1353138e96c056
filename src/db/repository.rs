//! Store capabilities consumed by the services.
//!
//! Each backend (Postgres, in-memory) implements every trait; handlers only
//! ever see the trait objects held by `AppState`.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Movie, MovieFilter, NewMovie, NewReview, NewUser, Review, User, WatchlistEntry},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieRepository: Send + Sync {
    /// Lists movies matching the filter, applying its skip/limit and ordering
    async fn list_movies(&self, filter: &MovieFilter) -> AppResult<Vec<Movie>>;

    async fn get_movie(&self, id: Uuid) -> AppResult<Option<Movie>>;

    /// Fetches the movies that exist among `ids`, in no particular order
    async fn get_movies_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Movie>>;

    async fn create_movie(&self, new_movie: NewMovie) -> AppResult<Movie>;

    /// Overwrites the stored average rating.
    ///
    /// Returns `false` when no movie has the given id.
    async fn update_average_rating(&self, id: Uuid, value: f64) -> AppResult<bool>;

    /// Deletes a movie along with its reviews and watchlist entries
    async fn delete_movie(&self, id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_reviews_by_movie(&self, movie_id: Uuid) -> AppResult<Vec<Review>>;

    async fn find_reviews_by_user(&self, user_id: Uuid) -> AppResult<Vec<Review>>;

    async fn get_review(&self, id: Uuid) -> AppResult<Option<Review>>;

    async fn create_review(&self, new_review: NewReview) -> AppResult<Review>;

    async fn delete_review(&self, id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn get_users_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>>;

    /// Looks up a user by normalized (lowercase) email
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Fails with a validation error when the email is already registered
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;

    async fn update_user(&self, user: &User) -> AppResult<User>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchlistRepository: Send + Sync {
    /// Entries of one user, oldest first
    async fn list_watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>>;

    async fn find_entry(&self, user_id: Uuid, movie_id: Uuid)
        -> AppResult<Option<WatchlistEntry>>;

    async fn add_entry(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<WatchlistEntry>;

    async fn remove_entry(&self, id: Uuid) -> AppResult<bool>;
}

/// Maps opaque bearer tokens to user ids
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, token: &str, user_id: Uuid, ttl_secs: u64) -> AppResult<()>;

    /// Returns the session owner, or `None` for unknown or expired tokens
    async fn resolve_session(&self, token: &str) -> AppResult<Option<Uuid>>;

    async fn revoke_session(&self, token: &str) -> AppResult<()>;
}
