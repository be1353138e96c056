//! Ownership and role checks that gate mutations.
//!
//! Callers resolve the target record first (NotFound wins over Forbidden)
//! and must run these before touching the store.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Movie, Review},
};

/// Administrators or the movie's creator may delete it
pub fn ensure_can_delete_movie(requester: &AuthUser, movie: &Movie) -> AppResult<()> {
    if requester.is_admin || movie.added_by == Some(requester.id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Not authorized to delete this movie".to_string(),
        ))
    }
}

/// Only the author may delete a review; there is no admin override here
pub fn ensure_can_delete_review(requester: &AuthUser, review: &Review) -> AppResult<()> {
    if review.user_id == requester.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Not authorized to delete this review".to_string(),
        ))
    }
}

pub fn ensure_admin(requester: &AuthUser) -> AppResult<()> {
    if requester.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}

/// Profiles and watchlists are reachable by their owner and administrators
pub fn ensure_self_or_admin(requester: &AuthUser, user_id: Uuid) -> AppResult<()> {
    if requester.is_admin || requester.id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Not authorized to access this user".to_string(),
        ))
    }
}
