use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Lowest accepted star rating
pub const MIN_RATING: i32 = 1;
/// Highest accepted star rating
pub const MAX_RATING: i32 = 5;

/// A user's rating and opinion of a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    /// Author
    pub user_id: Uuid,
    pub movie_id: Uuid,
    /// Star rating, 1 to 5
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(new_review: NewReview) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: new_review.user_id,
            movie_id: new_review.movie_id,
            rating: new_review.rating,
            review_text: new_review.review_text,
            created_at: Utc::now(),
        }
    }
}

/// Validated review ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
}

/// Body of `POST /api/movies/:id/reviews`
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReviewRequest {
    pub rating: i32,
    pub review_text: Option<String>,
}

impl SubmitReviewRequest {
    pub fn validate(self, user_id: Uuid, movie_id: Uuid) -> AppResult<NewReview> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(AppError::Validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        let review_text = self
            .review_text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(NewReview {
            user_id,
            movie_id,
            rating: self.rating,
            review_text,
        })
    }
}

/// Review as shown under a movie, with the author's name resolved
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: Review,
    /// `None` when the author account no longer exists
    pub username: Option<String>,
}

/// Review as shown on a profile, with the reviewed movie resolved
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewWithMovie {
    #[serde(flatten)]
    pub review: Review,
    pub movie_title: Option<String>,
    pub movie_poster_url: Option<String>,
}
