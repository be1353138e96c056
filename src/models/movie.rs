use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::is_http_url;

/// A movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    /// Free-text genre tags
    pub genre: Vec<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    #[sqlx(rename = "cast_members")]
    pub cast: Vec<String>,
    pub synopsis: Option<String>,
    pub poster_url: Option<String>,
    /// Mean of all review ratings, 0 when unreviewed
    pub average_rating: f64,
    /// User who submitted the movie
    pub added_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// Builds a fresh record from validated input
    pub fn new(new_movie: NewMovie) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: new_movie.title,
            genre: new_movie.genre,
            release_year: new_movie.release_year,
            director: new_movie.director,
            cast: new_movie.cast,
            synopsis: new_movie.synopsis,
            poster_url: new_movie.poster_url,
            average_rating: 0.0,
            added_by: new_movie.added_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when both movies carry at least one identical genre tag
    pub fn shares_genre_with(&self, other: &Movie) -> bool {
        self.genre.iter().any(|g| other.genre.contains(g))
    }
}

/// Validated movie ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub genre: Vec<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    pub cast: Vec<String>,
    pub synopsis: Option<String>,
    pub poster_url: Option<String>,
    pub added_by: Option<Uuid>,
}

/// Body of `POST /api/movies`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    #[serde(default)]
    pub genre: Vec<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    pub synopsis: Option<String>,
    pub poster_url: Option<String>,
}

impl CreateMovieRequest {
    /// Checks required fields and normalizes tag lists
    pub fn validate(self, added_by: Uuid) -> AppResult<NewMovie> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        if let Some(year) = self.release_year {
            if !(1850..=2100).contains(&year) {
                return Err(AppError::Validation(format!(
                    "Invalid release year: {}",
                    year
                )));
            }
        }

        let poster_url = non_blank(self.poster_url);
        if let Some(url) = &poster_url {
            if !is_http_url(url) {
                return Err(AppError::Validation(format!("Invalid poster URL: {}", url)));
            }
        }

        Ok(NewMovie {
            title,
            genre: clean_tags(self.genre),
            release_year: self.release_year,
            director: non_blank(self.director),
            cast: clean_tags(self.cast),
            synopsis: non_blank(self.synopsis),
            poster_url,
            added_by: Some(added_by),
        })
    }
}

/// Trims entries, drops blanks and repeated tags while keeping order
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !cleaned.iter().any(|t| t == tag) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Ordering applied to catalog listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieOrder {
    /// Insertion order, oldest first
    #[default]
    Oldest,
    /// Newest first
    Recent,
}

/// Catalog query understood by every movie store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub min_rating: Option<f64>,
    /// Case-insensitive title substring
    pub search: Option<String>,
    pub skip: usize,
    pub limit: Option<usize>,
    pub order: MovieOrder,
}

impl MovieFilter {
    /// Filter matching every movie, without pagination
    pub fn all() -> Self {
        Self::default()
    }

    /// Evaluates the non-pagination predicates against a single movie
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(genre) = &self.genre {
            if !movie.genre.iter().any(|g| g == genre) {
                return false;
            }
        }
        if let Some(year) = self.release_year {
            if movie.release_year != Some(year) {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if movie.average_rating < min_rating {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !movie.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}
