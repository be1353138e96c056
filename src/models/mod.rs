mod movie;
mod review;
mod user;
mod watchlist;

pub use movie::{CreateMovieRequest, Movie, MovieFilter, MovieOrder, NewMovie};
pub use review::{
    NewReview, Review, ReviewWithAuthor, ReviewWithMovie, SubmitReviewRequest, MAX_RATING,
    MIN_RATING,
};
pub use user::{
    normalize_email, AuthResponse, LoginRequest, NewUser, ProfileChanges, RegisterRequest,
    UpdateProfileRequest, User,
};
pub use watchlist::{AddToWatchlistRequest, WatchlistEntry, WatchlistItem};

/// Accepts only absolute http(s) URLs with a host part
pub(crate) fn is_http_url(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .strip_prefix(scheme)
            .map(|rest| !rest.is_empty() && !rest.starts_with('/') && !rest.contains(char::is_whitespace))
            .unwrap_or(false)
    })
}
