use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{MovieRepository, ReviewRepository, SessionStore, UserRepository},
    error::{AppError, AppResult},
    models::{
        normalize_email, AuthResponse, LoginRequest, NewUser, ProfileChanges, RegisterRequest,
        ReviewWithMovie, User,
    },
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Verified against on unknown emails so every failed login pays for one
/// Argon2 run. Uses the same parameters as `Argon2::default()` and matches no
/// password.
const UNKNOWN_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$XzIxuI+5XBy66Kns62amaw$CoWDrglnE5ZgKcyYnWLUTLPVj0JfNUKgX7/07zERPXs";

/// Public profile with the user's reviews
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub reviews: Vec<ReviewWithMovie>,
}

/// Hash password securely using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verify password against a stored PHC hash
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

async fn start_session(
    sessions: &dyn SessionStore,
    user: User,
    ttl_secs: u64,
) -> AppResult<AuthResponse> {
    let token = Uuid::new_v4().simple().to_string();
    sessions.create_session(&token, user.id, ttl_secs).await?;
    Ok(AuthResponse { token, user })
}

/// Creates an account and logs it in
#[instrument(skip_all, fields(email = %request.email))]
pub async fn register(
    users: &dyn UserRepository,
    sessions: &dyn SessionStore,
    config: &Config,
    request: RegisterRequest,
) -> AppResult<AuthResponse> {
    let (username, email) = request.validate()?;

    if users.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    let password_hash = hash_password(&request.password)?;
    let is_admin = config.is_admin_email(&email);

    let user = users
        .create_user(NewUser {
            username,
            email,
            password_hash,
            is_admin,
        })
        .await?;

    tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User registered");

    start_session(sessions, user, config.session_ttl_secs).await
}

/// Checks credentials and opens a new session
#[instrument(skip_all, fields(email = %request.email))]
pub async fn login(
    users: &dyn UserRepository,
    sessions: &dyn SessionStore,
    config: &Config,
    request: LoginRequest,
) -> AppResult<AuthResponse> {
    let email = normalize_email(&request.email)
        .map_err(|_| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let user = match users.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            verify_password(&request.password, UNKNOWN_USER_HASH)?;
            tracing::warn!("Login attempt for unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    if !verify_password(&request.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    tracing::info!(user_id = %user.id, "User logged in");

    start_session(sessions, user, config.session_ttl_secs).await
}

pub async fn logout(sessions: &dyn SessionStore, token: &str) -> AppResult<()> {
    sessions.revoke_session(token).await
}

pub async fn find_user(users: &dyn UserRepository, user_id: Uuid) -> AppResult<User> {
    users
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Loads a profile with each review's movie title and poster
#[instrument(skip(users, reviews, movies))]
pub async fn get_profile(
    users: &dyn UserRepository,
    reviews: &dyn ReviewRepository,
    movies: &dyn MovieRepository,
    user_id: Uuid,
) -> AppResult<UserProfile> {
    let user = find_user(users, user_id).await?;
    let user_reviews = reviews.find_reviews_by_user(user_id).await?;

    let mut movie_ids: Vec<Uuid> = user_reviews.iter().map(|r| r.movie_id).collect();
    movie_ids.sort_unstable();
    movie_ids.dedup();
    let reviewed = movies.get_movies_by_ids(&movie_ids).await?;

    let reviews = user_reviews
        .into_iter()
        .map(|review| {
            let movie = reviewed.iter().find(|m| m.id == review.movie_id);
            ReviewWithMovie {
                movie_title: movie.map(|m| m.title.clone()),
                movie_poster_url: movie.and_then(|m| m.poster_url.clone()),
                review,
            }
        })
        .collect();

    Ok(UserProfile { user, reviews })
}

/// Applies profile changes; absent fields keep their current value
#[instrument(skip(users, changes))]
pub async fn update_profile(
    users: &dyn UserRepository,
    user_id: Uuid,
    changes: ProfileChanges,
) -> AppResult<User> {
    let mut user = find_user(users, user_id).await?;

    if let Some(email) = changes.email {
        if email != user.email {
            if let Some(other) = users.find_user_by_email(&email).await? {
                if other.id != user.id {
                    return Err(AppError::Validation("User already exists".to_string()));
                }
            }
            user.email = email;
        }
    }
    if let Some(username) = changes.username {
        user.username = username;
    }
    if let Some(password) = changes.password {
        user.password_hash = hash_password(&password)?;
    }
    if let Some(profile_picture) = changes.profile_picture {
        user.profile_picture = Some(profile_picture);
    }

    let updated = users.update_user(&user).await?;
    tracing::info!(user_id = %updated.id, "Profile updated");
    Ok(updated)
}
