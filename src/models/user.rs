use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::is_http_url;

const MIN_PASSWORD_LEN: usize = 6;
const MAX_USERNAME_LEN: usize = 50;

/// A registered account
#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub join_date: DateTime<Utc>,
    pub is_admin: bool,
}

impl User {
    pub fn new(new_user: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            profile_picture: None,
            join_date: Utc::now(),
            is_admin: new_user.is_admin,
        }
    }
}

/// Account ready to be persisted, password already hashed
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Body of `POST /api/auth/register`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Returns the trimmed username and normalized email
    pub fn validate(&self) -> AppResult<(String, String)> {
        let username = validate_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        validate_password(&self.password)?;
        Ok((username, email))
    }
}

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register and login
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Body of `PUT /api/users/:id`; blank fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
}

/// Validated profile changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> AppResult<ProfileChanges> {
        let username = provided(self.username)
            .map(|u| validate_username(&u))
            .transpose()?;
        let email = provided(self.email)
            .map(|e| normalize_email(&e))
            .transpose()?;
        let password = match self.password.filter(|p| !p.is_empty()) {
            Some(password) => {
                validate_password(&password)?;
                Some(password)
            }
            None => None,
        };
        let profile_picture = provided(self.profile_picture);
        if let Some(url) = &profile_picture {
            if !is_http_url(url) {
                return Err(AppError::Validation(format!(
                    "Invalid profile picture URL: {}",
                    url
                )));
            }
        }

        Ok(ProfileChanges {
            username,
            email,
            password,
            profile_picture,
        })
    }
}

fn provided(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_username(username: &str) -> AppResult<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::Validation(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }
    Ok(username.to_string())
}

/// Lowercases and trims an email, rejecting obviously malformed input
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::Validation(format!("Invalid email: {}", email))),
    }
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
