use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Movie, MovieFilter, MovieOrder, NewMovie, NewReview, NewUser, Review, User,
        WatchlistEntry,
    },
};

use super::repository::{MovieRepository, ReviewRepository, UserRepository, WatchlistRepository};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Record store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Builds the catalog query for a filter
fn movie_list_query(filter: &MovieFilter) -> AppResult<QueryBuilder<'static, Postgres>> {
    let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM movies WHERE TRUE");

    if let Some(genre) = &filter.genre {
        query.push(" AND ");
        query.push_bind(genre.clone());
        query.push(" = ANY(genre)");
    }
    if let Some(year) = filter.release_year {
        query.push(" AND release_year = ");
        query.push_bind(year);
    }
    if let Some(min_rating) = filter.min_rating {
        query.push(" AND average_rating >= ");
        query.push_bind(min_rating);
    }
    if let Some(search) = &filter.search {
        // position() instead of ILIKE so `%` and `_` in the search are literal
        query.push(" AND position(lower(");
        query.push_bind(search.clone());
        query.push(") in lower(title)) > 0");
    }

    match filter.order {
        MovieOrder::Oldest => query.push(" ORDER BY created_at ASC, id ASC"),
        MovieOrder::Recent => query.push(" ORDER BY created_at DESC, id DESC"),
    };

    query.push(" OFFSET ");
    query.push_bind(to_bind_count(filter.skip, "Offset")?);
    if let Some(limit) = filter.limit {
        query.push(" LIMIT ");
        query.push_bind(to_bind_count(limit, "Limit")?);
    }

    Ok(query)
}

/// OFFSET and LIMIT are BIGINT in Postgres
fn to_bind_count(value: usize, name: &str) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|_| AppError::Validation(format!("{} {} is out of range", name, value)))
}

#[async_trait::async_trait]
impl MovieRepository for PgStore {
    async fn list_movies(&self, filter: &MovieFilter) -> AppResult<Vec<Movie>> {
        let movies = movie_list_query(filter)?
            .build_query_as::<Movie>()
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }

    async fn get_movie(&self, id: Uuid) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn get_movies_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Movie>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let movies = sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }

    async fn create_movie(&self, new_movie: NewMovie) -> AppResult<Movie> {
        let movie = Movie::new(new_movie);
        let created = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (
                id, title, genre, release_year, director, cast_members,
                synopsis, poster_url, average_rating, added_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.genre)
        .bind(movie.release_year)
        .bind(&movie.director)
        .bind(&movie.cast)
        .bind(&movie.synopsis)
        .bind(&movie.poster_url)
        .bind(movie.average_rating)
        .bind(movie.added_by)
        .bind(movie.created_at)
        .bind(movie.updated_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(movie_id = %created.id, title = %created.title, "Movie created");
        Ok(created)
    }

    async fn update_average_rating(&self, id: Uuid, value: f64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE movies SET average_rating = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_movie(&self, id: Uuid) -> AppResult<bool> {
        // reviews and watchlist entries go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl ReviewRepository for PgStore {
    async fn find_reviews_by_movie(&self, movie_id: Uuid) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE movie_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn find_reviews_by_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn get_review(&self, id: Uuid) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn create_review(&self, new_review: NewReview) -> AppResult<Review> {
        let review = Review::new(new_review);
        let created = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, user_id, movie_id, rating, review_text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(review.id)
        .bind(review.user_id)
        .bind(review.movie_id)
        .bind(review.rating)
        .bind(&review.review_text)
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn delete_review(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl UserRepository for PgStore {
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_users_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let user = User::new(new_user);
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, profile_picture, join_date, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile_picture)
        .bind(user.join_date)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(created)
    }

    async fn update_user(&self, user: &User) -> AppResult<User> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, profile_picture = $5, is_admin = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile_picture)
        .bind(user.is_admin)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        updated.ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[async_trait::async_trait]
impl WatchlistRepository for PgStore {
    async fn list_watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let entries = sqlx::query_as::<_, WatchlistEntry>(
            "SELECT * FROM watchlist_entries WHERE user_id = $1 ORDER BY added_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn find_entry(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> AppResult<Option<WatchlistEntry>> {
        let entry = sqlx::query_as::<_, WatchlistEntry>(
            "SELECT * FROM watchlist_entries WHERE user_id = $1 AND movie_id = $2",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn add_entry(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<WatchlistEntry> {
        let entry = WatchlistEntry::new(user_id, movie_id);
        let created = sqlx::query_as::<_, WatchlistEntry>(
            r#"
            INSERT INTO watchlist_entries (id, user_id, movie_id, added_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.movie_id)
        .bind(entry.added_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Validation("Movie already in watchlist".to_string())
            }
            other => AppError::Database(other),
        })?;
        Ok(created)
    }

    async fn remove_entry(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM watchlist_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// The only unique constraint on `users` is the email index
fn map_unique_violation(error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Validation("User already exists".to_string())
        }
        other => AppError::Database(other),
    }
}
