use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{MovieRepository, ReviewRepository},
    error::AppResult,
    models::Review,
};

/// Arithmetic mean of the review ratings, 0 for an empty set
pub fn average_rating(reviews: &[Review]) -> f64 {
    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    sum as f64 / reviews.len().max(1) as f64
}

/// Recomputes a movie's average rating from its current reviews and stores it
///
/// Runs after every review creation and deletion, before the response is
/// produced. A movie that no longer exists is not an error: the write simply
/// matches nothing. Concurrent recomputations race and the last write wins.
///
/// Returns the value that was written.
#[instrument(skip(reviews, movies))]
pub async fn recompute(
    reviews: &dyn ReviewRepository,
    movies: &dyn MovieRepository,
    movie_id: Uuid,
) -> AppResult<f64> {
    let movie_reviews = reviews.find_reviews_by_movie(movie_id).await?;
    let average = average_rating(&movie_reviews);

    let updated = movies.update_average_rating(movie_id, average).await?;
    if updated {
        tracing::debug!(
            review_count = movie_reviews.len(),
            average_rating = average,
            "Average rating recomputed"
        );
    } else {
        tracing::debug!("Movie vanished before its rating could be updated");
    }

    Ok(average)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::repository::{MockMovieRepository, MockReviewRepository};
    use crate::models::{NewMovie, NewReview};
    use mockall::predicate::eq;

    fn review(movie_id: Uuid, rating: i32) -> Review {
        Review::new(NewReview {
            user_id: Uuid::new_v4(),
            movie_id,
            rating,
            review_text: None,
        })
    }

    #[test]
    fn test_average_of_empty_set_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_average_is_raw_mean() {
        let movie_id = Uuid::new_v4();
        let reviews = vec![review(movie_id, 5), review(movie_id, 4)];
        assert_eq!(average_rating(&reviews), 4.5);

        let reviews = vec![review(movie_id, 5), review(movie_id, 4), review(movie_id, 4)];
        assert!((average_rating(&reviews) - 13.0 / 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_recompute_writes_mean() {
        let movie_id = Uuid::new_v4();
        let stored = vec![review(movie_id, 5), review(movie_id, 3), review(movie_id, 4)];

        let mut reviews = MockReviewRepository::new();
        reviews
            .expect_find_reviews_by_movie()
            .with(eq(movie_id))
            .times(1)
            .returning(move |_| Ok(stored.clone()));

        let mut movies = MockMovieRepository::new();
        movies
            .expect_update_average_rating()
            .with(eq(movie_id), eq(4.0))
            .times(1)
            .returning(|_, _| Ok(true));

        let average = recompute(&reviews, &movies, movie_id).await.unwrap();
        assert_eq!(average, 4.0);
    }

    #[tokio::test]
    async fn test_recompute_without_reviews_writes_zero() {
        let movie_id = Uuid::new_v4();

        let mut reviews = MockReviewRepository::new();
        reviews
            .expect_find_reviews_by_movie()
            .returning(|_| Ok(vec![]));

        let mut movies = MockMovieRepository::new();
        movies
            .expect_update_average_rating()
            .with(eq(movie_id), eq(0.0))
            .times(1)
            .returning(|_, _| Ok(true));

        assert_eq!(recompute(&reviews, &movies, movie_id).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_recompute_for_vanished_movie_is_noop() {
        let mut reviews = MockReviewRepository::new();
        reviews
            .expect_find_reviews_by_movie()
            .returning(|_| Ok(vec![]));

        let mut movies = MockMovieRepository::new();
        movies
            .expect_update_average_rating()
            .returning(|_, _| Ok(false));

        tokio_test::assert_ok!(recompute(&reviews, &movies, Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_recompute_tracks_deletions_and_is_idempotent() {
        let store = MemoryStore::new();
        let movie = store
            .create_movie(NewMovie {
                title: "Dunkirk".to_string(),
                genre: vec!["War".to_string()],
                release_year: Some(2017),
                director: None,
                cast: vec![],
                synopsis: None,
                poster_url: None,
                added_by: None,
            })
            .await
            .unwrap();

        let mut created = Vec::new();
        for rating in [5, 3, 4] {
            let review = store
                .create_review(NewReview {
                    user_id: Uuid::new_v4(),
                    movie_id: movie.id,
                    rating,
                    review_text: None,
                })
                .await
                .unwrap();
            created.push(review);
        }

        assert_eq!(recompute(&store, &store, movie.id).await.unwrap(), 4.0);
        let stored = store.get_movie(movie.id).await.unwrap().unwrap();
        assert_eq!(stored.average_rating, 4.0);

        store.delete_review(created[1].id).await.unwrap();
        assert_eq!(recompute(&store, &store, movie.id).await.unwrap(), 4.5);
        assert_eq!(recompute(&store, &store, movie.id).await.unwrap(), 4.5);

        let stored = store.get_movie(movie.id).await.unwrap().unwrap();
        assert_eq!(stored.average_rating, 4.5);
    }
}
