//! Ratings repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::rating::{CreateRating, Rating},
};

#[derive(Clone)]
pub struct RatingsRepository {
    pool: Pool<Postgres>,
}

impl RatingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a rating and fold it into the book's running average,
    /// in one transaction.
    pub async fn create(&self, user_id: i32, rating: &CreateRating) -> AppResult<(Rating, f64)> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(rating.book_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                rating.book_id
            )));
        }

        let inserted = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (book_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(rating.book_id)
        .bind(user_id)
        .bind(rating.rating)
        .bind(&rating.comment)
        .fetch_one(&mut *tx)
        .await?;

        let new_avg: f64 = sqlx::query_scalar(
            r#"
            UPDATE books
            SET rating = (rating * rating_count + $2) / (rating_count + 1),
                rating_count = rating_count + 1
            WHERE id = $1
            RETURNING rating
            "#,
        )
        .bind(rating.book_id)
        .bind(rating.rating as f64)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((inserted, new_avg))
    }

    /// Ratings submitted for a book, newest first
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE book_id = $1 ORDER BY created_at DESC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }
}
