//! Borrows repository for database operations.
//!
//! Every workflow mutation (borrow, return, extend) runs as a single
//! transaction; stock moves are conditional updates checked through the
//! affected-row count, so two borrows of the last copy cannot both succeed.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{compute_fine, Borrow, BorrowDetails, BorrowStatus},
        PageQuery,
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a new borrow (take one copy of a book).
    ///
    /// The decrement carries `available_copies > 0` in its WHERE clause;
    /// zero affected rows means the last copy was taken by someone else.
    pub async fn create(
        &self,
        user_id: i32,
        book_id: i32,
        loan_period_days: i64,
    ) -> AppResult<Borrow> {
        let now = Utc::now();
        let due_date = now + Duration::days(loan_period_days);

        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }

        let taken = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1,
                status = CASE WHEN available_copies - 1 <= 0 THEN 'borrowed' ELSE status END,
                updated_at = NOW()
            WHERE id = $1 AND available_copies > 0
            "#,
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if taken.rows_affected() == 0 {
            return Err(AppError::InvalidState("Book is not available".to_string()));
        }

        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (user_id, book_id, borrow_date, due_date, status)
            VALUES ($1, $2, $3, $4, 'ongoing')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(borrow)
    }

    /// Return a borrow: compute the fine, close the record, give the copy
    /// back and optionally fold in a 1-5 rating.
    pub async fn return_borrow(
        &self,
        borrow_id: i32,
        user_id: i32,
        rating: Option<i16>,
        fine_rate_per_day: i64,
    ) -> AppResult<(i64, Option<i16>)> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let borrow = sqlx::query_as::<_, Borrow>(
            "SELECT * FROM borrows WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(borrow_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow record {} not found", borrow_id)))?;

        if !borrow.status.can_transition_to(BorrowStatus::Returned) {
            return Err(AppError::InvalidState(format!(
                "Borrow is {}, not an active loan",
                borrow.status
            )));
        }

        let fine = compute_fine(borrow.due_date, now, fine_rate_per_day);

        sqlx::query(
            r#"
            UPDATE borrows
            SET status = 'returned', return_date = $2, fine_amount = $3, rating = $4
            WHERE id = $1
            "#,
        )
        .bind(borrow_id)
        .bind(now)
        .bind(fine)
        .bind(rating)
        .execute(&mut *tx)
        .await?;

        // One copy comes back; the counter never exceeds total_copies.
        sqlx::query(
            r#"
            UPDATE books
            SET available_copies = LEAST(total_copies, available_copies + 1),
                status = 'available',
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(borrow.book_id)
        .execute(&mut *tx)
        .await?;

        if let Some(r) = rating {
            sqlx::query(
                r#"
                UPDATE books
                SET rating = (rating * rating_count + $2) / (rating_count + 1),
                    rating_count = rating_count + 1
                WHERE id = $1
                "#,
            )
            .bind(borrow.book_id)
            .bind(r as f64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok((fine, rating))
    }

    /// Extend an active borrow by `extension_days`. No limit on the number
    /// of extensions.
    pub async fn extend(
        &self,
        borrow_id: i32,
        user_id: i32,
        extension_days: i64,
    ) -> AppResult<DateTime<Utc>> {
        let new_due: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            UPDATE borrows
            SET due_date = due_date + make_interval(days => $3)
            WHERE id = $1 AND user_id = $2
              AND status IN ('pending', 'ongoing', 'requested_return')
            RETURNING due_date
            "#,
        )
        .bind(borrow_id)
        .bind(user_id)
        .bind(extension_days as i32)
        .fetch_optional(&self.pool)
        .await?;

        new_due.ok_or_else(|| AppError::NotFound("No active borrow found".to_string()))
    }

    /// Borrow history for a user, newest first, paginated.
    pub async fn user_history(
        &self,
        user_id: i32,
        page: &PageQuery,
    ) -> AppResult<(i64, Vec<BorrowDetails>)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrows WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT br.id, br.user_id, br.book_id, br.borrow_date, br.due_date,
                   br.return_date, br.status, br.fine_amount, br.rating,
                   b.title AS book_title, b.author AS book_author, b.cover_url
            FROM borrows br
            JOIN books b ON br.book_id = b.id
            WHERE br.user_id = $1
            ORDER BY br.borrow_date DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((total, rows_to_details(rows)))
    }

    /// Admin report over all borrow records, optionally filtered by status,
    /// newest first, paginated. A `late` filter selects active records whose
    /// due date has passed.
    pub async fn report(
        &self,
        status: Option<BorrowStatus>,
        page: &PageQuery,
    ) -> AppResult<(i64, Vec<BorrowDetails>)> {
        let filter = match status {
            None => String::new(),
            Some(BorrowStatus::Late) => {
                "WHERE br.status IN ('pending', 'ongoing', 'requested_return') AND br.due_date < NOW()"
                    .to_string()
            }
            Some(s) => format!("WHERE br.status = '{}'", s.as_str()),
        };

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM borrows br {}",
            filter
        ))
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT br.id, br.user_id, br.book_id, br.borrow_date, br.due_date,
                   br.return_date, br.status, br.fine_amount, br.rating,
                   b.title AS book_title, b.author AS book_author, b.cover_url,
                   u.name AS user_name
            FROM borrows br
            JOIN books b ON br.book_id = b.id
            JOIN users u ON br.user_id = u.id
            {}
            ORDER BY br.borrow_date DESC
            LIMIT $1 OFFSET $2
            "#,
            filter
        ))
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((total, rows_to_details(rows)))
    }

    /// The N most recent borrows with book/user display fields.
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT br.id, br.user_id, br.book_id, br.borrow_date, br.due_date,
                   br.return_date, br.status, br.fine_amount, br.rating,
                   b.title AS book_title, b.author AS book_author, b.cover_url,
                   u.name AS user_name
            FROM borrows br
            JOIN books b ON br.book_id = b.id
            JOIN users u ON br.user_id = u.id
            ORDER BY br.borrow_date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows_to_details(rows))
    }

    /// Count active loans (pending + ongoing + requested_return)
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrows WHERE status IN ('pending', 'ongoing', 'requested_return')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Count overdue loans (active with due date in the past)
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrows
            WHERE status IN ('pending', 'ongoing', 'requested_return') AND due_date < NOW()
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Borrow counts grouped by book genre
    pub async fn count_by_genre(&self) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT b.genre AS category, COUNT(br.id) AS count
            FROM borrows br
            JOIN books b ON br.book_id = b.id
            GROUP BY b.genre
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("category"), row.get("count")))
            .collect())
    }
}

fn rows_to_details(rows: Vec<sqlx::postgres::PgRow>) -> Vec<BorrowDetails> {
    let now = Utc::now();
    rows.into_iter()
        .map(|row| {
            let status: BorrowStatus = row.get("status");
            let due_date: DateTime<Utc> = row.get("due_date");
            // Overdue active records are reported as late.
            let display = if status.is_active() && due_date < now {
                BorrowStatus::Late
            } else {
                status
            };
            BorrowDetails {
                borrow_id: row.get("id"),
                user_id: row.get("user_id"),
                book_id: row.get("book_id"),
                borrow_date: row.get("borrow_date"),
                due_date,
                return_date: row.get("return_date"),
                status: display,
                fine_amount: row.get("fine_amount"),
                rating: row.get("rating"),
                book_title: row.get("book_title"),
                book_author: row.get("book_author"),
                cover_url: row.get("cover_url"),
                user_name: row.try_get("user_name").ok(),
            }
        })
        .collect()
}
