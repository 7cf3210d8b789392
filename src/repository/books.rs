//! Books repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDetails, BookSummary, CreateBook, Genre, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books, optionally filtered by genre, with availability and
    /// whether the viewer holds an active borrow on each.
    pub async fn list(
        &self,
        genre: Option<Genre>,
        viewer_id: Option<i32>,
    ) -> AppResult<Vec<BookSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.title, b.author, b.genre, b.cover_url, b.status,
                   b.rating, b.rating_count, b.available_copies,
                   EXISTS(
                       SELECT 1 FROM borrows br
                       WHERE br.book_id = b.id
                         AND br.user_id = $2
                         AND br.status IN ('pending', 'ongoing', 'requested_return')
                   ) AS is_borrowed_by_user
            FROM books b
            WHERE $1::text IS NULL OR b.genre = $1
            ORDER BY b.id DESC
            "#,
        )
        .bind(genre.map(|g| g.as_str().to_string()))
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(BookSummary {
                id: row.get("id"),
                title: row.get("title"),
                author: row.get("author"),
                genre: row.get("genre"),
                cover_url: row.get("cover_url"),
                status: row.get("status"),
                rating: row.get("rating"),
                rating_count: row.get("rating_count"),
                available_count: row.get("available_copies"),
                is_borrowed_by_user: row.get("is_borrowed_by_user"),
            });
        }

        Ok(result)
    }

    /// Get one book with borrow counters
    pub async fn get_details(&self, id: i32, viewer_id: Option<i32>) -> AppResult<BookDetails> {
        let book = self.get_by_id(id).await?;

        let borrowed_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrows
            WHERE book_id = $1 AND status IN ('pending', 'ongoing', 'requested_return')
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let is_borrowed_by_user: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrows
                WHERE book_id = $1 AND user_id = $2
                  AND status IN ('pending', 'ongoing', 'requested_return')
            )
            "#,
        )
        .bind(id)
        .bind(viewer_id)
        .fetch_one(&self.pool)
        .await?;

        let available_count = book.available_copies;
        Ok(BookDetails {
            book,
            borrowed_count,
            available_count,
            is_borrowed_by_user,
        })
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let copies = book.total_copies.unwrap_or(1);
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, genre, cover_url, total_copies, available_copies, status)
            VALUES ($1, $2, $3, $4, $5, $5, CASE WHEN $5 > 0 THEN 'available' ELSE 'borrowed' END)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre)
        .bind(&book.cover_url)
        .bind(copies)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book. A change in total copies adjusts the available
    /// counter by the same delta, floored at zero.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let total = update.total_copies.unwrap_or(current.total_copies);
        let delta = total - current.total_copies;
        let available = (current.available_copies + delta).clamp(0, total);

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author = $3, genre = $4, cover_url = $5,
                total_copies = $6, available_copies = $7,
                status = CASE WHEN $7 > 0 THEN 'available' ELSE 'borrowed' END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_ref().unwrap_or(&current.title))
        .bind(update.author.as_ref().unwrap_or(&current.author))
        .bind(update.genre.unwrap_or(current.genre))
        .bind(update.cover_url.as_ref().or(current.cover_url.as_ref()))
        .bind(total)
        .bind(available)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
