//! Catalog service: read-mostly queries over books

use crate::{
    error::AppResult,
    models::book::{Book, BookDetails, BookSummary, CreateBook, Genre, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books, optionally filtered by genre.
    ///
    /// Fail-soft: listing pages must render even when the database is down,
    /// so internal failures are logged and an empty list is returned.
    pub async fn list_books(&self, genre: Option<Genre>, viewer_id: Option<i32>) -> Vec<BookSummary> {
        match self.repository.books.list(genre, viewer_id).await {
            Ok(books) => books,
            Err(e) => {
                tracing::error!("Failed to list books: {}", e);
                Vec::new()
            }
        }
    }

    /// Get one book with computed availability
    pub async fn get_book(&self, id: i32, viewer_id: Option<i32>) -> AppResult<BookDetails> {
        self.repository.books.get_details(id, viewer_id).await
    }

    /// Create a book (catalog administration)
    pub async fn create_book(&self, book: &CreateBook) -> AppResult<Book> {
        self.repository.books.create(book).await
    }

    /// Update a book (catalog administration)
    pub async fn update_book(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, update).await
    }

    /// Delete a book (catalog administration)
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
