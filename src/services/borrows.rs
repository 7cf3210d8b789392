//! Borrow/return workflow service

use chrono::{DateTime, Utc};

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::{
        borrow::{Borrow, BorrowDetails, BorrowStatus},
        rating::{CreateRating, Rating},
        PageQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    config: LoansConfig,
}

impl BorrowsService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow a book for the calling user
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<Borrow> {
        self.repository
            .borrows
            .create(user_id, book_id, self.config.loan_period_days)
            .await
    }

    /// Return a borrow owned by the calling user, with an optional 1-5 rating
    pub async fn return_borrow(
        &self,
        user_id: i32,
        borrow_id: i32,
        rating: Option<i16>,
    ) -> AppResult<(i64, Option<i16>)> {
        if let Some(r) = rating {
            if !(1..=5).contains(&r) {
                return Err(AppError::Validation(
                    "Rating must be between 1 and 5".to_string(),
                ));
            }
        }

        self.repository
            .borrows
            .return_borrow(borrow_id, user_id, rating, self.config.fine_rate_per_day)
            .await
    }

    /// Extend an active borrow by one loan period
    pub async fn extend(&self, user_id: i32, borrow_id: i32) -> AppResult<DateTime<Utc>> {
        self.repository
            .borrows
            .extend(borrow_id, user_id, self.config.loan_period_days)
            .await
    }

    /// Paginated borrow history for the calling user
    pub async fn history(
        &self,
        user_id: i32,
        page: &PageQuery,
    ) -> AppResult<(i64, Vec<BorrowDetails>)> {
        self.repository.borrows.user_history(user_id, page).await
    }

    /// Paginated report over all borrow records (admin)
    pub async fn report(
        &self,
        status: Option<BorrowStatus>,
        page: &PageQuery,
    ) -> AppResult<(i64, Vec<BorrowDetails>)> {
        self.repository.borrows.report(status, page).await
    }

    /// Submit a standalone rating for a book
    pub async fn rate(&self, user_id: i32, rating: &CreateRating) -> AppResult<f64> {
        let (_, new_avg) = self.repository.ratings.create(user_id, rating).await?;
        Ok(new_avg)
    }

    /// All ratings submitted for a book, newest first
    pub async fn ratings_for_book(&self, book_id: i32) -> AppResult<Vec<Rating>> {
        self.repository.ratings.list_for_book(book_id).await
    }
}
