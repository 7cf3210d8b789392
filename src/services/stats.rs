//! Dashboard statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::borrow::BorrowDetails, repository::Repository};

/// Summary counters for the admin dashboard
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    pub total_books: i64,
    pub active_loans: i64,
    pub overdue: i64,
    pub users_registered: i64,
}

/// Borrow count for one genre
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Full dashboard payload
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub statistics: DashboardStatistics,
    pub borrow_by_category: Vec<CategoryCount>,
    pub recent_borrows: Vec<BorrowDetails>,
}

const RECENT_BORROWS_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Aggregate dashboard statistics (read-only)
    pub async fn dashboard(&self) -> AppResult<DashboardResponse> {
        let total_books = self.repository.books.count().await?;
        let active_loans = self.repository.borrows.count_active().await?;
        let overdue = self.repository.borrows.count_overdue().await?;
        let users_registered = self.repository.users.count_registered().await?;

        let borrow_by_category = self
            .repository
            .borrows
            .count_by_genre()
            .await?
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();

        let recent_borrows = self.repository.borrows.recent(RECENT_BORROWS_LIMIT).await?;

        Ok(DashboardResponse {
            statistics: DashboardStatistics {
                total_books,
                active_loans,
                overdue,
                users_registered,
            },
            borrow_by_category,
            recent_borrows,
        })
    }
}
