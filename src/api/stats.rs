//! Admin dashboard and report endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        borrow::{BorrowDetails, BorrowStatus},
        PageQuery, PageResponse,
    },
    services::stats::DashboardResponse,
};

use super::AuthenticatedUser;

/// Admin report query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// Filter by borrow status; `late` selects overdue active loans
    pub status: Option<BorrowStatus>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Dashboard statistics (admin only)
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardResponse>> {
    claims.require_admin()?;

    let response = state.services.stats.dashboard().await?;
    Ok(Json(response))
}

/// Paginated borrow report, status-filterable (admin only)
#[utoipa::path(
    get,
    path = "/admin/reports",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(ReportQuery),
    responses(
        (status = 200, description = "Borrow report page", body = PageResponse<BorrowDetails>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn report(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<PageResponse<BorrowDetails>>> {
    claims.require_admin()?;

    let page = PageQuery {
        page: query.page,
        page_size: query.page_size,
    };
    let (total, data) = state.services.borrows.report(query.status, &page).await?;
    Ok(Json(PageResponse::new(&page, total, data)))
}
