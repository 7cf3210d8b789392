//! Borrow workflow and rating endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::BorrowDetails,
        rating::{CreateRating, Rating},
        PageQuery, PageResponse,
    },
};

use super::AuthenticatedUser;

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub book_id: i32,
}

/// Borrow response
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    pub borrow_id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub due_date: DateTime<Utc>,
}

/// Return request with optional rating
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    /// Optional 1-5 star rating recorded with the return
    pub rating: Option<i16>,
}

/// Return response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Fine charged for this return, in currency units
    pub fine: i64,
    pub rating: Option<i16>,
}

/// Extend response
#[derive(Serialize, ToSchema)]
pub struct ExtendResponse {
    pub message: String,
    pub due_date: DateTime<Utc>,
}

/// Rating response
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub avg_rating: f64,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Borrow created", body = BorrowResponse),
        (status = 400, description = "Book unavailable"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let borrow = state
        .services
        .borrows
        .borrow(claims.user_id, request.book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            borrow_id: borrow.id,
            book_id: borrow.book_id,
            user_id: borrow.user_id,
            due_date: borrow.due_date,
        }),
    ))
}

/// Return a borrowed book, optionally rating it
#[utoipa::path(
    patch,
    path = "/borrows/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow ID")
    ),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Borrow is not an active loan"),
        (status = 404, description = "Borrow record not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(borrow_id): Path<i32>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<ReturnResponse>> {
    let (fine, rating) = state
        .services
        .borrows
        .return_borrow(claims.user_id, borrow_id, request.rating)
        .await?;

    Ok(Json(ReturnResponse { fine, rating }))
}

/// Extend an active borrow by one loan period
#[utoipa::path(
    put,
    path = "/borrows/{id}/extend",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow ID")
    ),
    responses(
        (status = 200, description = "Due date extended", body = ExtendResponse),
        (status = 404, description = "No active borrow found")
    )
)]
pub async fn extend_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(borrow_id): Path<i32>,
) -> AppResult<Json<ExtendResponse>> {
    let due_date = state
        .services
        .borrows
        .extend(claims.user_id, borrow_id)
        .await?;

    Ok(Json(ExtendResponse {
        message: "Borrow extended successfully".to_string(),
        due_date,
    }))
}

/// Paginated borrow history for the calling user
#[utoipa::path(
    get,
    path = "/borrows/history",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Borrow history page", body = PageResponse<BorrowDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PageResponse<BorrowDetails>>> {
    let (total, data) = state.services.borrows.history(claims.user_id, &page).await?;
    Ok(Json(PageResponse::new(&page, total, data)))
}

/// Submit a rating for a book
#[utoipa::path(
    post,
    path = "/ratings",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateRating,
    responses(
        (status = 200, description = "Rating recorded", body = RatingResponse),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn rate_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateRating>,
) -> AppResult<Json<RatingResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let avg_rating = state.services.borrows.rate(claims.user_id, &request).await?;
    Ok(Json(RatingResponse { avg_rating }))
}

/// List ratings submitted for a book
#[utoipa::path(
    get,
    path = "/books/{id}/ratings",
    tag = "borrows",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Ratings for the book", body = Vec<Rating>)
    )
)]
pub async fn list_ratings(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Vec<Rating>>> {
    let ratings = state.services.borrows.ratings_for_book(book_id).await?;
    Ok(Json(ratings))
}
