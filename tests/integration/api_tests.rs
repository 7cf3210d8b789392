//! API integration tests
//!
//! These tests run against a live server with a seeded database.
//! Run with: cargo test -- --ignored

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

const ADMIN_EMAIL: &str = "admin@perpus.test";
const ADMIN_PASSWORD: &str = "admin123";

/// Helper to log in and get a JWT token
async fn get_token(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to register a fresh user and return (email, token)
async fn register_user(client: &Client) -> (String, String) {
    let email = format!(
        "user{}@perpus.test",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos()
    );

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": "testpass123"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);

    let token = get_token(client, &email, "testpass123").await;
    (email, token)
}

/// Helper to create a book as admin, returning its id
async fn create_book(client: &Client, admin_token: &str, copies: i32) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "title": "Integration Test Book",
            "author": "Test Author",
            "genre": "Fiction",
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let (email, token) = register_user(&client).await;

    assert!(!token.is_empty());

    // Registering the same email again is rejected
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": "testpass123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_token(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], ADMIN_EMAIL);
    // Password hash must never appear in responses
    assert!(body.get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_list_books_is_public() {
    let client = Client::new();

    // No Authorization header at all
    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_book_details() {
    let client = Client::new();
    let admin_token = get_token(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let book_id = create_book(&client, &admin_token, 3).await;

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"].as_i64(), Some(book_id));
    assert_eq!(body["available_count"].as_i64(), Some(3));
    assert_eq!(body["borrowed_count"].as_i64(), Some(0));

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_flow() {
    let client = Client::new();
    let admin_token = get_token(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, user_token) = register_user(&client).await;
    let book_id = create_book(&client, &admin_token, 1).await;

    // Borrow
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = body["borrow_id"].as_i64().expect("No borrow ID");
    assert!(body["due_date"].is_string());

    // The last copy is out, so a second borrow is refused
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request");

    assert_eq!(response.status(), 400);

    // Return with a rating
    let response = client
        .patch(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({ "rating": 4 }))
        .send()
        .await
        .expect("Failed to send return request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    // Returned well before the due date, so no fine
    assert_eq!(body["fine"].as_i64(), Some(0));
    assert_eq!(body["rating"].as_i64(), Some(4));

    // Returning the same borrow again is refused
    let response = client
        .patch(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send return request");

    assert_eq!(response.status(), 400);

    // The copy is back on the shelf
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_count"].as_i64(), Some(1));

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_extend_borrow() {
    let client = Client::new();
    let admin_token = get_token(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, user_token) = register_user(&client).await;
    let book_id = create_book(&client, &admin_token, 1).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request");

    let body: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = body["borrow_id"].as_i64().expect("No borrow ID");
    let due_before = body["due_date"].as_str().expect("No due date").to_string();

    let response = client
        .put(format!("{}/borrows/{}/extend", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send extend request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let due_before: DateTime<Utc> = due_before.parse().expect("Bad due date");
    let due_after: DateTime<Utc> = body["due_date"]
        .as_str()
        .expect("No due date")
        .parse()
        .expect("Bad due date");
    // One extension adds exactly one loan period
    assert_eq!(due_after - due_before, Duration::days(7));

    // Extending someone else's borrow fails
    let response = client
        .put(format!("{}/borrows/{}/extend", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send extend request");

    assert_eq!(response.status(), 404);

    // Cleanup: return then delete the book
    let _ = client
        .patch(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({}))
        .send()
        .await;
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_borrow_history_envelope() {
    let client = Client::new();
    let (_, user_token) = register_user(&client).await;

    let response = client
        .get(format!("{}/borrows/history?page=1&pageSize=5", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["page"].as_i64(), Some(1));
    assert_eq!(body["pageSize"].as_i64(), Some(5));
    assert!(body["total"].is_number());
    assert!(body["totalPages"].is_number());
    assert!(body["data"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_admin_dashboard() {
    let client = Client::new();
    let token = get_token(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = client
        .get(format!("{}/admin/dashboard", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["statistics"]["totalBooks"].is_number());
    assert!(body["statistics"]["activeLoans"].is_number());
    assert!(body["statistics"]["overdue"].is_number());
    assert!(body["statistics"]["usersRegistered"].is_number());
    assert!(body["borrowByCategory"].is_array());
    assert!(body["recentBorrows"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_admin_endpoints_require_admin_role() {
    let client = Client::new();
    let (_, user_token) = register_user(&client).await;

    let response = client
        .get(format!("{}/admin/dashboard", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({
            "title": "Nope",
            "author": "Nope",
            "genre": "Fiction",
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_admin_report_filters_by_status() {
    let client = Client::new();
    let token = get_token(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = client
        .get(format!("{}/admin/reports?status=returned&page=1", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"].is_array());
    for row in body["data"].as_array().expect("data is an array") {
        assert_eq!(row["status"], "returned");
    }
}

#[tokio::test]
#[ignore]
async fn test_rate_book() {
    let client = Client::new();
    let admin_token = get_token(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, user_token) = register_user(&client).await;
    let book_id = create_book(&client, &admin_token, 1).await;

    let response = client
        .post(format!("{}/ratings", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({ "book_id": book_id, "rating": 5 }))
        .send()
        .await
        .expect("Failed to send rating request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["avgRating"].as_f64(), Some(5.0));

    // A second rating folds into the running average: (5 + 4) / 2
    let (_, other_token) = register_user(&client).await;
    let response = client
        .post(format!("{}/ratings", BASE_URL))
        .header("Authorization", format!("Bearer {}", other_token))
        .json(&json!({ "book_id": book_id, "rating": 4 }))
        .send()
        .await
        .expect("Failed to send rating request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["avgRating"].as_f64(), Some(4.5));

    // Out-of-range ratings are rejected
    let response = client
        .post(format!("{}/ratings", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({ "book_id": book_id, "rating": 6 }))
        .send()
        .await
        .expect("Failed to send rating request");

    assert_eq!(response.status(), 400);

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/borrows/history", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", "Bearer not-a-real-token")
        .json(&json!({ "book_id": 1 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
