//! API integration tests
//!
//! These tests expect a running server with a clean database:
//! `cargo run` in one terminal, then `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Register a borrower with a unique email and return (id, email)
async fn register_borrower(client: &Client) -> (String, String) {
    let email = format!("{}@example.com", Uuid::new_v4());
    let response = client
        .post(format!("{}/borrowers", BASE_URL))
        .json(&json!({
            "name": "Test Borrower",
            "email": email,
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    (body["id"].as_str().expect("No id").to_string(), email)
}

/// Helper to get an authenticated token for a fresh borrower
async fn get_auth_token(client: &Client) -> String {
    let (_, email) = register_borrower(client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a book with the given quantity and return its id
async fn create_book(client: &Client, token: &str, quantity: i32) -> String {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": format!("Book {}", Uuid::new_v4()),
            "author": "Test Author",
            "isbn": Uuid::new_v4().to_string(),
            "available_quantity": quantity,
            "shelf_location": "A1"
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_str().expect("No id").to_string()
}

fn future_date() -> String {
    (Utc::now().date_naive() + Duration::days(14)).to_string()
}

async fn checkout(
    client: &Client,
    token: &str,
    borrower_id: &str,
    book_id: &str,
    due_date: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/borrowings/checkout", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "borrowerId": borrower_id,
            "bookId": book_id,
            "dueDate": due_date
        }))
        .send()
        .await
        .expect("Failed to send checkout request")
}

async fn return_book(
    client: &Client,
    token: &str,
    borrower_id: &str,
    book_id: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/borrowings/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "borrowerId": borrower_id,
            "bookId": book_id
        }))
        .send()
        .await
        .expect("Failed to send return request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
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
async fn test_login() {
    let client = Client::new();
    let (_, email) = register_borrower(&client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["message"], "Logged in successfully");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let (_, email) = register_borrower(&client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_request_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_checkout_and_return_cycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (borrower_id, _) = register_borrower(&client).await;
    let book_id = create_book(&client, &token, 2).await;

    let response = checkout(&client, &token, &borrower_id, &book_id, &future_date()).await;
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book checked out successfully");
    assert!(body["borrowing"]["return_date"].is_null());

    // Quantity dropped by one
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["available_quantity"], 1);

    let response = return_book(&client, &token, &borrower_id, &book_id).await;
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["borrowing"]["return_date"].is_string());

    // Quantity restored
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["available_quantity"], 2);
}

#[tokio::test]
#[ignore]
async fn test_checkout_exhausted_stock_conflicts() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (first, _) = register_borrower(&client).await;
    let (second, _) = register_borrower(&client).await;
    let book_id = create_book(&client, &token, 1).await;

    let response = checkout(&client, &token, &first, &book_id, &future_date()).await;
    assert!(response.status().is_success());

    // Last copy is out, second borrower gets a conflict
    let response = checkout(&client, &token, &second, &book_id, &future_date()).await;
    assert_eq!(response.status(), 409);

    // After a return the copy is borrowable again
    let response = return_book(&client, &token, &first, &book_id).await;
    assert!(response.status().is_success());

    let response = checkout(&client, &token, &second, &book_id, &future_date()).await;
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_checkout_past_due_date_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (borrower_id, _) = register_borrower(&client).await;
    let book_id = create_book(&client, &token, 1).await;

    let yesterday = (Utc::now().date_naive() - Duration::days(1)).to_string();
    let response = checkout(&client, &token, &borrower_id, &book_id, &yesterday).await;
    assert_eq!(response.status(), 400);

    // No copy was consumed
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["available_quantity"], 1);
}

#[tokio::test]
#[ignore]
async fn test_checkout_due_today_allowed() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (borrower_id, _) = register_borrower(&client).await;
    let book_id = create_book(&client, &token, 1).await;

    let today = Utc::now().date_naive().to_string();
    let response = checkout(&client, &token, &borrower_id, &book_id, &today).await;
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_open_loan_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (borrower_id, _) = register_borrower(&client).await;
    let book_id = create_book(&client, &token, 3).await;

    let response = checkout(&client, &token, &borrower_id, &book_id, &future_date()).await;
    assert!(response.status().is_success());

    // Same pair again while the first loan is still open
    let response = checkout(&client, &token, &borrower_id, &book_id, &future_date()).await;
    assert_eq!(response.status(), 409);

    // Only one copy was consumed
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["available_quantity"], 2);
}

#[tokio::test]
#[ignore]
async fn test_return_without_open_loan() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (borrower_id, _) = register_borrower(&client).await;
    let book_id = create_book(&client, &token, 1).await;

    let response = return_book(&client, &token, &borrower_id, &book_id).await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_checkout_unknown_book_not_found() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (borrower_id, _) = register_borrower(&client).await;

    let response = checkout(
        &client,
        &token,
        &borrower_id,
        &Uuid::new_v4().to_string(),
        &future_date(),
    )
    .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrower_books_lists_open_loans_only() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (borrower_id, _) = register_borrower(&client).await;
    let kept = create_book(&client, &token, 1).await;
    let returned = create_book(&client, &token, 1).await;

    checkout(&client, &token, &borrower_id, &kept, &future_date()).await;
    checkout(&client, &token, &borrower_id, &returned, &future_date()).await;
    return_book(&client, &token, &borrower_id, &returned).await;

    let response = client
        .get(format!("{}/borrowers/{}/books", BASE_URL, borrower_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let books = body.as_array().expect("Expected array");
    assert_eq!(books.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_list_overdue_books() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/books/overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let loans = body.as_array().expect("Expected array");

    // A loan due in the future is never overdue
    let (borrower_id, _) = register_borrower(&client).await;
    let book_id = create_book(&client, &token, 1).await;
    checkout(&client, &token, &borrower_id, &book_id, &future_date()).await;

    let after: Value = client
        .get(format!("{}/books/overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(after.as_array().expect("Expected array").len(), loans.len());
}

#[tokio::test]
#[ignore]
async fn test_analytics_requires_date_window() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/borrowings/reports", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let response = client
        .get(format!(
            "{}/borrowings/reports?startDate=2026-01-01",
            BASE_URL
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_analytics_report_shape() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (borrower_id, _) = register_borrower(&client).await;
    let book_id = create_book(&client, &token, 1).await;
    checkout(&client, &token, &borrower_id, &book_id, &future_date()).await;

    let start = (Utc::now().date_naive() - Duration::days(7)).to_string();
    let end = (Utc::now().date_naive() + Duration::days(1)).to_string();

    let response = client
        .get(format!(
            "{}/borrowings/reports?startDate={}&endDate={}",
            BASE_URL, start, end
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_books_borrowed"].as_i64().expect("count") >= 1);
    assert!(body["most_borrowed_books"].is_array());
    assert!(body["books_borrowed_by_borrower"].is_array());
    // Open loans contribute no duration
    assert!(
        body["average_borrowing_duration"].is_null()
            || body["average_borrowing_duration"].is_f64()
    );
}

#[tokio::test]
#[ignore]
async fn test_export_borrowings_csv() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (borrower_id, _) = register_borrower(&client).await;
    let book_id = create_book(&client, &token, 1).await;
    checkout(&client, &token, &borrower_id, &book_id, &future_date()).await;

    let start = (Utc::now().date_naive() - Duration::days(7)).to_string();
    let end = (Utc::now().date_naive() + Duration::days(1)).to_string();

    let response = client
        .get(format!(
            "{}/borrowings/export?startDate={}&endDate={}",
            BASE_URL, start, end
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .expect("No content type")
            .to_str()
            .expect("Invalid header"),
        "text/csv"
    );

    let body = response.text().await.expect("Failed to read body");
    let mut lines = body.lines();
    assert_eq!(
        lines.next().expect("Empty export"),
        "ID,Book Title,Borrower Name,Borrowed Date,Due Date,Return Date"
    );
    // Open loan renders an empty return date column
    assert!(lines.any(|line| line.ends_with(',')));
}

#[tokio::test]
#[ignore]
async fn test_export_overdue_csv_header() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/books/overdue/export", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body = response.text().await.expect("Failed to read body");
    assert!(body.starts_with("ID,Book Title,Borrower Name,Borrowed Date,Due Date"));
}

#[tokio::test]
#[ignore]
async fn test_book_crud() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_book(&client, &token, 4).await;

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "shelf_location": "B7" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["shelf_location"], "B7");
    // Quantity is untouched by catalog updates
    assert_eq!(body["available_quantity"], 4);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_conflicts() {
    let client = Client::new();
    let (_, email) = register_borrower(&client).await;

    let response = client
        .post(format!("{}/borrowers", BASE_URL))
        .json(&json!({
            "name": "Other Borrower",
            "email": email,
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}
