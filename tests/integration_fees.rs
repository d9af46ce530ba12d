mod common;

use axum::http::StatusCode;
use common::{amount, create_test_class, create_test_student, id_of, send};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

async fn create_fee(pool: &PgPool, student_id: Uuid, discount: &str) -> Value {
    let (status, fee) = send(
        pool,
        "POST",
        "/api/fees",
        Some(json!({
            "student_id": student_id,
            "title": "Term 1 Fees",
            "academic_term": "2025 Term 1",
            "items": [
                { "name": "Tuition", "amount": "1000.00" },
                { "name": "Library", "amount": 50 },
                { "name": "Laboratory", "amount": "" }
            ],
            "discount": discount
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", fee);
    fee
}

async fn pay(pool: &PgPool, fee_id: Uuid, value: &str) -> (StatusCode, Value) {
    send(
        pool,
        "POST",
        "/api/payments",
        Some(json!({
            "fee_id": fee_id,
            "amount": value,
            "method": "bank_transfer",
            "reference": "TX-1"
        })),
    )
    .await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_fee_computes_totals(pool: PgPool) {
    let student_id = create_test_student(&pool, "ADM-F1", None, None, None).await;

    let fee = create_fee(&pool, student_id, "50").await;

    assert_eq!(amount(&fee["subtotal"]), 1050.0);
    assert_eq!(amount(&fee["discount"]), 50.0);
    assert_eq!(amount(&fee["total"]), 1000.0);
    assert_eq!(amount(&fee["remaining"]), 1000.0);
    assert_eq!(fee["status"], "unpaid");
    assert_eq!(fee["student_name"], "Ada Lovelace");

    let items = fee["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["name"], "Tuition");
    assert_eq!(amount(&items[2]["amount"]), 0.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_discount_above_subtotal_is_rejected(pool: PgPool) {
    let student_id = create_test_student(&pool, "ADM-F2", None, None, None).await;

    let (status, body) = send(
        &pool,
        "POST",
        "/api/fees",
        Some(json!({
            "student_id": student_id,
            "title": "Bus Fee",
            "items": [{ "name": "Transport", "amount": "100" }],
            "discount": "150"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("iscount"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_fee_for_unknown_student_is_bad_request(pool: PgPool) {
    let (status, _) = send(
        &pool,
        "POST",
        "/api/fees",
        Some(json!({
            "student_id": Uuid::new_v4(),
            "title": "Orphan",
            "items": [{ "name": "Tuition", "amount": "10" }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_payments_move_fee_through_statuses(pool: PgPool) {
    let student_id = create_test_student(&pool, "ADM-F3", None, None, None).await;
    let fee = create_fee(&pool, student_id, "50").await;
    let fee_id = id_of(&fee);

    let (status, recorded) = pay(&pool, fee_id, "400").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recorded["payment"]["method"], "bank_transfer");
    assert_eq!(recorded["fee"]["status"], "partial");
    assert_eq!(amount(&recorded["fee"]["remaining"]), 600.0);

    let (status, body) = pay(&pool, fee_id, "600.01").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().is_some());

    let (status, _) = pay(&pool, fee_id, "0").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, recorded) = pay(&pool, fee_id, "600").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recorded["fee"]["status"], "paid");
    assert_eq!(amount(&recorded["fee"]["remaining"]), 0.0);

    let (_, details) = send(&pool, "GET", &format!("/api/fees/{}", fee_id), None).await;
    assert_eq!(details["payments"].as_array().unwrap().len(), 2);
    assert_eq!(amount(&details["paid_amount"]), 1000.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_payment_reverses_balance(pool: PgPool) {
    let student_id = create_test_student(&pool, "ADM-F4", None, None, None).await;
    let fee_id = id_of(&create_fee(&pool, student_id, "0").await);

    let (_, recorded) = pay(&pool, fee_id, "1050").await;
    assert_eq!(recorded["fee"]["status"], "paid");
    let payment_id = recorded["payment"]["id"].as_str().unwrap().to_string();

    let (status, fee) = send(&pool, "DELETE", &format!("/api/payments/{}", payment_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fee["status"], "unpaid");
    assert_eq!(amount(&fee["paid_amount"]), 0.0);

    let (status, _) = send(&pool, "GET", &format!("/api/payments/{}", payment_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_fee_update_cannot_drop_below_paid(pool: PgPool) {
    let student_id = create_test_student(&pool, "ADM-F5", None, None, None).await;
    let fee_id = id_of(&create_fee(&pool, student_id, "0").await);
    pay(&pool, fee_id, "500").await;

    let (status, _) = send(
        &pool,
        "PATCH",
        &format!("/api/fees/{}", fee_id),
        Some(json!({ "items": [{ "name": "Tuition", "amount": "300" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, fee) = send(
        &pool,
        "PATCH",
        &format!("/api/fees/{}", fee_id),
        Some(json!({ "discount": "50", "title": "Term 1 Fees (revised)" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", fee);
    assert_eq!(fee["title"], "Term 1 Fees (revised)");
    assert_eq!(amount(&fee["total"]), 1000.0);
    assert_eq!(amount(&fee["remaining"]), 500.0);
    assert_eq!(fee["items"].as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_fees_and_payments_filters(pool: PgPool) {
    let first = create_test_student(&pool, "ADM-F6", None, None, None).await;
    let second = create_test_student(&pool, "ADM-F7", None, None, None).await;
    let paid_fee = id_of(&create_fee(&pool, first, "0").await);
    create_fee(&pool, second, "0").await;
    pay(&pool, paid_fee, "1050").await;

    let (_, body) = send(&pool, "GET", "/api/fees?status=paid", None).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], paid_fee.to_string());

    let (_, body) = send(&pool, "GET", "/api/fees?status=unpaid", None).await;
    assert_eq!(body["meta"]["total"], 1);

    let (_, body) = send(&pool, "GET", &format!("/api/fees?student_id={}", second), None).await;
    assert_eq!(body["meta"]["total"], 1);

    let (_, body) = send(&pool, "GET", "/api/fees?search=term%201", None).await;
    assert_eq!(body["meta"]["total"], 2);

    let (_, body) = send(&pool, "GET", &format!("/api/payments?student_id={}", first), None).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["fee_title"], "Term 1 Fees");

    let (_, body) = send(&pool, "GET", "/api/payments?method=cash", None).await;
    assert_eq!(body["meta"]["total"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_dashboard_summary(pool: PgPool) {
    let class_id = create_test_class(&pool, "Grade 1").await;
    let student_id = create_test_student(&pool, "ADM-D1", Some(class_id), None, None).await;
    let fee_id = id_of(&create_fee(&pool, student_id, "50").await);
    pay(&pool, fee_id, "250").await;

    let (status, summary) = send(&pool, "GET", "/api/dashboard/summary", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["students"], 1);
    assert_eq!(summary["classes"], 1);
    assert_eq!(summary["teachers"], 0);
    assert_eq!(summary["active_schedules"], 0);
    assert_eq!(amount(&summary["fees"]["billed"]), 1000.0);
    assert_eq!(amount(&summary["fees"]["collected"]), 250.0);
    assert_eq!(amount(&summary["fees"]["outstanding"]), 750.0);
    assert_eq!(summary["fees"]["unpaid_fees"], 0);
}
