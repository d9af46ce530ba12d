#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use edudesk::router::init_router;
use edudesk::state::AppState;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    init_router(AppState::new(pool))
}

/// Sends a request through a fresh router and returns status plus JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(
    pool: &PgPool,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let app = setup_test_app(pool.clone());
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Reads a decimal amount serialized as a string or number.
pub fn amount(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.as_f64().unwrap(),
        other => panic!("not an amount: {}", other),
    }
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}

pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

pub async fn create_test_class(pool: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar("INSERT INTO classes (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_section(pool: &PgPool, class_id: Uuid, name: &str) -> Uuid {
    sqlx::query_scalar("INSERT INTO sections (class_id, name) VALUES ($1, $2) RETURNING id")
        .bind(class_id)
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_teacher(pool: &PgPool, first_name: &str) -> Uuid {
    sqlx::query_scalar(
        r#"INSERT INTO teachers (first_name, last_name, email)
           VALUES ($1, 'Teacher', $2)
           RETURNING id"#,
    )
    .bind(first_name)
    .bind(format!("{}@school.test", unique(first_name).to_lowercase()))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_subject(pool: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar("INSERT INTO subjects (name, code) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(unique("SUB"))
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_period(
    pool: &PgPool,
    name: &str,
    start: &str,
    end: &str,
    sort_order: i32,
) -> Uuid {
    sqlx::query_scalar(
        r#"INSERT INTO periods (name, start_time, end_time, sort_order)
           VALUES ($1, $2::time, $3::time, $4)
           RETURNING id"#,
    )
    .bind(name)
    .bind(start)
    .bind(end)
    .bind(sort_order)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_bus(pool: &PgPool, bus_number: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO buses (bus_number, route_name) VALUES ($1, 'North Loop') RETURNING id",
    )
    .bind(bus_number)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_student(
    pool: &PgPool,
    admission_number: &str,
    class_id: Option<Uuid>,
    section_id: Option<Uuid>,
    bus_id: Option<Uuid>,
) -> Uuid {
    sqlx::query_scalar(
        r#"INSERT INTO students (first_name, last_name, admission_number, class_id, section_id, bus_id)
           VALUES ('Ada', 'Lovelace', $1, $2, $3, $4)
           RETURNING id"#,
    )
    .bind(admission_number)
    .bind(class_id)
    .bind(section_id)
    .bind(bus_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// A class with one section, a subject, two teachers and two periods.
pub struct TimetableFixture {
    pub class_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub teacher_id: Uuid,
    pub other_teacher_id: Uuid,
    pub first_period: Uuid,
    pub second_period: Uuid,
}

impl TimetableFixture {
    pub async fn create(pool: &PgPool) -> Self {
        let class_id = create_test_class(pool, &unique("Grade")).await;
        let section_id = create_test_section(pool, class_id, "A").await;
        Self {
            class_id,
            section_id,
            subject_id: create_test_subject(pool, "Mathematics").await,
            teacher_id: create_test_teacher(pool, "Grace").await,
            other_teacher_id: create_test_teacher(pool, "Alan").await,
            first_period: create_test_period(pool, "First", "08:00:00", "08:45:00", 1).await,
            second_period: create_test_period(pool, "Second", "08:50:00", "09:35:00", 2).await,
        }
    }

    pub fn entry(&self, day: &str, period_id: Uuid, teacher_id: Uuid) -> Value {
        serde_json::json!({
            "day": day,
            "period_id": period_id,
            "class_id": self.class_id,
            "section_id": self.section_id,
            "subject_id": self.subject_id,
            "teacher_id": teacher_id,
        })
    }
}
