mod common;

use axum::http::StatusCode;
use common::{
    create_test_bus, create_test_class, create_test_section, create_test_student, id_of, send,
    unique,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_with_placement(pool: PgPool) {
    let class_id = create_test_class(&pool, "Grade 4").await;
    let section_id = create_test_section(&pool, class_id, "A").await;
    let bus_id = create_test_bus(&pool, "BUS-01").await;

    let (status, body) = send(
        &pool,
        "POST",
        "/api/students",
        Some(json!({
            "first_name": "Mary",
            "last_name": "Jackson",
            "admission_number": "ADM-001",
            "email": "mary@school.test",
            "class_id": class_id,
            "section_id": section_id,
            "bus_id": bus_id
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["admission_number"], "ADM-001");
    assert_eq!(body["class_name"], "Grade 4");
    assert_eq!(body["section_name"], "A");
    assert_eq!(body["bus_number"], "BUS-01");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_rejects_section_of_other_class(pool: PgPool) {
    let class_id = create_test_class(&pool, "Grade 4").await;
    let other_class = create_test_class(&pool, "Grade 5").await;
    let foreign_section = create_test_section(&pool, other_class, "A").await;

    let (status, body) = send(
        &pool,
        "POST",
        "/api/students",
        Some(json!({
            "first_name": "Mary",
            "last_name": "Jackson",
            "admission_number": "ADM-002",
            "class_id": class_id,
            "section_id": foreign_section
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().to_lowercase().contains("section"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_rejects_section_without_class(pool: PgPool) {
    let class_id = create_test_class(&pool, "Grade 4").await;
    let section_id = create_test_section(&pool, class_id, "A").await;

    let (status, _) = send(
        &pool,
        "POST",
        "/api/students",
        Some(json!({
            "first_name": "Mary",
            "last_name": "Jackson",
            "admission_number": "ADM-003",
            "section_id": section_id
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_admission_number_is_bad_request(pool: PgPool) {
    create_test_student(&pool, "ADM-100", None, None, None).await;

    let (status, _) = send(
        &pool,
        "POST",
        "/api/students",
        Some(json!({
            "first_name": "Katherine",
            "last_name": "Johnson",
            "admission_number": "ADM-100"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_students_filters_and_search(pool: PgPool) {
    let class_id = create_test_class(&pool, "Grade 6").await;
    let section_id = create_test_section(&pool, class_id, "B").await;
    create_test_student(&pool, "ADM-201", Some(class_id), Some(section_id), None).await;
    create_test_student(&pool, "ADM-202", Some(class_id), None, None).await;
    create_test_student(&pool, "XYZ-300", None, None, None).await;

    let (status, body) = send(
        &pool,
        "GET",
        &format!("/api/students?class_id={}", class_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);

    let (_, body) = send(&pool, "GET", "/api/students?search=xyz", None).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["admission_number"], "XYZ-300");

    let (_, body) = send(&pool, "GET", "/api/students?search=&page=1&limit=2", None).await;
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["has_more"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_students_far_past_last_page(pool: PgPool) {
    create_test_student(&pool, "ADM-250", None, None, None).await;

    let (status, body) =
        send(&pool, "GET", "/api/students?page=9223372036854775807", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["meta"]["has_more"], false);

    let (status, body) =
        send(&pool, "GET", "/api/teachers?offset=9223372036854775807", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_student_keeps_absent_fields(pool: PgPool) {
    let bus_id = create_test_bus(&pool, "BUS-07").await;
    let student_id = create_test_student(&pool, "ADM-400", None, None, Some(bus_id)).await;

    let (status, body) = send(
        &pool,
        "PATCH",
        &format!("/api/students/{}", student_id),
        Some(json!({ "guardian_name": "Dorothy Vaughan" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["guardian_name"], "Dorothy Vaughan");
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["bus_id"], bus_id.to_string());

    let (status, body) = send(
        &pool,
        "PATCH",
        &format!("/api/students/{}", student_id),
        Some(json!({ "bus_id": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["bus_id"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_student_null_clears_contact_fields(pool: PgPool) {
    let student_id = create_test_student(&pool, "ADM-401", None, None, None).await;
    let path = format!("/api/students/{}", student_id);

    let (status, body) = send(
        &pool,
        "PATCH",
        &path,
        Some(json!({
            "guardian_name": "Dorothy Vaughan",
            "email": "ada@school.test",
            "address": "12 Harbour Road"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["guardian_name"], "Dorothy Vaughan");

    let (status, body) = send(
        &pool,
        "PATCH",
        &path,
        Some(json!({ "guardian_name": null, "email": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["guardian_name"].is_null());
    assert!(body["email"].is_null());
    assert_eq!(body["address"], "12 Harbour Road");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_student_is_not_found(pool: PgPool) {
    let missing = uuid::Uuid::new_v4();

    let (status, _) = send(&pool, "GET", &format!("/api/students/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&pool, "DELETE", &format!("/api/students/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_class_stats_and_nested_sections(pool: PgPool) {
    let (status, class) = send(
        &pool,
        "POST",
        "/api/classes",
        Some(json!({ "name": "Grade 8", "description": "Upper school" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let class_id = id_of(&class);

    let (status, section) = send(
        &pool,
        "POST",
        &format!("/api/classes/{}/sections", class_id),
        Some(json!({ "name": "A", "capacity": 30 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let section_id = id_of(&section);

    let (status, _) = send(
        &pool,
        "POST",
        &format!("/api/classes/{}/sections", class_id),
        Some(json!({ "name": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    create_test_student(&pool, "ADM-500", Some(class_id), Some(section_id), None).await;

    let (status, body) = send(&pool, "GET", "/api/classes?search=grade%208", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["section_count"], 1);
    assert_eq!(body["data"][0]["student_count"], 1);

    let (_, body) = send(&pool, "GET", &format!("/api/classes/{}/sections", class_id), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_class_cascades_sections_and_detaches_students(pool: PgPool) {
    let class_id = create_test_class(&pool, "Grade 9").await;
    let section_id = create_test_section(&pool, class_id, "A").await;
    let student_id =
        create_test_student(&pool, "ADM-600", Some(class_id), Some(section_id), None).await;

    let (status, _) = send(&pool, "DELETE", &format!("/api/classes/{}", class_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&pool, "GET", &format!("/api/sections/{}", section_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&pool, "GET", &format!("/api/students/{}", student_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["class_id"].is_null());
    assert!(body["section_id"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bus_riders(pool: PgPool) {
    let (status, bus) = send(
        &pool,
        "POST",
        "/api/buses",
        Some(json!({
            "bus_number": "BUS-12",
            "route_name": "Harbor Road",
            "driver_name": "Sam Carter",
            "capacity": 40
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bus_id = id_of(&bus);

    create_test_student(&pool, "ADM-700", None, None, Some(bus_id)).await;
    create_test_student(&pool, "ADM-701", None, None, Some(bus_id)).await;
    create_test_student(&pool, "ADM-702", None, None, None).await;

    let (status, body) = send(&pool, "GET", &format!("/api/buses/{}/students", bus_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);

    let (_, body) = send(&pool, "GET", "/api/buses?search=harbor", None).await;
    assert_eq!(body["meta"]["total"], 1);

    let (status, _) = send(&pool, "DELETE", &format!("/api/buses/{}", bus_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&pool, "GET", "/api/students?search=ADM-70", None).await;
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|student| student["bus_id"].is_null())
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_and_subject_uniqueness(pool: PgPool) {
    let email = format!("{}@school.test", unique("teacher"));
    let teacher = json!({
        "first_name": "Grace",
        "last_name": "Hopper",
        "email": email,
        "specialization": "Computing"
    });

    let (status, _) = send(&pool, "POST", "/api/teachers", Some(teacher.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&pool, "POST", "/api/teachers", Some(teacher)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&pool, "GET", "/api/teachers?search=comput", None).await;
    assert_eq!(body["meta"]["total"], 1);

    let subject = json!({ "name": "Physics", "code": "PHY-1" });
    let (status, _) = send(&pool, "POST", "/api/subjects", Some(subject.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&pool, "POST", "/api/subjects", Some(subject)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
