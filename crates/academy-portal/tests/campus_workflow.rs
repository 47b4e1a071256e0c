//! Student-facing scenarios: enrollment, term dashboards, the announcement board, curriculum
//! uploads and role lookups, all sharing one store the way the API binary wires them.

use std::sync::Arc;

use academy_portal::access::{role_router, RoleDirectory, ACTOR_HEADER};
use academy_portal::store::InMemoryStore;
use academy_portal::workflows::catalog::{
    CatalogService, CourseDraft, Placement, Program, ProgramDraft,
};
use academy_portal::workflows::cohort::{cohort_router, CohortService};
use academy_portal::workflows::curriculum::{curriculum_router, CurriculumLibrary};
use academy_portal::workflows::students::{student_router, StudentService};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

struct Campus {
    app: Router,
    program: Program,
    course_ids: Vec<String>,
}

fn campus() -> Campus {
    let store = Arc::new(InMemoryStore::new());
    let catalog = CatalogService::new(store.clone());

    let program = catalog
        .create_program(ProgramDraft::new("Diploma in Pastoral Care", 2))
        .expect("program created");
    let mut course_ids = Vec::new();
    for (code, title, semester) in [
        ("PC101", "Foundations of Pastoral Care", 1),
        ("PC102", "Grief and Lament", 1),
        ("PC201", "Family Counselling", 2),
    ] {
        let course = catalog
            .create_course(CourseDraft::new(code, title))
            .expect("course created");
        catalog
            .link_course(
                program.id.as_str(),
                Placement {
                    course_id: course.id.to_string(),
                    semester,
                    year: 1,
                },
            )
            .expect("course linked");
        course_ids.push(course.id.to_string());
    }

    let app = student_router(Arc::new(StudentService::new(store.clone())))
        .merge(cohort_router(Arc::new(CohortService::new(store.clone()))))
        .merge(curriculum_router(Arc::new(CurriculumLibrary::new(
            store.clone(),
        ))))
        .merge(role_router(Arc::new(RoleDirectory::new(store))));

    Campus {
        app,
        program,
        course_ids,
    }
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header(ACTOR_HEADER, actor);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn enroll(campus: &Campus, user_id: &str, full_name: &str) -> String {
    let (status, student) = call(
        &campus.app,
        "POST",
        "/api/v1/students",
        None,
        Some(json!({
            "user_id": user_id,
            "full_name": full_name,
            "email": format!("{user_id}@example.org"),
            "program_id": campus.program.id.as_str(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "enroll: {student}");
    student["id"].as_str().expect("student id").to_string()
}

#[tokio::test]
async fn dashboard_reflects_progress_milestones_and_announcements() {
    let campus = campus();
    let student = enroll(&campus, "user-tabitha", "Tabitha Joppa").await;

    for (course_id, progress) in campus.course_ids.iter().zip([80, 45]) {
        let (status, _) = call(
            &campus.app,
            "PUT",
            &format!("/api/v1/students/{student}/progress/{course_id}"),
            None,
            Some(json!({ "progress": progress })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = call(
        &campus.app,
        "PUT",
        &format!("/api/v1/students/{student}/progress/{}", campus.course_ids[0]),
        None,
        Some(json!({ "progress": 101 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &campus.app,
        "POST",
        "/api/v1/milestones",
        None,
        Some(json!({
            "program_id": campus.program.id.as_str(),
            "title": "Case study",
            "type": "assignment",
            "due_date": "2026-11-20",
            "semester": 1,
            "year": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for (audience, target) in [
        ("program", Some(campus.program.id.to_string())),
        ("course", Some(campus.course_ids[2].clone())),
        ("all", None),
    ] {
        let (status, _) = call(
            &campus.app,
            "POST",
            "/api/v1/announcements",
            None,
            Some(json!({
                "title": "Notice",
                "message": "Chapel moves to the main hall.",
                "type": "info",
                "author": "Dean of Students",
                "target_audience": audience,
                "target_id": target,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, task) = call(
        &campus.app,
        "POST",
        &format!("/api/v1/students/{student}/tasks"),
        None,
        Some(json!({ "title": "Read chapter 3", "priority": "high" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = task["id"].as_str().expect("task id");
    let (status, _) = call(
        &campus.app,
        "PATCH",
        &format!("/api/v1/tasks/{task_id}"),
        None,
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, dashboard) = call(
        &campus.app,
        "GET",
        &format!("/api/v1/students/{student}/dashboard?semester=1&year=1"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["courses"].as_array().map(Vec::len), Some(2));
    assert_eq!(dashboard["overall_progress"], 63);
    assert_eq!(dashboard["milestones"].as_array().map(Vec::len), Some(1));
    assert_eq!(dashboard["unread_announcements"], 2);
    assert_eq!(dashboard["tasks"]["percent"], 100);
}

#[tokio::test]
async fn students_find_themselves_through_the_actor_header() {
    let campus = campus();
    enroll(&campus, "user-silas", "Silas Berea").await;

    let (status, me) = call(
        &campus.app,
        "GET",
        "/api/v1/students/me",
        Some("user-silas"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["full_name"], "Silas Berea");

    let (status, _) = call(&campus.app, "GET", "/api/v1/students/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &campus.app,
        "POST",
        "/api/v1/students",
        None,
        Some(json!({
            "user_id": "user-silas",
            "full_name": "Silas Again",
            "email": "silas2@example.org",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn curriculum_uploads_need_a_signed_in_user() {
    let campus = campus();
    let upload = json!({
        "title": "Programme handbook",
        "file_path": "handbooks/pastoral-care.pdf",
        "file_url": "https://files.example.org/handbooks/pastoral-care.pdf",
        "file_size": 1_572_864,
        "program_id": campus.program.id.as_str(),
        "category": "handbook",
    });

    let (status, _) = call(
        &campus.app,
        "POST",
        "/api/v1/curriculum",
        None,
        Some(upload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, document) = call(
        &campus.app,
        "POST",
        "/api/v1/curriculum",
        Some("faculty-7"),
        Some(upload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(document["uploaded_by"], "faculty-7");
    assert_eq!(document["file_type"], "application/pdf");

    let (_, listed) = call(
        &campus.app,
        "GET",
        "/api/v1/curriculum?category=handbook",
        None,
        None,
    )
    .await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn roles_default_to_student_until_assigned() {
    let campus = campus();

    let (status, role) = call(
        &campus.app,
        "GET",
        "/api/v1/roles/me",
        Some("user-phoebe"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(role["role"], "student");
    assert_eq!(role["staff"], false);

    let (status, _) = call(
        &campus.app,
        "PUT",
        "/api/v1/roles/user-phoebe",
        None,
        Some(json!({ "role": "faculty" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, role) = call(
        &campus.app,
        "GET",
        "/api/v1/roles/me",
        Some("user-phoebe"),
        None,
    )
    .await;
    assert_eq!(role["role"], "faculty");
    assert_eq!(role["staff"], true);
}
