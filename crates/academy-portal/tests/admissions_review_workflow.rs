//! End-to-end admissions review through the public service facade and HTTP router, against
//! the file-backed store so decisions survive a restart.

use std::sync::Arc;

use academy_portal::access::{Actor, ACTOR_HEADER};
use academy_portal::store::{PortalStore, SnapshotStore};
use academy_portal::workflows::admissions::{
    application_router, ApplicationFilter, ApplicationReviewService, ApplicationStatus,
    ApplicationSubmission, ReviewPolicy, StatusUpdate, TracingNotifier,
};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

type Service = ApplicationReviewService<PortalStore, TracingNotifier>;

fn service_at(path: &std::path::Path) -> Arc<Service> {
    let store = SnapshotStore::open(path).expect("snapshot opens");
    Arc::new(ApplicationReviewService::new(
        Arc::new(PortalStore::Snapshot(store)),
        Arc::new(TracingNotifier),
        ReviewPolicy::default(),
    ))
}

fn submission(full_name: &str, email: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone: "+254 700 000 000".to_string(),
        country: "Kenya".to_string(),
        program_id: None,
        program_title: Some("Certificate in Christian Ministry".to_string()),
        preferred_schedule: "Weekends".to_string(),
        desired_start_term: Some("Spring 2027".to_string()),
        payment_plan: None,
        testimony: "Serving in a rural congregation.".to_string(),
        ministry_context: None,
        reference_name: "Pastor Amos".to_string(),
        reference_relationship: "Senior pastor".to_string(),
        reference_email: "amos@example.org".to_string(),
        reference_phone: None,
        reference_notes: None,
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

#[test]
fn review_decisions_survive_reopening_the_snapshot() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("portal.json");
    let reviewer = Actor::new("dean-1");

    let application_id = {
        let service = service_at(&path);
        let application = service
            .submit(submission("Priscilla Aquila", "priscilla@example.org"))
            .expect("submission accepted");
        service
            .update_status(
                application.id.as_str(),
                StatusUpdate::new(ApplicationStatus::Waitlisted).with_notes("Cohort is full"),
                reviewer.as_ref(),
            )
            .expect("status updated");
        application.id
    };

    let reopened = service_at(&path);
    let stored = reopened
        .find(application_id.as_str())
        .expect("application persisted");
    assert_eq!(stored.status, ApplicationStatus::Waitlisted);
    assert_eq!(stored.reviewed_by.as_deref(), Some("dean-1"));
    assert_eq!(stored.admin_notes.as_deref(), Some("Cohort is full"));
    assert!(stored.reviewed_at.expect("stamped") >= stored.created_at);

    let stats = reopened.stats();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.waitlisted, 1);
    assert_eq!(stats.pending, 0);
}

#[test]
fn export_respects_the_admin_filter() {
    let dir = tempfile::tempdir().expect("temp dir");
    let service = service_at(&dir.path().join("portal.json"));

    service
        .submit(submission("Priscilla Aquila", "priscilla@example.org"))
        .expect("first submission");
    service
        .submit(submission("Apollos Alexandria", "apollos@example.org"))
        .expect("second submission");

    let mut buffer = Vec::new();
    let rows = service
        .export_csv(&ApplicationFilter::searching("APOLLOS"), &mut buffer)
        .expect("export succeeds");
    assert_eq!(rows, 1);

    let csv = String::from_utf8(buffer).expect("utf8 csv");
    assert!(csv.contains("Apollos Alexandria"));
    assert!(!csv.contains("Priscilla Aquila"));
}

#[tokio::test]
async fn admin_review_over_http() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = application_router(service_at(&dir.path().join("portal.json")));

    let mut payload = serde_json::to_value(submission("Lois Timothy", "lois@example.org"))
        .expect("submission serializes");
    payload["status"] = json!("approved");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/applications")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["status"], "pending");
    let id = created["id"].as_str().expect("id").to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/applications/{id}/status"))
                .header(header::CONTENT_TYPE, "application/json")
                .header(ACTOR_HEADER, "dean-1")
                .body(Body::from(
                    json!({ "status": "Reviewing", "admin_notes": "Call reference" }).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["status"], "reviewing");
    assert_eq!(updated["admin_notes"], "Call reference");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/applications?status=reviewing")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}
