use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::access::Actor;
use crate::store::{InMemoryStore, UnconfiguredStore};
use crate::workflows::admissions::domain::ApplicationSubmission;
use crate::workflows::admissions::notifier::{
    NotifierError, StatusTransition, TransitionNotifier,
};
use crate::workflows::admissions::{application_router, ApplicationReviewService, ReviewPolicy};

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        full_name: "Ruth Moabite".to_string(),
        email: "ruth@example.org".to_string(),
        phone: "+1 555 0100".to_string(),
        country: "Kenya".to_string(),
        program_id: None,
        program_title: Some("Diploma in Biblical Studies".to_string()),
        preferred_schedule: "evenings".to_string(),
        desired_start_term: Some("Fall 2026".to_string()),
        payment_plan: None,
        testimony: "Came to faith through a village fellowship.".to_string(),
        ministry_context: Some("Youth leader".to_string()),
        reference_name: "Naomi".to_string(),
        reference_relationship: "Pastor".to_string(),
        reference_email: "naomi@example.org".to_string(),
        reference_phone: None,
        reference_notes: None,
    }
}

pub(super) fn submission_from(full_name: &str, email: &str) -> ApplicationSubmission {
    let mut submission = submission();
    submission.full_name = full_name.to_string();
    submission.email = email.to_string();
    submission
}

pub(super) fn reviewer() -> Actor {
    Actor::new("admin-1").expect("non-blank actor")
}

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) type MemoryReviewService = ApplicationReviewService<InMemoryStore, MemoryNotifier>;

pub(super) fn build_service() -> (MemoryReviewService, InMemoryStore, Arc<MemoryNotifier>) {
    build_service_with(ReviewPolicy::default())
}

pub(super) fn build_service_with(
    policy: ReviewPolicy,
) -> (MemoryReviewService, InMemoryStore, Arc<MemoryNotifier>) {
    let store = InMemoryStore::new();
    let notifier = Arc::new(MemoryNotifier::default());
    let service =
        ApplicationReviewService::new(Arc::new(store.clone()), notifier.clone(), policy);
    (service, store, notifier)
}

pub(super) fn unconfigured_service() -> ApplicationReviewService<UnconfiguredStore, MemoryNotifier>
{
    ApplicationReviewService::new(
        Arc::new(UnconfiguredStore),
        Arc::new(MemoryNotifier::default()),
        ReviewPolicy::default(),
    )
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    transitions: Mutex<Vec<StatusTransition>>,
}

impl MemoryNotifier {
    pub(super) fn transitions(&self) -> Vec<StatusTransition> {
        self.transitions
            .lock()
            .expect("notifier mutex poisoned")
            .clone()
    }
}

impl TransitionNotifier for MemoryNotifier {
    fn notify(&self, transition: &StatusTransition) -> Result<(), NotifierError> {
        self.transitions
            .lock()
            .expect("notifier mutex poisoned")
            .push(transition.clone());
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl TransitionNotifier for OfflineNotifier {
    fn notify(&self, _transition: &StatusTransition) -> Result<(), NotifierError> {
        Err(NotifierError::Transport("smtp relay down".to_string()))
    }
}

pub(super) fn router_with_service(service: MemoryReviewService) -> axum::Router {
    application_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
