//! Shared harness for HTTP integration tests.
//!
//! Wires the router over in-memory stores and the mock payment provider.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use enrollment_gate::adapters::http::enrollment::STRIPE_SIGNATURE_HEADER;
use enrollment_gate::adapters::http::middleware::STUDENT_ID_HEADER;
use enrollment_gate::adapters::memory::{
    InMemoryCourseCatalog, InMemoryEnrollmentStore, InMemoryProfileDirectory,
    InMemoryReconciliationLog, InMemoryWebhookEventRepository,
};
use enrollment_gate::adapters::stripe::{MockPaymentProvider, MOCK_WEBHOOK_SECRET};
use enrollment_gate::adapters::{enrollment_router, EnrollmentAppState};
use enrollment_gate::application::CheckoutSettings;
use enrollment_gate::domain::enrollment::{CourseReference, StudentProfile};
use enrollment_gate::domain::foundation::{CourseId, StudentId};
use enrollment_gate::domain::payment::sign_payload;

pub const BASE_URL: &str = "https://learn.example.com";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryEnrollmentStore>,
    pub catalog: Arc<InMemoryCourseCatalog>,
    pub profiles: Arc<InMemoryProfileDirectory>,
    pub reconciliation: Arc<InMemoryReconciliationLog>,
    pub webhook_events: Arc<InMemoryWebhookEventRepository>,
    pub provider: MockPaymentProvider,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryEnrollmentStore::new());
        let catalog = Arc::new(InMemoryCourseCatalog::new());
        let profiles = Arc::new(InMemoryProfileDirectory::new());
        let reconciliation = Arc::new(InMemoryReconciliationLog::new());
        let webhook_events = Arc::new(InMemoryWebhookEventRepository::new());
        let provider = MockPaymentProvider::new();

        let state = EnrollmentAppState::new(
            store.clone(),
            catalog.clone(),
            profiles.clone(),
            Arc::new(provider.clone()),
            reconciliation.clone(),
            webhook_events.clone(),
            CheckoutSettings::new(BASE_URL, "usd"),
        );

        Self {
            router: enrollment_router(state),
            store,
            catalog,
            profiles,
            reconciliation,
            webhook_events,
            provider,
        }
    }

    pub async fn add_course(&self, slug: &str, price: Decimal) -> CourseReference {
        let course = CourseReference::new(CourseId::new(), Some(price))
            .with_title(format!("Course {}", slug))
            .with_description("A course")
            .with_slug(slug);
        self.catalog.upsert(course.clone()).await;
        course
    }

    pub async fn add_student(&self) -> StudentId {
        let student = StudentId::new();
        self.profiles
            .insert(StudentProfile::new(student, Some("student@example.com".to_string())))
            .await;
        student
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn checkout(&self, student: StudentId, course: CourseId) -> (StatusCode, Value) {
        let request = Request::post("/api/checkout")
            .header(STUDENT_ID_HEADER, student.to_string())
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "course_id": course.to_string() }).to_string(),
            ))
            .unwrap();
        let response = self.send(request).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    pub async fn access(&self, student: Option<StudentId>, course: CourseId) -> (StatusCode, Value) {
        let mut builder = Request::get(format!("/api/courses/{}/access", course));
        if let Some(student) = student {
            builder = builder.header(STUDENT_ID_HEADER, student.to_string());
        }
        let response = self.send(builder.body(Body::empty()).unwrap()).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    pub async fn deliver_webhook(&self, body: &str, signature: Option<String>) -> (StatusCode, Value) {
        let mut builder = Request::post("/api/webhooks/stripe").header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header(STRIPE_SIGNATURE_HEADER, signature);
        }
        let response = self.send(builder.body(Body::from(body.to_string())).unwrap()).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    pub async fn deliver_signed(&self, body: &str) -> (StatusCode, Value) {
        self.deliver_webhook(body, Some(sign(body))).await
    }
}

pub fn sign(body: &str) -> String {
    sign_payload(MOCK_WEBHOOK_SECRET, chrono::Utc::now().timestamp(), body.as_bytes())
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

/// A `checkout.session.completed` event as Stripe sends it.
pub fn completed_event(
    event_id: &str,
    student: StudentId,
    course: CourseId,
    amount_total: i64,
) -> String {
    session_event(event_id, "checkout.session.completed", "paid", student, course, amount_total)
}

pub fn session_event(
    event_id: &str,
    event_type: &str,
    payment_status: &str,
    student: StudentId,
    course: CourseId,
    amount_total: i64,
) -> String {
    serde_json::json!({
        "id": event_id,
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": {
            "object": {
                "id": format!("cs_{}", event_id),
                "object": "checkout.session",
                "payment_status": payment_status,
                "amount_total": amount_total,
                "currency": "usd",
                "metadata": {
                    "student_id": student.to_string(),
                    "course_id": course.to_string(),
                    "price_at_time": amount_total.to_string()
                }
            }
        }
    })
    .to_string()
}
