//! Integration tests for checkout initiation and the access gate over HTTP.
//!
//! These tests drive the full router with in-memory stores:
//! 1. Free courses enroll immediately without touching the provider
//! 2. Paid courses redirect to checkout and grant nothing until the webhook
//! 3. The access gate and the guarded route honor enrollment rows

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{completed_event, json_body, TestApp, BASE_URL};
use enrollment_gate::adapters::http::middleware::STUDENT_ID_HEADER;
use enrollment_gate::domain::enrollment::{CourseReference, FREE_PAYMENT_ID};
use enrollment_gate::domain::foundation::{CourseId, StudentId};
use enrollment_gate::ports::{EnrollmentStore, PaymentError};

// =============================================================================
// Free Courses
// =============================================================================

#[tokio::test]
async fn free_course_enrolls_without_provider_call() {
    let app = TestApp::new();
    let course = app.add_course("intro", Decimal::ZERO).await;
    let student = app.add_student().await;

    let (status, body) = app.checkout(student, course.id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "in_app");
    assert_eq!(body["redirect_url"], "/courses/intro");
    assert_eq!(app.provider.call_count("create_checkout_session"), 0);

    let enrollment = app.store.find(&student, &course.id).await.unwrap().unwrap();
    assert_eq!(enrollment.amount(), Decimal::ZERO);
    assert!(enrollment.is_free());
    assert_eq!(enrollment.payment_id(), FREE_PAYMENT_ID);
}

#[tokio::test]
async fn repeated_free_checkout_keeps_one_row() {
    let app = TestApp::new();
    let course = app.add_course("intro", Decimal::ZERO).await;
    let student = app.add_student().await;

    app.checkout(student, course.id).await;
    let (status, _) = app.checkout(student, course.id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.len().await, 1);
}

// =============================================================================
// Paid Courses
// =============================================================================

#[tokio::test]
async fn paid_course_redirects_to_provider_checkout() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(49.99)).await;
    let student = app.add_student().await;

    let (status, body) = app.checkout(student, course.id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "provider_checkout");
    assert_eq!(body["session_id"], "cs_mock_1");
    assert!(body["redirect_url"].as_str().unwrap().starts_with("https://checkout.stripe.test/"));

    let requests = app.provider.checkout_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].line_item.unit_amount, 4999);
    assert_eq!(requests[0].line_item.currency, "usd");
    assert_eq!(
        requests[0].success_url,
        format!("{}/courses/rust-101?session_id={{CHECKOUT_SESSION_ID}}", BASE_URL)
    );
    assert_eq!(requests[0].metadata["student_id"], student.to_string());
    assert_eq!(requests[0].metadata["course_id"], course.id.to_string());
}

#[tokio::test]
async fn paid_checkout_grants_no_access_before_webhook() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(49.99)).await;
    let student = app.add_student().await;

    app.checkout(student, course.id).await;
    let (status, body) = app.access(Some(student), course.id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authorized"], false);
    assert_eq!(body["reason"], "not_enrolled");
    assert_eq!(body["redirect"], "/courses/rust-101");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn priced_course_end_to_end_stores_decimal_amount() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(49.99)).await;
    let student = app.add_student().await;

    app.checkout(student, course.id).await;
    let (status, _) = app
        .deliver_signed(&completed_event("evt_4999", student, course.id, 4999))
        .await;

    assert_eq!(status, StatusCode::OK);
    let enrollment = app.store.find(&student, &course.id).await.unwrap().unwrap();
    assert_eq!(enrollment.amount(), dec!(49.99));
    assert!(!enrollment.is_free());

    let (_, body) = app.access(Some(student), course.id).await;
    assert_eq!(body["authorized"], true);
}

#[tokio::test]
async fn enrolled_student_is_sent_to_course_without_checkout() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(49.99)).await;
    let student = app.add_student().await;
    app.deliver_signed(&completed_event("evt_1", student, course.id, 4999)).await;

    let (status, body) = app.checkout(student, course.id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "in_app");
    assert_eq!(app.provider.call_count("create_checkout_session"), 0);
}

// =============================================================================
// Checkout Failures
// =============================================================================

#[tokio::test]
async fn checkout_without_identity_is_unauthorized() {
    let app = TestApp::new();
    let request = Request::post("/api/checkout")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "course_id": CourseId::new().to_string() }).to_string(),
        ))
        .unwrap();

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_course_is_not_found() {
    let app = TestApp::new();
    let student = app.add_student().await;

    let (status, body) = app.checkout(student, CourseId::new()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "COURSE_NOT_FOUND");
}

#[tokio::test]
async fn course_without_slug_is_unprocessable() {
    let app = TestApp::new();
    let course = CourseReference::new(CourseId::new(), Some(dec!(10)))
        .with_title("No slug")
        .with_description("Missing a slug");
    app.catalog.upsert(course.clone()).await;
    let student = app.add_student().await;

    let (status, _) = app.checkout(student, course.id).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.provider.call_count("create_checkout_session"), 0);
}

#[tokio::test]
async fn provider_outage_is_service_unavailable() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(49.99)).await;
    let student = app.add_student().await;
    app.provider
        .set_method_error("create_checkout_session", PaymentError::network("connection reset"));

    let (status, _) = app.checkout(student, course.id).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn provider_rejection_is_bad_gateway() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(49.99)).await;
    let student = app.add_student().await;
    app.provider.set_method_error(
        "create_checkout_session",
        PaymentError::invalid_request("bad line item"),
    );

    let (status, _) = app.checkout(student, course.id).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn store_outage_during_checkout_is_service_unavailable() {
    let app = TestApp::new();
    let course = app.add_course("intro", Decimal::ZERO).await;
    let student = app.add_student().await;
    app.store.set_unavailable(true);

    let (status, body) = app.checkout(student, course.id).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Service temporarily unavailable");
}

// =============================================================================
// Access Gate
// =============================================================================

#[tokio::test]
async fn anonymous_access_redirects_to_site_root() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(10)).await;

    let (status, body) = app.access(None, course.id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authorized"], false);
    assert_eq!(body["reason"], "unauthenticated");
    assert_eq!(body["redirect"], "/");
}

#[tokio::test]
async fn viewer_without_profile_is_denied() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(10)).await;

    let (_, body) = app.access(Some(StudentId::new()), course.id).await;

    assert_eq!(body["reason"], "no_profile");
    assert_eq!(body["redirect"], "/");
}

#[tokio::test]
async fn access_check_fails_secure_on_store_outage() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(10)).await;
    let student = app.add_student().await;
    app.store.set_unavailable(true);

    let (status, body) = app.access(Some(student), course.id).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.get("authorized").is_none());
}

// =============================================================================
// Guarded Route
// =============================================================================

fn guarded_request(student: Option<StudentId>, course: CourseId) -> Request<Body> {
    let mut builder = Request::get(format!("/api/courses/{}/enrollment", course));
    if let Some(student) = student {
        builder = builder.header(STUDENT_ID_HEADER, student.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn guarded_route_redirects_non_enrolled_viewer() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(10)).await;
    let student = app.add_student().await;

    let response = app.send(guarded_request(Some(student), course.id)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/courses/rust-101");
}

#[tokio::test]
async fn guarded_route_redirects_anonymous_viewer_to_root() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(10)).await;

    let response = app.send(guarded_request(None, course.id)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn guarded_route_serves_enrolled_viewer() {
    let app = TestApp::new();
    let course = app.add_course("intro", Decimal::ZERO).await;
    let student = app.add_student().await;
    app.checkout(student, course.id).await;

    let response = app.send(guarded_request(Some(student), course.id)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["course_id"], course.id.to_string());
    assert_eq!(body["is_free"], true);
}

#[tokio::test]
async fn guarded_route_fails_secure_on_store_outage() {
    let app = TestApp::new();
    let course = app.add_course("rust-101", dec!(10)).await;
    let student = app.add_student().await;
    app.store.set_unavailable(true);

    let response = app.send(guarded_request(Some(student), course.id)).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Enrollment Listing
// =============================================================================

#[tokio::test]
async fn lists_enrollments_for_the_student() {
    let app = TestApp::new();
    let free = app.add_course("intro", Decimal::ZERO).await;
    let paid = app.add_course("rust-101", dec!(49.99)).await;
    let student = app.add_student().await;
    app.checkout(student, free.id).await;
    app.deliver_signed(&completed_event("evt_1", student, paid.id, 4999)).await;

    let request = Request::get("/api/enrollments")
        .header(STUDENT_ID_HEADER, student.to_string())
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let enrollments = body["enrollments"].as_array().unwrap();
    assert_eq!(enrollments.len(), 2);
    for enrollment in enrollments {
        let is_free = enrollment["is_free"].as_bool().unwrap();
        let amount: Decimal = enrollment["amount"].as_str().unwrap().parse().unwrap();
        assert_eq!(is_free, amount.is_zero());
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new();

    let response = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}
