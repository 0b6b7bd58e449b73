//! InitiateCheckoutHandler - Command handler that starts a course purchase.
//!
//! Free courses are fulfilled immediately. Paid courses get a hosted checkout
//! session and nothing is persisted: access waits for the verified webhook.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::enrollment::money::to_minor_units;
use crate::domain::enrollment::{
    CheckoutIntent, CourseReference, Enrollment, EnrollmentError, StudentProfile, FREE_PAYMENT_ID,
};
use crate::domain::foundation::{CourseId, StudentId};
use crate::ports::{
    CheckoutLineItem, CourseCatalog, CreateCheckoutRequest, EnrollmentStore, PaymentError,
    PaymentProvider, ProfileDirectory,
};

use super::fulfill_enrollment::{FulfillEnrollmentCommand, FulfillEnrollmentHandler};
use super::store_call::{with_store_timeout, DEFAULT_STORE_TIMEOUT};

/// Command to start checkout for a course.
#[derive(Debug, Clone)]
pub struct InitiateCheckoutCommand {
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Provisions the student's profile and pre-fills the checkout form.
    pub email: Option<String>,
}

/// Where the client goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// A path inside the application.
    InApp { path: String },
    /// The provider's hosted checkout page.
    ProviderCheckout { url: String, session_id: String },
}

impl RedirectTarget {
    pub fn url(&self) -> &str {
        match self {
            RedirectTarget::InApp { path } => path,
            RedirectTarget::ProviderCheckout { url, .. } => url,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RedirectTarget::InApp { .. } => "in_app",
            RedirectTarget::ProviderCheckout { .. } => "provider_checkout",
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            RedirectTarget::InApp { .. } => None,
            RedirectTarget::ProviderCheckout { session_id, .. } => Some(session_id),
        }
    }
}

/// Result of checkout initiation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    pub redirect: RedirectTarget,
    /// Set when the student is enrolled by the time this returns.
    pub enrollment: Option<Enrollment>,
}

/// Values checkout needs from configuration.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Origin the provider redirects back to, without a trailing slash.
    pub public_base_url: String,
    /// Lowercase ISO currency code.
    pub currency: String,
}

impl CheckoutSettings {
    pub fn new(public_base_url: impl Into<String>, currency: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            currency: currency.into(),
        }
    }

    fn success_url(&self, slug: &str) -> String {
        format!(
            "{}/courses/{}?session_id={{CHECKOUT_SESSION_ID}}",
            self.public_base_url, slug
        )
    }

    fn cancel_url(&self, slug: &str) -> String {
        format!("{}/courses/{}?canceled=true", self.public_base_url, slug)
    }
}

/// Handler for starting checkout.
pub struct InitiateCheckoutHandler {
    catalog: Arc<dyn CourseCatalog>,
    profiles: Arc<dyn ProfileDirectory>,
    store: Arc<dyn EnrollmentStore>,
    payment_provider: Arc<dyn PaymentProvider>,
    fulfill: Arc<FulfillEnrollmentHandler>,
    settings: CheckoutSettings,
    store_timeout: Duration,
}

impl InitiateCheckoutHandler {
    pub fn new(
        catalog: Arc<dyn CourseCatalog>,
        profiles: Arc<dyn ProfileDirectory>,
        store: Arc<dyn EnrollmentStore>,
        payment_provider: Arc<dyn PaymentProvider>,
        fulfill: Arc<FulfillEnrollmentHandler>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            catalog,
            profiles,
            store,
            payment_provider,
            fulfill,
            settings,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub async fn handle(
        &self,
        cmd: InitiateCheckoutCommand,
    ) -> Result<CheckoutOutcome, EnrollmentError> {
        // 1. Load the course; a price must be set
        let course = with_store_timeout(
            self.store_timeout,
            "get_course_by_id",
            self.catalog.get_course_by_id(&cmd.course_id),
        )
        .await?
        .ok_or(EnrollmentError::CourseNotFound(cmd.course_id))?;

        let price = course
            .price
            .ok_or_else(|| EnrollmentError::IncompleteCourseData("price is not set".to_string()))?;

        // 2. Provision the profile when we know the email
        let email = cmd.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
        let profile = match email {
            Some(email) => Some(
                with_store_timeout(
                    self.store_timeout,
                    "ensure_profile",
                    self.profiles
                        .ensure_profile(StudentProfile::new(cmd.student_id, Some(email.to_string()))),
                )
                .await?,
            ),
            None => None,
        };

        // 3. Already enrolled: never start a second charge
        let existing = with_store_timeout(
            self.store_timeout,
            "find_enrollment",
            self.store.find(&cmd.student_id, &cmd.course_id),
        )
        .await?;
        if let Some(enrollment) = existing {
            tracing::info!(
                student_id = %cmd.student_id,
                course_id = %cmd.course_id,
                "Checkout skipped, student already enrolled"
            );
            return Ok(CheckoutOutcome {
                redirect: RedirectTarget::InApp {
                    path: course.public_path(),
                },
                enrollment: Some(enrollment),
            });
        }

        // 4. Free courses are fulfilled on the spot
        let price_minor = to_minor_units(price)
            .map_err(|e| EnrollmentError::IncompleteCourseData(e.to_string()))?;

        if price_minor == 0 {
            let outcome = self
                .fulfill
                .handle(FulfillEnrollmentCommand {
                    student_id: cmd.student_id,
                    course_id: cmd.course_id,
                    payment_id: FREE_PAYMENT_ID.to_string(),
                    amount: Decimal::ZERO,
                })
                .await?;

            return Ok(CheckoutOutcome {
                redirect: RedirectTarget::InApp {
                    path: course.public_path(),
                },
                enrollment: Some(outcome.enrollment),
            });
        }

        // 5. Paid courses need complete metadata for the checkout page
        let missing = course.missing_checkout_fields();
        if !missing.is_empty() {
            return Err(EnrollmentError::IncompleteCourseData(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        let customer_email = match profile {
            Some(profile) => profile.email,
            None => self.stored_email(&cmd.student_id).await,
        };

        // 6. Hosted checkout session carrying the intent
        let request = self.checkout_request(&cmd, &course, price_minor, customer_email)?;
        let session = self
            .payment_provider
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    course_id = %cmd.course_id,
                    student_id = %cmd.student_id,
                    "Failed to create checkout session"
                );
                provider_error(e)
            })?;

        tracing::info!(
            session_id = %session.id,
            course_id = %cmd.course_id,
            student_id = %cmd.student_id,
            amount_minor = price_minor,
            "Checkout session created"
        );

        Ok(CheckoutOutcome {
            redirect: RedirectTarget::ProviderCheckout {
                url: session.url,
                session_id: session.id,
            },
            enrollment: None,
        })
    }

    /// Email on the stored profile, if any. Lookup failures only lose the pre-fill.
    async fn stored_email(&self, student_id: &StudentId) -> Option<String> {
        match with_store_timeout(
            self.store_timeout,
            "find_profile",
            self.profiles.find_profile(student_id),
        )
        .await
        {
            Ok(profile) => profile.and_then(|p| p.email),
            Err(e) => {
                tracing::warn!(error = %e, student_id = %student_id, "Profile lookup failed");
                None
            }
        }
    }

    fn checkout_request(
        &self,
        cmd: &InitiateCheckoutCommand,
        course: &CourseReference,
        price_minor: i64,
        customer_email: Option<String>,
    ) -> Result<CreateCheckoutRequest, EnrollmentError> {
        let field = |value: &Option<String>, name: &'static str| {
            value
                .clone()
                .ok_or_else(|| EnrollmentError::IncompleteCourseData(format!("missing {}", name)))
        };
        let slug = field(&course.slug, "slug")?;

        Ok(CreateCheckoutRequest {
            student_id: cmd.student_id,
            course_id: cmd.course_id,
            customer_email,
            line_item: CheckoutLineItem {
                name: field(&course.title, "title")?,
                description: field(&course.description, "description")?,
                image_url: course.image_url.clone(),
                unit_amount: price_minor,
                currency: self.settings.currency.clone(),
            },
            success_url: self.settings.success_url(&slug),
            cancel_url: self.settings.cancel_url(&slug),
            metadata: CheckoutIntent::new(cmd.student_id, cmd.course_id, price_minor).to_metadata(),
            idempotency_key: None,
        }
        .with_derived_idempotency_key())
    }
}

fn provider_error(err: PaymentError) -> EnrollmentError {
    if err.retryable {
        EnrollmentError::ProviderUnavailable(err.message)
    } else {
        EnrollmentError::ProviderRejected(err.message)
    }
}
