//! FulfillEnrollmentHandler - Command handler that grants course access exactly once.
//!
//! Both fulfillment paths (free checkout and verified payment webhooks) end
//! here. Creation is a single insert-if-absent against the store, so racing
//! callers converge on the first row written. A later claim that disagrees
//! with that row is escalated as a reconciliation anomaly and never blocks
//! the caller.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::enrollment::{Enrollment, EnrollmentError, ReconciliationAnomaly};
use crate::domain::foundation::{CourseId, StudentId};
use crate::ports::{EnrollmentStore, InsertOutcome, ReconciliationLog};

use super::store_call::{with_store_timeout, DEFAULT_STORE_TIMEOUT};

/// Command to fulfill an enrollment.
#[derive(Debug, Clone)]
pub struct FulfillEnrollmentCommand {
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Provider session id, or `"free"`.
    pub payment_id: String,
    pub amount: Decimal,
}

/// Result of fulfillment.
#[derive(Debug, Clone, PartialEq)]
pub struct FulfillmentOutcome {
    /// The stored enrollment; the pre-existing row when `created` is false.
    pub enrollment: Enrollment,
    pub created: bool,
    pub anomaly: Option<ReconciliationAnomaly>,
}

/// Handler for fulfilling enrollments.
pub struct FulfillEnrollmentHandler {
    store: Arc<dyn EnrollmentStore>,
    reconciliation_log: Arc<dyn ReconciliationLog>,
    store_timeout: Duration,
}

impl FulfillEnrollmentHandler {
    pub fn new(
        store: Arc<dyn EnrollmentStore>,
        reconciliation_log: Arc<dyn ReconciliationLog>,
    ) -> Self {
        Self {
            store,
            reconciliation_log,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub async fn handle(
        &self,
        cmd: FulfillEnrollmentCommand,
    ) -> Result<FulfillmentOutcome, EnrollmentError> {
        // 1. Validate and build the candidate row
        let candidate = Enrollment::new(cmd.student_id, cmd.course_id, cmd.payment_id, cmd.amount)?;

        // 2. Atomic insert-if-absent
        let outcome = with_store_timeout(
            self.store_timeout,
            "insert_if_absent",
            self.store.insert_if_absent(&candidate),
        )
        .await
        .map_err(|e| {
            if let EnrollmentError::PaymentReferenceInUse(payment_id) = &e {
                tracing::error!(
                    student_id = %candidate.student_id(),
                    course_id = %candidate.course_id(),
                    payment_id = %payment_id,
                    "Payment reference already bound to a different enrollment"
                );
            }
            e
        })?;

        match outcome {
            InsertOutcome::Created(enrollment) => {
                tracing::info!(
                    enrollment_id = %enrollment.id(),
                    student_id = %enrollment.student_id(),
                    course_id = %enrollment.course_id(),
                    payment_id = enrollment.payment_id(),
                    amount = %enrollment.amount(),
                    is_free = enrollment.is_free(),
                    "Enrollment created"
                );
                Ok(FulfillmentOutcome {
                    enrollment,
                    created: true,
                    anomaly: None,
                })
            }
            InsertOutcome::Existing(existing) => {
                // 3. Compare the losing claim against the stored row
                let anomaly = ReconciliationAnomaly::detect(
                    &existing,
                    candidate.payment_id(),
                    candidate.amount(),
                );

                match &anomaly {
                    Some(anomaly) => self.escalate(anomaly).await,
                    None => tracing::debug!(
                        enrollment_id = %existing.id(),
                        payment_id = existing.payment_id(),
                        "Duplicate fulfillment, returning existing enrollment"
                    ),
                }

                Ok(FulfillmentOutcome {
                    enrollment: existing,
                    created: false,
                    anomaly,
                })
            }
        }
    }

    /// Logs the anomaly and queues it for review. Queue failures are logged only.
    async fn escalate(&self, anomaly: &ReconciliationAnomaly) {
        tracing::warn!(
            target: "reconciliation",
            kind = %anomaly.kind,
            student_id = %anomaly.student_id,
            course_id = %anomaly.course_id,
            existing_payment_id = %anomaly.existing_payment_id,
            existing_amount = %anomaly.existing_amount,
            claimed_payment_id = %anomaly.claimed_payment_id,
            claimed_amount = %anomaly.claimed_amount,
            "Fulfillment claim conflicts with existing enrollment"
        );

        let recorded = with_store_timeout(
            self.store_timeout,
            "record_anomaly",
            self.reconciliation_log.record(anomaly),
        )
        .await;

        if let Err(e) = recorded {
            tracing::error!(
                target: "reconciliation",
                error = %e,
                kind = %anomaly.kind,
                student_id = %anomaly.student_id,
                course_id = %anomaly.course_id,
                "Failed to record reconciliation anomaly"
            );
        }
    }
}
