//! Lead form view controller.
//!
//! Wraps a [`LeadFormMachine`] shared with the delivery task. Submitting
//! moves the machine to `Submitting` synchronously, so a second submit on
//! the same controller is rejected before anything is spawned. The delivery
//! outcome is applied only if the view is still active.

use std::sync::Arc;

use dxm_core::{FormError, LeadForm, LeadFormMachine, SubmissionMeta};
use dxm_webhook::{DeliveryReceipt, LeadWebhook, WebhookError};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::lifecycle::ViewScope;

#[derive(Debug, Clone)]
pub struct LeadFormController {
    machine: Arc<Mutex<LeadFormMachine>>,
}

impl LeadFormController {
    pub fn new(form: LeadForm) -> Self {
        Self {
            machine: Arc::new(Mutex::new(LeadFormMachine::with_form(form))),
        }
    }

    pub fn snapshot(&self) -> LeadFormMachine {
        self.machine.lock().clone()
    }

    /// Begin a submission and spawn its delivery.
    ///
    /// Fails without spawning when fields are missing or a submission is
    /// already in flight.
    pub fn submit(
        &self,
        scope: &ViewScope,
        webhook: LeadWebhook,
        meta: SubmissionMeta,
    ) -> Result<JoinHandle<Result<DeliveryReceipt, WebhookError>>, FormError> {
        let envelope = self.machine.lock().begin_submit(meta)?;
        let guard = scope.guard();
        let machine = Arc::clone(&self.machine);

        Ok(tokio::spawn(async move {
            let result = webhook.deliver(&envelope).await;
            let outcome = match &result {
                Ok(_) => dxm_core::FormOutcome::Sent,
                Err(e) => e.form_outcome(),
            };
            guard.apply("delivery", move || {
                if let Err(e) = machine.lock().complete(outcome) {
                    tracing::warn!(error = %e, "delivery outcome arrived out of order");
                }
            });
            result
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxm_core::{FormStatus, LeadKind};
    use dxm_webhook::WebhookConfig;

    fn complete_form(kind: LeadKind) -> LeadForm {
        LeadForm::from_pairs(kind, kind.fields().iter().map(|f| (f.name, "값")))
    }

    fn unconfigured() -> LeadWebhook {
        LeadWebhook::new(WebhookConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn missing_fields_do_not_spawn() {
        let scope = ViewScope::new("quote");
        let controller = LeadFormController::new(LeadForm::new(LeadKind::Quote));
        let err = controller
            .submit(&scope, unconfigured(), SubmissionMeta::default())
            .unwrap_err();
        assert!(matches!(err, FormError::MissingFields(_)));
        assert_eq!(controller.snapshot().status(), &FormStatus::Idle);
    }

    #[tokio::test]
    async fn unconfigured_webhook_fails_with_values_kept() {
        let scope = ViewScope::new("register");
        let controller = LeadFormController::new(complete_form(LeadKind::VendorRegister));
        let result = controller
            .submit(&scope, unconfigured(), SubmissionMeta::default())
            .unwrap()
            .await
            .unwrap();
        assert!(matches!(result, Err(WebhookError::NotConfigured)));

        let machine = controller.snapshot();
        assert!(matches!(
            machine.status(),
            FormStatus::Failed { retryable: false, .. }
        ));
        assert!(machine.form().is_complete());
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_is_rejected() {
        let scope = ViewScope::new("quote");
        let controller = LeadFormController::new(complete_form(LeadKind::Quote));
        let first = controller
            .submit(&scope, unconfigured(), SubmissionMeta::default())
            .unwrap();
        // Single-threaded test runtime: the first delivery has not run yet.
        let second = controller.submit(&scope, unconfigured(), SubmissionMeta::default());
        assert_eq!(second.unwrap_err(), FormError::AlreadySubmitting);
        first.await.unwrap().unwrap_err();
    }

    #[tokio::test]
    async fn outcome_after_teardown_is_discarded() {
        let scope = ViewScope::new("quote");
        let controller = LeadFormController::new(complete_form(LeadKind::Quote));
        let handle = controller
            .submit(&scope, unconfigured(), SubmissionMeta::default())
            .unwrap();
        scope.teardown();
        handle.await.unwrap().unwrap_err();
        assert_eq!(controller.snapshot().status(), &FormStatus::Submitting);
    }
}
