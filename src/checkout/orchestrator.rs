use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use serde::Serialize;

use crate::{
    checkout::{
        CheckoutError,
        interaction_log::{InteractionKind, InteractionLog, InteractionSpan},
        presentation::{PresentationDelegate, SheetInit},
    },
    config::CheckoutConfig,
    stripe::{GatewayError, StripeGateway},
};

/// Strictly forward state machine. Any step failure goes straight to
/// [Phase::Failed] with the triggering error; there is no rollback and no
/// compensating action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    ResolvingCustomer,
    IssuingKey,
    CreatingIntent,
    Presenting,
    Confirming,
    Succeeded,
    Failed,
}

/// Flow-through session artifacts. Created per checkout session, never
/// reused across sessions: the key and the intent are both requested with
/// the customer id minted in the same run.
#[derive(Debug)]
struct CheckoutSession {
    customer_id: String,
    ephemeral_key_secret: String,
    client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutOutcome {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_image: Option<String>,
}

pub struct CheckoutRun {
    /// Terminal phase of the machine: [Phase::Succeeded], [Phase::Failed],
    /// or [Phase::Idle] when the run was rejected before starting.
    pub phase: Phase,
    pub outcome: std::result::Result<CheckoutOutcome, CheckoutError>,
    pub logs: Vec<InteractionLog>,
}

pub struct Orchestrator {
    gate: StripeGateway,
    delegate: Arc<dyn PresentationDelegate>,
    config: Arc<CheckoutConfig>,
    busy: AtomicBool,
}

fn validate_request(amount: u64, currency: &str) -> std::result::Result<(), GatewayError> {
    if amount == 0 {
        return Err(GatewayError::InvalidRequest("amount must be positive"));
    }
    if currency.is_empty() {
        return Err(GatewayError::InvalidRequest("currency is empty"));
    }
    Ok(())
}

/// Mirrors the UI loading indicator: held for exactly the span between
/// orchestration start and the terminal transition, released on drop so
/// every failure path clears it.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Orchestrator {
    pub fn new(
        gate: StripeGateway,
        delegate: Arc<dyn PresentationDelegate>,
        config: Arc<CheckoutConfig>,
    ) -> Self {
        Self {
            gate,
            delegate,
            config,
            busy: AtomicBool::new(false),
        }
    }

    pub fn delegate(&self) -> &Arc<dyn PresentationDelegate> {
        &self.delegate
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one checkout session end to end. Single-flight: a second call
    /// while one is in progress fails with [CheckoutError::Busy] without
    /// touching the backend.
    pub async fn run(&self, amount: u64, currency: &str) -> CheckoutRun {
        // Input is checked before the first step so a bad request cannot
        // leave a customer or key behind on the vendor side.
        if let Err(e) = validate_request(amount, currency) {
            tracing::error!(amount, currency, "Rejected checkout: {e}");
            return CheckoutRun {
                phase: Phase::Failed,
                outcome: Err(CheckoutError::Backend(e)),
                logs: Vec::new(),
            };
        }
        let Some(_busy) = BusyGuard::try_acquire(&self.busy) else {
            tracing::warn!("Rejected checkout: another session is in flight");
            return CheckoutRun {
                phase: Phase::Idle,
                outcome: Err(CheckoutError::Busy),
                logs: Vec::new(),
            };
        };
        let session = uuid::Uuid::new_v4();
        let mut logs = Vec::new();
        let mut phase = Phase::Idle;
        tracing::info!(%session, amount, currency, "Checkout started");
        let outcome = self
            .drive(amount, currency, &mut phase, &mut logs)
            .await;
        let terminal = match &outcome {
            Ok(_) => {
                tracing::info!(%session, "Checkout succeeded");
                Phase::Succeeded
            }
            Err(e) => {
                // Resources created before the failure stay on the vendor
                // side; there is no create-undo in this flow.
                if !matches!(phase, Phase::ResolvingCustomer) {
                    tracing::warn!(
                        %session,
                        failed_at = ?phase,
                        "Checkout failed after vendor resources were created; they are left in place"
                    );
                }
                tracing::error!(%session, failed_at = ?phase, "Checkout failed: {e}");
                Phase::Failed
            }
        };
        CheckoutRun {
            phase: terminal,
            outcome,
            logs,
        }
    }

    async fn drive(
        &self,
        amount: u64,
        currency: &str,
        phase: &mut Phase,
        logs: &mut Vec<InteractionLog>,
    ) -> std::result::Result<CheckoutOutcome, CheckoutError> {
        *phase = Phase::ResolvingCustomer;
        let mut span = InteractionSpan::enter();
        let customer = self.gate.create_customer(&mut span).await;
        logs.push(span.interaction_log(InteractionKind::CreateCustomer));
        let customer = customer?;
        tracing::debug!(customer = %customer.id, "Resolved customer");

        *phase = Phase::IssuingKey;
        let mut span = InteractionSpan::enter();
        let key = self.gate.create_ephemeral_key(&customer.id, &mut span).await;
        logs.push(span.interaction_log(InteractionKind::CreateEphemeralKey));
        let key = key?;
        tracing::debug!(key = %key.id, "Issued ephemeral key");

        *phase = Phase::CreatingIntent;
        let mut span = InteractionSpan::enter();
        let intent = self
            .gate
            .create_payment_intent(Some(&customer.id), amount, currency, &mut span)
            .await;
        logs.push(span.interaction_log(InteractionKind::CreatePaymentIntent));
        let intent = intent?;
        tracing::debug!(
            intent = %intent.id,
            amount = intent.amount,
            currency = %intent.currency,
            "Created payment intent"
        );

        let session = CheckoutSession {
            customer_id: customer.id,
            ephemeral_key_secret: key.secret,
            client_secret: intent.client_secret,
        };

        *phase = Phase::Presenting;
        let init = SheetInit {
            publishable_key: self.config.publishable_key.clone(),
            customer_id: session.customer_id,
            customer_ephemeral_key_secret: session.ephemeral_key_secret,
            payment_intent_client_secret: session.client_secret,
            merchant_display_name: self.config.merchant_display_name.clone(),
            merchant_country_code: self.config.merchant_country_code.clone(),
            return_url: self.config.return_url(),
            allows_delayed_payment_methods: true,
            default_billing_name: self.config.default_billing_name.clone(),
            wallet_test_env: self.config.wallet_test_env,
        };
        self.delegate.init_sheet(init).await?;
        let option = self.delegate.present().await?;
        tracing::debug!(payment_method = %option.label, "Payment method selected");

        *phase = Phase::Confirming;
        self.delegate.confirm().await?;

        *phase = Phase::Succeeded;
        Ok(CheckoutOutcome {
            phase: Phase::Succeeded,
            payment_method: Some(option.label),
            payment_method_image: option.image,
        })
    }
}
