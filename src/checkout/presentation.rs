use std::fmt::Display;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    checkout::interaction_log::{InteractionKind, InteractionSpan},
    config::CheckoutConfig,
    stripe::{IntentStatus, StripeGateway},
};

/// Everything the sheet needs before it can be presented. Mirrors the
/// vendor SDK's init call: the three session artifacts plus merchant
/// identity and the redirect return URL.
#[derive(Debug, Clone)]
pub struct SheetInit {
    pub publishable_key: String,
    pub customer_id: String,
    pub customer_ephemeral_key_secret: String,
    pub payment_intent_client_secret: String,
    pub merchant_display_name: String,
    pub merchant_country_code: String,
    pub return_url: String,
    pub allows_delayed_payment_methods: bool,
    pub default_billing_name: Option<String>,
    pub wallet_test_env: bool,
}

/// Payment method descriptor selected by the sheet.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOption {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Wallet {
    /// The device-native wallet. Its absence is silent: the pay button
    /// simply stays hidden.
    Platform,
    /// The alternate wallet. Its absence produces a user-facing notice.
    Alternate,
}

#[derive(Debug)]
pub enum PresentationError {
    Cancelled,
    Declined(String),
    NotInitialized,
    Sdk(String),
}

impl std::error::Error for PresentationError {}

impl Display for PresentationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresentationError::Cancelled => f.write_str("payment sheet was cancelled"),
            PresentationError::Declined(reason) => write!(f, "payment method declined: {reason}"),
            PresentationError::NotInitialized => f.write_str("payment sheet is not initialized"),
            PresentationError::Sdk(e) => write!(f, "sdk failure: {e}"),
        }
    }
}

#[derive(Debug)]
pub enum ConfirmationError {
    Declined(String),
    /// Confirmation needs a redirect (3-D Secure) the headless sheet
    /// cannot drive.
    RequiresAction,
    Sdk(String),
}

impl std::error::Error for ConfirmationError {}

impl Display for ConfirmationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmationError::Declined(reason) => write!(f, "confirmation declined: {reason}"),
            ConfirmationError::RequiresAction => {
                f.write_str("confirmation requires customer action")
            }
            ConfirmationError::Sdk(e) => write!(f, "sdk failure: {e}"),
        }
    }
}

/// The vendor-owned UI collaborator. Implementations wrap a real payment
/// sheet SDK; the orchestrator only sees these five calls.
#[async_trait]
pub trait PresentationDelegate: Send + Sync {
    async fn init_sheet(&self, init: SheetInit) -> std::result::Result<(), PresentationError>;

    /// Collect payment method details. The returned descriptor decides
    /// whether confirmation is entered.
    async fn present(&self) -> std::result::Result<PaymentOption, PresentationError>;

    async fn confirm(&self) -> std::result::Result<(), ConfirmationError>;

    /// Vendor callback-URL handler: true when the URL belongs to the
    /// payment redirect, false when it should be ignored.
    async fn handle_url(&self, url: &str) -> bool;

    async fn wallet_capability(
        &self,
        wallet: Wallet,
        test_env: bool,
    ) -> std::result::Result<bool, PresentationError>;
}

/// Server-side stand-in for the mobile payment sheet: confirms the intent
/// through the backend with a configured payment method. No wallet support,
/// no interactive 3-D Secure.
pub struct HeadlessSheet {
    gate: StripeGateway,
    payment_method: String,
    return_url_scheme: String,
    init: Mutex<Option<SheetInit>>,
}

impl HeadlessSheet {
    pub fn new(gate: StripeGateway, config: &CheckoutConfig) -> Self {
        Self {
            gate,
            payment_method: config.headless_payment_method.clone(),
            return_url_scheme: config.return_url_scheme.clone(),
            init: Mutex::new(None),
        }
    }
}

/// Client secrets look like `pi_xxx_secret_yyy`; the intent id is the part
/// before `_secret_`.
fn intent_id_from_client_secret(client_secret: &str) -> Option<&str> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
}

#[async_trait]
impl PresentationDelegate for HeadlessSheet {
    async fn init_sheet(&self, init: SheetInit) -> std::result::Result<(), PresentationError> {
        *self.init.lock().expect("sheet state lock") = Some(init);
        Ok(())
    }

    async fn present(&self) -> std::result::Result<PaymentOption, PresentationError> {
        let guard = self.init.lock().expect("sheet state lock");
        if guard.is_none() {
            return Err(PresentationError::NotInitialized);
        }
        Ok(PaymentOption {
            label: self.payment_method.clone(),
            image: None,
        })
    }

    async fn confirm(&self) -> std::result::Result<(), ConfirmationError> {
        let client_secret = {
            let guard = self.init.lock().expect("sheet state lock");
            let init = guard.as_ref().ok_or_else(|| {
                ConfirmationError::Sdk("confirm called before init".to_string())
            })?;
            init.payment_intent_client_secret.clone()
        };
        let intent_id = intent_id_from_client_secret(&client_secret)
            .ok_or_else(|| ConfirmationError::Sdk("malformed client secret".to_string()))?;

        let mut span = InteractionSpan::enter();
        let confirmed = self
            .gate
            .confirm_payment_intent(intent_id, &self.payment_method, &mut span)
            .await;
        let log = span.interaction_log(InteractionKind::ConfirmPaymentIntent);
        tracing::debug!(
            data = %serde_json::to_value(&log).expect("log serialization is infallible"),
            "Headless confirmation interaction"
        );
        let confirmed = confirmed.map_err(|e| ConfirmationError::Declined(e.to_string()))?;
        tracing::debug!(intent = %confirmed.id, status = ?confirmed.status, "Headless confirmation settled");
        match confirmed.status {
            IntentStatus::Succeeded | IntentStatus::Processing | IntentStatus::RequiresCapture => {
                Ok(())
            }
            IntentStatus::RequiresAction => Err(ConfirmationError::RequiresAction),
            other => Err(ConfirmationError::Declined(format!(
                "unexpected intent status {other:?}"
            ))),
        }
    }

    async fn handle_url(&self, url: &str) -> bool {
        url.starts_with(&format!("{}://", self.return_url_scheme))
    }

    async fn wallet_capability(
        &self,
        wallet: Wallet,
        _test_env: bool,
    ) -> std::result::Result<bool, PresentationError> {
        tracing::debug!(?wallet, "Headless sheet has no wallet support");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, ResponseTemplate,
        matchers::{method, path},
    };

    use super::{
        ConfirmationError, HeadlessSheet, PresentationDelegate, PresentationError, SheetInit,
        intent_id_from_client_secret,
    };
    use crate::{config::CheckoutConfig, stripe::test_support::mock_gateway};

    fn sheet_init(client_secret: &str) -> SheetInit {
        SheetInit {
            publishable_key: "pk_test_local".into(),
            customer_id: "cus_1".into(),
            customer_ephemeral_key_secret: "ek_test_1".into(),
            payment_intent_client_secret: client_secret.into(),
            merchant_display_name: "Test Merchant".into(),
            merchant_country_code: "UK".into(),
            return_url: "checkoutconnect://stripe-redirect".into(),
            allows_delayed_payment_methods: true,
            default_billing_name: None,
            wallet_test_env: true,
        }
    }

    #[test]
    fn intent_id_extraction() {
        assert_eq!(
            intent_id_from_client_secret("pi_3MtwBw_secret_ALlpn"),
            Some("pi_3MtwBw")
        );
        assert_eq!(intent_id_from_client_secret("_secret_x"), None);
        assert_eq!(intent_id_from_client_secret("garbage"), None);
    }

    #[tokio::test]
    async fn present_requires_init() {
        let (_server, gate) = mock_gateway().await;
        let sheet = HeadlessSheet::new(gate, &CheckoutConfig::test_defaults());
        let err = sheet.present().await.unwrap_err();
        assert!(matches!(err, PresentationError::NotInitialized));
    }

    #[tokio::test]
    async fn confirm_succeeds_on_succeeded_status() {
        let (server, gate) = mock_gateway().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents/pi_1/confirm"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pi_1",
                "client_secret": "pi_1_secret_x",
                "amount": 1099,
                "currency": "eur",
                "status": "succeeded"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sheet = HeadlessSheet::new(gate, &CheckoutConfig::test_defaults());
        sheet.init_sheet(sheet_init("pi_1_secret_x")).await.unwrap();
        sheet.present().await.unwrap();
        sheet.confirm().await.unwrap();
    }

    #[tokio::test]
    async fn confirm_maps_requires_action() {
        let (server, gate) = mock_gateway().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents/pi_2/confirm"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pi_2",
                "client_secret": "pi_2_secret_x",
                "amount": 1099,
                "currency": "eur",
                "status": "requires_action"
            })))
            .mount(&server)
            .await;

        let sheet = HeadlessSheet::new(gate, &CheckoutConfig::test_defaults());
        sheet.init_sheet(sheet_init("pi_2_secret_x")).await.unwrap();
        let err = sheet.confirm().await.unwrap_err();
        assert!(matches!(err, ConfirmationError::RequiresAction));
    }

    #[tokio::test]
    async fn recognizes_return_url_scheme() {
        let (_server, gate) = mock_gateway().await;
        let sheet = HeadlessSheet::new(gate, &CheckoutConfig::test_defaults());
        assert!(sheet.handle_url("checkoutconnect://stripe-redirect?x=1").await);
        assert!(!sheet.handle_url("https://example.com/other").await);
    }
}
