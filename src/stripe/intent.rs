use serde::{Deserialize, Serialize};

use crate::{
    checkout::interaction_log::InteractionSpan,
    stripe::{StripeGateway, error::GatewayError},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    #[default]
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Single-use confirmation secret, consumed by the presentation step.
    pub client_secret: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub status: IntentStatus,
}

impl StripeGateway {
    /// Amount is in minor currency units. Zero is rejected locally.
    pub async fn create_payment_intent(
        &self,
        customer_id: Option<&str>,
        amount: u64,
        currency: &str,
        span: &mut InteractionSpan,
    ) -> super::Result<PaymentIntent> {
        if amount == 0 {
            return Err(GatewayError::InvalidRequest("amount must be positive"));
        }
        if currency.is_empty() {
            return Err(GatewayError::InvalidRequest("currency is empty"));
        }
        let amount = amount.to_string();
        let mut params = vec![
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ];
        if let Some(customer_id) = customer_id {
            params.push(("customer", customer_id));
        }
        let headers = self.authenticated_headers();
        self.post_form("/v1/payment_intents", &params, headers, span)
            .await
    }

    /// Server-side confirmation with an explicit payment method. Stands in
    /// for the client SDK's sheet confirmation in headless deployments.
    pub async fn confirm_payment_intent(
        &self,
        intent_id: &str,
        payment_method: &str,
        span: &mut InteractionSpan,
    ) -> super::Result<PaymentIntent> {
        if intent_id.is_empty() {
            return Err(GatewayError::InvalidRequest("intent id is empty"));
        }
        let headers = self.authenticated_headers();
        self.post_form(
            &format!("/v1/payment_intents/{intent_id}/confirm"),
            &[("payment_method", payment_method)],
            headers,
            span,
        )
        .await
    }
}
