use serde::{Deserialize, Serialize};

use crate::{
    checkout::interaction_log::InteractionSpan,
    stripe::{StripeGateway, error::GatewayError},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct EphemeralKey {
    pub id: String,
    /// Short-lived secret the client SDK uses to act on the customer's
    /// behalf. Never stored, never logged unmasked.
    pub secret: String,
}

impl StripeGateway {
    /// The key is scoped to a customer created in the same session.
    /// Cross-session reuse is undefined behavior on the vendor side.
    pub async fn create_ephemeral_key(
        &self,
        customer_id: &str,
        span: &mut InteractionSpan,
    ) -> super::Result<EphemeralKey> {
        if customer_id.is_empty() {
            return Err(GatewayError::InvalidRequest("customer id is empty"));
        }
        let headers = self.versioned_headers();
        self.post_form(
            "/v1/ephemeral_keys",
            &[("customer", customer_id)],
            headers,
            span,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, ResponseTemplate,
        matchers::{body_string_contains, header, method, path},
    };

    use crate::{
        checkout::interaction_log::InteractionSpan,
        stripe::{error::GatewayError, test_support::mock_gateway},
    };

    #[tokio::test]
    async fn sends_version_header_and_customer() {
        let (server, gate) = mock_gateway().await;
        Mock::given(method("POST"))
            .and(path("/v1/ephemeral_keys"))
            .and(header("stripe-version", "2024-09-30.acacia"))
            .and(body_string_contains("customer=cus_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "ephkey_1",
                "object": "ephemeral_key",
                "secret": "ek_test_YWNjdF8xMDM"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut span = InteractionSpan::enter();
        let key = gate.create_ephemeral_key("cus_123", &mut span).await.unwrap();
        assert_eq!(key.secret, "ek_test_YWNjdF8xMDM");
    }

    #[tokio::test]
    async fn rejects_empty_customer_before_any_call() {
        let (server, gate) = mock_gateway().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut span = InteractionSpan::enter();
        let err = gate.create_ephemeral_key("", &mut span).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }
}
