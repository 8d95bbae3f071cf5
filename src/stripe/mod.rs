use axum::http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::{
    checkout::interaction_log::InteractionSpan, config::CheckoutConfig,
    stripe::error::ErrorResponse,
};

mod auth;
/// Customer resource
mod customer;
/// Customer-scoped ephemeral key resource
mod ephemeral_key;
mod error;
/// Payment intent resource
mod intent;
/// Credential masking
pub mod mask;

pub use customer::Customer;
pub use ephemeral_key::EphemeralKey;
pub use error::GatewayError;
pub use intent::{IntentStatus, PaymentIntent};

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, serde::Deserialize)]
pub enum StripeResponse<T> {
    #[serde(untagged)]
    Ok(T),
    #[serde(untagged)]
    Err(ErrorResponse),
}

impl<T> StripeResponse<T> {
    pub fn into_std_result(self) -> std::result::Result<T, ErrorResponse> {
        match self {
            StripeResponse::Ok(ok) => Ok(ok),
            StripeResponse::Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
    api_version: String,
}

impl StripeGateway {
    pub fn new(config: &CheckoutConfig) -> Self {
        // No request timeout: a hung call hangs the flow, matching the
        // client SDK it stands in for.
        let client = reqwest::Client::new();
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            api_version: config.api_version.clone(),
        }
    }

    fn authenticated_headers(&self) -> HeaderMap {
        auth::authenticated_headers(&self.secret_key)
    }

    fn versioned_headers(&self) -> HeaderMap {
        auth::versioned_headers(&self.secret_key, &self.api_version)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        headers: HeaderMap,
        span: &mut InteractionSpan,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let form: serde_json::Map<String, serde_json::Value> = params
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        let secured_request = mask::secure_value(&serde_json::Value::Object(form));
        tracing::debug!(%url, data = %secured_request, "Backend API request");
        span.set_request(url.clone(), &secured_request);
        let res = self
            .client
            .post(&url)
            .form(&params)
            .headers(headers)
            .send()
            .await?;
        span.set_response_status(res.status().as_u16());

        let response = res.json::<serde_json::Value>().await?;
        let secured_response = mask::secure_value(&response);
        span.set_response(&secured_response);
        tracing::debug!(response = %secured_response, "Backend API response");
        let res: StripeResponse<T> = serde_json::from_value(response)?;
        Ok(res.into_std_result()?)
    }
}
