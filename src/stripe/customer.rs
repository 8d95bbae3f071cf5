use serde::{Deserialize, Serialize};

use crate::{checkout::interaction_log::InteractionSpan, stripe::StripeGateway};

#[derive(Debug, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
}

impl StripeGateway {
    /// One outbound call, no retry. The caller aborts the flow on failure.
    pub async fn create_customer(&self, span: &mut InteractionSpan) -> super::Result<Customer> {
        let headers = self.authenticated_headers();
        self.post_form("/v1/customers", &[], headers, span).await
    }
}
