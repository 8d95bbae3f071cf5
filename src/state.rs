use std::sync::Arc;

use crate::{
    checkout::{deeplink::DeepLinkRouter, orchestrator::Orchestrator},
    config::CheckoutConfig,
};

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub links: DeepLinkRouter,
    pub config: Arc<CheckoutConfig>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        links: DeepLinkRouter,
        config: Arc<CheckoutConfig>,
    ) -> Self {
        Self {
            orchestrator,
            links,
            config,
        }
    }
}
