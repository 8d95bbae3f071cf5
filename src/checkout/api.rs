use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    checkout::{
        CheckoutErrorResponse, Result,
        deeplink::Forwarding,
        interaction_log::InteractionLog,
        orchestrator::{CheckoutRun, Phase},
        wallet,
    },
    state::AppState,
};

#[derive(Debug, Deserialize, Default)]
pub struct PayRequest {
    /// Minor currency units; falls back to the configured default.
    pub amount: Option<u64>,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PayData {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_image: Option<String>,
}

#[instrument(skip_all)]
pub async fn pay(
    State(AppState {
        orchestrator, config, ..
    }): State<AppState>,
    Json(request): Json<PayRequest>,
) -> Result<CheckoutResponse<PayData>> {
    let amount = request.amount.unwrap_or(config.amount);
    let currency = request.currency.as_deref().unwrap_or(&config.currency);
    let CheckoutRun { outcome, logs, .. } = orchestrator.run(amount, currency).await;
    match outcome {
        Ok(outcome) => {
            tracing::info!(payment_method = ?outcome.payment_method, "Dispatched checkout result");
            Ok(CheckoutResponse::new(
                PayData {
                    phase: outcome.phase,
                    payment_method: outcome.payment_method,
                    payment_method_image: outcome.payment_method_image,
                },
                logs,
            ))
        }
        Err(e) => {
            tracing::error!("Failed to complete checkout: {e}");
            Err(CheckoutErrorResponse::new(e.to_string(), logs))
        }
    }
}

#[instrument(skip_all)]
pub async fn wallets(
    State(AppState {
        orchestrator, config, ..
    }): State<AppState>,
) -> axum::Json<wallet::WalletAvailability> {
    let availability =
        wallet::check_wallets(orchestrator.delegate().as_ref(), config.wallet_test_env).await;
    tracing::debug!(
        pay_button = availability.pay_button,
        notices = availability.notices.len(),
        "Wallet capability check"
    );
    axum::Json(availability)
}

#[derive(Debug, Serialize)]
pub struct BusyState {
    /// Mirrors the UI loading indicator: true strictly between checkout
    /// start and its terminal transition.
    pub busy: bool,
}

pub async fn state(
    State(AppState { orchestrator, .. }): State<AppState>,
) -> axum::Json<BusyState> {
    axum::Json(BusyState {
        busy: orchestrator.is_busy(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ReturnQuery {
    /// The full deep link URL as delivered by the platform.
    pub url: String,
}

#[instrument(skip_all)]
pub async fn return_url(
    State(AppState { links, .. }): State<AppState>,
    Query(query): Query<ReturnQuery>,
) -> StatusCode {
    match links.forward(&query.url).await {
        Forwarding::Forwarded => StatusCode::OK,
        Forwarding::Ignored => StatusCode::NOT_FOUND,
        Forwarding::NoHandler => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse<T> {
    result: bool,
    logs: Vec<InteractionLog>,
    #[serde(flatten)]
    data: T,
}

impl<T> CheckoutResponse<T> {
    pub fn new(data: T, logs: Vec<InteractionLog>) -> Self {
        Self {
            result: true,
            logs,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for CheckoutResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let value = serde_json::to_value(self).expect("response serialization is infallible");
        tracing::debug!(data = %crate::stripe::mask::secure_value(&value), "Checkout API response payload");
        axum::Json(value).into_response()
    }
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/pay", post(pay))
        .route("/wallets", get(wallets))
        .route("/state", get(state))
        .route("/return", get(return_url))
}

/// `Json` extractor wrapper that customizes the error from `axum::extract::Json`
pub struct Json<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for Json<T>
where
    T: serde::de::DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = axum::Json<CheckoutErrorResponse>;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let rejection = match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => return Ok(Self(value)),
            Err(e) => e.to_string(),
        };
        Err(axum::Json(CheckoutErrorResponse::new(rejection, vec![])))
    }
}
