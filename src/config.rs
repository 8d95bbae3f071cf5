use anyhow::Context;

/// Checkout configuration, resolved once at process start. Keys and merchant
/// identity are never compiled in; they come from the environment (after
/// `.env` loading).
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub api_base_url: String,
    pub secret_key: String,
    pub publishable_key: String,
    /// Must match the API version the client SDK expects; a mismatch only
    /// surfaces at confirmation time.
    pub api_version: String,
    pub merchant_country_code: String,
    pub merchant_display_name: String,
    /// Default charge amount in minor currency units.
    pub amount: u64,
    pub currency: String,
    pub return_url_scheme: String,
    pub default_billing_name: Option<String>,
    pub wallet_test_env: bool,
    /// Payment method the headless sheet confirms with.
    pub headless_payment_method: String,
}

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_API_VERSION: &str = "2024-09-30.acacia";

fn required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl CheckoutConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let amount = or_default("CHECKOUT_AMOUNT", "1099")
            .parse()
            .context("CHECKOUT_AMOUNT must be a positive integer in minor units")?;
        let secret_key = required("STRIPE_SECRET_KEY")?;
        // The key is sent verbatim in a bearer header on every call; catch a
        // mangled value here instead of at request time.
        if !secret_key.chars().all(|c| c.is_ascii_graphic()) {
            anyhow::bail!(
                "STRIPE_SECRET_KEY contains characters not allowed in an authorization header"
            );
        }
        Ok(Self {
            api_base_url: or_default("API_BASE_URL", DEFAULT_API_BASE_URL),
            secret_key,
            publishable_key: required("STRIPE_PUBLISHABLE_KEY")?,
            api_version: or_default("STRIPE_API_VERSION", DEFAULT_API_VERSION),
            merchant_country_code: or_default("MERCHANT_COUNTRY_CODE", "UK"),
            merchant_display_name: or_default("MERCHANT_DISPLAY_NAME", "Checkout Connect"),
            amount,
            currency: or_default("CHECKOUT_CURRENCY", "eur"),
            return_url_scheme: or_default("RETURN_URL_SCHEME", "checkoutconnect"),
            default_billing_name: std::env::var("DEFAULT_BILLING_NAME").ok(),
            wallet_test_env: or_default("WALLET_TEST_ENV", "false")
                .parse()
                .context("WALLET_TEST_ENV must be true or false")?,
            headless_payment_method: or_default("HEADLESS_PAYMENT_METHOD", "pm_card_visa"),
        })
    }

    /// Redirect target the sheet returns to after 3-D Secure.
    pub fn return_url(&self) -> String {
        format!("{}://stripe-redirect", self.return_url_scheme)
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            secret_key: "sk_test_local".to_string(),
            publishable_key: "pk_test_local".to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            merchant_country_code: "UK".to_string(),
            merchant_display_name: "Test Merchant".to_string(),
            amount: 1099,
            currency: "eur".to_string(),
            return_url_scheme: "checkoutconnect".to_string(),
            default_billing_name: Some("Jane Doe".to_string()),
            wallet_test_env: true,
            headless_payment_method: "pm_card_visa".to_string(),
        }
    }
}
