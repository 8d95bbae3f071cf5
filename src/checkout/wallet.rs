use serde::Serialize;

use crate::checkout::presentation::{PresentationDelegate, Wallet};

#[derive(Debug, Serialize)]
pub struct WalletAvailability {
    /// Show the wallet-pay button only when the platform wallet is there.
    pub pay_button: bool,
    pub notices: Vec<String>,
}

/// Two independent capability queries. The asymmetry is deliberate and must
/// stay: the platform wallet's absence is silent (the button stays hidden),
/// the alternate wallet's absence is diagnostic (one user-facing notice).
pub async fn check_wallets(
    delegate: &dyn PresentationDelegate,
    alternate_test_env: bool,
) -> WalletAvailability {
    let platform = match delegate.wallet_capability(Wallet::Platform, false).await {
        Ok(supported) => supported,
        Err(e) => {
            tracing::debug!("Platform wallet capability query failed: {e}");
            false
        }
    };
    let alternate = match delegate
        .wallet_capability(Wallet::Alternate, alternate_test_env)
        .await
    {
        Ok(supported) => supported,
        Err(e) => {
            tracing::debug!("Alternate wallet capability query failed: {e}");
            false
        }
    };

    let mut notices = Vec::new();
    if !alternate {
        notices.push("Alternate wallet payments are not available on this device".to_string());
    }
    WalletAvailability {
        pay_button: platform,
        notices,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::check_wallets;
    use crate::checkout::presentation::{
        ConfirmationError, PaymentOption, PresentationDelegate, PresentationError, SheetInit,
        Wallet,
    };

    struct CapabilityOnly {
        platform: std::result::Result<bool, ()>,
        alternate: std::result::Result<bool, ()>,
    }

    #[async_trait]
    impl PresentationDelegate for CapabilityOnly {
        async fn init_sheet(&self, _init: SheetInit) -> Result<(), PresentationError> {
            unreachable!("capability tests never init the sheet")
        }

        async fn present(&self) -> Result<PaymentOption, PresentationError> {
            unreachable!("capability tests never present")
        }

        async fn confirm(&self) -> Result<(), ConfirmationError> {
            unreachable!("capability tests never confirm")
        }

        async fn handle_url(&self, _url: &str) -> bool {
            false
        }

        async fn wallet_capability(
            &self,
            wallet: Wallet,
            _test_env: bool,
        ) -> Result<bool, PresentationError> {
            let result = match wallet {
                Wallet::Platform => self.platform,
                Wallet::Alternate => self.alternate,
            };
            result.map_err(|_| PresentationError::Sdk("capability query failed".into()))
        }
    }

    #[tokio::test]
    async fn platform_present_alternate_absent_shows_button_with_one_notice() {
        let delegate = CapabilityOnly {
            platform: Ok(true),
            alternate: Ok(false),
        };
        let availability = check_wallets(&delegate, true).await;
        assert!(availability.pay_button);
        assert_eq!(availability.notices.len(), 1);
    }

    #[tokio::test]
    async fn platform_absence_is_silent() {
        let delegate = CapabilityOnly {
            platform: Ok(false),
            alternate: Ok(true),
        };
        let availability = check_wallets(&delegate, true).await;
        assert!(!availability.pay_button);
        assert!(availability.notices.is_empty());
    }

    #[tokio::test]
    async fn both_absent_still_produces_a_single_notice() {
        let delegate = CapabilityOnly {
            platform: Ok(false),
            alternate: Ok(false),
        };
        let availability = check_wallets(&delegate, false).await;
        assert!(!availability.pay_button);
        assert_eq!(availability.notices.len(), 1);
    }

    #[tokio::test]
    async fn failed_query_counts_as_unsupported() {
        let delegate = CapabilityOnly {
            platform: Err(()),
            alternate: Err(()),
        };
        let availability = check_wallets(&delegate, false).await;
        assert!(!availability.pay_button);
        assert_eq!(availability.notices.len(), 1);
    }
}
