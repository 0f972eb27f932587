//! Shared checkout state.
//!
//! [`CheckoutState`] holds the merchant's Pix configuration behind a lock so the
//! admin endpoints can edit it while checkouts read it concurrently.

use pix_types::amount::TransactionAmount;
use pix_types::config::PixConfig;
use pix_types::key::KeyType;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use url::Url;

use crate::auth::AdminToken;
use crate::config::Config;
use crate::qr;

/// Partial edit of the Pix configuration, as sent by the admin panel.
///
/// Absent fields are left untouched. When `key` is present the key type is
/// re-detected from it; an explicit `key_type` in the same request wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PixConfigUpdate {
    pub key: Option<String>,
    pub key_type: Option<KeyType>,
    pub merchant_name: Option<String>,
    pub merchant_city: Option<String>,
}

/// A generated checkout: the copy-and-paste code and where to fetch its QR image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkout {
    pub amount: TransactionAmount,
    pub payload: String,
    pub qr_code_url: Option<Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Pix payments are not configured; please contact the store")]
    NotConfigured,
}

pub struct CheckoutState {
    pix: RwLock<PixConfig>,
    qr_renderer: Url,
    admin_token: AdminToken,
}

impl CheckoutState {
    /// State with configuration edits disabled until an admin token is set.
    pub fn new(pix: PixConfig, qr_renderer: Url) -> Self {
        Self {
            pix: RwLock::new(pix),
            qr_renderer,
            admin_token: AdminToken::default(),
        }
    }

    pub fn with_admin_token(mut self, admin_token: AdminToken) -> Self {
        self.admin_token = admin_token;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.pix().clone(), config.qr_renderer().clone())
            .with_admin_token(AdminToken::new(config.admin_token()))
    }

    /// Token guarding [`CheckoutState::update_pix_config`] over HTTP.
    pub fn admin_token(&self) -> &AdminToken {
        &self.admin_token
    }

    /// Snapshot of the current configuration.
    pub async fn pix_config(&self) -> PixConfig {
        self.pix.read().await.clone()
    }

    /// Applies `update` and returns the resulting configuration.
    pub async fn update_pix_config(&self, update: PixConfigUpdate) -> PixConfig {
        let mut pix = self.pix.write().await;
        if let Some(key) = update.key.as_deref() {
            let detected = pix.apply_key_edit(key);
            tracing::debug!(key_type = %detected, "Pix key replaced");
        }
        if let Some(key_type) = update.key_type {
            pix.set_key_type(key_type);
        }
        if let Some(name) = update.merchant_name.as_deref() {
            pix.set_merchant_name(name);
        }
        if let Some(city) = update.merchant_city.as_deref() {
            pix.set_merchant_city(city);
        }
        tracing::info!(
            configured = pix.is_configured(),
            key_type = %pix.key_type(),
            "Pix configuration updated"
        );
        pix.clone()
    }

    /// Generates the payment code for an order total.
    pub async fn checkout(&self, amount: &TransactionAmount) -> Result<Checkout, CheckoutError> {
        let payload = self.pix.read().await.payload(amount);
        if payload.is_empty() {
            return Err(CheckoutError::NotConfigured);
        }
        let qr_code_url = qr::qr_image_url(&self.qr_renderer, &payload);
        Ok(Checkout {
            amount: *amount,
            payload,
            qr_code_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> Url {
        Url::parse("https://api.qrserver.com/v1/create-qr-code/").unwrap()
    }

    #[tokio::test]
    async fn test_checkout_not_configured() {
        let state = CheckoutState::new(PixConfig::default(), renderer());
        let result = state.checkout(&TransactionAmount::from(10)).await;
        assert!(matches!(result, Err(CheckoutError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_update_then_checkout() {
        let state = CheckoutState::new(PixConfig::default(), renderer());
        let pix = state
            .update_pix_config(PixConfigUpdate {
                key: Some("12345678909".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(pix.key_type(), KeyType::NationalIdIndividual);

        let checkout = state.checkout(&TransactionAmount::from(45)).await.unwrap();
        assert_eq!(
            checkout.payload,
            "00020126330014br.gov.bcb.pix011112345678909520400005303986540545.005802BR5912LIBRIS STORE6009SAO PAULO62070503***630433AA"
        );
        assert!(checkout.qr_code_url.is_some());
    }

    #[tokio::test]
    async fn test_explicit_key_type_wins_over_detection() {
        let state = CheckoutState::new(PixConfig::default(), renderer());
        let pix = state
            .update_pix_config(PixConfigUpdate {
                key: Some("12345678909".into()),
                key_type: Some(KeyType::Phone),
                ..Default::default()
            })
            .await;
        assert_eq!(pix.key_type(), KeyType::Phone);
        assert_eq!(pix.payment_key().normalized(), "+12345678909");
    }

    #[tokio::test]
    async fn test_update_merchant_only_keeps_key() {
        let state = CheckoutState::new(PixConfig::default(), renderer());
        state
            .update_pix_config(PixConfigUpdate {
                key: Some("shop@example.com".into()),
                ..Default::default()
            })
            .await;
        let pix = state
            .update_pix_config(PixConfigUpdate {
                merchant_name: Some("Example Shop".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(pix.payment_key().raw_value, "shop@example.com");
        assert_eq!(pix.merchant().name, "Example Shop");
        assert_eq!(pix.merchant().city, "Sao Paulo");
    }
}
