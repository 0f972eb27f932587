//! Merchant Pix configuration.
//!
//! [`PixConfig`] is what the store administrator maintains: the payment key, its
//! type and the merchant identity. It is the single input, besides the amount, of
//! every payload the checkout generates.
//!
//! # Environment Variable Resolution
//!
//! The [`LiteralOrEnv`] wrapper type allows configuration values to be specified
//! either as literal values or as references to environment variables:
//!
//! ```json
//! {
//!   "key": "$PIX_KEY",                   // Simple env var
//!   "key_type": "${PIX_KEY_TYPE}",       // Braced env var
//!   "merchant_name": "Libris Store"      // Literal value
//! }
//! ```
//!
//! This keeps the receiving account out of configuration files checked into a repository.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use crate::amount::TransactionAmount;
use crate::key::{KeyType, PaymentKey, detect_key_type};
use crate::merchant::{DEFAULT_MERCHANT_CITY, DEFAULT_MERCHANT_NAME, MerchantIdentity};
use crate::payload;

// ============================================================================
// Environment Variable Resolution
// ============================================================================

/// A transparent wrapper that resolves environment variables during deserialization.
///
/// Supports both literal values and environment variable references:
/// - Literal: `"shop@example.com"`
/// - Simple env var: `"$PIX_KEY"`
/// - Braced env var: `"${PIX_KEY}"`
///
/// The wrapper implements `Deref` to provide transparent access to the inner type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self(value)
    }

    /// Parse environment variable syntax from a string.
    /// Returns the variable name if the string matches `$VAR` or `${VAR}` syntax.
    fn parse_env_var_syntax(s: &str) -> Option<&str> {
        if let Some(braced) = s.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            Some(braced)
        } else if let Some(var_name) = s.strip_prefix('$') {
            let is_name =
                !var_name.is_empty() && var_name.chars().all(|c| c.is_alphanumeric() || c == '_');
            is_name.then_some(var_name)
        } else {
            None
        }
    }
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for LiteralOrEnv<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let value = if let Some(var_name) = Self::parse_env_var_syntax(&s) {
            std::env::var(var_name).map_err(|_| {
                serde::de::Error::custom(format!(
                    "Environment variable '{}' not found (referenced as '{}')",
                    var_name, s
                ))
            })?
        } else {
            s
        };

        let parsed = value
            .parse::<T>()
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse value: {}", e)))?;

        Ok(LiteralOrEnv(parsed))
    }
}

impl<T> Serialize for LiteralOrEnv<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

// ============================================================================
// Pix Configuration
// ============================================================================

/// The store's Pix receiving configuration.
///
/// An empty key is a valid configuration meaning "not configured": payloads built
/// from it are empty and the checkout must ask the customer to contact the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixConfig {
    #[serde(default)]
    key: LiteralOrEnv<String>,
    #[serde(default)]
    key_type: LiteralOrEnv<KeyType>,
    #[serde(default = "pix_config_defaults::merchant_name")]
    merchant_name: LiteralOrEnv<String>,
    #[serde(default = "pix_config_defaults::merchant_city")]
    merchant_city: LiteralOrEnv<String>,
}

mod pix_config_defaults {
    use super::*;

    pub fn merchant_name() -> LiteralOrEnv<String> {
        LiteralOrEnv::from_literal(DEFAULT_MERCHANT_NAME.to_string())
    }

    pub fn merchant_city() -> LiteralOrEnv<String> {
        LiteralOrEnv::from_literal(DEFAULT_MERCHANT_CITY.to_string())
    }
}

impl Default for PixConfig {
    fn default() -> Self {
        Self {
            key: LiteralOrEnv::default(),
            key_type: LiteralOrEnv::default(),
            merchant_name: pix_config_defaults::merchant_name(),
            merchant_city: pix_config_defaults::merchant_city(),
        }
    }
}

impl PixConfig {
    pub fn new(key: PaymentKey, merchant: MerchantIdentity) -> Self {
        Self {
            key: LiteralOrEnv::from_literal(key.raw_value),
            key_type: LiteralOrEnv::from_literal(key.key_type),
            merchant_name: LiteralOrEnv::from_literal(merchant.name),
            merchant_city: LiteralOrEnv::from_literal(merchant.city),
        }
    }

    /// `true` when the key can be encoded, i.e. when [`PixConfig::payload`] is non-empty.
    pub fn is_configured(&self) -> bool {
        self.payment_key().encodable().is_some()
    }

    /// The configured key with its type.
    pub fn payment_key(&self) -> PaymentKey {
        PaymentKey::new(self.key.as_str(), *self.key_type)
    }

    /// The configured merchant name and city.
    pub fn merchant(&self) -> MerchantIdentity {
        MerchantIdentity::new(self.merchant_name.as_str(), self.merchant_city.as_str())
    }

    pub fn key_type(&self) -> KeyType {
        *self.key_type
    }

    /// Builds the BR Code for `amount`. Empty when no key is configured.
    pub fn payload(&self, amount: &TransactionAmount) -> String {
        payload::build(&self.payment_key(), &self.merchant(), amount)
    }

    /// Replaces the key as typed by the administrator.
    ///
    /// The key type is re-detected from the new value and only overwritten when
    /// detection recognizes the shape; otherwise the current type is kept.
    /// Returns the type in effect afterwards.
    pub fn apply_key_edit(&mut self, raw: &str) -> KeyType {
        *self.key = raw.to_string();
        if let Some(detected) = detect_key_type(raw) {
            *self.key_type = detected;
        }
        *self.key_type
    }

    /// Sets the key type explicitly, bypassing detection.
    pub fn set_key_type(&mut self, key_type: KeyType) {
        *self.key_type = key_type;
    }

    pub fn set_merchant_name(&mut self, name: &str) {
        *self.merchant_name = name.to_string();
    }

    pub fn set_merchant_city(&mut self, city: &str) {
        *self.merchant_city = city.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_var_syntax() {
        assert_eq!(LiteralOrEnv::<String>::parse_env_var_syntax("$PIX_KEY"), Some("PIX_KEY"));
        assert_eq!(LiteralOrEnv::<String>::parse_env_var_syntax("${PIX_KEY}"), Some("PIX_KEY"));
        assert_eq!(LiteralOrEnv::<String>::parse_env_var_syntax("$"), None);
        assert_eq!(LiteralOrEnv::<String>::parse_env_var_syntax("R$ 10"), None);
        assert_eq!(
            LiteralOrEnv::<String>::parse_env_var_syntax("shop@example.com"),
            None
        );
    }

    #[test]
    fn test_deserialize_literals() {
        let config: PixConfig = serde_json::from_str(
            r#"{
                "key": "123.456.789-09",
                "key_type": "CPF",
                "merchant_name": "Livraria Ação",
                "merchant_city": "Recife"
            }"#,
        )
        .unwrap();
        assert!(config.is_configured());
        assert_eq!(config.key_type(), KeyType::NationalIdIndividual);
        assert_eq!(config.payment_key().normalized(), "12345678909");
        assert_eq!(config.merchant(), MerchantIdentity::new("Livraria Ação", "Recife"));
    }

    #[test]
    fn test_deserialize_env_reference() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("PIX_TYPES_TEST_CONFIG_KEY", "shop@example.com") };
        let config: PixConfig =
            serde_json::from_str(r#"{ "key": "${PIX_TYPES_TEST_CONFIG_KEY}" }"#).unwrap();
        assert_eq!(config.payment_key().raw_value, "shop@example.com");
    }

    #[test]
    fn test_deserialize_missing_env_reference_fails() {
        let result: Result<PixConfig, _> =
            serde_json::from_str(r#"{ "key": "$PIX_TYPES_TEST_SURELY_UNSET" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let config: PixConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PixConfig::default());
        assert!(!config.is_configured());
        assert_eq!(config.key_type(), KeyType::Email);
        assert_eq!(config.merchant(), MerchantIdentity::default());
        assert_eq!(config.payload(&TransactionAmount::from(10)), "");
    }

    #[test]
    fn test_apply_key_edit_detects_type() {
        let mut config = PixConfig::default();
        assert_eq!(config.apply_key_edit("12.345.678/0001-95"), KeyType::NationalIdEntity);
        assert_eq!(config.apply_key_edit("+5511999998888"), KeyType::Phone);
        assert_eq!(
            config.apply_key_edit("123e4567-e89b-12d3-a456-426614174000"),
            KeyType::RandomToken
        );
    }

    #[test]
    fn test_apply_key_edit_keeps_type_when_unrecognized() {
        let mut config = PixConfig::default();
        config.set_key_type(KeyType::Phone);
        assert_eq!(config.apply_key_edit("5511"), KeyType::Phone);
        assert_eq!(config.payment_key().raw_value, "5511");
    }

    #[test]
    fn test_unencodable_key_is_not_configured() {
        let config = PixConfig::new(
            PaymentKey::new("abc", KeyType::NationalIdIndividual),
            MerchantIdentity::default(),
        );
        assert!(!config.is_configured());
        assert_eq!(config.payload(&TransactionAmount::from(10)), "");

        let config = PixConfig::new(
            PaymentKey::new("joão@x.com", KeyType::Email),
            MerchantIdentity::default(),
        );
        assert!(!config.is_configured());
    }

    #[test]
    fn test_payload_from_config() {
        let config = PixConfig::new(
            PaymentKey::new("shop@example.com", KeyType::Email),
            MerchantIdentity::new("Example Shop", "Sao Paulo"),
        );
        let payload = config.payload(&TransactionAmount::try_from(19.9).unwrap());
        assert!(payload.ends_with("6304300F"));
    }

    #[test]
    fn test_serialize_resolved_values() {
        let config = PixConfig::new(
            PaymentKey::new("12345678000195", KeyType::NationalIdEntity),
            MerchantIdentity::new("Shop", "Rio"),
        );
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["key"], "12345678000195");
        assert_eq!(json["key_type"], "CNPJ");
        assert_eq!(json["merchant_name"], "Shop");
        assert_eq!(json["merchant_city"], "Rio");
    }
}
