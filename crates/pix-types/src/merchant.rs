//! Merchant identity shown by the payer's banking app.

use serde::{Deserialize, Serialize};

use crate::text::normalize_text;

/// Name used when the merchant name is left blank.
pub const DEFAULT_MERCHANT_NAME: &str = "Libris Store";
/// City used when the merchant city is left blank.
pub const DEFAULT_MERCHANT_CITY: &str = "Sao Paulo";

/// Longest encoded merchant name (field `59`).
pub const MAX_NAME_LEN: usize = 25;
/// Longest encoded merchant city (field `60`).
pub const MAX_CITY_LEN: usize = 15;

/// Merchant name and city as entered by the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantIdentity {
    pub name: String,
    pub city: String,
}

impl MerchantIdentity {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, city: C) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
        }
    }

    /// The name as encoded in the payload: defaulted when blank, normalized, at most 25 characters.
    pub fn encoded_name(&self) -> String {
        normalize_text(or_default(&self.name, DEFAULT_MERCHANT_NAME), MAX_NAME_LEN)
    }

    /// The city as encoded in the payload: defaulted when blank, normalized, at most 15 characters.
    pub fn encoded_city(&self) -> String {
        normalize_text(or_default(&self.city, DEFAULT_MERCHANT_CITY), MAX_CITY_LEN)
    }
}

impl Default for MerchantIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_MERCHANT_NAME, DEFAULT_MERCHANT_CITY)
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_fields() {
        let merchant = MerchantIdentity::new("Livraria Ação", "São José dos Campos");
        assert_eq!(merchant.encoded_name(), "LIVRARIA ACAO");
        assert_eq!(merchant.encoded_city(), "SAO JOSE DOS CA");
    }

    #[test]
    fn test_blank_values_fall_back_before_normalization() {
        let merchant = MerchantIdentity::new("", "");
        assert_eq!(merchant.encoded_name(), "LIBRIS STORE");
        assert_eq!(merchant.encoded_city(), "SAO PAULO");
    }

    #[test]
    fn test_fully_stripped_value_is_not_defaulted() {
        let merchant = MerchantIdentity::new("***", "São Paulo");
        assert_eq!(merchant.encoded_name(), "");
    }

    #[test]
    fn test_long_name_is_exactly_25() {
        let merchant = MerchantIdentity::new("Distribuidora de Livros Técnicos e Científicos", "Rio");
        assert_eq!(merchant.encoded_name().len(), MAX_NAME_LEN);
    }
}
