//! Pix payment keys.
//!
//! A Pix key identifies the account that receives a payment. Five kinds exist,
//! each with its own on-wire shape:
//!
//! | [`KeyType`] | Tag | Example | Encoded as |
//! |---|---|---|---|
//! | [`KeyType::Email`] | `EMAIL` | `shop@example.com` | whitespace removed |
//! | [`KeyType::Phone`] | `PHONE` | `+55 (11) 99999-8888` | `+` followed by digits |
//! | [`KeyType::NationalIdIndividual`] | `CPF` | `123.456.789-09` | digits only |
//! | [`KeyType::NationalIdEntity`] | `CNPJ` | `12.345.678/0001-95` | digits only |
//! | [`KeyType::RandomToken`] | `EVP` | `123e4567-e89b-12d3-a456-426614174000` | whitespace removed |
//!
//! [`normalize_key`] applies those rules. [`detect_key_type`] guesses a type from the
//! raw shape, which the admin settings use while a key is being typed.
//!
//! Normalization only strips formatting. A CPF with the wrong number of digits is
//! encoded as-is: the validity of the key itself is the administrator's concern.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

/// The kind of a Pix payment key.
///
/// Serializes to the short tags used by the storefront admin (`EMAIL`, `PHONE`, `CPF`,
/// `CNPJ`, `EVP`). Parsing additionally accepts the descriptive names
/// `NATIONAL_ID_INDIVIDUAL`, `NATIONAL_ID_ENTITY` and `RANDOM_TOKEN`.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyType {
    /// E-mail address.
    #[default]
    Email,
    /// Phone number with country calling code.
    Phone,
    /// Individual taxpayer number (CPF), 11 digits.
    NationalIdIndividual,
    /// Legal entity number (CNPJ), 14 digits.
    NationalIdEntity,
    /// Random key (EVP) issued by the bank, UUID shaped.
    RandomToken,
}

impl KeyType {
    /// Return all known [`KeyType`] variants.
    pub fn variants() -> &'static [KeyType] {
        &[
            KeyType::Email,
            KeyType::Phone,
            KeyType::NationalIdIndividual,
            KeyType::NationalIdEntity,
            KeyType::RandomToken,
        ]
    }

    /// Short tag used on the wire and in configuration files.
    pub fn as_tag(&self) -> &'static str {
        match self {
            KeyType::Email => "EMAIL",
            KeyType::Phone => "PHONE",
            KeyType::NationalIdIndividual => "CPF",
            KeyType::NationalIdEntity => "CNPJ",
            KeyType::RandomToken => "EVP",
        }
    }
}

impl Display for KeyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Error returned when parsing an unknown key type tag.
#[derive(Debug, thiserror::Error)]
#[error("Unknown Pix key type {0}")]
pub struct KeyTypeParseError(String);

impl FromStr for KeyType {
    type Err = KeyTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EMAIL" => Ok(KeyType::Email),
            "PHONE" => Ok(KeyType::Phone),
            "CPF" | "NATIONAL_ID_INDIVIDUAL" => Ok(KeyType::NationalIdIndividual),
            "CNPJ" | "NATIONAL_ID_ENTITY" => Ok(KeyType::NationalIdEntity),
            "EVP" | "RANDOM_TOKEN" => Ok(KeyType::RandomToken),
            _ => Err(KeyTypeParseError(s.into())),
        }
    }
}

impl Serialize for KeyType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for KeyType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        KeyType::from_str(&s).map_err(de::Error::custom)
    }
}

/// A raw payment key together with its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentKey {
    /// The key as entered by the administrator, formatting included.
    pub raw_value: String,
    /// How the raw value is to be interpreted.
    pub key_type: KeyType,
}

impl PaymentKey {
    pub fn new<V: Into<String>>(raw_value: V, key_type: KeyType) -> Self {
        Self {
            raw_value: raw_value.into(),
            key_type,
        }
    }

    /// `true` when no key has been configured.
    pub fn is_empty(&self) -> bool {
        self.raw_value.is_empty()
    }

    /// The on-wire form of this key, see [`normalize_key`].
    pub fn normalized(&self) -> String {
        normalize_key(&self.raw_value, self.key_type)
    }

    /// The normalized key if it can be placed in a payload.
    ///
    /// `None` when the key normalizes to nothing or keeps non-ASCII characters.
    /// Field lengths count characters and the payload is read as UTF-8 bytes, so
    /// only ASCII keys encode consistently.
    pub fn encodable(&self) -> Option<String> {
        let normalized = self.normalized();
        (!normalized.is_empty() && normalized.is_ascii()).then_some(normalized)
    }
}

/// Produces the canonical on-wire form of a raw key.
///
/// - CPF and CNPJ keep ASCII digits only.
/// - Phone keeps ASCII digits and prepends a single `+`. The country calling code
///   is expected to be part of the input; an existing `+` is stripped with the rest
///   of the punctuation and put back.
/// - E-mail and random keys only lose whitespace, anywhere in the string.
///
/// A key that is empty after trimming normalizes to an empty string. Non-ASCII
/// characters of e-mail and random keys are kept; [`PaymentKey::encodable`]
/// refuses such keys before they reach the payload.
///
/// ```
/// use pix_types::key::{KeyType, normalize_key};
///
/// assert_eq!(normalize_key("123.456.789-09", KeyType::NationalIdIndividual), "12345678909");
/// assert_eq!(normalize_key("+55 (11) 99999-8888", KeyType::Phone), "+5511999998888");
/// ```
pub fn normalize_key(raw: &str, key_type: KeyType) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match key_type {
        KeyType::NationalIdIndividual | KeyType::NationalIdEntity => digits_only(trimmed),
        KeyType::Phone => format!("+{}", digits_only(trimmed)),
        KeyType::Email | KeyType::RandomToken => {
            trimmed.chars().filter(|c| !c.is_whitespace()).collect()
        }
    }
}

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

mod patterns {
    use super::*;

    pub static RANDOM_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
        )
        .expect("Invalid regex for random key")
    });

    pub static NATIONAL_ID_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[0-9]{2}\.?[0-9]{3}\.?[0-9]{3}/?[0-9]{4}-?[0-9]{2}$").expect("Invalid regex for CNPJ")
    });

    pub static NATIONAL_ID_INDIVIDUAL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[0-9]{3}\.?[0-9]{3}\.?[0-9]{3}-?[0-9]{2}$").expect("Invalid regex for CPF")
    });
}

/// Infers the most likely key type from the shape of a raw key.
///
/// Rules are evaluated in a fixed order and the first match wins:
///
/// 1. UUID shape (`8-4-4-4-12` hex groups) is a random key.
/// 2. Anything containing `@` is an e-mail.
/// 3. 14 digits, optionally punctuated as `00.000.000/0000-00`, is a CNPJ.
/// 4. A leading `+` is a phone number.
/// 5. 11 digits, optionally punctuated as `000.000.000-00`, is a CPF.
///
/// Returns `None` when nothing matches. Callers keep their current type in that case.
///
/// ```
/// use pix_types::key::{KeyType, detect_key_type};
///
/// assert_eq!(detect_key_type("a@b.com"), Some(KeyType::Email));
/// assert_eq!(detect_key_type("random text"), None);
/// ```
pub fn detect_key_type(raw: &str) -> Option<KeyType> {
    let clean = raw.trim();
    if patterns::RANDOM_TOKEN.is_match(clean) {
        return Some(KeyType::RandomToken);
    }
    if clean.contains('@') {
        return Some(KeyType::Email);
    }
    if patterns::NATIONAL_ID_ENTITY.is_match(clean) {
        return Some(KeyType::NationalIdEntity);
    }
    if clean.starts_with('+') {
        return Some(KeyType::Phone);
    }
    if patterns::NATIONAL_ID_INDIVIDUAL.is_match(clean) {
        return Some(KeyType::NationalIdIndividual);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_national_ids() {
        assert_eq!(
            normalize_key("123.456.789-09", KeyType::NationalIdIndividual),
            "12345678909"
        );
        assert_eq!(
            normalize_key("12.345.678/0001-95", KeyType::NationalIdEntity),
            "12345678000195"
        );
        // Wrong digit counts are not rejected.
        assert_eq!(normalize_key("12-3", KeyType::NationalIdIndividual), "123");
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_key("11999998888", KeyType::Phone), "+11999998888");
        assert_eq!(
            normalize_key("+55 (11) 99999-8888", KeyType::Phone),
            "+5511999998888"
        );
        assert_eq!(normalize_key("++5511", KeyType::Phone), "+5511");
    }

    #[test]
    fn test_normalize_email_and_random_keep_punctuation() {
        assert_eq!(
            normalize_key(" shop @example.com \t", KeyType::Email),
            "shop@example.com"
        );
        assert_eq!(
            normalize_key("123e4567-e89b-12d3 -a456-426614174000", KeyType::RandomToken),
            "123e4567-e89b-12d3-a456-426614174000"
        );
    }

    #[test]
    fn test_normalize_blank_is_empty() {
        for key_type in KeyType::variants() {
            assert_eq!(normalize_key("", *key_type), "");
            assert_eq!(normalize_key("   \n", *key_type), "");
        }
    }

    #[test]
    fn test_detect_random_token() {
        assert_eq!(
            detect_key_type("123e4567-e89b-12d3-a456-426614174000"),
            Some(KeyType::RandomToken)
        );
        assert_eq!(
            detect_key_type("  123E4567-E89B-12D3-A456-426614174000 "),
            Some(KeyType::RandomToken)
        );
    }

    #[test]
    fn test_detect_email() {
        assert_eq!(detect_key_type("a@b.com"), Some(KeyType::Email));
        assert_eq!(detect_key_type("@"), Some(KeyType::Email));
    }

    #[test]
    fn test_detect_national_id_entity() {
        assert_eq!(
            detect_key_type("12.345.678/0001-95"),
            Some(KeyType::NationalIdEntity)
        );
        assert_eq!(
            detect_key_type("12345678000195"),
            Some(KeyType::NationalIdEntity)
        );
    }

    #[test]
    fn test_detect_phone() {
        assert_eq!(detect_key_type("+5511999998888"), Some(KeyType::Phone));
        assert_eq!(detect_key_type("+1 415 555 0100"), Some(KeyType::Phone));
    }

    #[test]
    fn test_detect_national_id_individual() {
        assert_eq!(
            detect_key_type("123.456.789-09"),
            Some(KeyType::NationalIdIndividual)
        );
        assert_eq!(
            detect_key_type("12345678909"),
            Some(KeyType::NationalIdIndividual)
        );
    }

    #[test]
    fn test_detect_priority() {
        // A UUID made only of digits is still a random key.
        assert_eq!(
            detect_key_type("12345678-1234-1234-1234-123456789012"),
            Some(KeyType::RandomToken)
        );
        // An e-mail whose local part looks like a CPF is an e-mail.
        assert_eq!(
            detect_key_type("12345678909@example.com"),
            Some(KeyType::Email)
        );
    }

    #[test]
    fn test_detect_none() {
        assert_eq!(detect_key_type("random text"), None);
        assert_eq!(detect_key_type(""), None);
        assert_eq!(detect_key_type("1234"), None);
        assert_eq!(detect_key_type("123456789012345"), None);
    }

    #[test]
    fn test_key_type_serde() {
        let json = serde_json::to_string(&KeyType::NationalIdEntity).unwrap();
        assert_eq!(json, "\"CNPJ\"");
        let parsed: KeyType = serde_json::from_str("\"RANDOM_TOKEN\"").unwrap();
        assert_eq!(parsed, KeyType::RandomToken);
        let parsed: KeyType = serde_json::from_str("\"cpf\"").unwrap();
        assert_eq!(parsed, KeyType::NationalIdIndividual);
        let result: Result<KeyType, _> = serde_json::from_str("\"IBAN\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_payment_key_normalized() {
        let key = PaymentKey::new("(11) 99999-8888", KeyType::Phone);
        assert!(!key.is_empty());
        assert_eq!(key.normalized(), "+11999998888");
        assert!(PaymentKey::new("", KeyType::Email).is_empty());
    }

    #[test]
    fn test_payment_key_encodable() {
        let key = PaymentKey::new(" shop@example.com ", KeyType::Email);
        assert_eq!(key.encodable().as_deref(), Some("shop@example.com"));
        assert_eq!(PaymentKey::new("joão@x.com", KeyType::Email).encodable(), None);
        assert_eq!(PaymentKey::new("abc", KeyType::NationalIdIndividual).encodable(), None);
        assert_eq!(PaymentKey::new("   ", KeyType::RandomToken).encodable(), None);
    }
}
