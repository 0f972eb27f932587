//! BR Code payload assembly and parsing.
//!
//! [`build`] produces the static Pix payload for a key, a merchant and an amount.
//! Fields are emitted in a fixed order:
//!
//! | Tag | Field | Value |
//! |---|---|---|
//! | `00` | Payload format indicator | `01` |
//! | `26` | Merchant account information | `00` = `br.gov.bcb.pix`, `01` = key |
//! | `52` | Merchant category code | `0000` |
//! | `53` | Transaction currency | `986` (BRL) |
//! | `54` | Transaction amount | two decimals |
//! | `58` | Country code | `BR` |
//! | `59` | Merchant name | up to 25 characters |
//! | `60` | Merchant city | up to 15 characters |
//! | `62` | Additional data | `05` = `***` |
//! | `63` | CRC16 | four hex digits |
//!
//! [`BrCode::parse`] goes the other way and checks the checksum, which is how
//! the checkout service verifies payloads handed back to it.

use serde::Serialize;

use crate::amount::{AmountError, TransactionAmount};
use crate::crc::checksum;
use crate::key::PaymentKey;
use crate::merchant::MerchantIdentity;
use crate::tlv::{self, TlvError, field, nested};

/// Field tags and constant values of a static Pix BR Code.
pub mod ids {
    pub const PAYLOAD_FORMAT_INDICATOR: &str = "00";
    pub const MERCHANT_ACCOUNT_INFORMATION: &str = "26";
    pub const MERCHANT_CATEGORY_CODE: &str = "52";
    pub const TRANSACTION_CURRENCY: &str = "53";
    pub const TRANSACTION_AMOUNT: &str = "54";
    pub const COUNTRY_CODE: &str = "58";
    pub const MERCHANT_NAME: &str = "59";
    pub const MERCHANT_CITY: &str = "60";
    pub const ADDITIONAL_DATA_FIELD: &str = "62";
    pub const CRC16: &str = "63";

    // Sub-fields of `26`.
    pub const GUI: &str = "00";
    pub const KEY: &str = "01";

    // Sub-fields of `62`.
    pub const REFERENCE_LABEL: &str = "05";

    pub const PAYLOAD_FORMAT_VERSION: &str = "01";
    pub const PIX_GUI: &str = "br.gov.bcb.pix";
    pub const CATEGORY_CODE_UNSPECIFIED: &str = "0000";
    pub const CURRENCY_BRL: &str = "986";
    pub const COUNTRY_BR: &str = "BR";
    pub const REFERENCE_LABEL_UNSPECIFIED: &str = "***";
    pub const CRC16_LENGTH: &str = "04";
}

/// Longest key that still fits the merchant account template next to the GUI.
pub const MAX_KEY_LEN: usize =
    tlv::MAX_VALUE_LEN - (4 + ids::PIX_GUI.len()) - 4;

/// Builds the BR Code for `key`, `merchant` and `amount`.
///
/// Returns an empty string when the key is not configured, i.e. when it is empty,
/// normalizes to nothing or is not ASCII (see [`PaymentKey::encodable`]). No partial payload is ever returned. Every other input
/// produces a complete payload: blank merchant fields fall back to their defaults,
/// and keys longer than [`MAX_KEY_LEN`] characters are cut to fit the template.
///
/// The last four characters are the CRC16 of everything before them, `6304` included.
pub fn build(key: &PaymentKey, merchant: &MerchantIdentity, amount: &TransactionAmount) -> String {
    if key.is_empty() {
        return String::new();
    }
    let Some(encoded_key) = key.encodable() else {
        return String::new();
    };
    let encoded_key: String = encoded_key.chars().take(MAX_KEY_LEN).collect();

    let mut payload = [
        field(ids::PAYLOAD_FORMAT_INDICATOR, ids::PAYLOAD_FORMAT_VERSION),
        nested(
            ids::MERCHANT_ACCOUNT_INFORMATION,
            &[field(ids::GUI, ids::PIX_GUI), field(ids::KEY, &encoded_key)],
        ),
        field(ids::MERCHANT_CATEGORY_CODE, ids::CATEGORY_CODE_UNSPECIFIED),
        field(ids::TRANSACTION_CURRENCY, ids::CURRENCY_BRL),
        field(ids::TRANSACTION_AMOUNT, &amount.to_string()),
        field(ids::COUNTRY_CODE, ids::COUNTRY_BR),
        field(ids::MERCHANT_NAME, &merchant.encoded_name()),
        field(ids::MERCHANT_CITY, &merchant.encoded_city()),
        nested(
            ids::ADDITIONAL_DATA_FIELD,
            &[field(ids::REFERENCE_LABEL, ids::REFERENCE_LABEL_UNSPECIFIED)],
        ),
        format!("{}{}", ids::CRC16, ids::CRC16_LENGTH),
    ]
    .concat();

    let crc = checksum(&payload);
    payload.push_str(&crc);

    tracing::debug!(
        key_type = %key.key_type,
        amount = %amount,
        length = payload.len(),
        "Built Pix payload"
    );
    payload
}

/// Errors that can occur while parsing a BR Code.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The payload is not a well formed TLV sequence.
    #[error("Malformed payload: {0}")]
    Tlv(#[from] TlvError),
    /// The payload does not end with a four character CRC16 field.
    #[error("Payload does not end with a CRC16 field")]
    MissingChecksum,
    /// The CRC16 field does not match the payload.
    #[error("Checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    /// A mandatory field is absent.
    #[error("Missing mandatory field {0}")]
    MissingField(&'static str),
    /// The transaction amount field is not a valid amount.
    #[error("Invalid transaction amount: {0}")]
    InvalidAmount(#[from] AmountError),
}

/// A parsed and checksum-verified BR Code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrCode {
    pub payload_format: String,
    pub gui: String,
    pub merchant_key: String,
    pub merchant_category_code: String,
    pub currency: String,
    /// Absent on payloads that let the payer choose the amount.
    pub amount: Option<TransactionAmount>,
    pub country_code: String,
    pub merchant_name: String,
    pub merchant_city: String,
    pub reference_label: Option<String>,
    pub checksum: String,
}

impl BrCode {
    /// Parses `payload`, verifying its structure and checksum.
    pub fn parse(payload: &str) -> Result<Self, PayloadError> {
        let fields = tlv::decode(payload)?;
        let crc_field = fields
            .last()
            .filter(|f| f.tag == ids::CRC16 && f.value.len() == 4)
            .ok_or(PayloadError::MissingChecksum)?;
        let prefix = &payload[..payload.len() - crc_field.value.len()];
        let expected = checksum(prefix);
        if !expected.eq_ignore_ascii_case(crc_field.value) {
            return Err(PayloadError::ChecksumMismatch {
                expected,
                actual: crc_field.value.into(),
            });
        }

        let find = |tag: &'static str| {
            fields
                .iter()
                .find(|f| f.tag == tag)
                .map(|f| f.value)
                .ok_or(PayloadError::MissingField(tag))
        };

        let account = tlv::decode(find(ids::MERCHANT_ACCOUNT_INFORMATION)?)?;
        let find_sub = |tag: &'static str| {
            account
                .iter()
                .find(|f| f.tag == tag)
                .map(|f| f.value.to_string())
                .ok_or(PayloadError::MissingField(tag))
        };
        let gui = find_sub(ids::GUI)?;
        let merchant_key = find_sub(ids::KEY)?;

        let amount = match find(ids::TRANSACTION_AMOUNT) {
            Ok(value) => Some(TransactionAmount::parse(value)?),
            Err(_) => None,
        };

        let reference_label = match find(ids::ADDITIONAL_DATA_FIELD) {
            Ok(value) => tlv::decode(value)?
                .into_iter()
                .find(|f| f.tag == ids::REFERENCE_LABEL)
                .map(|f| f.value.to_string()),
            Err(_) => None,
        };

        Ok(BrCode {
            payload_format: find(ids::PAYLOAD_FORMAT_INDICATOR)?.into(),
            gui,
            merchant_key,
            merchant_category_code: find(ids::MERCHANT_CATEGORY_CODE)?.into(),
            currency: find(ids::TRANSACTION_CURRENCY)?.into(),
            amount,
            country_code: find(ids::COUNTRY_CODE)?.into(),
            merchant_name: find(ids::MERCHANT_NAME)?.into(),
            merchant_city: find(ids::MERCHANT_CITY)?.into(),
            reference_label,
            checksum: crc_field.value.to_ascii_uppercase(),
        })
    }
}
