//! Tag-length-value fields.
//!
//! Every BR Code field is a two digit tag, a two digit zero-padded decimal length
//! and the value. Templates nest by using an already encoded concatenation of
//! sub-fields as the value of an outer field.
//!
//! Lengths count characters, not bytes, and must fit in two decimal digits. The
//! encoder does not truncate: callers bound variable inputs before encoding.

/// Largest value length representable by the two digit length prefix.
pub const MAX_VALUE_LEN: usize = 99;

/// Encodes a single field as `tag + zero-padded length + value`.
///
/// ```
/// use pix_types::tlv::field;
///
/// assert_eq!(field("00", "01"), "000201");
/// assert_eq!(field("58", "BR"), "5802BR");
/// ```
pub fn field(tag: &str, value: &str) -> String {
    let len = value.chars().count();
    debug_assert!(is_two_digits(tag), "TLV tag must be two ASCII digits, got {tag:?}");
    debug_assert!(
        len <= MAX_VALUE_LEN,
        "TLV value for tag {tag} is {len} characters long"
    );
    format!("{tag}{len:02}{value}")
}

/// Encodes a template field whose value is the concatenation of already encoded sub-fields.
///
/// ```
/// use pix_types::tlv::{field, nested};
///
/// let additional = nested("62", &[&field("05", "***")]);
/// assert_eq!(additional, "62070503***");
/// ```
pub fn nested<S: AsRef<str>>(tag: &str, subfields: &[S]) -> String {
    let value: String = subfields.iter().map(AsRef::as_ref).collect();
    field(tag, &value)
}

fn is_two_digits(s: &str) -> bool {
    s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit())
}

/// A decoded field borrowing from the input it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvField<'a> {
    pub tag: &'a str,
    pub value: &'a str,
}

impl<'a> TlvField<'a> {
    /// Decodes this field's value as a sequence of sub-fields.
    pub fn subfields(&self) -> Result<Vec<TlvField<'a>>, TlvError> {
        decode(self.value)
    }
}

/// Errors that can occur while decoding a TLV sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TlvError {
    /// The input ended in the middle of a field.
    #[error("Truncated field at character {offset}")]
    Truncated { offset: usize },
    /// The tag is not two ASCII digits.
    #[error("Invalid tag {tag:?} at character {offset}")]
    InvalidTag { tag: String, offset: usize },
    /// The length prefix is not two ASCII digits.
    #[error("Invalid length {length:?} for tag {tag}")]
    InvalidLength { tag: String, length: String },
}

/// Splits `s` after `n` characters, or `None` if it is shorter.
fn split_chars(s: &str, n: usize) -> Option<(&str, &str)> {
    if n == 0 {
        return Some(("", s));
    }
    match s.char_indices().nth(n) {
        Some((idx, _)) => Some(s.split_at(idx)),
        None if s.chars().count() == n => Some((s, "")),
        None => None,
    }
}

/// Decodes a flat TLV sequence into its fields, in order.
///
/// Nested templates are left encoded; use [`TlvField::subfields`] to descend.
pub fn decode(input: &str) -> Result<Vec<TlvField<'_>>, TlvError> {
    let mut fields = Vec::new();
    let mut rest = input;
    let mut offset = 0;
    while !rest.is_empty() {
        let (tag, after_tag) = split_chars(rest, 2).ok_or(TlvError::Truncated { offset })?;
        if !is_two_digits(tag) {
            return Err(TlvError::InvalidTag {
                tag: tag.into(),
                offset,
            });
        }
        let (length, after_length) =
            split_chars(after_tag, 2).ok_or(TlvError::Truncated { offset })?;
        if !is_two_digits(length) {
            return Err(TlvError::InvalidLength {
                tag: tag.into(),
                length: length.into(),
            });
        }
        let len: usize = length.parse().map_err(|_| TlvError::InvalidLength {
            tag: tag.into(),
            length: length.into(),
        })?;
        let (value, remaining) =
            split_chars(after_length, len).ok_or(TlvError::Truncated { offset })?;
        fields.push(TlvField { tag, value });
        offset += 4 + len;
        rest = remaining;
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field() {
        assert_eq!(field("00", "01"), "000201");
        assert_eq!(field("53", "986"), "5303986");
        assert_eq!(field("05", ""), "0500");
    }

    #[test]
    fn test_field_counts_characters() {
        assert_eq!(field("59", "JOÃO"), "5904JOÃO");
    }

    #[test]
    fn test_field_two_digit_length() {
        let value = "X".repeat(99);
        let encoded = field("26", &value);
        assert!(encoded.starts_with("2699"));
        assert_eq!(encoded.len(), 103);
    }

    #[test]
    fn test_nested() {
        let account = nested(
            "26",
            &[field("00", "br.gov.bcb.pix"), field("01", "shop@example.com")],
        );
        assert_eq!(account, "26380014br.gov.bcb.pix0116shop@example.com");
    }

    #[test]
    fn test_decode_flat_and_nested() {
        let input = "0002015802BR62070503***";
        let fields = decode(input).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], TlvField { tag: "00", value: "01" });
        assert_eq!(fields[1], TlvField { tag: "58", value: "BR" });
        assert_eq!(fields[2].tag, "62");
        let sub = fields[2].subfields().unwrap();
        assert_eq!(sub, vec![TlvField { tag: "05", value: "***" }]);
    }

    #[test]
    fn test_decode_multibyte_values() {
        let fields = decode("5904JOÃO6002SP").unwrap();
        assert_eq!(fields[0].value, "JOÃO");
        assert_eq!(fields[1].value, "SP");
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(decode("0"), Err(TlvError::Truncated { offset: 0 }));
        assert_eq!(decode("000"), Err(TlvError::Truncated { offset: 0 }));
        assert_eq!(decode("000201590"), Err(TlvError::Truncated { offset: 6 }));
        assert_eq!(decode("0005AB"), Err(TlvError::Truncated { offset: 0 }));
    }

    #[test]
    fn test_decode_invalid_tag_and_length() {
        assert!(matches!(
            decode("AB0201"),
            Err(TlvError::InvalidTag { offset: 0, .. })
        ));
        assert!(matches!(
            decode("00X201"),
            Err(TlvError::InvalidLength { .. })
        ));
    }
}
