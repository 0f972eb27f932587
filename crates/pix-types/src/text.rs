//! Free text normalization for BR Code name and city fields.
//!
//! Banking apps display the merchant name and city exactly as encoded, and the
//! payload format only admits a restricted alphabet. [`normalize_text`] reduces
//! arbitrary user input to upper-case ASCII letters, digits and spaces.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalizes free text for a BR Code field and truncates it to `max_len` characters.
///
/// The input is decomposed (NFD) so that accented letters split into a base letter
/// plus combining marks. Combining marks are dropped, then every character that is not
/// an ASCII letter, ASCII digit or space. The rest is upper-cased and cut to `max_len`.
///
/// Truncation happens last, so characters removed by normalization never count
/// against the length budget. Empty or fully stripped input yields an empty string;
/// callers substitute their defaults before calling this, not after.
///
/// ```
/// use pix_types::text::normalize_text;
///
/// assert_eq!(normalize_text("São Paulo", 15), "SAO PAULO");
/// assert_eq!(normalize_text("Café & Cia.", 25), "CAFE  CIA");
/// ```
pub fn normalize_text(input: &str, max_len: usize) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .map(|c| c.to_ascii_uppercase())
        .take(max_len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(normalize_text("São Paulo", 15), "SAO PAULO");
        assert_eq!(normalize_text("Florianópolis", 15), "FLORIANOPOLIS");
        assert_eq!(normalize_text("Ação Livraria", 25), "ACAO LIVRARIA");
    }

    #[test]
    fn test_removes_punctuation_keeps_spaces() {
        assert_eq!(normalize_text("Libris-Store, Ltda.", 25), "LIBRISSTORE LTDA");
        assert_eq!(normalize_text("  a b  ", 25), "  A B  ");
    }

    #[test]
    fn test_truncates_after_normalization() {
        let name = "Livraria Internacional do Brasil";
        let normalized = normalize_text(name, 25);
        assert_eq!(normalized.len(), 25);
        assert_eq!(normalized, "LIVRARIA INTERNACIONAL DO");

        // Stripped characters don't consume the budget.
        assert_eq!(normalize_text("É...........ABC", 3), "EAB");
    }

    #[test]
    fn test_empty_and_fully_stripped() {
        assert_eq!(normalize_text("", 25), "");
        assert_eq!(normalize_text("!@#$%¨&*()", 25), "");
        assert_eq!(normalize_text("日本語", 25), "");
    }

    #[test]
    fn test_zero_budget() {
        assert_eq!(normalize_text("Anything", 0), "");
    }

    #[test]
    fn test_precomposed_and_decomposed_inputs_agree() {
        let precomposed = "Jo\u{00E3}o";
        let decomposed = "Joa\u{0303}o";
        assert_eq!(normalize_text(precomposed, 15), "JOAO");
        assert_eq!(normalize_text(decomposed, 15), "JOAO");
    }
}
