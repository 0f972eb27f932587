//! QR image links for checkout payloads.
//!
//! The server does not rasterize QR codes itself; it points the storefront at an
//! external renderer that takes the payload as a query parameter.

use url::Url;

pub const QR_SIZE: &str = "300x300";
pub const QR_MARGIN: &str = "10";

/// URL of a QR image encoding `payload`, or `None` for an empty payload.
///
/// Query parameters already present on `renderer` are preserved.
pub fn qr_image_url(renderer: &Url, payload: &str) -> Option<Url> {
    if payload.is_empty() {
        return None;
    }
    let mut url = renderer.clone();
    url.query_pairs_mut()
        .append_pair("size", QR_SIZE)
        .append_pair("margin", QR_MARGIN)
        .append_pair("data", payload);
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = "00020126380014br.gov.bcb.pix0116shop@example.com520400005303986540519.905802BR5912EXAMPLE SHOP6009SAO PAULO62070503***6304300F";

    fn renderer() -> Url {
        Url::parse("https://api.qrserver.com/v1/create-qr-code/").unwrap()
    }

    #[test]
    fn test_empty_payload_has_no_image() {
        assert_eq!(qr_image_url(&renderer(), ""), None);
    }

    #[test]
    fn test_payload_round_trips_through_query() {
        let url = qr_image_url(&renderer(), PAYLOAD).unwrap();
        assert_eq!(url.path(), "/v1/create-qr-code/");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("size".to_string(), "300x300".to_string()),
                ("margin".to_string(), "10".to_string()),
                ("data".to_string(), PAYLOAD.to_string()),
            ]
        );
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        let url = qr_image_url(&renderer(), PAYLOAD).unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("shop%40example.com"));
        assert!(query.contains("EXAMPLE+SHOP"));
        assert!(query.contains("***"));
    }

    #[test]
    fn test_existing_query_is_kept() {
        let renderer = Url::parse("https://qr.example.com/render?format=png").unwrap();
        let url = qr_image_url(&renderer, PAYLOAD).unwrap();
        assert!(url.query().unwrap().starts_with("format=png&size=300x300"));
    }
}
