//! Marketplace listings for well-known deep-link schemes.

/// Storefront front page suggested for schemes with no known listing
pub const FALLBACK_LISTING: &str = "https://apps.apple.com";

/// Marketplace listing for the app behind a scheme.
///
/// Covers the handful of schemes embedded payment and messenger pages
/// dispatch most often; anything else gets the storefront front page.
pub fn store_listing(scheme: &str) -> &'static str {
    match scheme {
        "tg" | "telegram" => "https://apps.apple.com/app/telegram-messenger/id686449807",
        "sberbank" => "https://apps.apple.com/app/sberbank/id492224193",
        "tinkoff" => "https://apps.apple.com/app/tinkoff/id298813222",
        "alfabank" => "https://apps.apple.com/app/alfa-bank/id1067895403",
        "whatsapp" => "https://apps.apple.com/app/whatsapp-messenger/id310633997",
        "viber" => "https://apps.apple.com/app/viber-messenger/id382617920",
        _ => FALLBACK_LISTING,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_schemes_have_listings() {
        assert!(store_listing("tg").contains("telegram"));
        assert!(store_listing("telegram").contains("telegram"));
        assert!(store_listing("viber").contains("viber"));
    }

    #[test]
    fn test_unknown_scheme_falls_back_to_storefront() {
        assert_eq!(store_listing("obscureapp"), FALLBACK_LISTING);
    }

    #[test]
    fn test_listings_parse_as_urls() {
        for scheme in ["tg", "sberbank", "tinkoff", "alfabank", "whatsapp", "viber", "other"] {
            assert!(url::Url::parse(store_listing(scheme)).is_ok());
        }
    }
}
