//! Input normalization: email or domain/URL to a canonical domain.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::InputKind;

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://(www\.)?").expect("scheme regex is valid"));

/// Classifies `input` and extracts its domain.
///
/// Emails yield the part after the last `@`. Anything else has its
/// `http(s)://` (and a `www.` directly after it) removed and is cut at the
/// first `/`.
pub fn normalize(input: &str) -> (InputKind, String) {
    if let Some((_, domain)) = input.rsplit_once('@') {
        return (InputKind::Email, domain.to_string());
    }

    let stripped = SCHEME_PREFIX.replace_all(input, "");
    let domain = stripped.split('/').next().unwrap_or_default();
    (InputKind::Domain, domain.to_string())
}

/// Label used as the business name in news queries: the domain's first label.
pub fn business_name(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_uses_text_after_last_at() {
        assert_eq!(
            normalize("jane@acme.io"),
            (InputKind::Email, "acme.io".to_string())
        );
        assert_eq!(
            normalize("odd@name@shop.example.org"),
            (InputKind::Email, "shop.example.org".to_string())
        );
    }

    #[test]
    fn url_is_stripped_to_host() {
        assert_eq!(
            normalize("https://www.example.com/about/team"),
            (InputKind::Domain, "example.com".to_string())
        );
        assert_eq!(
            normalize("http://shop.example.com"),
            (InputKind::Domain, "shop.example.com".to_string())
        );
    }

    #[test]
    fn bare_domain_passes_through() {
        assert_eq!(
            normalize("example.com"),
            (InputKind::Domain, "example.com".to_string())
        );
        assert_eq!(
            normalize("example.com/pricing"),
            (InputKind::Domain, "example.com".to_string())
        );
    }

    #[test]
    fn www_without_scheme_is_kept() {
        assert_eq!(normalize("www.example.com").1, "www.example.com");
    }

    #[test]
    fn business_name_is_first_label() {
        assert_eq!(business_name("acme.co.uk"), "acme");
        assert_eq!(business_name("localhost"), "localhost");
    }
}
