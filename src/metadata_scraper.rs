//! Homepage scraper: fetches a domain over HTTP, then HTTPS, and extracts
//! title, meta tags, contact details and social links from the first page
//! that answers.

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use std::time::Duration;

use crate::errors::AppError;
use crate::models::{ScrapedSite, SiteMetadata};
use crate::traits::SiteScraper;

/// Schemes tried in order; the first successful response wins.
const SCHEMES: [&str; 2] = ["http", "https"];

const TITLE_FALLBACK: &str = "No title found";

const SOCIAL_HOSTS: [&str; 4] = [
    "facebook.com",
    "twitter.com",
    "linkedin.com",
    "instagram.com",
];

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s().-]{7,}\d").expect("phone regex is valid"));
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email regex is valid")
});

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));
static META_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="description"]"#).expect("description selector is valid")
});
static META_KEYWORDS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="keywords"]"#).expect("keywords selector is valid")
});
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// reqwest-backed `SiteScraper`.
#[derive(Clone)]
pub struct HttpMetadataScraper {
    client: reqwest::Client,
}

impl HttpMetadataScraper {
    /// Creates a scraper whose every attempt is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("business-intel-api/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create scraper client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch raw HTML from a URL, treating any non-2xx status as a failure.
    async fn fetch_html(&self, url: &str) -> Result<String, AppError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalApi(format!("HTTP {} for {}", status, url)));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl SiteScraper for HttpMetadataScraper {
    async fn scrape(&self, domain: &str) -> Result<ScrapedSite, AppError> {
        let urls: Vec<String> = SCHEMES
            .iter()
            .map(|scheme| format!("{}://{}", scheme, domain))
            .collect();
        self.scrape_first(domain, &urls).await
    }
}

impl HttpMetadataScraper {
    /// Tries `urls` in order and extracts the first page that answers with 2xx.
    async fn scrape_first(&self, domain: &str, urls: &[String]) -> Result<ScrapedSite, AppError> {
        for url in urls {
            match self.fetch_html(url).await {
                Ok(html) => {
                    tracing::info!("✓ Fetched {}", url);
                    return Ok(extract_site(&html));
                }
                Err(e) => {
                    tracing::warn!("Request failed while fetching {}: {}", url, e);
                }
            }
        }

        Err(AppError::Fetch(format!(
            "Could not fetch metadata for domain: {}",
            domain
        )))
    }
}

/// Extracts metadata and visible text from an HTML document.
pub fn extract_site(html: &str) -> ScrapedSite {
    let document = Html::parse_document(html);
    let text = visible_text(&document);

    let title = document
        .select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| TITLE_FALLBACK.to_string());

    let metadata = SiteMetadata {
        title,
        description: meta_content(&document, &META_DESCRIPTION),
        keywords: meta_content(&document, &META_KEYWORDS),
        phone_numbers: matches(&PHONE_PATTERN, &text),
        emails: matches(&EMAIL_PATTERN, &text),
        social_media_links: social_links(&document),
    };

    ScrapedSite { metadata, text }
}

fn meta_content(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_string()
}

fn matches(pattern: &Regex, text: &str) -> BTreeSet<String> {
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn social_links(document: &Html) -> BTreeSet<String> {
    document
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| SOCIAL_HOSTS.iter().any(|host| href.contains(host)))
        .map(str::to_string)
        .collect()
}

/// Text nodes outside `script`/`style`/`noscript`, joined by single spaces.
fn visible_text(document: &Html) -> String {
    let mut parts = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| {
                parent
                    .value()
                    .as_element()
                    .map(|el| matches!(el.name(), "script" | "style" | "noscript"))
            })
            .unwrap_or(false);
        let trimmed = text.trim();
        if !hidden && !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head>
            <title> Acme Widgets </title>
            <meta name="description" content="Industrial widgets since 1982">
            <meta name="keywords" content="widgets, gears">
            <style>.phone { content: "0000000000"; }</style>
          </head>
          <body>
            <p>Call +1 (555) 010-2000 or +1 (555) 010-2000 again.</p>
            <p>Write to sales@acme.example or sales@acme.example</p>
            <a href="https://www.facebook.com/acme">fb</a>
            <a href="https://www.facebook.com/acme">fb again</a>
            <a href="https://linkedin.com/company/acme">li</a>
            <a href="/contact">contact</a>
            <script>var tracking = "support@tracker.example";</script>
          </body>
        </html>
    "#;

    #[test]
    fn extracts_title_and_meta() {
        let site = extract_site(PAGE);
        assert_eq!(site.metadata.title, "Acme Widgets");
        assert_eq!(site.metadata.description, "Industrial widgets since 1982");
        assert_eq!(site.metadata.keywords, "widgets, gears");
    }

    #[test]
    fn contact_details_are_deduplicated() {
        let site = extract_site(PAGE);
        assert_eq!(site.metadata.emails.len(), 1);
        assert!(site.metadata.emails.contains("sales@acme.example"));
        assert_eq!(site.metadata.phone_numbers.len(), 1);
        assert!(site.metadata.phone_numbers.contains("+1 (555) 010-2000"));
    }

    #[test]
    fn only_social_links_are_kept() {
        let site = extract_site(PAGE);
        let links: Vec<_> = site.metadata.social_media_links.iter().cloned().collect();
        assert_eq!(
            links,
            vec![
                "https://linkedin.com/company/acme".to_string(),
                "https://www.facebook.com/acme".to_string(),
            ]
        );
    }

    #[test]
    fn script_and_style_text_is_ignored() {
        let site = extract_site(PAGE);
        assert!(!site.text.contains("tracker.example"));
        assert!(!site.metadata.phone_numbers.contains("0000000000"));
    }

    #[test]
    fn missing_elements_fall_back() {
        let site = extract_site("<html><body><p>hello</p></body></html>");
        assert_eq!(site.metadata.title, "No title found");
        assert_eq!(site.metadata.description, "");
        assert_eq!(site.metadata.keywords, "");
        assert!(site.metadata.social_media_links.is_empty());
        assert_eq!(site.text, "hello");
    }

    mod attempts {
        use crate::errors::AppError;
        use crate::metadata_scraper::HttpMetadataScraper;
        use std::time::Duration;
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        async fn page_server(title: &str, status: u16, hits: u64) -> MockServer {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(
                    ResponseTemplate::new(status)
                        .set_body_string(format!("<html><head><title>{}</title></head></html>", title)),
                )
                .expect(hits)
                .mount(&server)
                .await;
            server
        }

        fn scraper() -> HttpMetadataScraper {
            HttpMetadataScraper::new(Duration::from_secs(5)).unwrap()
        }

        #[tokio::test]
        async fn connection_failure_falls_through_to_next_url() {
            let second = page_server("Second", 200, 1).await;
            let urls = vec!["http://127.0.0.1:1".to_string(), second.uri()];

            let site = scraper().scrape_first("acme.io", &urls).await.unwrap();
            assert_eq!(site.metadata.title, "Second");
        }

        #[tokio::test]
        async fn error_status_does_not_win() {
            let first = page_server("Maintenance", 503, 1).await;
            let second = page_server("Second", 200, 1).await;
            let urls = vec![first.uri(), second.uri()];

            let site = scraper().scrape_first("acme.io", &urls).await.unwrap();
            assert_eq!(site.metadata.title, "Second");
        }

        #[tokio::test]
        async fn first_success_stops_further_attempts() {
            let first = page_server("First", 200, 1).await;
            let second = page_server("Second", 200, 0).await;
            let urls = vec![first.uri(), second.uri()];

            let site = scraper().scrape_first("acme.io", &urls).await.unwrap();
            assert_eq!(site.metadata.title, "First");
        }

        #[tokio::test]
        async fn every_attempt_failing_is_a_fetch_error() {
            let first = page_server("Down", 500, 1).await;
            let urls = vec![first.uri(), "http://127.0.0.1:1".to_string()];

            let err = scraper().scrape_first("acme.io", &urls).await.unwrap_err();
            assert!(matches!(
                err,
                AppError::Fetch(ref msg) if msg == "Could not fetch metadata for domain: acme.io"
            ));
        }
    }
}
