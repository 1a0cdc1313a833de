//! Enrichment pipeline shared by the HTTP handlers
//!
//! Stages, in order:
//! 1. Normalize the input to a domain
//! 2. Scrape homepage metadata (fatal on failure)
//! 3. Classify the business (fatal on failure)
//! 4. Score similarity to the high-risk categories (fatal on failure)
//! 5. Adverse media and WHOIS, concurrently and only when requested (never fatal)
//! 6. Assemble the response and apply the caller's field mask
use serde_json::Value;
use std::sync::Arc;

use crate::adverse_media::{check_adverse_media, RetryPolicy};
use crate::classifier::{classify, score_high_risk_similarity};
use crate::errors::{AppError, ResultExt};
use crate::field_filter::filter_fields;
use crate::input::{business_name, normalize};
use crate::models::{AiResponse, EnrichmentRequest, EnrichmentResponse};
use crate::traits::{CategorySource, NewsSearch, RegistrationLookup, SiteScraper, TextGenerator};
use crate::whois::fetch_registration_data;

#[derive(Clone)]
pub struct EnrichmentPipeline {
    scraper: Arc<dyn SiteScraper>,
    llm: Arc<dyn TextGenerator>,
    news: Arc<dyn NewsSearch>,
    registry: Arc<dyn RegistrationLookup>,
    categories: Arc<dyn CategorySource>,
    retry: RetryPolicy,
}

impl EnrichmentPipeline {
    pub fn new(
        scraper: Arc<dyn SiteScraper>,
        llm: Arc<dyn TextGenerator>,
        news: Arc<dyn NewsSearch>,
        registry: Arc<dyn RegistrationLookup>,
        categories: Arc<dyn CategorySource>,
    ) -> Self {
        Self {
            scraper,
            llm,
            news,
            registry,
            categories,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the sentiment retry schedule.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Runs the pipeline and returns the field-filtered response tree.
    pub async fn run(&self, request: &EnrichmentRequest) -> Result<Value, AppError> {
        let response = self.enrich(request).await?;
        let tree = serde_json::to_value(&response)
            .map_err(|e| AppError::Internal(format!("Failed to serialize response: {}", e)))?;
        Ok(filter_fields(tree, &request.selected_fields))
    }

    /// Runs every stage and assembles the unfiltered response.
    pub async fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichmentResponse, AppError> {
        let input = request.input_string.trim();
        if input.is_empty() {
            return Err(AppError::Validation("input_string is required".to_string()));
        }

        let (kind, domain) = normalize(input);
        if domain.is_empty() {
            return Err(AppError::Validation(
                "input_string does not contain a domain".to_string(),
            ));
        }
        tracing::info!("Enriching {} ({:?})", domain, kind);

        // Step 1: Scrape website metadata
        let site = self
            .scraper
            .scrape(&domain)
            .await
            .with_context(|| format!("scraping {}", domain))?;
        let homepage_content = if site.metadata.description.is_empty() {
            site.text.as_str()
        } else {
            site.metadata.description.as_str()
        };

        // Step 2: Categorize and summarize
        let categories = non_empty_or(request.custom_categories.as_deref(), || {
            self.categories.default_categories()
        });
        let classification = classify(
            self.llm.as_ref(),
            &domain,
            &site.metadata,
            homepage_content,
            &categories,
        )
        .await
        .with_context(|| format!("classifying {}", domain))?;

        // Step 3: High-risk similarity
        let high_risk_categories = non_empty_or(request.custom_high_risk_categories.as_deref(), || {
            self.categories.default_high_risk_categories()
        });
        let high_risk_similarity_score = score_high_risk_similarity(
            self.llm.as_ref(),
            &classification.category,
            &high_risk_categories,
        )
        .await
        .with_context(|| format!("scoring high-risk similarity for {}", domain))?;

        // Step 4: Optional enrichments, independent of each other
        let adverse_media = async {
            if !request.include_adverse_media {
                return None;
            }
            Some(
                check_adverse_media(
                    self.llm.as_ref(),
                    self.news.as_ref(),
                    business_name(&domain),
                    &domain,
                    self.retry,
                )
                .await,
            )
        };
        let whois_data = async {
            if !request.include_whois {
                return None;
            }
            Some(fetch_registration_data(self.registry.as_ref(), &domain).await)
        };
        let (adverse_media, whois_data) = tokio::join!(adverse_media, whois_data);

        tracing::info!(
            "✓ Enriched {}: category '{}', high-risk similarity {:.2}",
            domain,
            classification.category,
            high_risk_similarity_score
        );

        Ok(EnrichmentResponse {
            kind,
            domain,
            metadata: site.metadata,
            ai_response: AiResponse {
                classification,
                high_risk_similarity_score,
            },
            whois_data,
            adverse_media,
        })
    }
}

/// The caller's list when it has entries, otherwise the default.
fn non_empty_or(custom: Option<&[String]>, default: impl FnOnce() -> Vec<String>) -> Vec<String> {
    match custom {
        Some(list) if !list.is_empty() => list.to_vec(),
        _ => default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::StaticCategorySource;
    use crate::models::{
        AdverseMediaOutcome, InputKind, NewsArticle, ScrapedSite, SiteMetadata, WhoisOutcome,
        WhoisRecord,
    };
    use crate::test_support::{ScriptedGenerator, StubNews, StubRegistry, StubScraper};
    use serde_json::json;
    use std::time::Duration;

    const CLASSIFICATION: &str =
        r#"{"category": "Retail", "summary": "Sells widgets. Ships fast.", "category_confidence_score": 0.8}"#;

    fn site() -> ScrapedSite {
        ScrapedSite {
            metadata: SiteMetadata {
                title: "Acme".into(),
                description: "Widgets for everyone".into(),
                ..SiteMetadata::default()
            },
            text: "Acme Widgets for everyone".into(),
        }
    }

    fn categories() -> Arc<StaticCategorySource> {
        Arc::new(StaticCategorySource::new(
            vec!["Retail".into(), "Gambling".into()],
            vec!["Gambling".into()],
        ))
    }

    fn pipeline(
        scraper: StubScraper,
        llm: Arc<ScriptedGenerator>,
        news: StubNews,
        registry: StubRegistry,
    ) -> EnrichmentPipeline {
        EnrichmentPipeline::new(
            Arc::new(scraper),
            llm,
            Arc::new(news),
            Arc::new(registry),
            categories(),
        )
        .with_retry(RetryPolicy::new(3, Duration::ZERO))
    }

    #[tokio::test]
    async fn mandatory_chain_only() {
        let llm = Arc::new(
            ScriptedGenerator::new()
                .reply(CLASSIFICATION)
                .reply(r#"{"high_risk_similarity_score": 0.1}"#),
        );
        let p = pipeline(
            StubScraper::site(site()),
            llm.clone(),
            StubNews::failing("unused"),
            StubRegistry::failing("unused"),
        );
        let mut request = EnrichmentRequest::for_input("https://www.acme.com/shop");
        request.include_adverse_media = false;

        let response = p.enrich(&request).await.unwrap();
        assert_eq!(response.kind, InputKind::Domain);
        assert_eq!(response.domain, "acme.com");
        assert_eq!(response.ai_response.classification.category, "Retail");
        assert_eq!(response.ai_response.high_risk_similarity_score, 0.1);
        assert!(response.adverse_media.is_none());
        assert!(response.whois_data.is_none());

        // Default high-risk list reaches the scorer
        let calls = llm.calls();
        assert!(calls[1].user_prompt.contains("High-Risk Categories: Gambling"));
        assert!(calls[0].user_prompt.contains("Widgets for everyone"));
    }

    #[tokio::test]
    async fn custom_lists_replace_defaults() {
        let llm = Arc::new(
            ScriptedGenerator::new()
                .reply(r#"{"category": "Bakery", "summary": "s", "category_confidence_score": 0.6}"#)
                .reply(r#"{"high_risk_similarity_score": 0.0}"#),
        );
        let p = pipeline(
            StubScraper::site(site()),
            llm.clone(),
            StubNews::articles(Vec::new()),
            StubRegistry::failing("unused"),
        );
        let mut request = EnrichmentRequest::for_input("owner@bakery.example");
        request.custom_categories = Some(vec!["Bakery".into()]);
        request.custom_high_risk_categories = Some(vec!["Casino".into()]);
        request.include_adverse_media = false;

        let response = p.enrich(&request).await.unwrap();
        assert_eq!(response.kind, InputKind::Email);
        assert_eq!(response.domain, "bakery.example");
        assert!(llm.calls()[1].user_prompt.contains("High-Risk Categories: Casino"));
    }

    #[tokio::test]
    async fn optional_enrichments_degrade_without_failing() {
        let llm = Arc::new(
            ScriptedGenerator::new()
                .reply(CLASSIFICATION)
                .reply(r#"{"high_risk_similarity_score": 0.2}"#),
        );
        let p = pipeline(
            StubScraper::site(site()),
            llm,
            StubNews::failing("dns error"),
            StubRegistry::failing("no registry"),
        );
        let mut request = EnrichmentRequest::for_input("acme.com");
        request.include_whois = true;

        let response = p.enrich(&request).await.unwrap();
        assert!(matches!(
            response.adverse_media,
            Some(AdverseMediaOutcome::Failed { .. })
        ));
        assert!(matches!(response.whois_data, Some(WhoisOutcome::Failed { .. })));
    }

    #[tokio::test]
    async fn optional_enrichments_are_included_when_requested() {
        let llm = Arc::new(
            ScriptedGenerator::new()
                .reply(CLASSIFICATION)
                .reply(r#"{"high_risk_similarity_score": 0.2}"#)
                .reply("0.6"),
        );
        let news = StubNews::articles(vec![NewsArticle {
            title: "Acme recalls widgets".into(),
            description: "Safety concerns".into(),
            ..NewsArticle::default()
        }]);
        let registry = StubRegistry::record(WhoisRecord {
            registrar: Some("Example Registrar".into()),
            ..WhoisRecord::default()
        });
        let p = pipeline(StubScraper::site(site()), llm, news, registry);
        let mut request = EnrichmentRequest::for_input("acme.com");
        request.include_whois = true;

        let tree = p.run(&request).await.unwrap();
        assert_eq!(tree["adverse_media"]["has_adverse_media"], json!(true));
        assert_eq!(tree["adverse_media"]["overall_adverse_score"], json!(0.6));
        assert_eq!(tree["whois_data"]["registrar"], json!("Example Registrar"));
    }

    #[tokio::test]
    async fn scrape_failure_is_fatal() {
        let llm = Arc::new(ScriptedGenerator::new());
        let p = pipeline(
            StubScraper::unreachable(),
            llm.clone(),
            StubNews::articles(Vec::new()),
            StubRegistry::failing("unused"),
        );
        let err = p
            .enrich(&EnrichmentRequest::for_input("down.example"))
            .await
            .unwrap_err();
        assert!(matches!(err.root(), AppError::Fetch(_)));
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn classification_failure_is_fatal() {
        let llm = Arc::new(ScriptedGenerator::new().reply("I think it's a shop"));
        let p = pipeline(
            StubScraper::site(site()),
            llm.clone(),
            StubNews::articles(Vec::new()),
            StubRegistry::failing("unused"),
        );
        let err = p
            .enrich(&EnrichmentRequest::for_input("acme.com"))
            .await
            .unwrap_err();
        assert!(matches!(err.root(), AppError::Classification(_)));
        assert_eq!(llm.calls().len(), 1);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_scraping() {
        let scraper = Arc::new(StubScraper::site(site()));
        let p = EnrichmentPipeline::new(
            scraper.clone(),
            Arc::new(ScriptedGenerator::new()),
            Arc::new(StubNews::articles(Vec::new())),
            Arc::new(StubRegistry::failing("unused")),
            categories(),
        );
        let err = p
            .enrich(&EnrichmentRequest::for_input("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(scraper.domains().is_empty());
    }

    #[tokio::test]
    async fn field_mask_is_applied_to_the_response() {
        let llm = Arc::new(
            ScriptedGenerator::new()
                .reply(CLASSIFICATION)
                .reply(r#"{"high_risk_similarity_score": 0.3}"#),
        );
        let p = pipeline(
            StubScraper::site(site()),
            llm,
            StubNews::articles(Vec::new()),
            StubRegistry::failing("unused"),
        );
        let mut request = EnrichmentRequest::for_input("acme.com");
        request.include_adverse_media = false;
        request.selected_fields = json!({"metadata": false, "ai_response": {"summary": false}});

        let tree = p.run(&request).await.unwrap();
        assert!(tree.get("metadata").is_none());
        assert!(tree["ai_response"].get("summary").is_none());
        assert_eq!(tree["ai_response"]["category"], json!("Retail"));
        assert_eq!(tree["type"], json!("domain"));
    }
}
