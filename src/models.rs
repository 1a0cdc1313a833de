use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

// ============ Request Models ============

/// Body of `POST /enrich`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrichmentRequest {
    /// Email address, bare domain or URL to enrich.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub input_string: String,
    /// Replaces the default category list when non-empty.
    #[serde(default)]
    pub custom_categories: Option<Vec<String>>,
    /// Replaces the default high-risk category list when non-empty.
    #[serde(default)]
    pub custom_high_risk_categories: Option<Vec<String>>,
    #[serde(default)]
    pub include_whois: bool,
    #[serde(default = "default_true")]
    pub include_adverse_media: bool,
    /// Nested field mask; absent keys are kept.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub selected_fields: serde_json::Value,
}

fn default_true() -> bool {
    true
}

/// `null` reads as an empty string, so it is reported as a missing field.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl EnrichmentRequest {
    /// Request for `input` with the default flags.
    pub fn for_input(input: impl Into<String>) -> Self {
        Self {
            input_string: input.into(),
            custom_categories: None,
            custom_high_risk_categories: None,
            include_whois: false,
            include_adverse_media: true,
            selected_fields: serde_json::Value::Null,
        }
    }
}

/// Body of `POST /api/generate_sop`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SopRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prompt: String,
}

// ============ Pipeline Models ============

/// Whether the caller supplied an email address or a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Email,
    Domain,
}

/// Structured metadata extracted from a site's homepage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    #[schema(value_type = Vec<String>)]
    pub phone_numbers: BTreeSet<String>,
    #[schema(value_type = Vec<String>)]
    pub emails: BTreeSet<String>,
    #[schema(value_type = Vec<String>)]
    pub social_media_links: BTreeSet<String>,
}

/// Output of a successful scrape: the metadata plus the page's visible text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedSite {
    pub metadata: SiteMetadata,
    pub text: String,
}

/// Category label, summary and confidence chosen by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClassificationResult {
    pub category: String,
    pub summary: String,
    pub category_confidence_score: f64,
}

/// Classification plus the high-risk similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AiResponse {
    #[serde(flatten)]
    pub classification: ClassificationResult,
    pub high_risk_similarity_score: f64,
}

/// Article as returned by the news-search capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: String,
}

/// A news article with its adverseness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdverseMediaArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub source: String,
    pub sentiment_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdverseMediaResult {
    /// True whenever the search returned any article at all.
    pub has_adverse_media: bool,
    pub adverse_media_articles: Vec<AdverseMediaArticle>,
    pub overall_adverse_score: f64,
}

impl AdverseMediaResult {
    pub fn empty() -> Self {
        Self {
            has_adverse_media: false,
            adverse_media_articles: Vec::new(),
            overall_adverse_score: 0.0,
        }
    }

    /// Threshold reading of the articles, independent of `has_adverse_media`.
    pub fn any_article_above(&self, threshold: f64) -> bool {
        self.adverse_media_articles
            .iter()
            .filter_map(|a| a.sentiment_score)
            .any(|score| score > threshold)
    }
}

/// The adverse-media section: a report, or the reason it could not be built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdverseMediaOutcome {
    Report(AdverseMediaResult),
    Failed { error: String },
}

/// Registration metadata as returned by the lookup capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisRecord {
    pub creation_date: Option<String>,
    pub updated_date: Option<String>,
    pub expiration_date: Option<String>,
    pub registrar: Option<String>,
    pub name_servers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WhoisData {
    pub creation_date: Option<String>,
    pub last_updated: Option<String>,
    pub expiration_date: Option<String>,
    pub registrar: Option<String>,
    pub name_servers: Vec<String>,
}

impl From<WhoisRecord> for WhoisData {
    fn from(record: WhoisRecord) -> Self {
        Self {
            creation_date: record.creation_date,
            last_updated: record.updated_date,
            expiration_date: record.expiration_date,
            registrar: record.registrar,
            name_servers: record.name_servers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WhoisOutcome {
    Record(WhoisData),
    Failed { error: String },
}

// ============ Response Models ============

/// Full enrichment profile, before field filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnrichmentResponse {
    #[serde(rename = "type")]
    pub kind: InputKind,
    pub domain: String,
    pub metadata: SiteMetadata,
    pub ai_response: AiResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub whois_data: Option<WhoisOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub adverse_media: Option<AdverseMediaOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SopResponse {
    pub status: String,
    pub sop_document: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
