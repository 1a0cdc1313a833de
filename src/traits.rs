// Capability traits injected into the pipeline and handlers.
//
// Infrastructure only: prompt construction and result shaping live in the
// stage modules that call these.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{NewsArticle, ScrapedSite, WhoisRecord};

/// Text generation backed by a language model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AppError>;
}

/// News search.
#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        language: &str,
        sort_by: &str,
        page_size: u32,
    ) -> Result<Vec<NewsArticle>, AppError>;
}

/// Domain registration lookup.
#[async_trait]
pub trait RegistrationLookup: Send + Sync {
    async fn whois(&self, domain: &str) -> Result<WhoisRecord, AppError>;
}

/// Fetches a site's homepage and extracts metadata from it.
#[async_trait]
pub trait SiteScraper: Send + Sync {
    /// Fails with `AppError::Fetch` when no scheme yields a successful response.
    async fn scrape(&self, domain: &str) -> Result<ScrapedSite, AppError>;
}

/// Default category lists, in order.
pub trait CategorySource: Send + Sync {
    fn default_categories(&self) -> Vec<String>;
    fn default_high_risk_categories(&self) -> Vec<String>;
}

/// Lookup of authorized API key pairs.
pub trait CredentialStore: Send + Sync {
    fn is_authorized(&self, api_key: &str, secret_key: &str) -> bool;
}
