// Capability doubles for tests.
//
// Scripted replies are consumed in order; every call is recorded so tests
// can assert on prompts and parameters.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::errors::AppError;
use crate::models::{NewsArticle, ScrapedSite, WhoisRecord};
use crate::traits::{NewsSearch, RegistrationLookup, SiteScraper, TextGenerator};

// =============================================================================
// Text generator
// =============================================================================

/// Arguments captured from a generate call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateCall {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, AppError>>>,
    calls: Mutex<Vec<GenerateCall>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(text.to_string()))
    }

    /// Queue a failed call.
    pub fn fail(self, message: &str) -> Self {
        self.push(Err(AppError::ExternalApi(message.to_string())))
    }

    fn push(self, reply: Result<String, AppError>) -> Self {
        self.replies
            .lock()
            .expect("generator script lock poisoned")
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<GenerateCall> {
        self.calls
            .lock()
            .expect("generator calls lock poisoned")
            .clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AppError> {
        self.calls
            .lock()
            .expect("generator calls lock poisoned")
            .push(GenerateCall {
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
                max_tokens,
                temperature,
            });
        self.replies
            .lock()
            .expect("generator script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(AppError::ExternalApi("no scripted reply left".to_string())))
    }
}

// =============================================================================
// News search
// =============================================================================

pub struct StubNews {
    result: Result<Vec<NewsArticle>, AppError>,
    queries: Mutex<Vec<String>>,
}

impl StubNews {
    pub fn articles(articles: Vec<NewsArticle>) -> Self {
        Self {
            result: Ok(articles),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(AppError::ExternalApi(message.to_string())),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("news lock poisoned").clone()
    }
}

#[async_trait]
impl NewsSearch for StubNews {
    async fn search(
        &self,
        query: &str,
        _language: &str,
        _sort_by: &str,
        _page_size: u32,
    ) -> Result<Vec<NewsArticle>, AppError> {
        self.queries
            .lock()
            .expect("news lock poisoned")
            .push(query.to_string());
        self.result.clone()
    }
}

// =============================================================================
// Registration lookup
// =============================================================================

pub struct StubRegistry {
    result: Result<WhoisRecord, AppError>,
}

impl StubRegistry {
    pub fn record(record: WhoisRecord) -> Self {
        Self { result: Ok(record) }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(AppError::ExternalApi(message.to_string())),
        }
    }
}

#[async_trait]
impl RegistrationLookup for StubRegistry {
    async fn whois(&self, _domain: &str) -> Result<WhoisRecord, AppError> {
        self.result.clone()
    }
}

// =============================================================================
// Site scraper
// =============================================================================

pub struct StubScraper {
    result: Result<ScrapedSite, AppError>,
    domains: Mutex<Vec<String>>,
}

impl StubScraper {
    pub fn site(site: ScrapedSite) -> Self {
        Self {
            result: Ok(site),
            domains: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            result: Err(AppError::Fetch(
                "Could not fetch metadata for domain".to_string(),
            )),
            domains: Mutex::new(Vec::new()),
        }
    }

    /// Domains that were scraped
    pub fn domains(&self) -> Vec<String> {
        self.domains.lock().expect("scraper lock poisoned").clone()
    }
}

#[async_trait]
impl SiteScraper for StubScraper {
    async fn scrape(&self, domain: &str) -> Result<ScrapedSite, AppError> {
        self.domains
            .lock()
            .expect("scraper lock poisoned")
            .push(domain.to_string());
        self.result.clone()
    }
}
