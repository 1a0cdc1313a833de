use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{NewsArticle, WhoisRecord};
use crate::traits::{NewsSearch, RegistrationLookup, TextGenerator};

/// Builds a client with a request timeout, shared by every service below.
fn http_client(timeout_secs: u64, name: &str) -> Result<Client, AppError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create {} client: {}", name, e)))
}

/// Reads a non-2xx response into an `ExternalApi` error.
async fn error_from_response(service: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AppError::ExternalApi(format!("{} returned {}: {}", service, status, error_text))
}

// ============ OpenAI ============

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat Completions client implementing `TextGenerator`.
#[derive(Clone)]
pub struct OpenAiService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(config.llm_timeout_secs, "OpenAI")?,
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiService {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AppError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens,
            temperature,
        };

        tracing::debug!(
            "Calling OpenAI model {} (prompt {} chars, max_tokens {})",
            self.model,
            user_prompt.len(),
            max_tokens
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response("OpenAI", response).await);
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse OpenAI response: {}", e))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::ExternalApi("OpenAI returned no message content".to_string()))
    }
}

// ============ NewsAPI ============

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<NewsApiArticle> for NewsArticle {
    fn from(article: NewsApiArticle) -> Self {
        Self {
            title: article.title.unwrap_or_default(),
            description: article.description.unwrap_or_default(),
            url: article.url.unwrap_or_default(),
            source: article
                .source
                .and_then(|source| source.name)
                .unwrap_or_default(),
            published_at: article.published_at.unwrap_or_default(),
        }
    }
}

/// NewsAPI `/v2/everything` client implementing `NewsSearch`.
#[derive(Clone)]
pub struct NewsApiService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsApiService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(config.news_timeout_secs, "NewsAPI")?,
            base_url: config.newsapi_base_url.clone(),
            api_key: config.newsapi_key.clone(),
        })
    }
}

#[async_trait]
impl NewsSearch for NewsApiService {
    async fn search(
        &self,
        query: &str,
        language: &str,
        sort_by: &str,
        page_size: u32,
    ) -> Result<Vec<NewsArticle>, AppError> {
        let page_size = page_size.to_string();
        // Build URL with proper parameter encoding; the key travels in a header
        let url = url::Url::parse_with_params(
            &format!("{}/v2/everything", self.base_url),
            &[
                ("q", query),
                ("language", language),
                ("sortBy", sort_by),
                ("pageSize", page_size.as_str()),
            ],
        )
        .map_err(|e| AppError::ExternalApi(format!("Failed to build URL: {}", e)))?;

        tracing::debug!("NewsAPI search: {}", url);

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("NewsAPI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response("NewsAPI", response).await);
        }

        let body: NewsApiResponse = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse NewsAPI response: {}", e))
        })?;

        Ok(body.articles.into_iter().map(NewsArticle::from).collect())
    }
}

// ============ RDAP ============

#[derive(Debug, Deserialize)]
struct RdapDomain {
    #[serde(default)]
    events: Vec<RdapEvent>,
    #[serde(default)]
    entities: Vec<RdapEntity>,
    #[serde(default)]
    nameservers: Vec<RdapNameserver>,
}

#[derive(Debug, Deserialize)]
struct RdapEvent {
    #[serde(rename = "eventAction")]
    action: String,
    #[serde(rename = "eventDate", default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RdapEntity {
    #[serde(default)]
    roles: Vec<String>,
    #[serde(rename = "vcardArray", default)]
    vcard_array: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RdapNameserver {
    #[serde(rename = "ldhName", default)]
    ldh_name: Option<String>,
}

impl RdapDomain {
    fn event_date(&self, action: &str) -> Option<String> {
        self.events
            .iter()
            .find(|event| event.action.eq_ignore_ascii_case(action))
            .and_then(|event| event.date.as_deref())
            .map(normalize_date)
    }

    fn registrar(&self) -> Option<String> {
        self.entities
            .iter()
            .find(|entity| entity.roles.iter().any(|role| role == "registrar"))
            .and_then(|entity| entity.vcard_array.as_ref())
            .and_then(vcard_full_name)
    }

    fn into_record(self) -> WhoisRecord {
        WhoisRecord {
            creation_date: self.event_date("registration"),
            updated_date: self.event_date("last changed"),
            expiration_date: self.event_date("expiration"),
            registrar: self.registrar(),
            name_servers: self
                .nameservers
                .into_iter()
                .filter_map(|ns| ns.ldh_name)
                .collect(),
        }
    }
}

/// Pulls the `fn` property out of a jCard (`["vcard", [[name, params, type, value], ...]]`).
fn vcard_full_name(vcard: &Value) -> Option<String> {
    vcard
        .get(1)?
        .as_array()?
        .iter()
        .find(|property| property.get(0).and_then(Value::as_str) == Some("fn"))
        .and_then(|property| property.get(3))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// RFC 3339 dates are normalised to UTC; anything else passes through.
fn normalize_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).to_rfc3339())
        .unwrap_or_else(|_| raw.to_string())
}

/// RDAP client implementing `RegistrationLookup`.
#[derive(Clone)]
pub struct RdapService {
    client: Client,
    base_url: String,
}

impl RdapService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(config.whois_timeout_secs, "RDAP")?,
            base_url: config.rdap_base_url.clone(),
        })
    }
}

#[async_trait]
impl RegistrationLookup for RdapService {
    async fn whois(&self, domain: &str) -> Result<WhoisRecord, AppError> {
        let url = format!("{}/domain/{}", self.base_url, domain);
        tracing::info!("Fetching registration data for {}", domain);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/rdap+json")
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("RDAP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response("RDAP", response).await);
        }

        let body: RdapDomain = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Failed to parse RDAP response: {}", e)))?;

        Ok(body.into_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rdap_document_maps_to_record() {
        let doc: RdapDomain = serde_json::from_value(json!({
            "events": [
                {"eventAction": "registration", "eventDate": "1995-08-14T04:00:00Z"},
                {"eventAction": "expiration", "eventDate": "2025-08-13T04:00:00Z"},
                {"eventAction": "last changed", "eventDate": "not a date"}
            ],
            "entities": [
                {"roles": ["technical"], "vcardArray": ["vcard", [["fn", {}, "text", "Tech Person"]]]},
                {"roles": ["registrar"], "vcardArray": ["vcard", [
                    ["version", {}, "text", "4.0"],
                    ["fn", {}, "text", "Example Registrar, Inc."]
                ]]}
            ],
            "nameservers": [{"ldhName": "ns1.example.net"}, {"ldhName": "ns2.example.net"}]
        }))
        .unwrap();

        let record = doc.into_record();
        assert_eq!(record.creation_date.as_deref(), Some("1995-08-14T04:00:00+00:00"));
        assert_eq!(record.expiration_date.as_deref(), Some("2025-08-13T04:00:00+00:00"));
        assert_eq!(record.updated_date.as_deref(), Some("not a date"));
        assert_eq!(record.registrar.as_deref(), Some("Example Registrar, Inc."));
        assert_eq!(record.name_servers, vec!["ns1.example.net", "ns2.example.net"]);
    }

    #[test]
    fn sparse_rdap_document_is_accepted() {
        let doc: RdapDomain = serde_json::from_value(json!({"objectClassName": "domain"})).unwrap();
        assert_eq!(doc.into_record(), WhoisRecord::default());
    }

    #[test]
    fn news_article_fills_missing_fields() {
        let raw: NewsApiArticle = serde_json::from_value(json!({
            "source": {"id": null, "name": "Reuters"},
            "title": "Acme fined",
            "description": null,
            "url": "https://reuters.example/acme",
            "publishedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let article = NewsArticle::from(raw);
        assert_eq!(article.source, "Reuters");
        assert_eq!(article.description, "");
        assert_eq!(article.published_at, "2024-01-01T00:00:00Z");
    }
}
