use serde::Deserialize;

/// A configured `X-API-Key` / `X-Secret-Key` pair.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiKeyPair {
    pub api_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub newsapi_key: String,
    pub newsapi_base_url: String,
    pub rdap_base_url: String,
    pub api_keys: Vec<ApiKeyPair>,
    pub categories_file: Option<String>,
    pub high_risk_categories_file: Option<String>,
    pub scrape_timeout_secs: u64,
    pub llm_timeout_secs: u64,
    pub news_timeout_secs: u64,
    pub whois_timeout_secs: u64,
    pub sentiment_retry_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5003".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: base_url("OPENAI_BASE_URL", "https://api.openai.com")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            newsapi_key: required("NEWSAPI_KEY")?,
            newsapi_base_url: base_url("NEWSAPI_BASE_URL", "https://newsapi.org")?,
            rdap_base_url: base_url("RDAP_BASE_URL", "https://rdap.org")?,
            api_keys: required("API_KEYS").and_then(|raw| parse_api_keys(&raw))?,
            categories_file: std::env::var("CATEGORIES_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            high_risk_categories_file: std::env::var("HIGH_RISK_CATEGORIES_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            scrape_timeout_secs: number("SCRAPE_TIMEOUT_SECS", 10)?,
            llm_timeout_secs: number("LLM_TIMEOUT_SECS", 30)?,
            news_timeout_secs: number("NEWS_TIMEOUT_SECS", 15)?,
            whois_timeout_secs: number("WHOIS_TIMEOUT_SECS", 15)?,
            sentiment_retry_delay_ms: number("SENTIMENT_RETRY_DELAY_MS", 250)?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("OpenAI Base URL: {} (model {})", config.openai_base_url, config.openai_model);
        tracing::debug!("NewsAPI Base URL: {}", config.newsapi_base_url);
        tracing::debug!("RDAP Base URL: {}", config.rdap_base_url);
        tracing::debug!("Authorized key pairs: {}", config.api_keys.len());
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))
        .and_then(|value| {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
            Ok(value)
        })
}

fn base_url(name: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(url.trim_end_matches('/').to_string())
}

fn number(name: &str, default: u64) -> anyhow::Result<u64> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer", name)),
        _ => Ok(default),
    }
}

/// Parses `key:secret` pairs separated by commas.
pub fn parse_api_keys(raw: &str) -> anyhow::Result<Vec<ApiKeyPair>> {
    let mut pairs = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((api_key, secret_key)) = entry.split_once(':') else {
            anyhow::bail!("API_KEYS entries must look like key:secret");
        };
        let (api_key, secret_key) = (api_key.trim(), secret_key.trim());
        if api_key.is_empty() || secret_key.is_empty() {
            anyhow::bail!("API_KEYS entries cannot have an empty key or secret");
        }
        pairs.push(ApiKeyPair {
            api_key: api_key.to_string(),
            secret_key: secret_key.to_string(),
        });
    }
    if pairs.is_empty() {
        anyhow::bail!("API_KEYS must contain at least one key:secret pair");
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_pairs() {
        let pairs = parse_api_keys("alpha:one, beta:two").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].api_key, "beta");
        assert_eq!(pairs[1].secret_key, "two");
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(parse_api_keys("no-colon").is_err());
        assert!(parse_api_keys(":secret").is_err());
        assert!(parse_api_keys(" , ").is_err());
    }
}
