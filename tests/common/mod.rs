// Shared fixtures for integration tests
#![allow(dead_code)]

use business_intel_api::config::{ApiKeyPair, Config};

pub const API_KEY: &str = "staging_api_key_test";
pub const SECRET_KEY: &str = "staging_secret_key_test";

/// Helper function to create test config pointing every client at `base_url`
pub fn create_test_config(base_url: &str) -> Config {
    Config {
        port: 0,
        openai_api_key: "test-openai".to_string(),
        openai_base_url: base_url.to_string(),
        openai_model: "gpt-3.5-turbo".to_string(),
        newsapi_key: "test-news".to_string(),
        newsapi_base_url: base_url.to_string(),
        rdap_base_url: base_url.to_string(),
        api_keys: vec![ApiKeyPair {
            api_key: API_KEY.to_string(),
            secret_key: SECRET_KEY.to_string(),
        }],
        categories_file: None,
        high_risk_categories_file: None,
        scrape_timeout_secs: 5,
        llm_timeout_secs: 5,
        news_timeout_secs: 5,
        whois_timeout_secs: 5,
        sentiment_retry_delay_ms: 0,
    }
}

/// OpenAI Chat Completions body carrying `content`
pub fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

pub const HOMEPAGE: &str = r#"<html>
<head>
  <title>Acme Widgets</title>
  <meta name="description" content="Industrial widgets and gears">
  <meta name="keywords" content="widgets, gears">
</head>
<body>
  <h1>Acme</h1>
  <p>Call us on +44 20 7946 0958 or email hello@acme.example</p>
  <a href="https://twitter.com/acme">Twitter</a>
  <a href="https://instagram.com/acme">Instagram</a>
</body>
</html>"#;
