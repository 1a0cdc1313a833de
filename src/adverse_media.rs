//! Adverse media check: news search followed by per-article sentiment scoring.
//!
//! Best effort. Nothing here returns an error to the pipeline; failures end
//! up as `error` fields in the report.

use std::time::Duration;

use crate::models::{AdverseMediaArticle, AdverseMediaOutcome, AdverseMediaResult, NewsArticle};
use crate::traits::{NewsSearch, TextGenerator};

/// Marker the news provider puts in place of taken-down content.
pub const REMOVED_MARKER: &str = "[Removed]";

const SENTIMENT_SYSTEM_PROMPT: &str = "You are a sentiment analysis assistant.";
const PAGE_SIZE: u32 = 5;

/// Retry schedule for sentiment scoring: linear backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
        }
    }

    /// Delay after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(250))
    }
}

/// Searches for articles about the business and scores each for adverseness.
pub async fn check_adverse_media(
    llm: &dyn TextGenerator,
    news: &dyn NewsSearch,
    business_name: &str,
    domain: &str,
    retry: RetryPolicy,
) -> AdverseMediaOutcome {
    let query = format!("\"{}\" OR \"{}\"", business_name, domain);
    tracing::info!("Checking adverse media with query {}", query);

    let articles = match news.search(&query, "en", "relevancy", PAGE_SIZE).await {
        Ok(articles) => articles,
        Err(e) => {
            tracing::warn!("News search failed for {}: {}", domain, e);
            return AdverseMediaOutcome::Failed {
                error: format!("NewsAPI request failed: {}", e),
            };
        }
    };

    if articles.is_empty() {
        return AdverseMediaOutcome::Report(AdverseMediaResult::empty());
    }

    let analyzed = analyze_articles_sentiment(llm, articles, retry).await;
    let overall_adverse_score = overall_adverse_score(&analyzed);
    tracing::info!(
        "Adverse media for {}: {} article(s), overall score {:.2}",
        domain,
        analyzed.len(),
        overall_adverse_score
    );

    AdverseMediaOutcome::Report(AdverseMediaResult {
        // Literal rule: any returned article counts, whatever its score.
        has_adverse_media: !analyzed.is_empty(),
        adverse_media_articles: analyzed,
        overall_adverse_score,
    })
}

/// Scores every article. A failure on one article never affects the others.
pub async fn analyze_articles_sentiment(
    llm: &dyn TextGenerator,
    articles: Vec<NewsArticle>,
    retry: RetryPolicy,
) -> Vec<AdverseMediaArticle> {
    let mut analyzed = Vec::with_capacity(articles.len());

    for article in articles {
        let (sentiment_score, error) =
            if article.title == REMOVED_MARKER || article.description == REMOVED_MARKER {
                (
                    None,
                    Some("Article content was removed or unavailable.".to_string()),
                )
            } else {
                match get_sentiment_score(llm, &article.title, &article.description, retry).await {
                    Some(score) => (Some(score), None),
                    None => (
                        None,
                        Some("Failed to analyze sentiment after multiple attempts.".to_string()),
                    ),
                }
            };

        analyzed.push(AdverseMediaArticle {
            title: article.title,
            description: article.description,
            url: article.url,
            published_at: article.published_at,
            source: article.source,
            sentiment_score,
            error,
        });
    }

    analyzed
}

/// Asks the model for an adverseness score in [0, 1].
///
/// Returns `None` once every attempt has failed to produce a number.
pub async fn get_sentiment_score(
    llm: &dyn TextGenerator,
    title: &str,
    description: &str,
    retry: RetryPolicy,
) -> Option<f64> {
    let prompt = format!(
        "Analyze the following article for adverse sentiment and return a numerical score from 0.0 (not adverse) \
         to 1.0 (highly adverse). Respond with only the score:\n\n\
         Title: {title}\n\
         Description: {description}\n\n\
         Adverse Sentiment Score:"
    );

    for attempt in 1..=retry.attempts {
        match llm.generate(SENTIMENT_SYSTEM_PROMPT, &prompt, 10, 0.0).await {
            Ok(reply) => match reply.trim().parse::<f64>() {
                Ok(score) if score.is_finite() => return Some(score.clamp(0.0, 1.0)),
                _ => tracing::warn!("Invalid response on attempt {}: {:?}", attempt, reply),
            },
            Err(e) => {
                tracing::warn!("Failed to analyze sentiment on attempt {}: {}", attempt, e)
            }
        }

        if attempt < retry.attempts {
            tokio::time::sleep(retry.delay_for(attempt)).await;
        }
    }

    None
}

/// Mean of the articles' non-null scores, 0.0 when there are none.
pub fn overall_adverse_score(articles: &[AdverseMediaArticle]) -> f64 {
    let scores: Vec<f64> = articles.iter().filter_map(|a| a.sentiment_score).collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}
