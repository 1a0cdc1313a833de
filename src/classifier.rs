//! Category classification and high-risk similarity scoring.
//!
//! Both calls ask the model for a JSON object and validate it strictly at
//! this boundary: unparseable replies, missing fields, out-of-range scores
//! and categories outside the supplied list are all `AppError::Classification`.

use serde_json::Value;

use crate::errors::AppError;
use crate::models::{ClassificationResult, SiteMetadata};
use crate::traits::TextGenerator;

pub const JSON_SYSTEM_PROMPT: &str = "You are a helpful assistant that responds only in valid JSON.";

/// Homepage content is cut to this many characters before prompting.
const HOMEPAGE_CHAR_LIMIT: usize = 1000;

/// Picks one category from `categories` for the site, with a summary and
/// confidence score.
pub async fn classify(
    llm: &dyn TextGenerator,
    domain: &str,
    metadata: &SiteMetadata,
    homepage_content: &str,
    categories: &[String],
) -> Result<ClassificationResult, AppError> {
    let serialized_metadata = serde_json::to_string(metadata)
        .map_err(|e| AppError::Internal(format!("Failed to serialize metadata: {}", e)))?;
    let homepage: String = homepage_content.chars().take(HOMEPAGE_CHAR_LIMIT).collect();

    let prompt = format!(
        "Domain: {domain}\n\
         Metadata: {serialized_metadata}\n\
         Homepage Content (truncated to {HOMEPAGE_CHAR_LIMIT} chars): {homepage}\n\n\
         You must choose exactly one category from the list below. Use only the categories provided:\n\
         {categories}\n\n\
         Additionally, provide a two-sentence summary of the business and the product/service it offers.\n\
         Assign a confidence score (from 0.0 to 1.0) indicating how certain you are about the selected category.\n\
         Respond with valid JSON only in this exact format:\n\
         {{\n  \"category\": \"ChosenCategory\",\n  \"summary\": \"Two-sentence summary here.\",\n  \"category_confidence_score\": 0.85\n}}",
        categories = categories.join(", "),
    );

    let reply = llm
        .generate(JSON_SYSTEM_PROMPT, &prompt, 300, 0.5)
        .await
        .map_err(|e| AppError::Classification(format!("OpenAI API call failed: {}", e)))?;

    let parsed = parse_json_reply(&reply, "OpenAI did not return valid JSON.")?;
    let result = ClassificationResult {
        category: required_str(&parsed, "category")?,
        summary: required_str(&parsed, "summary")?,
        category_confidence_score: required_score(&parsed, "category_confidence_score")?,
    };

    if !categories.iter().any(|c| c == &result.category) {
        return Err(AppError::Classification(format!(
            "Model returned category '{}' which is not in the supplied category list",
            result.category
        )));
    }

    tracing::debug!(
        "Classified {} as '{}' (confidence {:.2})",
        domain,
        result.category,
        result.category_confidence_score
    );
    Ok(result)
}

/// Scores how close `category` is to the high-risk list, in [0, 1].
///
/// An exact match is required to score 1.0; that rule is stated to the model
/// and its answer is taken as authoritative.
pub async fn score_high_risk_similarity(
    llm: &dyn TextGenerator,
    category: &str,
    high_risk_categories: &[String],
) -> Result<f64, AppError> {
    let prompt = format!(
        "AI-Generated Category: {category}\n\
         High-Risk Categories: {high_risk}\n\n\
         Determine the similarity of the AI-generated category to each high-risk category. \
         Provide a similarity score (from 0.0 to 1.0) for the closest match.\n\
         If the AI-generated category exactly matches one of the high-risk categories, the score should be 1.0.\n\
         Respond with valid JSON only in this exact format:\n\
         {{\n  \"high_risk_similarity_score\": 0.8\n}}",
        high_risk = high_risk_categories.join(", "),
    );

    let reply = llm
        .generate(JSON_SYSTEM_PROMPT, &prompt, 100, 0.5)
        .await
        .map_err(|e| AppError::Classification(format!("OpenAI API call failed: {}", e)))?;

    let parsed = parse_json_reply(
        &reply,
        "OpenAI did not return valid JSON for high-risk similarity score.",
    )?;
    required_score(&parsed, "high_risk_similarity_score")
}

/// Unwraps a reply that arrived inside a Markdown code fence.
pub(crate) fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    match rest.split_once('\n') {
        Some((tag, body)) if !tag.trim_start().starts_with('{') => body.trim(),
        _ => rest.trim(),
    }
}

fn parse_json_reply(reply: &str, invalid_message: &str) -> Result<Value, AppError> {
    let value: Value = serde_json::from_str(strip_code_fence(reply)).map_err(|e| {
        tracing::warn!("Unparseable model reply ({}): {}", e, reply);
        AppError::Classification(invalid_message.to_string())
    })?;
    if !value.is_object() {
        return Err(AppError::Classification(invalid_message.to_string()));
    }
    Ok(value)
}

fn required_str(value: &Value, field: &str) -> Result<String, AppError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::Classification(format!("Model reply is missing string field '{}'", field))
        })
}

fn required_score(value: &Value, field: &str) -> Result<f64, AppError> {
    let score = value.get(field).and_then(Value::as_f64).ok_or_else(|| {
        AppError::Classification(format!("Model reply is missing numeric field '{}'", field))
    })?;
    if !(0.0..=1.0).contains(&score) {
        return Err(AppError::Classification(format!(
            "Model reply field '{}' is out of range: {}",
            field, score
        )));
    }
    Ok(score)
}
