use axum::{
    extract::{FromRequest, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use std::time::Duration;

use crate::adverse_media::RetryPolicy;
use crate::auth::StaticKeyStore;
use crate::categories::StaticCategorySource;
use crate::config::Config;
use crate::enrichment::EnrichmentPipeline;
use crate::errors::AppError;
use crate::metadata_scraper::HttpMetadataScraper;
use crate::models::*;
use crate::services::{NewsApiService, OpenAiService, RdapService};
use crate::traits::{CredentialStore, TextGenerator};

const SOP_SYSTEM_PROMPT: &str = "You are an expert in generating well-structured SOPs for businesses.";

/// `Json` extractor whose rejections (bad JSON, wrong content type, oversized
/// body) render as `{"error": ...}` with status 400.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Scrape → classify → score → enrich pipeline.
    pub pipeline: EnrichmentPipeline,
    /// Text generator, also used directly by SOP generation.
    pub llm: Arc<dyn TextGenerator>,
    /// Authorized API key pairs.
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    /// Wires the production capability clients from configuration.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let llm: Arc<dyn TextGenerator> = Arc::new(OpenAiService::new(&config)?);
        let scraper = HttpMetadataScraper::new(Duration::from_secs(config.scrape_timeout_secs))?;
        let categories = StaticCategorySource::load(
            config.categories_file.as_deref(),
            config.high_risk_categories_file.as_deref(),
        )?;

        let pipeline = EnrichmentPipeline::new(
            Arc::new(scraper),
            llm.clone(),
            Arc::new(NewsApiService::new(&config)?),
            Arc::new(RdapService::new(&config)?),
            Arc::new(categories),
        )
        .with_retry(RetryPolicy::new(
            3,
            Duration::from_millis(config.sentiment_retry_delay_ms),
        ));

        Ok(Self {
            credentials: Arc::new(StaticKeyStore::new(&config.api_keys)),
            config,
            pipeline,
            llm,
        })
    }
}

/// Health check endpoint.
///
/// Returns the service status and version. Never authenticated.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// POST /enrich
///
/// Scrapes, classifies and scores the business behind an email or domain,
/// then prunes the profile with `selected_fields`.
#[utoipa::path(
    post,
    path = "/enrich",
    request_body = EnrichmentRequest,
    responses(
        (status = 200, description = "Field-filtered enrichment profile", body = EnrichmentResponse),
        (status = 400, description = "input_string missing, empty or null, or malformed body", body = ErrorBody),
        (status = 403, description = "Invalid API key pair", body = ErrorBody),
        (status = 500, description = "Scrape or classification failure", body = ErrorBody)
    ),
    params(
        ("X-API-Key" = String, Header, description = "API key"),
        ("X-Secret-Key" = String, Header, description = "Secret paired with the API key")
    )
)]
pub async fn scrape_metadata(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<EnrichmentRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!(
        "POST /enrich - input: {:?}, whois: {}, adverse_media: {}",
        request.input_string,
        request.include_whois,
        request.include_adverse_media
    );

    let response = state.pipeline.run(&request).await?;
    Ok(Json(response))
}

/// POST /api/generate_sop
///
/// Drafts a standard operating procedure from a free-text prompt.
#[utoipa::path(
    post,
    path = "/api/generate_sop",
    request_body = SopRequest,
    responses(
        (status = 200, description = "Generated SOP", body = SopResponse),
        (status = 400, description = "Prompt missing or malformed body", body = ErrorBody),
        (status = 403, description = "Invalid API key pair", body = ErrorBody),
        (status = 502, description = "Model call failed", body = ErrorBody)
    )
)]
pub async fn generate_sop(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<SopRequest>,
) -> Result<Json<SopResponse>, AppError> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("The prompt is required.".to_string()));
    }

    let user_prompt = format!(
        "Create a detailed and formatted SOP based on the following prompt: {}",
        prompt
    );
    let sop_document = state
        .llm
        .generate(SOP_SYSTEM_PROMPT, &user_prompt, 1000, 0.7)
        .await
        .map_err(|e| AppError::ExternalApi(format!("OpenAI API call failed: {}", e)))?;

    Ok(Json(SopResponse {
        status: "success".to_string(),
        sop_document,
    }))
}
