use utoipa::OpenApi;

use crate::handlers;
use crate::models::{
    AdverseMediaArticle, AdverseMediaResult, AiResponse, ClassificationResult, EnrichmentRequest,
    EnrichmentResponse, ErrorBody, HealthResponse, InputKind, SiteMetadata, SopRequest,
    SopResponse, WhoisData,
};

/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::scrape_metadata, handlers::generate_sop),
    components(schemas(
        EnrichmentRequest,
        EnrichmentResponse,
        InputKind,
        SiteMetadata,
        ClassificationResult,
        AiResponse,
        AdverseMediaArticle,
        AdverseMediaResult,
        WhoisData,
        SopRequest,
        SopResponse,
        HealthResponse,
        ErrorBody
    )),
    tags((name = "enrichment", description = "Business intelligence enrichment"))
)]
pub struct ApiDoc;
