//! Business Intelligence Enrichment API Library
//!
//! Given a domain or email, scrapes the associated website, classifies the
//! business with a language model, scores its similarity to high-risk
//! categories and optionally adds adverse-media and registration data.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `adverse_media`: News search and sentiment scoring.
//! - `auth`: API key pair validation.
//! - `categories`: Default category lists.
//! - `classifier`: Category classification and high-risk similarity.
//! - `config`: Configuration management.
//! - `enrichment`: The enrichment pipeline.
//! - `errors`: Error handling types.
//! - `field_filter`: Response pruning by field mask.
//! - `handlers`: HTTP request handlers.
//! - `input`: Email/domain normalization.
//! - `metadata_scraper`: Homepage fetching and metadata extraction.
//! - `models`: Request, response and pipeline data models.
//! - `openapi`: OpenAPI document.
//! - `routes`: Router and middleware.
//! - `services`: External service clients (OpenAI, NewsAPI, RDAP).
//! - `test_support`: Capability doubles for tests.
//! - `traits`: Capability traits.
//! - `whois`: Registration-data enrichment.

pub mod api;
pub mod core;
pub mod integrations;

pub mod adverse_media;
pub mod auth;
pub mod categories;
pub mod classifier;
pub mod config;
pub mod enrichment;
pub mod errors;
pub mod field_filter;
pub mod handlers;
pub mod input;
pub mod metadata_scraper;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod test_support;
pub mod traits;
pub mod whois;
