use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ApiKeyPair;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::traits::CredentialStore;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const SECRET_KEY_HEADER: &str = "X-Secret-Key";

/// Key pairs from configuration. Secrets are kept only as SHA-256 digests.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyStore {
    secret_digests: HashMap<String, String>,
}

impl StaticKeyStore {
    pub fn new(pairs: &[ApiKeyPair]) -> Self {
        let secret_digests = pairs
            .iter()
            .map(|pair| (pair.api_key.clone(), digest(&pair.secret_key)))
            .collect();
        Self { secret_digests }
    }
}

impl CredentialStore for StaticKeyStore {
    fn is_authorized(&self, api_key: &str, secret_key: &str) -> bool {
        self.secret_digests
            .get(api_key)
            .is_some_and(|expected| constant_time_compare(&digest(secret_key), expected))
    }
}

fn digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time string comparison
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Rejects requests whose `X-API-Key`/`X-Secret-Key` pair is not authorized.
///
/// Preflight `OPTIONS` requests pass through untouched.
pub async fn require_api_keys(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let authorized = match (
        header(request.headers(), API_KEY_HEADER),
        header(request.headers(), SECRET_KEY_HEADER),
    ) {
        (Some(api_key), Some(secret_key)) => state.credentials.is_authorized(api_key, secret_key),
        _ => false,
    };

    if !authorized {
        return Err(AppError::Unauthorized(format!(
            "rejected {} {}",
            request.method(),
            request.uri().path()
        )));
    }

    Ok(next.run(request).await)
}
