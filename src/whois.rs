//! Optional registration-data enrichment.

use crate::models::{WhoisData, WhoisOutcome};
use crate::traits::RegistrationLookup;

/// Looks up registration data for `domain`. Never fails: lookup errors come
/// back as an `error` object.
pub async fn fetch_registration_data(lookup: &dyn RegistrationLookup, domain: &str) -> WhoisOutcome {
    match lookup.whois(domain).await {
        Ok(record) => WhoisOutcome::Record(WhoisData::from(record)),
        Err(e) => {
            tracing::warn!("WHOIS lookup failed for {}: {}", domain, e);
            WhoisOutcome::Failed {
                error: format!("WHOIS lookup failed: {}", e),
            }
        }
    }
}
