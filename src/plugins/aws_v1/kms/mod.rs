//! AWS KMS handle construction using AWS SDK v1
//!
//! Handles are bound to the region named in the client's key URI prefix.
//! Credentials come from the rusoto default chain (environment, shared
//! profile, container or instance metadata) unless explicit credential
//! material is supplied.

use crate::credentials::CredentialMaterial;
use crate::error::{Error, Result};
use crate::uri::region_from_uri;
use log::debug;
use rusoto_core::credential::{DefaultCredentialsProvider, StaticProvider};
use rusoto_core::{HttpClient, Region};
use rusoto_kms::KmsClient as RusotoKmsClient;
use std::str::FromStr;

mod client;
pub use client::RusotoKms;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;

/// Builds a handle for the region in `key_uri_prefix` using default credentials
pub fn new_kms(key_uri_prefix: &str) -> Result<RusotoKms> {
    let region = region_for(key_uri_prefix)?;

    let dispatcher = http_client()?;
    let provider = DefaultCredentialsProvider::new()
        .map_err(|e| Error::Kms(format!("Failed to create credentials provider: {}", e)))?;

    debug!("building rusoto KMS handle with default credentials in {}", region.name());

    let client = RusotoKmsClient::new_with(dispatcher, provider, region.clone());
    Ok(RusotoKms::new(client, region))
}

/// Builds a handle for the region in `key_uri_prefix` using `credentials`
pub fn new_kms_with_credentials(
    key_uri_prefix: &str,
    credentials: &CredentialMaterial,
) -> Result<RusotoKms> {
    let region = region_for(key_uri_prefix)?;

    let dispatcher = http_client()?;
    let provider = StaticProvider::new(
        credentials.access_key_id().to_string(),
        credentials.secret_access_key().to_string(),
        credentials.session_token().map(str::to_string),
        None,
    );

    debug!("building rusoto KMS handle with static credentials in {}", region.name());

    let client = RusotoKmsClient::new_with(dispatcher, provider, region.clone());
    Ok(RusotoKms::new(client, region))
}

fn http_client() -> Result<HttpClient> {
    HttpClient::new().map_err(|e| Error::Kms(format!("Failed to create HTTP client: {}", e)))
}

/// Maps the region in a key URI onto a rusoto region.
///
/// Regions rusoto does not know yet get the standard KMS endpoint.
pub(crate) fn region_for(key_uri: &str) -> Result<Region> {
    let name = region_from_uri(key_uri)?;

    Ok(Region::from_str(&name).unwrap_or_else(|_| {
        let endpoint = if name.starts_with("cn-") {
            format!("https://kms.{}.amazonaws.com.cn", name)
        } else {
            format!("https://kms.{}.amazonaws.com", name)
        };
        Region::Custom { name, endpoint }
    }))
}
