//! AWS KMS handle using AWS SDK v1
//!
//! This module wraps the rusoto KMS client behind [`KmsApi`].

use crate::error::{Error, Result};
use crate::kms::{DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, KmsApi};
use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_kms::{Kms, KmsClient as RusotoKmsClient};
use std::fmt;

/// Standard implementation of [`KmsApi`] using the rusoto SDK
pub struct RusotoKms {
    /// rusoto KMS client
    client: RusotoKmsClient,

    /// AWS region for this client
    region: Region,
}

impl RusotoKms {
    /// Wraps an existing rusoto client
    pub fn new(client: RusotoKmsClient, region: Region) -> Self {
        Self { client, region }
    }

    /// Returns the region requests are sent to
    pub fn region(&self) -> &Region {
        &self.region
    }
}

impl fmt::Debug for RusotoKms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RusotoKms")
            .field("region", &self.region)
            .finish()
    }
}

#[async_trait]
impl KmsApi for RusotoKms {
    async fn encrypt(&self, request: EncryptRequest) -> Result<EncryptResponse> {
        let input = rusoto_kms::EncryptRequest {
            key_id: request.key_id,
            plaintext: request.plaintext.into(),
            encryption_context: request.encryption_context,
            ..Default::default()
        };

        let output = self
            .client
            .encrypt(input)
            .await
            .map_err(|e| Error::Kms(format!("KMS encrypt error: {}", e)))?;

        let ciphertext_blob = output
            .ciphertext_blob
            .map(|b| b.to_vec())
            .ok_or_else(|| Error::Kms("No ciphertext blob returned from KMS".into()))?;

        Ok(EncryptResponse {
            key_id: output.key_id,
            ciphertext_blob,
        })
    }

    async fn decrypt(&self, request: DecryptRequest) -> Result<DecryptResponse> {
        let input = rusoto_kms::DecryptRequest {
            key_id: Some(request.key_id),
            ciphertext_blob: request.ciphertext_blob.into(),
            encryption_context: request.encryption_context,
            ..Default::default()
        };

        let output = self
            .client
            .decrypt(input)
            .await
            .map_err(|e| Error::Kms(format!("KMS decrypt error: {}", e)))?;

        let plaintext = output
            .plaintext
            .map(|b| b.to_vec())
            .ok_or_else(|| Error::Kms("No plaintext returned from KMS".into()))?;

        Ok(DecryptResponse {
            key_id: output.key_id,
            plaintext,
        })
    }
}
