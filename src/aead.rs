//! AEAD adapter over a remote KMS key

use crate::encryption_context::EncryptionContextName;
use crate::error::{Error, Result};
use crate::kms::{DecryptRequest, EncryptRequest, KmsApi};
use crate::Aead;
use async_trait::async_trait;
use log::debug;
use metrics::{counter, histogram};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// An [`Aead`] whose key lives in AWS KMS
///
/// Associated data is never part of the ciphertext. It is bound through the
/// request's `EncryptionContext` under the configured
/// [`EncryptionContextName`], hex encoded, so the service authenticates it
/// and refuses to decrypt under any other value.
pub struct AwsAead {
    key_arn: String,
    kms: Arc<dyn KmsApi>,
    encryption_context_name: EncryptionContextName,
    timeout: Option<Duration>,
}

impl AwsAead {
    /// Creates an adapter for `key_arn` (the key URI without `aws-kms://`)
    pub fn new(
        key_arn: impl Into<String>,
        kms: Arc<dyn KmsApi>,
        encryption_context_name: EncryptionContextName,
    ) -> Self {
        Self {
            key_arn: key_arn.into(),
            kms,
            encryption_context_name,
            timeout: None,
        }
    }

    /// Bounds each remote round trip by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the ARN of the key this adapter encrypts under
    pub fn key_arn(&self) -> &str {
        &self.key_arn
    }

    /// Returns the encryption context name associated data is bound under
    pub fn encryption_context_name(&self) -> EncryptionContextName {
        self.encryption_context_name
    }

    async fn round_trip<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| Error::Timeout(timeout))?,
            None => call.await,
        }
    }
}

impl fmt::Debug for AwsAead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsAead")
            .field("key_arn", &self.key_arn)
            .field("encryption_context_name", &self.encryption_context_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Aead for AwsAead {
    async fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        counter!("awskms.aead.encrypt", 1);
        let start = Instant::now();

        let request = EncryptRequest {
            key_id: self.key_arn.clone(),
            plaintext: plaintext.to_vec(),
            encryption_context: self.encryption_context_name.encryption_context(associated_data),
        };

        let result = self.round_trip(self.kms.encrypt(request)).await;
        histogram!("awskms.aead.encrypt.time", start.elapsed());

        let response = result.map_err(|e| {
            debug!("encrypt with key {} failed: {}", self.key_arn, e);
            e
        })?;

        Ok(response.ciphertext_blob)
    }

    async fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        counter!("awskms.aead.decrypt", 1);
        let start = Instant::now();

        let request = DecryptRequest {
            key_id: self.key_arn.clone(),
            ciphertext_blob: ciphertext.to_vec(),
            encryption_context: self.encryption_context_name.encryption_context(associated_data),
        };

        let result = self.round_trip(self.kms.decrypt(request)).await;
        histogram!("awskms.aead.decrypt.time", start.elapsed());

        let response = result.map_err(|e| {
            debug!("decrypt with key {} failed: {}", self.key_arn, e);
            e
        })?;

        match response.key_id {
            Some(key_id) if key_id == self.key_arn => Ok(response.plaintext),
            other => Err(Error::WrongKeyId {
                expected: self.key_arn.clone(),
                got: other.unwrap_or_default(),
            }),
        }
    }
}
