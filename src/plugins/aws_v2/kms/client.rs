use crate::error::{Error, Result};
use crate::kms::{DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, KmsApi};
use async_trait::async_trait;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::Client as AwsSdkKmsClient;
use std::fmt;

/// Standard implementation of [`KmsApi`] using AWS SDK v2
#[derive(Clone)]
pub struct SdkKms {
    /// AWS SDK KMS client
    client: AwsSdkKmsClient,
}

impl SdkKms {
    /// Wraps an existing SDK client
    pub fn new(client: AwsSdkKmsClient) -> Self {
        Self { client }
    }

    /// Returns the region the SDK client is configured for, if any
    pub fn region(&self) -> Option<&str> {
        self.client.config().region().map(|r| r.as_ref())
    }
}

impl fmt::Debug for SdkKms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkKms")
            .field("region", &self.region())
            .finish()
    }
}

#[async_trait]
impl KmsApi for SdkKms {
    async fn encrypt(&self, request: EncryptRequest) -> Result<EncryptResponse> {
        let result = self
            .client
            .encrypt()
            .key_id(request.key_id)
            .plaintext(Blob::new(request.plaintext))
            .set_encryption_context(request.encryption_context)
            .send()
            .await
            .map_err(|e| Error::Kms(format!("KMS encrypt error: {}", DisplayErrorContext(&e))))?;

        let ciphertext_blob = result
            .ciphertext_blob()
            .map(|b| b.as_ref().to_vec())
            .ok_or_else(|| Error::Kms("No ciphertext blob returned from KMS".into()))?;

        Ok(EncryptResponse {
            key_id: result.key_id().map(str::to_string),
            ciphertext_blob,
        })
    }

    async fn decrypt(&self, request: DecryptRequest) -> Result<DecryptResponse> {
        let result = self
            .client
            .decrypt()
            .key_id(request.key_id)
            .ciphertext_blob(Blob::new(request.ciphertext_blob))
            .set_encryption_context(request.encryption_context)
            .send()
            .await
            .map_err(|e| Error::Kms(format!("KMS decrypt error: {}", DisplayErrorContext(&e))))?;

        let plaintext = result
            .plaintext()
            .map(|b| b.as_ref().to_vec())
            .ok_or_else(|| Error::Kms("No plaintext returned from KMS".into()))?;

        Ok(DecryptResponse {
            key_id: result.key_id().map(str::to_string),
            plaintext,
        })
    }
}
