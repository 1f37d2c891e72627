//! Remote key management service handles
//!
//! [`KmsApi`] is the narrow seam between the AEAD adapter and a concrete KMS
//! client. Implementations live in:
//!
//! - `plugins::aws_v1::kms`: AWS SDK v1 (rusoto)
//! - `plugins::aws_v2::kms`: AWS SDK v2 (aws-sdk-kms)
//! - [`StaticKms`]: an in-memory service for testing and development

mod static_kms;

pub use static_kms::StaticKms;

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Input of a KMS `Encrypt` call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncryptRequest {
    /// Key ARN to encrypt under
    pub key_id: String,

    /// Data to encrypt
    pub plaintext: Vec<u8>,

    /// Encryption context bound to the ciphertext
    pub encryption_context: Option<HashMap<String, String>>,
}

/// Output of a KMS `Encrypt` call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncryptResponse {
    /// ARN of the key that encrypted the data
    pub key_id: Option<String>,

    /// The encrypted data
    pub ciphertext_blob: Vec<u8>,
}

/// Input of a KMS `Decrypt` call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecryptRequest {
    /// Key ARN the ciphertext is expected to be encrypted under
    pub key_id: String,

    /// Data to decrypt
    pub ciphertext_blob: Vec<u8>,

    /// Encryption context that was bound at encryption time
    pub encryption_context: Option<HashMap<String, String>>,
}

/// Output of a KMS `Decrypt` call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecryptResponse {
    /// ARN of the key that decrypted the data
    pub key_id: Option<String>,

    /// The decrypted data
    pub plaintext: Vec<u8>,
}

/// Remote KMS handle
///
/// Each call is exactly one request to the service. Implementations must not
/// retry on their own behalf beyond what the underlying SDK transport does.
#[async_trait]
pub trait KmsApi: Send + Sync {
    /// Encrypts data using a KMS key
    async fn encrypt(&self, request: EncryptRequest) -> Result<EncryptResponse>;

    /// Decrypts data that was encrypted with a KMS key
    async fn decrypt(&self, request: DecryptRequest) -> Result<DecryptResponse>;
}
