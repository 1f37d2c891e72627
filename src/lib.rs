//! # AWS KMS Integration
//!
//! `awskms` exposes keys held in AWS KMS as local [`Aead`] primitives. A
//! [`KmsClient`] is bound to a key URI prefix such as
//! `aws-kms://arn:aws:kms:us-east-2:235739564943:key/`; every key URI under
//! that prefix resolves to an [`Aead`] whose encrypt and decrypt calls are
//! single round trips to the service. Key material never leaves KMS.
//!
//! Two generations of the AWS SDK are supported side by side:
//!
//! - the legacy generation, built on rusoto (feature `aws-v1`), which is the
//!   default strategy of a client
//! - the newer generation, built on `aws-sdk-kms` (feature `aws-v2`), selected
//!   with [`client::use_v2`] or [`client::with_v2_kms_options`]
//!
//! Associated data is bound through the KMS `EncryptionContext` rather than
//! the ciphertext; see [`EncryptionContextName`].
//!
//! ## Basic Usage
//!
//! ```rust
//! use awskms::client::{with_kms, AwsClientBuilder};
//! use awskms::kms::StaticKms;
//! use awskms::KmsClient;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let key_uri = "aws-kms://arn:aws:kms:us-east-2:235739564943:key/3ee50705-5a82-4f5b-9753-05c4f473922f";
//!
//! // StaticKms stands in for the real service
//! let kms = Arc::new(StaticKms::new(["arn:aws:kms:us-east-2:235739564943:key/3ee50705-5a82-4f5b-9753-05c4f473922f"]));
//!
//! let client = AwsClientBuilder::new("aws-kms://arn:aws:kms:us-east-2:235739564943:key/")
//!     .with_option(with_kms(kms))
//!     .build()?;
//!
//! let aead = client.get_aead(key_uri).await?;
//!
//! let ciphertext = aead.encrypt(b"secret data", b"context").await?;
//! let plaintext = aead.decrypt(&ciphertext, b"context").await?;
//! assert_eq!(plaintext, b"secret data");
//! # Ok(())
//! # }
//! ```

pub mod aead;
pub mod client;
pub mod credentials;
pub mod encryption_context;
pub mod error;
pub mod kms;
pub mod uri;

// SDK specific KMS handles
pub mod plugins;

// Re-export key types
pub use crate::aead::AwsAead;
pub use crate::client::{new_client_with_options, AwsClient, AwsClientBuilder, ClientOption};
pub use crate::credentials::CredentialMaterial;
pub use crate::encryption_context::EncryptionContextName;
pub use crate::error::{Error, Result};
pub use crate::kms::{KmsApi, StaticKms};

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// AEAD (Authenticated Encryption with Associated Data) interface
///
/// Associated data is authenticated but not encrypted. Empty associated data
/// is a valid value.
#[async_trait]
pub trait Aead: Send + Sync + fmt::Debug {
    /// Encrypts `plaintext`, binding `associated_data` to the ciphertext
    async fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts `ciphertext`; fails unless `associated_data` matches the
    /// value used at encryption
    async fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;
}

/// Key Management Service client interface for resolving key URIs
#[async_trait]
pub trait KmsClient: Send + Sync + fmt::Debug {
    /// Returns true if this client handles `key_uri`
    fn supported(&self, key_uri: &str) -> bool;

    /// Returns an [`Aead`] backed by the key `key_uri` names
    async fn get_aead(&self, key_uri: &str) -> Result<Arc<dyn Aead>>;
}
