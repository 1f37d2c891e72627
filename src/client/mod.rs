//! Key URI client
//!
//! An [`AwsClient`] serves every key URI under one prefix. The KMS handle is
//! either supplied through an option or built on first use by the selected
//! SDK generation, then shared by every AEAD the client returns.

mod builder;
mod options;

pub use builder::{new_client_with_options, AwsClientBuilder};
#[allow(deprecated)]
pub use builder::{new_client, new_client_with_kms};
#[cfg(feature = "aws-v1")]
#[allow(deprecated)]
pub use builder::new_client_with_credentials;
pub use options::{with_encryption_context_name, with_kms, ClientOption};
#[cfg(feature = "aws-v1")]
pub use options::with_credential_path;
#[cfg(feature = "aws-v2")]
pub use options::{use_v2, with_v2_kms_options};

use crate::aead::AwsAead;
use crate::encryption_context::EncryptionContextName;
use crate::error::{Error, Result};
use crate::kms::KmsApi;
#[cfg(feature = "aws-v2")]
use crate::plugins::aws_v2::kms::V2KmsBuilder;
use crate::uri::key_arn;
use crate::{Aead, KmsClient};
use async_trait::async_trait;
use log::debug;
use metrics::counter;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Strategy used to build the KMS handle when none was supplied
pub(crate) enum Generation {
    /// AWS SDK v1 (rusoto), default credentials, region from the prefix
    Legacy,
    /// AWS SDK v2 with its settings
    #[cfg(feature = "aws-v2")]
    V2(V2KmsBuilder),
}

impl Generation {
    async fn build_kms(&self, key_uri_prefix: &str) -> Result<Arc<dyn KmsApi>> {
        match self {
            #[cfg(feature = "aws-v1")]
            Generation::Legacy => Ok(Arc::new(crate::plugins::aws_v1::kms::new_kms(
                key_uri_prefix,
            )?)),
            #[cfg(not(feature = "aws-v1"))]
            Generation::Legacy => Err(Error::Internal(format!(
                "cannot build a legacy KMS handle for {} without the aws-v1 feature",
                key_uri_prefix
            ))),
            #[cfg(feature = "aws-v2")]
            Generation::V2(builder) => builder.build(key_uri_prefix).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Generation::Legacy => "legacy",
            #[cfg(feature = "aws-v2")]
            Generation::V2(_) => "v2",
        }
    }
}

/// A [`KmsClient`] for keys in AWS KMS
///
/// Created by [`AwsClientBuilder`] and immutable afterwards, apart from the
/// KMS handle, which is built at most once even under concurrent first use.
pub struct AwsClient {
    key_uri_prefix: String,
    encryption_context_name: EncryptionContextName,
    generation: Generation,
    kms: OnceCell<Arc<dyn KmsApi>>,
}

impl AwsClient {
    pub(crate) fn new(
        key_uri_prefix: String,
        encryption_context_name: EncryptionContextName,
        generation: Generation,
        kms: Option<Arc<dyn KmsApi>>,
    ) -> Self {
        Self {
            key_uri_prefix,
            encryption_context_name,
            generation,
            kms: OnceCell::new_with(kms),
        }
    }

    /// Returns a builder for keys whose URIs start with `key_uri_prefix`
    pub fn builder(key_uri_prefix: impl Into<String>) -> AwsClientBuilder {
        AwsClientBuilder::new(key_uri_prefix)
    }

    /// Returns the key URI prefix this client serves
    pub fn key_uri_prefix(&self) -> &str {
        &self.key_uri_prefix
    }

    /// Returns the name associated data is bound under
    pub fn encryption_context_name(&self) -> EncryptionContextName {
        self.encryption_context_name
    }

    /// Returns true if the v2 generation was selected
    pub fn uses_v2(&self) -> bool {
        !matches!(self.generation, Generation::Legacy)
    }

    async fn kms(&self) -> Result<Arc<dyn KmsApi>> {
        self.kms
            .get_or_try_init(|| async {
                debug!(
                    "building {} KMS handle for {}",
                    self.generation.name(),
                    self.key_uri_prefix
                );
                let kms = self.generation.build_kms(&self.key_uri_prefix).await?;
                counter!("awskms.client.handle_built", 1);
                Ok::<_, Error>(kms)
            })
            .await
            .map(Arc::clone)
    }
}

impl fmt::Debug for AwsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsClient")
            .field("key_uri_prefix", &self.key_uri_prefix)
            .field("encryption_context_name", &self.encryption_context_name)
            .field("generation", &self.generation.name())
            .field("kms_ready", &self.kms.initialized())
            .finish()
    }
}

#[async_trait]
impl KmsClient for AwsClient {
    /// Byte-exact prefix check; unlike the prefix validation at build time,
    /// this is case-sensitive.
    fn supported(&self, key_uri: &str) -> bool {
        key_uri.starts_with(&self.key_uri_prefix)
    }

    async fn get_aead(&self, key_uri: &str) -> Result<Arc<dyn Aead>> {
        if !self.supported(key_uri) {
            return Err(Error::UnsupportedKeyUri {
                expected: self.key_uri_prefix.clone(),
                got: key_uri.to_string(),
            });
        }

        let kms = self.kms().await?;
        let aead = AwsAead::new(key_arn(key_uri), kms, self.encryption_context_name);

        let aead = match &self.generation {
            Generation::Legacy => aead,
            #[cfg(feature = "aws-v2")]
            Generation::V2(builder) => aead.with_timeout(builder.timeout()),
        };

        Ok(Arc::new(aead))
    }
}
