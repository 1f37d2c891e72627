use crate::client::options::{with_encryption_context_name, with_kms, ClientOption, Descriptor};
use crate::client::{AwsClient, Generation};
use crate::encryption_context::EncryptionContextName;
use crate::error::{Error, Result};
use crate::kms::KmsApi;
use crate::uri::{has_aws_prefix, AWS_PREFIX};
use std::fmt;
use std::sync::Arc;
#[cfg(feature = "aws-v1")]
use std::path::PathBuf;
#[cfg(feature = "aws-v2")]
use crate::plugins::aws_v2::kms::V2ClientOption;

/// Builder for [`AwsClient`]
///
/// Options are applied in the order they were added. The first conflicting
/// or duplicate option fails [`build`](Self::build) and no client is
/// returned.
///
/// # Examples
///
/// ```
/// use awskms::client::AwsClientBuilder;
/// use awskms::plugins::aws_v2::kms::with_api_timeout;
/// use awskms::EncryptionContextName;
/// use std::time::Duration;
///
/// let client = AwsClientBuilder::new("aws-kms://arn:aws:kms:us-east-2:235739564943:key/")
///     .with_encryption_context_name(EncryptionContextName::AssociatedData)
///     .with_v2_kms_options(vec![with_api_timeout(Duration::from_secs(2))])
///     .build()
///     .unwrap();
/// ```
pub struct AwsClientBuilder {
    key_uri_prefix: String,
    options: Vec<ClientOption>,
}

impl AwsClientBuilder {
    /// Creates a builder for keys whose URIs start with `key_uri_prefix`.
    ///
    /// The prefix must have the form
    /// `aws-kms://arn:<partition>:kms:<region>:[<path>]`; the scheme is
    /// checked by [`build`](Self::build).
    pub fn new(key_uri_prefix: impl Into<String>) -> Self {
        Self {
            key_uri_prefix: key_uri_prefix.into(),
            options: Vec::new(),
        }
    }

    /// Appends an option
    pub fn with_option(mut self, option: ClientOption) -> Self {
        self.options.push(option);
        self
    }

    /// Appends several options, keeping their order
    pub fn with_options(mut self, options: impl IntoIterator<Item = ClientOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Uses `kms` as the legacy handle
    pub fn with_kms(self, kms: Arc<dyn KmsApi>) -> Self {
        self.with_option(with_kms(kms))
    }

    /// Builds the legacy handle from the credentials in `path`
    #[cfg(feature = "aws-v1")]
    pub fn with_credential_path(self, path: impl Into<PathBuf>) -> Self {
        self.with_option(super::options::with_credential_path(path))
    }

    /// Sets the name associated data is bound under
    pub fn with_encryption_context_name(self, name: EncryptionContextName) -> Self {
        self.with_option(with_encryption_context_name(name))
    }

    /// Selects the v2 generation with default settings
    #[cfg(feature = "aws-v2")]
    pub fn use_v2(self) -> Self {
        self.with_option(super::options::use_v2())
    }

    /// Selects the v2 generation with the given settings
    #[cfg(feature = "aws-v2")]
    pub fn with_v2_kms_options(self, options: Vec<V2ClientOption>) -> Self {
        self.with_option(super::options::with_v2_kms_options(options))
    }

    /// Validates the prefix, applies the options and returns the client.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUriPrefix`] if the prefix does not start with
    ///   `aws-kms://` (in any case)
    /// - [`Error::Config`] for duplicate or conflicting options
    /// - credential errors from options that read a credential file
    pub fn build(self) -> Result<AwsClient> {
        if !has_aws_prefix(&self.key_uri_prefix) {
            return Err(Error::InvalidUriPrefix {
                expected: AWS_PREFIX,
                got: self.key_uri_prefix,
            });
        }

        let mut descriptor = Descriptor::default();
        for option in self.options {
            descriptor.apply(&self.key_uri_prefix, option)?;
        }

        let encryption_context_name = descriptor.encryption_context_name.unwrap_or_default();

        #[cfg(feature = "aws-v2")]
        if let Some(v2) = descriptor.v2 {
            let kms = v2.kms();
            return Ok(AwsClient::new(
                self.key_uri_prefix,
                encryption_context_name,
                Generation::V2(v2),
                kms,
            ));
        }

        Ok(AwsClient::new(
            self.key_uri_prefix,
            encryption_context_name,
            Generation::Legacy,
            descriptor.kms,
        ))
    }
}

impl fmt::Debug for AwsClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsClientBuilder")
            .field("key_uri_prefix", &self.key_uri_prefix)
            .field("options", &self.options)
            .finish()
    }
}

/// Creates a client for `key_uri_prefix` with `options` applied in order.
///
/// By default the client uses the legacy generation with default
/// credentials and binds associated data under
/// [`EncryptionContextName::AssociatedData`].
pub fn new_client_with_options(
    key_uri_prefix: impl Into<String>,
    options: impl IntoIterator<Item = ClientOption>,
) -> Result<AwsClient> {
    AwsClientBuilder::new(key_uri_prefix)
        .with_options(options)
        .build()
}

/// Creates a legacy client using default credentials.
///
/// AEADs produced by this client bind associated data under
/// [`EncryptionContextName::LegacyAdditionalData`].
#[deprecated(note = "use new_client_with_options or AwsClientBuilder instead")]
pub fn new_client(key_uri_prefix: impl Into<String>) -> Result<AwsClient> {
    new_client_with_options(
        key_uri_prefix,
        [with_encryption_context_name(EncryptionContextName::LegacyAdditionalData)],
    )
}

/// Creates a legacy client using the credentials in `credential_path`.
///
/// AEADs produced by this client bind associated data under
/// [`EncryptionContextName::LegacyAdditionalData`].
#[cfg(feature = "aws-v1")]
#[deprecated(note = "use new_client_with_options with with_credential_path instead")]
pub fn new_client_with_credentials(
    key_uri_prefix: impl Into<String>,
    credential_path: impl Into<PathBuf>,
) -> Result<AwsClient> {
    new_client_with_options(
        key_uri_prefix,
        [
            super::options::with_credential_path(credential_path),
            with_encryption_context_name(EncryptionContextName::LegacyAdditionalData),
        ],
    )
}

/// Creates a legacy client around an existing handle.
///
/// AEADs produced by this client bind associated data under
/// [`EncryptionContextName::LegacyAdditionalData`].
#[deprecated(note = "use new_client_with_options with with_kms instead")]
pub fn new_client_with_kms(
    key_uri_prefix: impl Into<String>,
    kms: Arc<dyn KmsApi>,
) -> Result<AwsClient> {
    new_client_with_options(
        key_uri_prefix,
        [
            with_kms(kms),
            with_encryption_context_name(EncryptionContextName::LegacyAdditionalData),
        ],
    )
}
