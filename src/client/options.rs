use crate::encryption_context::EncryptionContextName;
use crate::error::{Error, Result};
use crate::kms::KmsApi;
#[cfg(feature = "aws-v2")]
use crate::plugins::aws_v2::kms::{V2ClientOption, V2KmsBuilder};
use log::debug;
use std::fmt;
#[cfg(feature = "aws-v1")]
use std::path::PathBuf;
use std::sync::Arc;

/// A single client setting, applied in order by
/// [`AwsClientBuilder`](super::AwsClientBuilder)
pub enum ClientOption {
    /// Legacy handle built from a credential file
    #[cfg(feature = "aws-v1")]
    CredentialPath(PathBuf),
    /// Pre-built legacy handle
    Kms(Arc<dyn KmsApi>),
    /// Name associated data is bound under
    EncryptionContextName(EncryptionContextName),
    /// Selects the v2 generation with the given settings
    #[cfg(feature = "aws-v2")]
    V2(Vec<V2ClientOption>),
}

impl fmt::Debug for ClientOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "aws-v1")]
            ClientOption::CredentialPath(path) => f.debug_tuple("CredentialPath").field(path).finish(),
            ClientOption::Kms(_) => f.write_str("Kms"),
            ClientOption::EncryptionContextName(name) => {
                f.debug_tuple("EncryptionContextName").field(name).finish()
            }
            #[cfg(feature = "aws-v2")]
            ClientOption::V2(options) => f.debug_tuple("V2").field(options).finish(),
        }
    }
}

/// Builds the legacy handle from the credentials in `path`.
///
/// `path` may be a CSV file from the IAM console or a shared credentials
/// file, whose `default` profile is used. The file is read and the region is
/// taken from the key URI prefix when the client is built.
#[cfg(feature = "aws-v1")]
pub fn with_credential_path(path: impl Into<PathBuf>) -> ClientOption {
    ClientOption::CredentialPath(path.into())
}

/// Uses `kms` as the legacy handle.
///
/// The caller must make sure the handle's region matches the region of the
/// key URIs passed to the client, otherwise requests fail.
pub fn with_kms(kms: Arc<dyn KmsApi>) -> ClientOption {
    ClientOption::Kms(kms)
}

/// Sets the name associated data is bound under.
///
/// Defaults to [`EncryptionContextName::AssociatedData`].
pub fn with_encryption_context_name(name: EncryptionContextName) -> ClientOption {
    ClientOption::EncryptionContextName(name)
}

/// Selects the v2 generation with default settings
#[cfg(feature = "aws-v2")]
pub fn use_v2() -> ClientOption {
    ClientOption::V2(Vec::new())
}

/// Selects the v2 generation with the given settings
#[cfg(feature = "aws-v2")]
pub fn with_v2_kms_options(options: Vec<V2ClientOption>) -> ClientOption {
    ClientOption::V2(options)
}

/// Client settings accumulated while options are applied
#[derive(Default)]
pub(crate) struct Descriptor {
    pub(crate) kms: Option<Arc<dyn KmsApi>>,
    pub(crate) encryption_context_name: Option<EncryptionContextName>,
    #[cfg(feature = "aws-v2")]
    pub(crate) v2: Option<V2KmsBuilder>,
}

impl Descriptor {
    pub(crate) fn apply(&mut self, key_uri_prefix: &str, option: ClientOption) -> Result<()> {
        match option {
            #[cfg(feature = "aws-v1")]
            ClientOption::CredentialPath(path) => {
                self.check_legacy_handle_unset("credential path")?;
                let creds = crate::credentials::resolve_credential_path(&path)?;
                let kms = crate::plugins::aws_v1::kms::new_kms_with_credentials(key_uri_prefix, &creds)?;
                self.kms = Some(Arc::new(kms));
            }
            ClientOption::Kms(kms) => {
                self.check_legacy_handle_unset("KMS handle")?;
                self.kms = Some(kms);
            }
            ClientOption::EncryptionContextName(name) => {
                if self.encryption_context_name.is_some() {
                    return Err(Error::Config("encryption context name already set".into()));
                }
                self.encryption_context_name = Some(name);
            }
            #[cfg(feature = "aws-v2")]
            ClientOption::V2(options) => {
                if self.v2.is_some() {
                    return Err(Error::Config("v2 generation already selected".into()));
                }
                if self.kms.is_some() {
                    return Err(Error::Config(
                        "v2 generation cannot be selected, legacy KMS handle already set".into(),
                    ));
                }

                let mut builder = V2KmsBuilder::new();
                for option in options {
                    builder.apply(option)?;
                }

                debug!("selected v2 generation for {}: {:?}", key_uri_prefix, builder);
                self.v2 = Some(builder);
            }
        }

        Ok(())
    }

    fn check_legacy_handle_unset(&self, name: &str) -> Result<()> {
        if self.kms.is_some() {
            return Err(Error::Config(format!(
                "{} cannot be used, KMS handle already set",
                name
            )));
        }

        #[cfg(feature = "aws-v2")]
        if self.v2.is_some() {
            return Err(Error::Config(format!(
                "{} cannot be used, v2 generation already selected",
                name
            )));
        }

        Ok(())
    }
}
