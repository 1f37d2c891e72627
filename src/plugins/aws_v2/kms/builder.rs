use crate::credentials::{resolve_credential_path, CredentialMaterial};
use crate::error::{Error, Result};
use crate::kms::KmsApi;
use crate::plugins::aws_v2::kms::client::SdkKms;
use crate::uri::region_from_uri;
use aws_config::{BehaviorVersion, ConfigLoader};
use aws_sdk_kms::config::{Credentials, Region};
use aws_sdk_kms::Client as AwsSdkKmsClient;
use log::debug;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Timeout applied to config loading and to each request when none is set
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Provider name reported for credentials read from a credential file
const CREDENTIAL_FILE_PROVIDER: &str = "awskms-credential-file";

/// Adjusts the loader used to build the AWS SDK configuration
pub type LoadOption = Arc<dyn Fn(ConfigLoader) -> ConfigLoader + Send + Sync>;

/// Adjusts the KMS client configuration derived from the SDK configuration
pub type KmsOption =
    Arc<dyn Fn(aws_sdk_kms::config::Builder) -> aws_sdk_kms::config::Builder + Send + Sync>;

/// Function type that creates a KMS handle from the final KMS client configuration
pub type KmsFactory = dyn Fn(aws_sdk_kms::Config) -> Arc<dyn KmsApi> + Send + Sync;

/// Default KMS factory that creates an [`SdkKms`] from the provided config
fn default_kms_factory(config: aws_sdk_kms::Config) -> Arc<dyn KmsApi> {
    Arc::new(SdkKms::new(AwsSdkKmsClient::from_conf(config)))
}

/// A single setting of the v2 generation
///
/// Each setting may be supplied at most once per client.
pub enum V2ClientOption {
    /// Pre-built handle; no SDK configuration is loaded
    Kms(Arc<dyn KmsApi>),
    /// Time budget for config loading and for each request
    ApiTimeout(Duration),
    /// Adjustments to the SDK config loader
    LoadOptions(Vec<LoadOption>),
    /// Adjustments to the KMS client configuration
    KmsOptions(Vec<KmsOption>),
    /// Credential file (IAM CSV or shared credentials)
    CredentialPath(PathBuf),
    /// Replacement for the default handle construction
    KmsFactory(Arc<KmsFactory>),
}

impl V2ClientOption {
    fn name(&self) -> &'static str {
        match self {
            V2ClientOption::Kms(_) => "V2 KMS handle",
            V2ClientOption::ApiTimeout(_) => "API timeout",
            V2ClientOption::LoadOptions(_) => "load options",
            V2ClientOption::KmsOptions(_) => "KMS options",
            V2ClientOption::CredentialPath(_) => "credential path",
            V2ClientOption::KmsFactory(_) => "KMS factory",
        }
    }
}

impl fmt::Debug for V2ClientOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            V2ClientOption::ApiTimeout(timeout) => f.debug_tuple("ApiTimeout").field(timeout).finish(),
            V2ClientOption::LoadOptions(opts) => f.debug_tuple("LoadOptions").field(&opts.len()).finish(),
            V2ClientOption::KmsOptions(opts) => f.debug_tuple("KmsOptions").field(&opts.len()).finish(),
            V2ClientOption::CredentialPath(path) => f.debug_tuple("CredentialPath").field(path).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Uses `kms` instead of loading an SDK configuration
pub fn with_v2_kms(kms: Arc<dyn KmsApi>) -> V2ClientOption {
    V2ClientOption::Kms(kms)
}

/// Sets the time budget for config loading and for each request.
///
/// A zero duration selects [`DEFAULT_TIMEOUT`].
pub fn with_api_timeout(timeout: Duration) -> V2ClientOption {
    V2ClientOption::ApiTimeout(timeout)
}

/// Sets the adjustments applied, in order, to the SDK config loader
pub fn with_load_options(options: Vec<LoadOption>) -> V2ClientOption {
    V2ClientOption::LoadOptions(options)
}

/// Sets the adjustments applied, in order, to the KMS client configuration
pub fn with_kms_options(options: Vec<KmsOption>) -> V2ClientOption {
    V2ClientOption::KmsOptions(options)
}

/// Reads static credentials from a credential file.
///
/// `path` may be a CSV file from the IAM console or a shared credentials
/// file, whose `default` profile is used. The file is read when the client
/// is built.
pub fn with_credential_path(path: impl Into<PathBuf>) -> V2ClientOption {
    V2ClientOption::CredentialPath(path.into())
}

/// Sets a custom KMS factory function for creating the handle
///
/// This is primarily used for testing, but can also wrap the SDK client.
///
/// # Examples
///
/// ```
/// use awskms::kms::{KmsApi, StaticKms};
/// use awskms::plugins::aws_v2::kms::with_kms_factory;
/// use std::sync::Arc;
///
/// let option = with_kms_factory(|_config: aws_sdk_kms::Config| -> Arc<dyn KmsApi> {
///     Arc::new(StaticKms::new(["arn:aws:kms:us-east-2:235739564943:key/abcd-1234"]))
/// });
/// ```
pub fn with_kms_factory<F>(factory: F) -> V2ClientOption
where
    F: Fn(aws_sdk_kms::Config) -> Arc<dyn KmsApi> + Send + Sync + 'static,
{
    V2ClientOption::KmsFactory(Arc::new(factory))
}

/// Accumulated settings of the v2 generation and the lazy handle construction
///
/// A pre-built handle excludes every construction setting (credential path,
/// load options, KMS options, factory); the timeout combines with either.
///
/// Credentials read from a credential file are handed to the SDK by the
/// first successful [`build`](Self::build) and not kept afterwards.
#[derive(Default)]
pub struct V2KmsBuilder {
    kms: Option<Arc<dyn KmsApi>>,
    timeout: Option<Duration>,
    load_options: Option<Vec<LoadOption>>,
    kms_options: Option<Vec<KmsOption>>,
    credentials: Mutex<Option<CredentialMaterial>>,
    factory: Option<Arc<KmsFactory>>,
}

impl V2KmsBuilder {
    /// Creates a builder with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one option, rejecting duplicates and conflicts.
    ///
    /// Credential files are resolved here, so a bad file fails the apply.
    pub fn apply(&mut self, option: V2ClientOption) -> Result<()> {
        let name = option.name();

        match option {
            V2ClientOption::Kms(kms) => {
                if self.kms.is_some() {
                    return Err(Error::Config(format!("{} already set", name)));
                }
                if self.constructs_handle() {
                    return Err(Error::Config(format!(
                        "{} cannot be combined with handle construction options",
                        name
                    )));
                }
                self.kms = Some(kms);
            }
            V2ClientOption::ApiTimeout(timeout) => set_once(&mut self.timeout, timeout, name)?,
            V2ClientOption::LoadOptions(options) => {
                self.check_no_handle(name)?;
                set_once(&mut self.load_options, options, name)?;
            }
            V2ClientOption::KmsOptions(options) => {
                self.check_no_handle(name)?;
                set_once(&mut self.kms_options, options, name)?;
            }
            V2ClientOption::CredentialPath(path) => {
                self.check_no_handle(name)?;
                let credentials = self
                    .credentials
                    .get_mut()
                    .unwrap_or_else(PoisonError::into_inner);
                if credentials.is_some() {
                    return Err(Error::Config(format!("{} already set", name)));
                }
                *credentials = Some(resolve_credential_path(&path)?);
            }
            V2ClientOption::KmsFactory(factory) => {
                self.check_no_handle(name)?;
                set_once(&mut self.factory, factory, name)?;
            }
        }

        Ok(())
    }

    /// Returns the pre-built handle, if one was supplied
    pub fn kms(&self) -> Option<Arc<dyn KmsApi>> {
        self.kms.clone()
    }

    /// Returns the effective time budget
    pub fn timeout(&self) -> Duration {
        self.timeout
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Returns true while credentials from a credential file are waiting to be
    /// handed to the SDK
    pub fn holds_credentials(&self) -> bool {
        self.lock_credentials().is_some()
    }

    /// Builds the handle for keys under `key_uri_prefix`.
    ///
    /// The region in the prefix, when present, is applied before the caller's
    /// load options so they can override it. Config loading is bounded by
    /// [`timeout`](Self::timeout).
    ///
    /// Credentials from a credential file are released once a handle is
    /// built and restored if the build fails. Callers must not run two builds
    /// of the same builder concurrently; [`AwsClient`](crate::AwsClient)
    /// builds at most once.
    pub async fn build(&self, key_uri_prefix: &str) -> Result<Arc<dyn KmsApi>> {
        if let Some(kms) = &self.kms {
            return Ok(kms.clone());
        }

        let credentials = self.lock_credentials().take();
        let built = self.construct(key_uri_prefix, credentials.as_ref()).await;

        if built.is_err() {
            if let Some(credentials) = credentials {
                *self.lock_credentials() = Some(credentials);
            }
        }

        built
    }

    async fn construct(
        &self,
        key_uri_prefix: &str,
        credentials: Option<&CredentialMaterial>,
    ) -> Result<Arc<dyn KmsApi>> {
        let timeout = self.timeout();
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        match region_from_uri(key_uri_prefix) {
            Ok(region) => {
                debug!("using region {} from key URI prefix", region);
                loader = loader.region(Region::new(region));
            }
            Err(_) => debug!("no region in key URI prefix, using the default region chain"),
        }

        if let Some(creds) = credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id(),
                creds.secret_access_key(),
                creds.session_token().map(str::to_string),
                None,
                CREDENTIAL_FILE_PROVIDER,
            ));
        }

        for option in self.load_options.iter().flatten() {
            loader = option(loader);
        }

        let sdk_config = tokio::time::timeout(timeout, loader.load())
            .await
            .map_err(|_| Error::Timeout(timeout))?;

        let mut kms_config = aws_sdk_kms::config::Builder::from(&sdk_config);
        for option in self.kms_options.iter().flatten() {
            kms_config = option(kms_config);
        }

        let factory = self
            .factory
            .clone()
            .unwrap_or_else(|| Arc::new(default_kms_factory));

        Ok(factory(kms_config.build()))
    }

    fn lock_credentials(&self) -> MutexGuard<'_, Option<CredentialMaterial>> {
        self.credentials.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn constructs_handle(&self) -> bool {
        self.holds_credentials()
            || self.load_options.is_some()
            || self.kms_options.is_some()
            || self.factory.is_some()
    }

    fn check_no_handle(&self, name: &str) -> Result<()> {
        if self.kms.is_some() {
            return Err(Error::Config(format!(
                "{} cannot be used, V2 KMS handle already set",
                name
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for V2KmsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("V2KmsBuilder")
            .field("kms", &self.kms.is_some())
            .field("timeout", &self.timeout())
            .field("load_options", &self.load_options.as_ref().map(Vec::len))
            .field("kms_options", &self.kms_options.as_ref().map(Vec::len))
            .field("credentials", &self.holds_credentials())
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, name: &str) -> Result<()> {
    if slot.is_some() {
        return Err(Error::Config(format!("{} already set", name)));
    }
    *slot = Some(value);
    Ok(())
}
