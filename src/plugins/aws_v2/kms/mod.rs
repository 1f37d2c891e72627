//! AWS KMS handle using AWS SDK v2
//!
//! [`SdkKms`] implements [`KmsApi`](crate::kms::KmsApi) over `aws-sdk-kms`.
//! [`V2KmsBuilder`] collects the [`V2ClientOption`]s of a client and builds
//! the handle on first use: it loads the default SDK configuration bounded by
//! the API timeout, applies the caller's load and KMS options, and passes the
//! result to the KMS factory.
//!
//! # Examples
//!
//! ```
//! use awskms::client::{with_v2_kms_options, AwsClientBuilder};
//! use awskms::plugins::aws_v2::kms::{with_api_timeout, with_load_options, LoadOption};
//! use aws_config::ConfigLoader;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let profile: LoadOption = Arc::new(|loader: ConfigLoader| loader.profile_name("kms"));
//!
//! let client = AwsClientBuilder::new("aws-kms://arn:aws:kms:us-east-2:235739564943:key/")
//!     .with_option(with_v2_kms_options(vec![
//!         with_api_timeout(Duration::from_secs(2)),
//!         with_load_options(vec![profile]),
//!     ]))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod client;


pub use builder::{
    with_api_timeout, with_credential_path, with_kms_factory, with_kms_options, with_load_options,
    with_v2_kms, KmsFactory, KmsOption, LoadOption, V2ClientOption, V2KmsBuilder, DEFAULT_TIMEOUT,
};
pub use client::SdkKms;
