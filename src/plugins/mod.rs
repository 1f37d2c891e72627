//! KMS handles for each AWS SDK generation
//!
//! Each plugin module corresponds to one AWS SDK generation and implements
//! [`KmsApi`](crate::kms::KmsApi) on top of it.
//!
//! ## Available Plugins
//!
//! - `aws_v1`: AWS SDK v1 (rusoto), the legacy generation
//! - `aws_v2`: AWS SDK v2 (`aws-sdk-kms`), the newer generation
//!
//! ## Feature Flags
//!
//! - `aws-v1`: Enables the rusoto plugin
//! - `aws-v2`: Enables the aws-sdk-kms plugin
//!
//! Both are on by default. To use only the newer generation:
//! ```toml
//! [dependencies]
//! awskms = { version = "0.1.0", default-features = false, features = ["aws-v2"] }
//! ```

#[cfg(feature = "aws-v1")]
pub mod aws_v1;

#[cfg(feature = "aws-v2")]
pub mod aws_v2;
