//! AWS SDK v2 plugin
//!
//! KMS handle built on `aws-config` and `aws-sdk-kms`, plus the option set
//! that configures how a client builds it.

pub mod kms;
