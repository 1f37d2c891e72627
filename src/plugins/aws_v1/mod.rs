//! AWS SDK v1 plugin
//!
//! KMS handle built on the rusoto crates. This is the strategy a client uses
//! unless the newer generation is selected.
//!
//! **Note:** The rusoto crate is deprecated. For new deployments, consider
//! selecting the v2 generation instead.

pub mod kms;
