//! Key URI handling
//!
//! Key URIs have the form `aws-kms://arn:<partition>:kms:<region>:<path>`.
//! See <https://docs.aws.amazon.com/IAM/latest/UserGuide/reference-arns.html>.

use crate::error::{Error, Result};
use regex::Regex;

/// Scheme every key URI handled by this crate starts with
pub const AWS_PREFIX: &str = "aws-kms://";

const REGION_PATTERN: &str = r"aws-kms://arn:(aws[a-zA-Z0-9-_]*):kms:([a-z0-9-]+):";

/// Returns true if `uri` starts with the `aws-kms://` scheme, ignoring case.
pub fn has_aws_prefix(uri: &str) -> bool {
    uri.get(..AWS_PREFIX.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(AWS_PREFIX))
}

/// Strips the `aws-kms://` scheme, leaving the key ARN.
///
/// The scheme is matched case-insensitively, the same way client prefixes
/// are validated. URIs without the scheme are returned unchanged.
pub fn key_arn(key_uri: &str) -> &str {
    if has_aws_prefix(key_uri) {
        &key_uri[AWS_PREFIX.len()..]
    } else {
        key_uri
    }
}

/// Extracts the region from a key URI or key URI prefix.
///
/// # Examples
///
/// ```
/// use awskms::uri::region_from_uri;
///
/// let region = region_from_uri("aws-kms://arn:aws:kms:us-east-2:235739564943:key/3ee50705").unwrap();
/// assert_eq!(region, "us-east-2");
///
/// assert!(region_from_uri("aws-kms://us-east-2:235739564943:key/3ee50705").is_err());
/// ```
pub fn region_from_uri(key_uri: &str) -> Result<String> {
    let re = Regex::new(REGION_PATTERN)
        .map_err(|e| Error::Internal(format!("compiling region pattern: {}", e)))?;

    let mut matches = re.captures_iter(key_uri);
    match (matches.next(), matches.next()) {
        (Some(captures), None) if captures.len() == 3 => captures
            .get(2)
            .map(|region| region.as_str().to_string())
            .ok_or_else(|| Error::RegionExtraction(key_uri.to_string())),
        _ => Err(Error::RegionExtraction(key_uri.to_string())),
    }
}
