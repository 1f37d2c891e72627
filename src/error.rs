use std::time::Duration;
use thiserror::Error;

/// Result type for awskms operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the awskms library
#[derive(Error, Debug)]
pub enum Error {
    /// The key URI prefix given to a client does not use the `aws-kms://` scheme
    #[error("uri prefix must start with {expected:?}, but got {got:?}")]
    InvalidUriPrefix {
        /// The required scheme
        expected: &'static str,
        /// The prefix that was supplied
        got: String,
    },

    /// Conflicting or duplicate client options
    #[error("failed setting option: {0}")]
    Config(String),

    /// An encryption context name outside the two recognized values
    #[error("invalid encryption context name: {0}")]
    InvalidEncryptionContextName(String),

    /// An empty credential path was supplied
    #[error("invalid credential path")]
    MissingCredentialPath,

    /// The credential file could not be opened
    #[error("cannot open credential path: {0}")]
    CannotOpenCredentialPath(#[source] std::io::Error),

    /// The file parsed as CSV but lacks the data row or the key columns
    #[error("malformed credential CSV file")]
    MalformedCredentialCsv,

    /// The file is a single-column file, so it is not an IAM credential CSV
    #[error("not a valid CSV credential file")]
    NotCsvCredentialFile,

    /// The CSV reader failed for a reason other than the file's shape
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The shared credentials file could not be parsed or lacks the profile keys
    #[error("credential profile error: {0}")]
    CredentialProfile(String),

    /// A key URI outside the prefix this client was built for
    #[error("key URI must start with prefix {expected}, but got {got}")]
    UnsupportedKeyUri {
        /// The client's key URI prefix
        expected: String,
        /// The key URI that was requested
        got: String,
    },

    /// The region could not be extracted from a key URI
    #[error("extracting region from URI failed: {0}")]
    RegionExtraction(String),

    /// Errors returned by the remote key management service
    #[error("KMS error: {0}")]
    Kms(String),

    /// The service decrypted with a key other than the one requested
    #[error("decryption failed: wrong key id (expected {expected}, got {got})")]
    WrongKeyId {
        /// The key the adapter is bound to
        expected: String,
        /// The key id the service reported
        got: String,
    },

    /// A remote call or client construction exceeded its time budget
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// General internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true for the two CSV outcomes that hand the file to the
    /// shared-credentials parser instead of failing.
    pub fn is_csv_fallback(&self) -> bool {
        matches!(self, Error::NotCsvCredentialFile | Error::MalformedCredentialCsv)
    }
}
