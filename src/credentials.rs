//! Credential file resolution
//!
//! A credential path may name either the CSV file the IAM console offers for
//! download when an access key is created, or an INI-style shared credentials
//! file. The CSV form is tried first; the shared credentials form is only
//! attempted when the CSV reader says the file is not an IAM CSV or is an
//! IAM CSV missing its key columns.
//!
//! See <https://docs.aws.amazon.com/cli/latest/userguide/cli-authentication-user.html#cli-authentication-user-configure-csv>
//! and <https://docs.aws.amazon.com/cli/latest/userguide/cli-configure-files.html#cli-configure-files-format>.

use crate::error::{Error, Result};
use ini::Ini;
use std::fmt;
use std::fs::File;
use std::path::Path;
use zeroize::Zeroizing;

/// Profile read from shared credentials files
pub const DEFAULT_PROFILE: &str = "default";

const ACCESS_KEY_ID_COLUMN: usize = 2;
const SECRET_ACCESS_KEY_COLUMN: usize = 3;

/// An access key pair, optionally with a session token
#[derive(Clone)]
pub struct CredentialMaterial {
    access_key_id: String,
    secret_access_key: Zeroizing<String>,
    session_token: Option<Zeroizing<String>>,
}

impl CredentialMaterial {
    /// Creates credential material from an access key id and secret access key
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: Zeroizing::new(secret_access_key.into()),
            session_token: None,
        }
    }

    /// Attaches a session token
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(Zeroizing::new(session_token.into()));
        self
    }

    /// Returns the access key id
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Returns the secret access key
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Returns the session token, if the source carried one
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_ref().map(|token| token.as_str())
    }
}

impl fmt::Debug for CredentialMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialMaterial")
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolves a credential path into credential material.
///
/// Errors:
/// - [`Error::MissingCredentialPath`] if `path` is empty
/// - [`Error::CannotOpenCredentialPath`] if the file cannot be opened
/// - [`Error::Csv`] if the CSV reader fails for any reason other than the
///   file's shape; no fallback is attempted
/// - [`Error::CredentialProfile`] if the shared credentials fallback fails
pub fn resolve_credential_path(path: impl AsRef<Path>) -> Result<CredentialMaterial> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(Error::MissingCredentialPath);
    }

    match extract_creds_csv(path) {
        Ok(creds) => Ok(creds),
        Err(e) if e.is_csv_fallback() => {
            log::debug!(
                "credential file {} is not an IAM CSV ({}), reading it as a shared credentials file",
                path.display(),
                e
            );
            extract_creds_ini(path, DEFAULT_PROFILE)
        }
        Err(e) => Err(e),
    }
}

/// Extracts credentials from an IAM console CSV file.
///
/// Properties of a properly formatted file:
///
/// 1. The first line consists of the headers, e.g.
///    `User name,Password,Access key ID,Secret access key,Console login link`
/// 2. The second line holds the values; the access key id is the third
///    column and the secret access key the fourth.
///
/// A shared credentials file also parses as CSV, but as a single column. A
/// real IAM CSV never has one column, so a single-column first line reports
/// [`Error::NotCsvCredentialFile`].
pub fn extract_creds_csv(path: impl AsRef<Path>) -> Result<CredentialMaterial> {
    let file = File::open(path.as_ref()).map_err(Error::CannotOpenCredentialPath)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(file);

    let lines = reader
        .records()
        .collect::<std::result::Result<Vec<csv::StringRecord>, csv::Error>>()?;

    if lines.first().is_some_and(|header| header.len() == 1) {
        return Err(Error::NotCsvCredentialFile);
    }

    let values = match lines.get(1) {
        Some(values) if values.len() > SECRET_ACCESS_KEY_COLUMN => values,
        _ => return Err(Error::MalformedCredentialCsv),
    };

    match (
        values.get(ACCESS_KEY_ID_COLUMN),
        values.get(SECRET_ACCESS_KEY_COLUMN),
    ) {
        (Some(access_key_id), Some(secret_access_key)) => {
            Ok(CredentialMaterial::new(access_key_id, secret_access_key))
        }
        _ => Err(Error::MalformedCredentialCsv),
    }
}

/// Extracts credentials from a named profile of a shared credentials file.
pub fn extract_creds_ini(path: impl AsRef<Path>, profile: &str) -> Result<CredentialMaterial> {
    let path = path.as_ref();
    let conf = Ini::load_from_file(path).map_err(|e| {
        Error::CredentialProfile(format!("parsing {}: {}", path.display(), e))
    })?;

    let section = conf.section(Some(profile)).ok_or_else(|| {
        Error::CredentialProfile(format!(
            "profile {} not found in {}",
            profile,
            path.display()
        ))
    })?;

    let field = |name: &str| {
        section
            .get(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                Error::CredentialProfile(format!("profile {} has no {}", profile, name))
            })
    };

    let mut creds = CredentialMaterial::new(
        field("aws_access_key_id")?,
        field("aws_secret_access_key")?,
    );
    if let Ok(token) = field("aws_session_token") {
        creds = creds.with_session_token(token);
    }

    Ok(creds)
}
