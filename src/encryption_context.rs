use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Name under which associated data is bound in the `EncryptionContext` of
/// KMS encrypt and decrypt requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncryptionContextName {
    /// `"associatedData"`, compatible with the KMS extensions of other Tink languages
    #[default]
    AssociatedData,
    /// `"additionalData"`, used by older clients before the name was configurable
    LegacyAdditionalData,
}

impl EncryptionContextName {
    /// Returns the context key used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionContextName::AssociatedData => "associatedData",
            EncryptionContextName::LegacyAdditionalData => "additionalData",
        }
    }

    /// Returns the numeric code of this name (1 or 2)
    pub fn code(&self) -> u32 {
        match self {
            EncryptionContextName::AssociatedData => 1,
            EncryptionContextName::LegacyAdditionalData => 2,
        }
    }

    /// Builds the encryption context binding `associated_data`.
    ///
    /// The bytes are hex encoded. Empty associated data yields no context at
    /// all, so requests with and without empty associated data are identical.
    pub fn encryption_context(&self, associated_data: &[u8]) -> Option<HashMap<String, String>> {
        if associated_data.is_empty() {
            return None;
        }

        Some(HashMap::from([(
            self.as_str().to_string(),
            hex::encode(associated_data),
        )]))
    }
}

impl fmt::Display for EncryptionContextName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncryptionContextName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "associatedData" => Ok(EncryptionContextName::AssociatedData),
            "additionalData" => Ok(EncryptionContextName::LegacyAdditionalData),
            other => Err(Error::InvalidEncryptionContextName(format!(
                "unrecognized value {:?}",
                other
            ))),
        }
    }
}

impl TryFrom<u32> for EncryptionContextName {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            1 => Ok(EncryptionContextName::AssociatedData),
            2 => Ok(EncryptionContextName::LegacyAdditionalData),
            other => Err(Error::InvalidEncryptionContextName(format!(
                "unrecognized value {}",
                other
            ))),
        }
    }
}
