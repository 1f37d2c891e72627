use crate::error::{Error, Result};
use crate::kms::{DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, KmsApi};
use aes_gcm::{
    aead::{Aead as AeadTrait, KeyInit, Payload},
    Aes256Gcm, Key as AesKey, Nonce,
};
use async_trait::async_trait;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use zeroize::Zeroizing;

const GCM_NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;

/// Ciphertext format of the static KMS
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "keyId")]
    key_id: String,

    nonce: Vec<u8>,

    ciphertext: Vec<u8>,
}

/// An in-memory key management service for testing
///
/// Every registered key ARN gets a random AES-256-GCM key. The encryption
/// context is authenticated as associated data, and the key ARN travels in
/// the ciphertext, so the service rejects a context mismatch and a decrypt
/// request naming a different key the same way AWS KMS does. It should not
/// be used in production.
pub struct StaticKms {
    keys: HashMap<String, Aes256Gcm>,
}

impl StaticKms {
    /// Creates a static KMS holding one fresh key per ARN
    pub fn new<I, S>(key_arns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = key_arns
            .into_iter()
            .map(|arn| (arn.into(), random_cipher()))
            .collect();

        Self { keys }
    }

    /// Returns true if the service holds a key for `key_id`
    pub fn has_key(&self, key_id: &str) -> bool {
        self.keys.contains_key(key_id)
    }

    fn cipher(&self, key_id: &str) -> Result<&Aes256Gcm> {
        self.keys
            .get(key_id)
            .ok_or_else(|| Error::Kms(format!("NotFoundException: key {} does not exist", key_id)))
    }
}

impl fmt::Debug for StaticKms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut key_ids: Vec<&String> = self.keys.keys().collect();
        key_ids.sort();

        f.debug_struct("StaticKms").field("keys", &key_ids).finish()
    }
}

fn random_cipher() -> Aes256Gcm {
    let mut key_bytes = Zeroizing::new([0_u8; KEY_SIZE]);
    OsRng.fill_bytes(&mut key_bytes[..]);
    Aes256Gcm::new(AesKey::<Aes256Gcm>::from_slice(&key_bytes[..]))
}

/// Canonical bytes of an encryption context; absent and empty are the same.
fn context_aad(context: Option<&HashMap<String, String>>) -> Result<Vec<u8>> {
    let sorted: BTreeMap<&String, &String> = context.into_iter().flatten().collect();
    serde_json::to_vec(&sorted)
        .map_err(|e| Error::Internal(format!("serializing encryption context: {}", e)))
}

#[async_trait]
impl KmsApi for StaticKms {
    async fn encrypt(&self, request: EncryptRequest) -> Result<EncryptResponse> {
        let cipher = self.cipher(&request.key_id)?;
        let aad = context_aad(request.encryption_context.as_ref())?;

        let mut nonce = vec![0_u8; GCM_NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &request.plaintext,
                    aad: &aad,
                },
            )
            .map_err(|e| Error::Kms(format!("encryption failed: {}", e)))?;

        let envelope = Envelope {
            key_id: request.key_id,
            nonce,
            ciphertext,
        };

        let ciphertext_blob = serde_json::to_vec(&envelope)
            .map_err(|e| Error::Internal(format!("marshalling envelope: {}", e)))?;

        Ok(EncryptResponse {
            key_id: Some(envelope.key_id),
            ciphertext_blob,
        })
    }

    async fn decrypt(&self, request: DecryptRequest) -> Result<DecryptResponse> {
        let envelope: Envelope = serde_json::from_slice(&request.ciphertext_blob)
            .map_err(|_| Error::Kms("InvalidCiphertextException: malformed ciphertext".into()))?;

        if envelope.nonce.len() != GCM_NONCE_SIZE {
            return Err(Error::Kms(
                "InvalidCiphertextException: malformed ciphertext".into(),
            ));
        }

        if request.key_id != envelope.key_id {
            return Err(Error::Kms(format!(
                "IncorrectKeyException: ciphertext was not encrypted under key {}",
                request.key_id
            )));
        }

        let cipher = self.cipher(&envelope.key_id)?;
        let aad = context_aad(request.encryption_context.as_ref())?;

        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(&envelope.nonce),
                Payload {
                    msg: &envelope.ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|_| Error::Kms("InvalidCiphertextException".into()))?;

        Ok(DecryptResponse {
            key_id: Some(envelope.key_id),
            plaintext,
        })
    }
}
