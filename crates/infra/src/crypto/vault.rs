//! Credential vault: AES-256-GCM encryption of stored access tokens.
//!
//! Payload layout: a JSON envelope `{nonce, ciphertext, algorithm}` encoded
//! as base64 so it can live in a TEXT column. A tampered or incompatible
//! payload fails with [`KintaiError::Credential`], which callers treat as
//! "credential invalid, prompt re-auth" rather than a fatal crash.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use kintai_core::CredentialCipher;
use kintai_domain::{KintaiError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

const ALGORITHM: &str = "AES-256-GCM";

/// Serializable encrypted payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncryptedData {
    nonce: Vec<u8>,
    ciphertext: Vec<u8>,
    algorithm: String,
}

/// Symmetric vault for a single 32-byte key.
pub struct CredentialVault {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault").field("key", &"[REDACTED]").finish()
    }
}

impl CredentialVault {
    /// Create a vault from a raw 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != 32 {
            return Err(KintaiError::Config(
                "vault key must be exactly 32 bytes".to_string(),
            ));
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| KintaiError::Config(format!("failed to create vault cipher: {e}")))?;
        Ok(Self { cipher })
    }

    /// Create a vault from a hex-encoded 32-byte key (64 hex chars).
    pub fn from_hex_key(hex_key: &str) -> Result<Self> {
        let key = hex::decode(hex_key.trim())
            .map_err(|e| KintaiError::Config(format!("vault key is not valid hex: {e}")))?;
        Self::new(&key)
    }

    /// Generate a random 32-byte key, hex-encoded for config storage.
    pub fn generate_key() -> String {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        hex::encode(key)
    }

    fn generate_nonce() -> [u8; 12] {
        let mut nonce = [0u8; 12];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }
}

impl CredentialCipher for CredentialVault {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce_bytes = Self::generate_nonce();
        let ciphertext = self
            .cipher
            .encrypt(&Nonce::from(nonce_bytes), plaintext.as_bytes())
            .map_err(|e| KintaiError::Internal(format!("encryption failed: {e}")))?;

        let payload = EncryptedData {
            nonce: nonce_bytes.to_vec(),
            ciphertext,
            algorithm: ALGORITHM.to_string(),
        };
        let serialized = serde_json::to_vec(&payload)
            .map_err(|e| KintaiError::Internal(format!("failed to serialize payload: {e}")))?;
        Ok(BASE64.encode(serialized))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let decoded = BASE64
            .decode(ciphertext)
            .map_err(|e| KintaiError::Credential(format!("payload is not valid base64: {e}")))?;
        let payload: EncryptedData = serde_json::from_slice(&decoded)
            .map_err(|e| KintaiError::Credential(format!("payload envelope is invalid: {e}")))?;

        if payload.algorithm != ALGORITHM {
            return Err(KintaiError::Credential(format!(
                "unsupported algorithm: {}",
                payload.algorithm
            )));
        }

        let nonce_array: [u8; 12] = payload.nonce.as_slice().try_into().map_err(|_| {
            KintaiError::Credential("nonce must be exactly 12 bytes".to_string())
        })?;

        let plaintext = self
            .cipher
            .decrypt(&Nonce::from(nonce_array), payload.ciphertext.as_ref())
            .map_err(|_| {
                KintaiError::Credential("decryption failed: wrong key or tampered data".into())
            })?;

        String::from_utf8(plaintext)
            .map_err(|_| KintaiError::Credential("decrypted credential is not UTF-8".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> CredentialVault {
        CredentialVault::from_hex_key(&CredentialVault::generate_key()).unwrap()
    }

    #[test]
    fn rejects_short_keys() {
        assert!(CredentialVault::new(&[0u8; 16]).is_err());
    }

    #[test]
    fn encrypt_and_decrypt_round_trip() {
        let vault = vault();
        let encrypted = vault.encrypt("ghp_secret_token").unwrap();
        assert_ne!(encrypted, "ghp_secret_token");
        assert_eq!(vault.decrypt(&encrypted).unwrap(), "ghp_secret_token");
    }

    #[test]
    fn nonces_differ_between_calls() {
        let vault = vault();
        let first = vault.encrypt("token").unwrap();
        let second = vault.encrypt("token").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn tampered_payload_is_a_credential_error() {
        let vault = vault();
        let encrypted = vault.encrypt("token").unwrap();

        let mut decoded = BASE64.decode(&encrypted).unwrap();
        let last = decoded.len() - 2;
        decoded[last] ^= 0x01;
        let tampered = BASE64.encode(decoded);

        let err = vault.decrypt(&tampered).unwrap_err();
        assert!(err.needs_reauth(), "expected credential error, got {err:?}");
    }

    #[test]
    fn wrong_key_is_a_credential_error() {
        let encrypted = vault().encrypt("token").unwrap();
        let other = vault();

        let err = other.decrypt(&encrypted).unwrap_err();
        assert!(err.needs_reauth());
    }

    #[test]
    fn garbage_input_is_a_credential_error() {
        let err = vault().decrypt("not base64 at all!!!").unwrap_err();
        assert!(matches!(err, KintaiError::Credential(_)));
    }
}
