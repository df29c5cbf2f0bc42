//! OS credential store backend (Windows)
//!
//! Key custody is delegated to the platform: a random 256-bit vault key is
//! created once and lives in the Windows Credential Manager. It is fetched
//! transiently per operation and zeroed afterwards. Blob format matches the
//! machine-derived backend: `nonce (12 bytes) || ciphertext+tag`.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use keyring::Entry;
use rand::{rngs::OsRng, RngCore};
use tracing::debug;
use zeroize::Zeroize;

use super::machine_key::NONCE_SIZE;
use super::secure_memory::{wipe, MachineKey};
use super::KeyBackend;
use crate::error::{Result, VaultError};

/// Service name used for credential store entries
const SERVICE_NAME: &str = "credvault";

/// Entry name under which the vault key is stored
const KEY_NAME: &str = "vault-key";

/// Key backend delegating key custody to the OS credential store
pub struct OsStoreBackend {
    service: &'static str,
}

impl OsStoreBackend {
    /// Create a new credential store backend
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME,
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(self.service, KEY_NAME).map_err(|e| VaultError::KeychainError(e.to_string()))
    }

    /// Fetch the vault key, creating and storing one on first use
    fn vault_key(&self) -> Result<MachineKey> {
        let entry = self.entry()?;

        match entry.get_password() {
            Ok(encoded) => {
                let mut raw = hex::decode(encoded.trim()).map_err(|e| {
                    VaultError::KeychainError(format!("stored key is not valid hex: {}", e))
                })?;
                if raw.len() != 32 {
                    wipe(&mut raw);
                    return Err(VaultError::KeychainError(format!(
                        "stored key has wrong length: {} (expected 32)",
                        raw.len()
                    )));
                }
                let mut key = [0u8; 32];
                key.copy_from_slice(&raw);
                wipe(&mut raw);
                Ok(MachineKey::new(key))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("no vault key in credential store, creating one");
                let mut key = [0u8; 32];
                OsRng.fill_bytes(&mut key);

                let mut encoded = hex::encode(key);
                let stored = entry.set_password(&encoded);
                encoded.zeroize();
                stored.map_err(|e| VaultError::KeychainError(e.to_string()))?;

                Ok(MachineKey::new(key))
            }
            Err(e) => Err(VaultError::KeychainError(e.to_string())),
        }
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        let key = self.vault_key()?;
        Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| VaultError::EncryptionError(e.to_string()))
    }
}

impl Default for OsStoreBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBackend for OsStoreBackend {
    fn protect(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| VaultError::EncryptionError(e.to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        wipe(&mut nonce_bytes);

        Ok(blob)
    }

    fn unprotect(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_SIZE {
            return Err(VaultError::DecryptionError(format!(
                "blob too short: {} bytes, need at least {}",
                ciphertext.len(),
                NONCE_SIZE
            )));
        }

        let cipher = self.cipher()?;

        let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        cipher
            .decrypt(nonce, sealed)
            .map_err(|_| VaultError::DecryptionError("authentication failed".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "Windows Credential Manager"
    }
}
