//! Machine-derived AES-256-GCM backend
//!
//! The encryption key is the SHA-256 hash of the host identity secret in
//! `/etc/machine-id`. It is recomputed on every call and never persisted.
//! Blob format: `nonce (12 bytes) || ciphertext+tag`.

use std::path::PathBuf;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::secure_memory::{wipe, MachineKey};
use super::KeyBackend;
use crate::error::{Result, VaultError};

/// Size of the AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Well-known location of the host identity secret
const MACHINE_ID_PATH: &str = "/etc/machine-id";

/// Key backend deriving its cipher key from the host identity secret
pub struct MachineKeyBackend {
    key_source: PathBuf,
}

impl MachineKeyBackend {
    /// Create a backend reading the key material from `/etc/machine-id`
    pub fn new() -> Self {
        Self {
            key_source: PathBuf::from(MACHINE_ID_PATH),
        }
    }

    /// Create a backend with a custom identity file (for testing)
    pub fn with_key_source(key_source: PathBuf) -> Self {
        Self { key_source }
    }

    /// Derive the 256-bit cipher key from the identity file
    ///
    /// A missing or unreadable identity file is a fatal configuration error;
    /// the vault must never be encrypted under a substitute key.
    fn derive_key(&self) -> Result<MachineKey> {
        let mut identity = std::fs::read(&self.key_source).map_err(|e| {
            VaultError::KeyUnavailable(format!("{}: {}", self.key_source.display(), e))
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&identity);
        let digest = hasher.finalize();

        wipe(&mut identity);

        Ok(MachineKey::new(digest.into()))
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        let key = self.derive_key()?;
        Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| VaultError::EncryptionError(e.to_string()))
        // key drops here and is zeroed
    }
}

impl Default for MachineKeyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBackend for MachineKeyBackend {
    fn protect(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| VaultError::EncryptionError(e.to_string()))?;

        // Prepend the nonce so unprotect can split it back out.
        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        wipe(&mut nonce_bytes);

        debug!(bytes = blob.len(), "sealed vault payload");
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
        "Machine-derived AES-256-GCM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_backend() -> (MachineKeyBackend, NamedTempFile) {
        let mut id_file = NamedTempFile::new().unwrap();
        id_file
            .write_all(b"4c6f72656d20697073756d2069640a")
            .unwrap();
        let backend = MachineKeyBackend::with_key_source(id_file.path().to_path_buf());
        (backend, id_file)
    }

    #[test]
    fn test_protect_unprotect_roundtrip() {
        let (backend, _id) = test_backend();
        let plaintext = b"Hello, World!";

        let blob = backend.protect(plaintext).unwrap();
        let recovered = backend.unprotect(&blob).unwrap();

        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let (backend, _id) = test_backend();

        let blob = backend.protect(b"").unwrap();
        // Nonce plus tag even for empty input
        assert_eq!(blob.len(), NONCE_SIZE + TAG_SIZE);

        let recovered = backend.unprotect(&blob).unwrap();
        assert!(recovered.is_empty());
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let (backend, _id) = test_backend();
        let plaintext = b"same plaintext";

        let blob1 = backend.protect(plaintext).unwrap();
        let blob2 = backend.protect(plaintext).unwrap();

        assert_ne!(blob1[..NONCE_SIZE], blob2[..NONCE_SIZE]);
        assert_ne!(blob1[NONCE_SIZE..], blob2[NONCE_SIZE..]);
    }

    #[test]
    fn test_any_single_bit_flip_fails() {
        let (backend, _id) = test_backend();

        let blob = backend.protect(b"secret data").unwrap();

        for byte in 0..blob.len() {
            for bit in 0..8 {
                let mut tampered = blob.clone();
                tampered[byte] ^= 1 << bit;
                assert!(
                    backend.unprotect(&tampered).is_err(),
                    "flip of bit {} in byte {} was not detected",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn test_truncated_blob_fails() {
        let (backend, _id) = test_backend();

        let result = backend.unprotect(&[0u8; NONCE_SIZE - 1]);
        assert!(matches!(result, Err(VaultError::DecryptionError(_))));

        assert!(backend.unprotect(b"").is_err());
    }

    #[test]
    fn test_foreign_key_fails() {
        let (backend, _id) = test_backend();

        let mut other_id = NamedTempFile::new().unwrap();
        other_id.write_all(b"a completely different host").unwrap();
        let other = MachineKeyBackend::with_key_source(other_id.path().to_path_buf());

        let blob = backend.protect(b"secret data").unwrap();
        assert!(other.unprotect(&blob).is_err());
    }

    #[test]
    fn test_missing_identity_file_is_fatal() {
        let backend = MachineKeyBackend::with_key_source(PathBuf::from(
            "/nonexistent/machine-id-for-tests",
        ));

        let result = backend.protect(b"data");
        assert!(matches!(result, Err(VaultError::KeyUnavailable(_))));
    }

    #[test]
    fn test_same_identity_same_key() {
        let mut id_file = NamedTempFile::new().unwrap();
        id_file.write_all(b"stable-host-identity").unwrap();

        let a = MachineKeyBackend::with_key_source(id_file.path().to_path_buf());
        let b = MachineKeyBackend::with_key_source(id_file.path().to_path_buf());

        let blob = a.protect(b"portable").unwrap();
        assert_eq!(b.unprotect(&blob).unwrap(), b"portable");
    }
}
