//! Encrypt/decrypt adapter between the account store and the key backend

use tracing::debug;

use crate::crypto::{default_backend, KeyBackend, SecureBuffer};
use crate::error::Result;

/// Uniform encryption surface over the active key backend
pub struct VaultCodec {
    backend: Box<dyn KeyBackend>,
}

impl VaultCodec {
    /// Create a codec over an explicit backend
    pub fn new(backend: Box<dyn KeyBackend>) -> Self {
        Self { backend }
    }

    /// Create a codec over the backend for this deployment target
    pub fn with_default_backend() -> Self {
        let backend = default_backend();
        debug!(backend = backend.backend_name(), "key backend selected");
        Self { backend }
    }

    /// Get the name of the active backend
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Encrypt the serialized collection
    ///
    /// Takes the plaintext by value; the buffer is zeroed when this call
    /// returns, whether encryption succeeded or failed.
    pub fn encrypt_collection(&self, plaintext: SecureBuffer) -> Result<Vec<u8>> {
        self.backend.protect(plaintext.as_bytes())
        // plaintext drops here and is zeroed
    }

    /// Decrypt the vault blob back into the serialized collection
    ///
    /// Tampered or foreign-key input fails without yielding any plaintext.
    pub fn decrypt_collection(&self, ciphertext: &[u8]) -> Result<SecureBuffer> {
        let plaintext = self.backend.unprotect(ciphertext)?;
        Ok(SecureBuffer::new(plaintext))
    }
}
