//! Key backend trait definitions

use crate::error::Result;

/// Trait for platform data-protection backends
///
/// Exactly one implementation is active per target: machine-derived AES-GCM
/// on Unix-like systems, the OS credential store on Windows. Callers only
/// ever see the two-operation contract.
pub trait KeyBackend: Send + Sync {
    /// Encrypt a plaintext blob
    fn protect(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a blob previously produced by [`protect`](Self::protect)
    ///
    /// Fails closed: tampered, truncated, or foreign-key input never yields
    /// partial plaintext.
    fn unprotect(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Get a human-readable name for this backend
    fn backend_name(&self) -> &'static str;
}

/// Select the key backend for the current deployment target
#[cfg(not(windows))]
pub fn default_backend() -> Box<dyn KeyBackend> {
    Box::new(super::machine_key::MachineKeyBackend::new())
}

/// Select the key backend for the current deployment target
#[cfg(windows)]
pub fn default_backend() -> Box<dyn KeyBackend> {
    Box::new(super::os_store::OsStoreBackend::new())
}
