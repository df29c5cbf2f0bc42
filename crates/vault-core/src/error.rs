//! Error types for vault-core

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Machine identity secret unavailable: {0}")]
    KeyUnavailable(String),

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    #[error("Decryption failed: {0}")]
    DecryptionError(String),

    #[error("Vault contents are corrupted: {0}")]
    CorruptVault(String),

    #[error("Account needs a service name and a password before it can be saved")]
    IncompleteAccount,

    #[error("Breach lookup could not be completed: {0}")]
    BreachLookupFailed(String),

    #[error("Keychain error: {0}")]
    KeychainError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
