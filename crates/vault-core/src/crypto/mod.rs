//! Cryptographic primitives for the vault
//!
//! This module provides:
//! - The platform key backend seam (machine-derived cipher vs. OS store)
//! - AES-256-GCM authenticated encryption of the vault payload
//! - Secure memory handling with zeroize

mod backend;
mod machine_key;
#[cfg(windows)]
mod os_store;
mod secure_memory;

pub use backend::{default_backend, KeyBackend};
pub use machine_key::{MachineKeyBackend, NONCE_SIZE, TAG_SIZE};
#[cfg(windows)]
pub use os_store::OsStoreBackend;
pub use secure_memory::{wipe, MachineKey, SecretString, SecureBuffer};
