//! # vault-core
//!
//! Core vault functionality for credvault including:
//! - AES-256-GCM encryption under a machine-bound key
//! - OS credential store delegation on Windows
//! - Encrypted single-file persistence of the account collection
//! - Password generation with breach-corpus screening
//! - Zeroize-on-drop handling of every secret-bearing buffer

pub mod account;
pub mod breach;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod generator;
pub mod store;

pub use account::{Account, AccountCollection};
pub use breach::{BreachCheck, BreachVerdict, HibpChecker};
pub use codec::VaultCodec;
pub use crypto::{default_backend, wipe, KeyBackend, MachineKeyBackend, SecretString, SecureBuffer};
pub use error::{Result, VaultError};
pub use generator::PasswordGenerator;
pub use store::AccountStore;
