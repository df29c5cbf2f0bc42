//! Vault file persistence
//!
//! The whole collection lives in a single encrypted file named `accounts`
//! in the process working directory, readable and writable by the owner
//! only. The file is rewritten in full on every save.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::account::AccountCollection;
use crate::codec::VaultCodec;
use crate::crypto::SecureBuffer;
use crate::error::{Result, VaultError};

/// Well-known vault file name, relative to the working directory
const VAULT_FILE: &str = "accounts";

/// Owner read/write only
#[cfg(unix)]
const VAULT_FILE_MODE: u32 = 0o600;

/// Loads and saves the encrypted account collection
pub struct AccountStore {
    path: PathBuf,
    codec: VaultCodec,
}

impl AccountStore {
    /// Create a store over the vault file in the current working directory
    pub fn open(codec: VaultCodec) -> Result<Self> {
        let path = std::env::current_dir()?.join(VAULT_FILE);
        Ok(Self { path, codec })
    }

    /// Create a store over an explicit vault file path (for testing)
    pub fn with_path(path: PathBuf, codec: VaultCodec) -> Self {
        Self { path, codec }
    }

    /// Get the vault file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the account collection from the vault file
    ///
    /// A missing or zero-length file is an empty collection. Anything else
    /// must decrypt and deserialize cleanly; a failure of either step means
    /// the vault cannot be trusted and is reported as an error rather than
    /// an empty result.
    pub fn load(&self) -> Result<AccountCollection> {
        let mut blob = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no vault file, starting empty");
                return Ok(AccountCollection::new());
            }
            Err(e) => return Err(e.into()),
        };

        if blob.is_empty() {
            debug!(path = %self.path.display(), "vault file is empty");
            return Ok(AccountCollection::new());
        }

        let plaintext = self.codec.decrypt_collection(&blob)?;
        blob.zeroize();

        let collection: AccountCollection = serde_json::from_slice(plaintext.as_bytes())
            .map_err(|e| VaultError::CorruptVault(e.to_string()))?;
        // plaintext buffer drops here and is zeroed

        debug!(accounts = collection.len(), "vault loaded");
        Ok(collection)
    }

    /// Encrypt and write the account collection, replacing the vault file
    ///
    /// Write failures are reported to the caller and not retried.
    pub fn save(&self, collection: &AccountCollection) -> Result<()> {
        let plaintext = SecureBuffer::new(serde_json::to_vec(collection)?);
        let mut blob = self.codec.encrypt_collection(plaintext)?;

        let written = write_owner_only(&self.path, &blob);
        blob.zeroize();

        if let Err(e) = &written {
            warn!(path = %self.path.display(), error = %e, "vault write failed");
        }
        written?;

        debug!(accounts = collection.len(), path = %self.path.display(), "vault saved");
        Ok(())
    }
}

/// Write `data` to `path` with owner-only permissions, replacing any
/// previous contents
fn write_owner_only(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(VAULT_FILE_MODE);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()?;

    // The mode on open only applies to newly created files; clamp an
    // existing vault file as well.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(VAULT_FILE_MODE);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}
