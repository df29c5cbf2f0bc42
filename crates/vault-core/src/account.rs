//! Account record and collection types

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, VaultError};

/// One credential record
///
/// All five fields are always present in the persisted payload; empty
/// strings are valid values. The password is zeroed when the record is
/// dropped and redacted from debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Account {
    /// Label for the protected resource
    #[zeroize(skip)]
    pub service: String,

    /// Free-form note on what the service is
    #[zeroize(skip)]
    pub description: String,

    /// Secondary note, may be multi-line
    #[zeroize(skip)]
    pub notes: String,

    /// Identifier used to authenticate (username or email)
    #[zeroize(skip)]
    pub user: String,

    /// The password itself
    #[serde(rename = "pw")]
    pub secret: String,
}

impl Account {
    /// Create a new record
    pub fn new(
        service: impl Into<String>,
        description: impl Into<String>,
        notes: impl Into<String>,
        user: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            description: description.into(),
            notes: notes.into(),
            user: user.into(),
            secret: secret.into(),
        }
    }

    /// Check that a brand-new record is complete enough to persist
    ///
    /// At minimum the service name and the password must be non-empty; the
    /// remaining fields may stay blank.
    pub fn validate_new(&self) -> Result<()> {
        if self.service.is_empty() || self.secret.is_empty() {
            return Err(VaultError::IncompleteAccount);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("service", &self.service)
            .field("description", &self.description)
            .field("notes", &self.notes)
            .field("user", &self.user)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Ordered sequence of account records
///
/// Insertion order is preserved and duplicate services are permitted.
/// Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountCollection {
    accounts: Vec<Account>,
}

impl AccountCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new record, validating it first
    pub fn insert(&mut self, account: Account) -> Result<()> {
        account.validate_new()?;
        self.accounts.push(account);
        Ok(())
    }

    /// Remove the record at `index`, shifting later records down
    ///
    /// Returns `None` when the index is out of range.
    pub fn remove(&mut self, index: usize) -> Option<Account> {
        if index < self.accounts.len() {
            Some(self.accounts.remove(index))
        } else {
            None
        }
    }

    /// Get the record at `index`
    pub fn get(&self, index: usize) -> Option<&Account> {
        self.accounts.get(index)
    }

    /// Get a mutable reference to the record at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Account> {
        self.accounts.get_mut(index)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Check if the collection holds no records
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterate over the records in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Account> {
        self.accounts.iter()
    }
}

impl<'a> IntoIterator for &'a AccountCollection {
    type Item = &'a Account;
    type IntoIter = std::slice::Iter<'a, Account>;

    fn into_iter(self) -> Self::IntoIter {
        self.accounts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Account {
        Account::new("mail", "personal mailbox", "", "alice@example.org", "s3cret")
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        for field in ["service", "description", "notes", "user", "pw"] {
            assert!(json.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
        assert!(!json.contains("\"secret\""));
    }

    #[test]
    fn test_field_order_is_fixed() {
        let json = serde_json::to_string(&sample()).unwrap();
        let positions: Vec<usize> = ["service", "description", "notes", "user", "pw"]
            .iter()
            .map(|f| json.find(&format!("\"{}\"", f)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_validate_new() {
        assert!(sample().validate_new().is_ok());

        let no_service = Account::new("", "", "", "bob", "pw");
        assert!(matches!(
            no_service.validate_new(),
            Err(VaultError::IncompleteAccount)
        ));

        let no_secret = Account::new("mail", "", "", "bob", "");
        assert!(no_secret.validate_new().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_insert_and_remove_preserve_order() {
        let mut collection = AccountCollection::new();
        for name in ["first", "second", "third"] {
            collection
                .insert(Account::new(name, "", "", "", "pw"))
                .unwrap();
        }

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.get(1).unwrap().service, "second");

        let removed = collection.remove(1).unwrap();
        assert_eq!(removed.service, "second");
        assert_eq!(collection.get(1).unwrap().service, "third");

        assert!(collection.remove(5).is_none());
    }

    #[test]
    fn test_insert_rejects_incomplete() {
        let mut collection = AccountCollection::new();
        let result = collection.insert(Account::new("", "", "", "", ""));
        assert!(result.is_err());
        assert!(collection.is_empty());
    }

    #[test]
    fn test_duplicate_services_permitted() {
        let mut collection = AccountCollection::new();
        collection
            .insert(Account::new("mail", "", "", "a", "pw1"))
            .unwrap();
        collection
            .insert(Account::new("mail", "", "", "b", "pw2"))
            .unwrap();
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_collection_serializes_as_array() {
        let mut collection = AccountCollection::new();
        collection.insert(sample()).unwrap();

        let json = serde_json::to_string(&collection).unwrap();
        assert!(json.starts_with('['));

        let parsed: AccountCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, collection);
    }
}
