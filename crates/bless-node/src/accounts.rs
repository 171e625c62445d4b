// ============================================
// File: crates/bless-node/src/accounts.rs
// ============================================
//! # Account Store
//!
//! ## Creation Reason
//! The scheduler re-reads the account list on every resync pass. This
//! module provides the store abstraction and the JSON file store.
//!
//! ## Account File Format
//! ```json
//! [
//!   {
//!     "Token": "eyJ...",
//!     "SecretKey": "...",
//!     "Nodes": [ { "PubKey": "12D3Koo...", "HardwareId": "b2a1..." } ]
//!   }
//! ]
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - A file that is not a JSON array is an error
//! - A single malformed entry is skipped with a warning, the rest loads
//! - Empty fields are not rejected here, the scheduler validates and
//!   skips them so the resync logs them each pass
//!
//! ## Last Modified
//! v0.1.0 - Initial account store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use bless_common::Account;

use crate::error::{NodeError, Result};

// ============================================
// AccountStore Trait
// ============================================

/// Source of the account list.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Returns the current accounts in file order.
    ///
    /// # Errors
    /// Returns `AccountLoad` if the source cannot be read at all.
    async fn load(&self) -> Result<Vec<Account>>;
}

// ============================================
// JsonAccountStore
// ============================================

/// Account store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonAccountStore {
    path: PathBuf,
}

impl JsonAccountStore {
    /// Creates a store reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AccountStore for JsonAccountStore {
    async fn load(&self) -> Result<Vec<Account>> {
        let path_str = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| NodeError::account_load(&path_str, e.to_string()))?;
        let accounts = parse_accounts(&content).map_err(|e| match e {
            NodeError::AccountLoad { reason, .. } => NodeError::account_load(&path_str, reason),
            other => other,
        })?;
        debug!(path = %path_str, count = accounts.len(), "Accounts loaded");
        Ok(accounts)
    }
}

/// Parses the account file content.
///
/// # Errors
/// Returns `AccountLoad` if the content is not a JSON array.
pub fn parse_accounts(content: &str) -> Result<Vec<Account>> {
    let entries: Vec<Value> = serde_json::from_str(content)
        .map_err(|e| NodeError::account_load("<string>", e.to_string()))?;

    let mut accounts = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Account>(entry) {
            Ok(account) => accounts.push(account),
            Err(e) => warn!(index, error = %e, "Skipping malformed account entry"),
        }
    }
    Ok(accounts)
}

// ============================================
// StaticAccountStore
// ============================================

/// In-memory account store.
///
/// Used when accounts come from somewhere other than a file, and by tests
/// that change the list between resync passes.
#[derive(Debug, Default)]
pub struct StaticAccountStore {
    accounts: RwLock<Vec<Account>>,
}

impl StaticAccountStore {
    /// Creates a store holding `accounts`.
    #[must_use]
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    /// Replaces the account list.
    pub fn replace(&self, accounts: Vec<Account>) {
        *self.accounts.write() = accounts;
    }
}

#[async_trait]
impl AccountStore for StaticAccountStore {
    async fn load(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.read().clone())
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use bless_common::Node;

    const ACCOUNTS: &str = r#"[
        {
            "Token": "token-one",
            "SecretKey": "secret-one",
            "Nodes": [
                { "PubKey": "pk-1", "HardwareId": "hw-1" },
                { "PubKey": "pk-2", "HardwareId": "hw-2" }
            ]
        },
        { "Token": 42 },
        { "Token": "token-two", "SecretKey": "", "Nodes": [] }
    ]"#;

    #[test]
    fn test_parse_accounts() {
        let accounts = parse_accounts(ACCOUNTS).unwrap();
        assert_eq!(accounts.len(), 2);

        let first = &accounts[0];
        assert_eq!(first.token, "token-one");
        assert_eq!(first.secret_key.expose(), "secret-one");
        assert_eq!(first.nodes, vec![Node::new("pk-1", "hw-1"), Node::new("pk-2", "hw-2")]);

        // kept, rejected later by validation
        assert!(accounts[1].validate().is_err());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(matches!(
            parse_accounts(r#"{"Token": "x"}"#),
            Err(NodeError::AccountLoad { .. })
        ));
    }

    #[tokio::test]
    async fn test_json_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        tokio::fs::write(&path, ACCOUNTS).await.unwrap();

        let accounts = JsonAccountStore::new(&path).load().await.unwrap();
        assert_eq!(accounts.len(), 2);
    }

    #[tokio::test]
    async fn test_json_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAccountStore::new(dir.path().join("nope.json"));

        match store.load().await {
            Err(NodeError::AccountLoad { path, .. }) => assert!(path.ends_with("nope.json")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_static_store_replace() {
        let store = StaticAccountStore::new(vec![]);
        assert!(store.load().await.unwrap().is_empty());

        store.replace(vec![Account::new("t", "s", vec![Node::new("pk", "hw")])]);
        assert_eq!(store.load().await.unwrap().len(), 1);
    }
}
