use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::json_file;
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
    /// Optional display name shown instead of the username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansion: Option<String>,
}

impl Account {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            alias: None,
            server: None,
            expansion: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    fn alias_str(&self) -> Option<&str> {
        self.alias.as_deref().filter(|a| !a.is_empty())
    }

    /// Alias when set, username otherwise
    pub fn display_name(&self) -> &str {
        self.alias_str().unwrap_or(&self.username)
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.alias_str() {
            Some(alias) => write!(f, "{} ({})", alias, self.username),
            None => write!(f, "{}", self.username),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: Vec<Account>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Append imported accounts to the existing ones
    Merge,
    /// Drop existing accounts first
    Replace,
}

/// The accounts of one server expansion, backed by a single JSON file that is
/// rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct AccountStore {
    path: PathBuf,
    server: Option<String>,
    expansion: Option<String>,
    accounts: Vec<Account>,
}

impl AccountStore {
    /// Load a store. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let file: AccountsFile = json_file::read(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            server: None,
            expansion: None,
            accounts: file.accounts,
        })
    }

    /// Like [`AccountStore::load`], but a malformed file is treated as empty
    pub fn load_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::load(path.clone()).unwrap_or_else(|e| {
            warn!("Failed to load accounts, starting empty: {}", e);
            Self {
                path,
                server: None,
                expansion: None,
                accounts: Vec::new(),
            }
        })
    }

    /// Stamp accounts added or imported from now on with this server and expansion
    pub fn for_expansion(mut self, server: &str, expansion: &str) -> Self {
        self.server = Some(server.to_string());
        self.expansion = Some(expansion.to_string());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn save(&self) -> Result<(), StoreError> {
        json_file::write(
            &self.path,
            &AccountsFile {
                accounts: self.accounts.clone(),
            },
        )?;
        info!(
            "Saved {} accounts to {}",
            self.accounts.len(),
            self.path.display()
        );
        Ok(())
    }

    fn stamp(&self, account: &mut Account) {
        if self.server.is_some() {
            account.server = self.server.clone();
        }
        if self.expansion.is_some() {
            account.expansion = self.expansion.clone();
        }
    }

    /// Add an account or replace the one with the same username.
    ///
    /// Returns `true` when an existing account was replaced.
    pub fn upsert(&mut self, mut account: Account) -> Result<bool, StoreError> {
        account.username = account.username.trim().to_string();
        account.password = account.password.trim().to_string();
        account.alias = account
            .alias
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        if account.username.is_empty() || account.password.is_empty() {
            return Err(StoreError::Validation(
                "Username and password are required!".to_string(),
            ));
        }
        self.stamp(&mut account);

        match self
            .accounts
            .iter_mut()
            .find(|a| a.username == account.username)
        {
            Some(existing) => {
                *existing = account;
                Ok(true)
            }
            None => {
                self.accounts.push(account);
                Ok(false)
            }
        }
    }

    pub fn remove(&mut self, username: &str) -> Result<Account, StoreError> {
        let idx = self
            .accounts
            .iter()
            .position(|a| a.username == username)
            .ok_or_else(|| {
                StoreError::NotFound(format!("Account with username '{}'", username))
            })?;
        Ok(self.accounts.remove(idx))
    }

    pub fn find_by_username(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    /// First account whose alias is `name`, or which has no alias and whose
    /// username is `name`.
    pub fn find_by_display_name(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| match a.alias_str() {
            Some(alias) => alias == name,
            None => a.username == name,
        })
    }

    pub fn display_names(&self) -> Vec<&str> {
        self.accounts.iter().map(Account::display_name).collect()
    }

    /// Import accounts from another accounts file. Returns how many were read.
    pub fn import(&mut self, source: &Path, mode: ImportMode) -> Result<usize, StoreError> {
        let file: AccountsFile = json_file::read(source)?
            .ok_or_else(|| StoreError::NotFound(format!("File {}", source.display())))?;

        let mut imported = file.accounts;
        if imported.is_empty() {
            return Ok(0);
        }
        for account in imported.iter_mut() {
            self.stamp(account);
        }

        let count = imported.len();
        match mode {
            ImportMode::Merge => self.accounts.extend(imported),
            ImportMode::Replace => self.accounts = imported,
        }
        info!("Imported {} accounts from {}", count, source.display());
        Ok(count)
    }

    /// Write all accounts to another file. Returns how many were written.
    pub fn export(&self, destination: &Path) -> Result<usize, StoreError> {
        if self.accounts.is_empty() {
            return Err(StoreError::Validation("No accounts to export.".to_string()));
        }
        json_file::write(
            destination,
            &AccountsFile {
                accounts: self.accounts.clone(),
            },
        )?;
        Ok(self.accounts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_in(dir: &tempfile::TempDir) -> AccountStore {
        AccountStore::load(dir.path().join("accounts_test_mop.json"))
            .unwrap()
            .for_expansion("StormForge", "MoP 5.4.8")
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).is_empty());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(AccountStore::load(&path).is_err());
        assert!(AccountStore::load_or_empty(&path).is_empty());
    }

    #[test]
    fn test_upsert_replaces_by_username() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        assert!(!store.upsert(Account::new("alice", "one")).unwrap());
        assert!(!store.upsert(Account::new("bob", "two")).unwrap());
        assert!(store
            .upsert(Account::new("alice", "three").with_alias("Main"))
            .unwrap());

        assert_eq!(store.accounts().len(), 2);
        let alice = &store.accounts()[0];
        assert_eq!(alice.password, "three");
        assert_eq!(alice.display_name(), "Main");
        assert_eq!(alice.server.as_deref(), Some("StormForge"));
        assert_eq!(alice.expansion.as_deref(), Some("MoP 5.4.8"));
    }

    #[test]
    fn test_upsert_requires_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        assert!(matches!(
            store.upsert(Account::new("  ", "pw")),
            Err(StoreError::Validation(_))
        ));
        assert!(store.upsert(Account::new("alice", "")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_display_name_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store
            .upsert(Account::new("alice", "pw").with_alias("bob"))
            .unwrap();
        store.upsert(Account::new("bob", "pw")).unwrap();

        // An alias wins over a username that happens to match it
        assert_eq!(store.find_by_display_name("bob").unwrap().username, "alice");
        assert!(store.find_by_display_name("alice").is_none());
        assert_eq!(store.display_names(), vec!["bob", "bob"]);
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.upsert(Account::new("alice", "pw")).unwrap();
        assert_eq!(store.remove("alice").unwrap().username, "alice");
        assert!(matches!(store.remove("alice"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store
            .upsert(Account::new("alice", "secret").with_alias("Main"))
            .unwrap();
        store.save().unwrap();

        let reloaded = AccountStore::load(store.path()).unwrap();
        assert_eq!(reloaded.accounts(), store.accounts());
    }

    #[test]
    fn test_reads_legacy_empty_alias() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        fs::write(
            &path,
            r#"{"accounts": [{"username": "alice", "password": "pw", "alias": "", "server": "S", "expansion": "E"}]}"#,
        )
        .unwrap();

        let store = AccountStore::load(&path).unwrap();
        assert_eq!(store.accounts()[0].display_name(), "alice");
        assert!(store.find_by_display_name("alice").is_some());
    }

    #[test]
    fn test_import_merge_and_replace() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("export.json");
        fs::write(
            &source,
            r#"{"accounts": [{"username": "carol", "password": "pw", "server": "Other"}]}"#,
        )
        .unwrap();

        let mut store = store_in(&dir);
        store.upsert(Account::new("alice", "pw")).unwrap();

        assert_eq!(store.import(&source, ImportMode::Merge).unwrap(), 1);
        assert_eq!(store.accounts().len(), 2);
        assert_eq!(store.accounts()[1].server.as_deref(), Some("StormForge"));

        assert_eq!(store.import(&source, ImportMode::Replace).unwrap(), 1);
        assert_eq!(store.accounts().len(), 1);
        assert_eq!(store.accounts()[0].username, "carol");
    }

    #[test]
    fn test_import_of_empty_file_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("empty.json");
        fs::write(&source, r#"{"accounts": []}"#).unwrap();

        let mut store = store_in(&dir);
        store.upsert(Account::new("alice", "pw")).unwrap();
        assert_eq!(store.import(&source, ImportMode::Replace).unwrap(), 0);
        assert_eq!(store.accounts().len(), 1);
    }

    #[test]
    fn test_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let destination = dir.path().join("out.json");
        assert!(matches!(
            store.export(&destination),
            Err(StoreError::Validation(_))
        ));

        store.upsert(Account::new("alice", "pw")).unwrap();
        assert_eq!(store.export(&destination).unwrap(), 1);
        let exported = AccountStore::load(&destination).unwrap();
        assert_eq!(exported.accounts(), store.accounts());
    }
}
