use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::json_file;
use crate::error::StoreError;

/// One game client build of a server, e.g. "TBC 2.4.3"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    /// Game executable. Empty until the operator fills it in.
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub accounts_file: String,
    #[serde(default)]
    pub coords_file: String,
}

impl Expansion {
    pub fn new(
        path: impl Into<PathBuf>,
        accounts_file: impl Into<String>,
        coords_file: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            accounts_file: accounts_file.into(),
            coords_file: coords_file.into(),
        }
    }

    /// Defaults for an expansion freshly added to `server`
    pub fn default_for(server: &str) -> Self {
        let server = sanitize_filename(server);
        Self {
            path: PathBuf::new(),
            accounts_file: format!("accounts_{}_new.json", server),
            coords_file: format!("login_coords_{}_new.json", server),
        }
    }

    /// Whether the configured executable exists on disk
    pub fn executable_exists(&self) -> bool {
        !self.path.as_os_str().is_empty() && self.path.exists()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub expansions: IndexMap<String, Expansion>,
}

/// An expansion picked out of the catalog together with its names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExpansion {
    pub server: String,
    pub name: String,
    pub expansion: Expansion,
}

/// All configured servers, keyed by name in the order they were added
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerCatalog {
    servers: IndexMap<String, Server>,
}

pub fn sanitize_filename(s: &str) -> String {
    s.to_lowercase().replace(' ', "_")
}

fn has_account_files(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        let name = entry.file_name().to_string_lossy().to_string();
        (name.starts_with("accounts_") || name.starts_with("sfaccounts_"))
            && name.ends_with(".json")
    })
}

impl ServerCatalog {
    /// Catalog used when nothing has been configured yet
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        let mut stormforge = Server::default();
        stormforge.expansions.insert(
            "MoP 5.4.8".to_string(),
            Expansion::new(
                r"F:\stormforge mop\mop_minimal_new\Wow-64_patched.exe",
                "accounts_stormforge_mop.json",
                "login_coords_stormforge_mop.json",
            ),
        );
        stormforge.expansions.insert(
            "TBC 2.4.3".to_string(),
            Expansion::new(
                r"F:\stormforge tbc\2.4.3 bot testing client\Wow.exe",
                "accounts_stormforge_tbc.json",
                "login_coords_stormforge_tbc.json",
            ),
        );
        catalog.servers.insert("StormForge".to_string(), stormforge);
        catalog
    }

    /// Create the servers file on first run.
    ///
    /// When account files are already lying around the catalog starts empty
    /// so detection can fill it in; otherwise the built-in catalog is written.
    pub fn init(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            return Self::load(path);
        }

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let catalog = if has_account_files(dir) {
            info!("Found existing account files, starting with an empty server list");
            Self::default()
        } else {
            Self::builtin()
        };
        catalog.save(path)?;
        Ok(catalog)
    }

    /// A missing file yields the built-in catalog
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        Ok(json_file::read(path)?.unwrap_or_else(Self::builtin))
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        json_file::write(path, self)?;
        info!("Saved server configuration to {}", path.display());
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn servers(&self) -> impl Iterator<Item = (&String, &Server)> {
        self.servers.iter()
    }

    pub fn server(&self, name: &str) -> Option<&Server> {
        self.servers.get(name)
    }

    pub fn contains_server(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    pub fn expansion(&self, server: &str, name: &str) -> Option<&Expansion> {
        self.servers.get(server)?.expansions.get(name)
    }

    fn server_mut(&mut self, name: &str) -> Result<&mut Server, StoreError> {
        self.servers
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(format!("Server '{}'", name)))
    }

    pub(crate) fn entry(&mut self, server: &str) -> &mut Server {
        self.servers.entry(server.to_string()).or_default()
    }

    pub fn add_server(&mut self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("Server name is required.".to_string()));
        }
        if self.servers.contains_key(name) {
            return Err(StoreError::Duplicate(format!(
                "A server with name '{}'",
                name
            )));
        }
        self.servers.insert(name.to_string(), Server::default());
        Ok(())
    }

    /// Rename a server, keeping its expansions
    pub fn rename_server(&mut self, old: &str, new: &str) -> Result<(), StoreError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(StoreError::Validation("Server name is required.".to_string()));
        }
        if old == new {
            return self.server_mut(old).map(|_| ());
        }
        if self.servers.contains_key(new) {
            return Err(StoreError::Duplicate(format!("A server with name '{}'", new)));
        }
        let server = self
            .servers
            .shift_remove(old)
            .ok_or_else(|| StoreError::NotFound(format!("Server '{}'", old)))?;
        self.servers.insert(new.to_string(), server);
        Ok(())
    }

    pub fn remove_server(&mut self, name: &str) -> Result<Server, StoreError> {
        self.servers
            .shift_remove(name)
            .ok_or_else(|| StoreError::NotFound(format!("Server '{}'", name)))
    }

    /// Add an expansion, or update `existing` (renaming it when `name` differs).
    ///
    /// Returns `false` when the executable path is set but does not exist; the
    /// expansion is saved anyway so the path can be fixed later.
    pub fn upsert_expansion(
        &mut self,
        server: &str,
        name: &str,
        expansion: Expansion,
        existing: Option<&str>,
    ) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation(
                "Expansion name is required.".to_string(),
            ));
        }

        let entry = self.server_mut(server)?;
        let collides = entry.expansions.contains_key(name);
        match existing {
            None if collides => {
                return Err(StoreError::Duplicate(format!(
                    "An expansion with name '{}' for server '{}'",
                    name, server
                )));
            }
            Some(old) if old != name && collides => {
                return Err(StoreError::Duplicate(format!(
                    "An expansion with name '{}' for server '{}'",
                    name, server
                )));
            }
            Some(old) if old != name => {
                if entry.expansions.shift_remove(old).is_none() {
                    return Err(StoreError::NotFound(format!(
                        "Expansion '{}' of server '{}'",
                        old, server
                    )));
                }
            }
            _ => {}
        }

        let path_ok = expansion.path.as_os_str().is_empty() || expansion.path.exists();
        if !path_ok {
            warn!(
                "The executable path does not exist: {}",
                expansion.path.display()
            );
        }
        entry.expansions.insert(name.to_string(), expansion);
        Ok(path_ok)
    }

    /// Remove an expansion. Returns `true` when the server has none left.
    pub fn remove_expansion(&mut self, server: &str, name: &str) -> Result<bool, StoreError> {
        let entry = self.server_mut(server)?;
        if entry.expansions.shift_remove(name).is_none() {
            return Err(StoreError::NotFound(format!(
                "Expansion '{}' of server '{}'",
                name, server
            )));
        }
        Ok(entry.expansions.is_empty())
    }

    pub fn set_path(
        &mut self,
        server: &str,
        name: &str,
        path: impl Into<PathBuf>,
    ) -> Result<(), StoreError> {
        let expansion = self
            .server_mut(server)?
            .expansions
            .get_mut(name)
            .ok_or_else(|| {
                StoreError::NotFound(format!("Expansion '{}' of server '{}'", name, server))
            })?;
        expansion.path = path.into();
        Ok(())
    }

    /// Pick an expansion of `server`. Without a name the server must have
    /// exactly one expansion.
    pub fn resolve(
        &self,
        server: &str,
        expansion: Option<&str>,
    ) -> Result<ResolvedExpansion, StoreError> {
        let entry = self
            .servers
            .get(server)
            .ok_or_else(|| StoreError::NotFound(format!("Server '{}'", server)))?;

        let (name, found) = match expansion {
            Some(name) => entry
                .expansions
                .get_key_value(name)
                .ok_or_else(|| {
                    StoreError::NotFound(format!("Expansion '{}' of server '{}'", name, server))
                })?,
            None => {
                let mut iter = entry.expansions.iter();
                match (iter.next(), iter.next()) {
                    (Some(only), None) => only,
                    (None, _) => {
                        return Err(StoreError::Validation(format!(
                            "Server {} has no configured expansions. Please add one.",
                            server
                        )))
                    }
                    (Some(_), Some(_)) => {
                        return Err(StoreError::Validation(format!(
                            "Please select a specific expansion for {}.",
                            server
                        )))
                    }
                }
            }
        };

        Ok(ResolvedExpansion {
            server: server.to_string(),
            name: name.clone(),
            expansion: found.clone(),
        })
    }
}
