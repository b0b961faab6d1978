use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _, Result};
use realmgate_client::config::{
    detect_existing_accounts, AccountStore, AppConfig, DataLayout, ResolvedExpansion,
    ServerCatalog,
};
use tracing::{info, warn};

/// Everything a command needs: where the files live and the app config
pub struct Context {
    pub layout: DataLayout,
    pub config: AppConfig,
}

impl Context {
    pub fn open(data_dir: Option<PathBuf>) -> Result<Self> {
        let layout = DataLayout::resolve(data_dir)
            .ok_or_else(|| anyhow!("Failed to find home directory"))?;
        fs::create_dir_all(&layout.data_dir).with_context(|| {
            format!(
                "Failed to create data directory {}",
                layout.data_dir.display()
            )
        })?;

        let config = AppConfig::load_or_init(&layout.config_file).map_err(|e| {
            anyhow!(
                "Failed to load config from {}: {}",
                layout.config_file.display(),
                e
            )
        })?;

        Ok(Self { layout, config })
    }

    /// Load the server catalog, creating it on first run and picking up any
    /// account files that are not registered yet
    pub fn catalog(&self) -> Result<ServerCatalog> {
        let path = self.layout.servers_file();
        let mut catalog = ServerCatalog::init(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        let report = detect_existing_accounts(&self.layout.data_dir, &mut catalog)?;
        for conflict in &report.conflicts {
            warn!(
                "{} - {} uses {} but {} was found; run `realmgate detect --prefer-found` to switch",
                conflict.server, conflict.expansion, conflict.current, conflict.found
            );
        }
        if report.changed() {
            info!("Registered {} detected expansions", report.added.len());
            self.save_catalog(&catalog)?;
        }
        Ok(catalog)
    }

    pub fn save_catalog(&self, catalog: &ServerCatalog) -> Result<()> {
        catalog
            .save(&self.layout.servers_file())
            .context("Failed to save server configuration")
    }

    /// Pick an expansion, falling back to the last used server and expansion
    pub fn resolve(
        &self,
        catalog: &ServerCatalog,
        server: Option<&str>,
        expansion: Option<&str>,
    ) -> Result<ResolvedExpansion> {
        let last_server = non_empty(&self.config.last_server);
        let server = server.or(last_server).ok_or_else(|| {
            anyhow!("No server given and none used before. Pass --server <name>.")
        })?;

        // The remembered expansion only applies to the remembered server
        let expansion = expansion.or_else(|| {
            (Some(server) == last_server)
                .then(|| non_empty(&self.config.last_expansion))
                .flatten()
                .filter(|name| catalog.expansion(server, name).is_some())
        });

        Ok(catalog.resolve(server, expansion)?)
    }

    pub fn accounts(&self, resolved: &ResolvedExpansion) -> AccountStore {
        AccountStore::load_or_empty(self.layout.resolve_file(&resolved.expansion.accounts_file))
            .for_expansion(&resolved.server, &resolved.name)
    }

    pub fn coords_path(&self, resolved: &ResolvedExpansion) -> PathBuf {
        self.layout.resolve_file(&resolved.expansion.coords_file)
    }

    pub fn remember(&mut self, resolved: &ResolvedExpansion) -> Result<()> {
        self.config
            .update_last_used(&self.layout.config_file, &resolved.server, &resolved.name)
            .map_err(|e| anyhow!("Failed to save config: {}", e))
    }

    pub fn config_file(&self) -> &Path {
        &self.layout.config_file
    }
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.is_empty())
}
