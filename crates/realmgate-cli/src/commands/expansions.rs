use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use realmgate_client::config::Expansion;

use crate::context::Context;

#[derive(Args, Debug, Clone, Default)]
pub struct ExpansionFields {
    /// Game executable
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Accounts file, relative to the data directory
    #[arg(long)]
    pub accounts_file: Option<String>,

    /// Login coordinates file, relative to the data directory
    #[arg(long)]
    pub coords_file: Option<String>,
}

impl ExpansionFields {
    fn apply(self, mut expansion: Expansion) -> Expansion {
        if let Some(path) = self.path {
            expansion.path = path;
        }
        if let Some(accounts_file) = self.accounts_file {
            expansion.accounts_file = accounts_file;
        }
        if let Some(coords_file) = self.coords_file {
            expansion.coords_file = coords_file;
        }
        expansion
    }
}

#[derive(Subcommand, Debug)]
pub enum ExpansionsAction {
    /// Add an expansion to a server
    Add {
        server: String,
        name: String,
        #[command(flatten)]
        fields: ExpansionFields,
    },
    /// Change an expansion, optionally renaming it
    Edit {
        server: String,
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[command(flatten)]
        fields: ExpansionFields,
    },
    Remove {
        server: String,
        name: String,
        /// Also remove the server when this was its last expansion
        #[arg(long)]
        remove_empty_server: bool,
    },
    /// Change the game executable of an expansion
    SetPath {
        server: String,
        name: String,
        path: PathBuf,
    },
}

fn warn_missing_path(path_ok: bool, expansion: &Expansion) {
    if !path_ok {
        eprintln!(
            "Warning: the game path does not exist: {}",
            expansion.path.display()
        );
    }
}

pub fn run(ctx: &mut Context, action: ExpansionsAction) -> Result<()> {
    let mut catalog = ctx.catalog()?;

    match action {
        ExpansionsAction::Add {
            server,
            name,
            fields,
        } => {
            let expansion = fields.apply(Expansion::default_for(&server));
            let path_ok = catalog.upsert_expansion(&server, &name, expansion.clone(), None)?;
            warn_missing_path(path_ok, &expansion);
            println!("Expansion '{}' added to '{}'.", name.trim(), server);
        }
        ExpansionsAction::Edit {
            server,
            name,
            rename,
            fields,
        } => {
            let current = catalog
                .expansion(&server, &name)
                .cloned()
                .ok_or_else(|| anyhow!("Expansion '{}' of server '{}' not found", name, server))?;
            let expansion = fields.apply(current);
            let new_name = rename.unwrap_or_else(|| name.clone());
            let path_ok =
                catalog.upsert_expansion(&server, &new_name, expansion.clone(), Some(&name))?;
            warn_missing_path(path_ok, &expansion);
            println!("Expansion '{}' of '{}' updated.", new_name.trim(), server);
        }
        ExpansionsAction::Remove {
            server,
            name,
            remove_empty_server,
        } => {
            let now_empty = catalog.remove_expansion(&server, &name)?;
            println!("Expansion '{}' removed from '{}'.", name, server);
            if now_empty {
                if remove_empty_server {
                    catalog.remove_server(&server)?;
                    println!("Server '{}' had no expansions left and was removed.", server);
                } else {
                    println!(
                        "Server '{}' has no expansions left. Remove it with `realmgate servers remove`.",
                        server
                    );
                }
            }
        }
        ExpansionsAction::SetPath { server, name, path } => {
            if !path.exists() {
                eprintln!("Warning: the game path does not exist: {}", path.display());
            }
            catalog.set_path(&server, &name, path.clone())?;
            println!("Game path of {} - {} set to {}", server, name, path.display());
        }
    }

    ctx.save_catalog(&catalog)
}
