use anyhow::Result;
use clap::Subcommand;

use crate::context::Context;

#[derive(Subcommand, Debug)]
pub enum ServersAction {
    /// List servers and their expansions
    List,
    Add { name: String },
    Rename { old: String, new: String },
    /// Remove a server together with all its expansions
    Remove { name: String },
}

pub fn run(ctx: &mut Context, action: ServersAction) -> Result<()> {
    let mut catalog = ctx.catalog()?;

    match action {
        ServersAction::List => {
            if catalog.is_empty() {
                println!("No servers configured.");
            }
            for (name, server) in catalog.servers() {
                println!("{}", name);
                for (expansion_name, expansion) in &server.expansions {
                    let path = if expansion.path.as_os_str().is_empty() {
                        "<no game path>".to_string()
                    } else if expansion.executable_exists() {
                        expansion.path.display().to_string()
                    } else {
                        format!("{} (missing)", expansion.path.display())
                    };
                    println!("  {}: {}", expansion_name, path);
                }
            }
            return Ok(());
        }
        ServersAction::Add { name } => {
            catalog.add_server(&name)?;
            println!("Server '{}' added.", name.trim());
        }
        ServersAction::Rename { old, new } => {
            catalog.rename_server(&old, &new)?;
            if ctx.config.last_server == old {
                ctx.config.last_server = new.trim().to_string();
                ctx.config
                    .save(ctx.config_file())
                    .map_err(|e| anyhow::anyhow!("Failed to save config: {}", e))?;
            }
            println!("Server '{}' renamed to '{}'.", old, new.trim());
        }
        ServersAction::Remove { name } => {
            let removed = catalog.remove_server(&name)?;
            println!(
                "Server '{}' and its {} expansion(s) removed.",
                name,
                removed.expansions.len()
            );
        }
    }

    ctx.save_catalog(&catalog)
}
