use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use realmgate_client::config::{Account, ImportMode};

use crate::commands::Target;
use crate::context::Context;

#[derive(Subcommand, Debug)]
pub enum AccountsAction {
    List,
    /// Add an account, or update the one with the same username
    Add {
        username: String,
        password: String,
        #[arg(long)]
        alias: Option<String>,
    },
    Delete { username: String },
    /// Read accounts from another accounts file
    Import {
        file: PathBuf,
        /// Replace the current accounts instead of adding to them
        #[arg(long)]
        replace: bool,
    },
    Export { file: PathBuf },
}

pub fn run(ctx: &mut Context, target: &Target, action: AccountsAction) -> Result<()> {
    let catalog = ctx.catalog()?;
    let resolved = ctx.resolve(
        &catalog,
        target.server.as_deref(),
        target.expansion.as_deref(),
    )?;
    let mut store = ctx.accounts(&resolved);

    match action {
        AccountsAction::List => {
            println!("{} - {}", resolved.server, resolved.name);
            if store.is_empty() {
                println!("  No accounts.");
            }
            for account in store.accounts() {
                println!("  {}", account);
            }
            return Ok(());
        }
        AccountsAction::Add {
            username,
            password,
            alias,
        } => {
            let mut account = Account::new(username, password);
            account.alias = alias;
            let name = account.username.trim().to_string();
            let replaced = store.upsert(account)?;
            if replaced {
                println!("Account '{}' updated.", name);
            } else {
                println!("Account '{}' added.", name);
            }
        }
        AccountsAction::Delete { username } => {
            let removed = store.remove(&username)?;
            println!("Account '{}' deleted.", removed.display_name());
        }
        AccountsAction::Import { file, replace } => {
            let mode = if replace {
                ImportMode::Replace
            } else {
                ImportMode::Merge
            };
            let count = store.import(&file, mode)?;
            if count == 0 {
                println!("No accounts found in {}", file.display());
                return Ok(());
            }
            println!(
                "Successfully imported {} accounts to {} - {}.",
                count, resolved.server, resolved.name
            );
        }
        AccountsAction::Export { file } => {
            let count = store.export(&file)?;
            println!("Successfully exported {} accounts to {}", count, file.display());
            return Ok(());
        }
    }

    store.save()?;
    Ok(())
}
