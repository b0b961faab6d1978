use std::fs;

use clap::Parser;
use realmgate_cli::commands::accounts::AccountsAction;
use realmgate_cli::commands::launch::LaunchArgs;
use realmgate_cli::commands::servers::ServersAction;
use realmgate_cli::commands::{Command, Target};
use realmgate_cli::Context;
use realmgate_client::config::{AccountStore, AutomationConfig, AppConfig, ServerCatalog};

#[derive(Parser)]
struct TestCli {
    #[command(subcommand)]
    command: Command,
}

fn parse(args: &[&str]) -> Command {
    TestCli::try_parse_from(std::iter::once("realmgate").chain(args.iter().copied()))
        .unwrap()
        .command
}

fn context(dir: &tempfile::TempDir) -> Context {
    let mut ctx = Context::open(Some(dir.path().to_path_buf())).unwrap();
    ctx.config.automation = AutomationConfig::immediate();
    ctx
}

#[test]
fn test_first_run_writes_builtin_catalog_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let catalog = ctx.catalog().unwrap();

    assert!(catalog.contains_server("StormForge"));
    assert!(dir.path().join("servers_config.json").exists());
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_first_run_with_account_files_detects_them() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("accounts_warmane_wotlk.json"),
        r#"{"accounts": []}"#,
    )
    .unwrap();

    let ctx = context(&dir);
    let catalog = ctx.catalog().unwrap();
    assert!(!catalog.contains_server("StormForge"));
    assert!(catalog.expansion("Warmane", "WotLK 3.3.5").is_some());
}

#[test]
fn test_server_commands() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);

    parse(&["servers", "add", "Warmane"]).run(&mut ctx).unwrap();
    parse(&["servers", "rename", "Warmane", "Warmane EU"])
        .run(&mut ctx)
        .unwrap();

    let catalog = ServerCatalog::load(&dir.path().join("servers_config.json")).unwrap();
    assert!(catalog.contains_server("Warmane EU"));
    assert!(!catalog.contains_server("Warmane"));

    let duplicate = Command::Servers {
        action: ServersAction::Add {
            name: "StormForge".to_string(),
        },
    };
    assert!(duplicate.run(&mut ctx).is_err());
}

#[test]
fn test_expansion_and_account_commands() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);

    parse(&["expansions", "add", "StormForge", "Legion", "--accounts-file", "legion.json"])
        .run(&mut ctx)
        .unwrap();
    parse(&[
        "accounts", "-s", "StormForge", "-e", "Legion", "add", "alice", "secret", "--alias", "Main",
    ])
    .run(&mut ctx)
    .unwrap();

    let store = AccountStore::load(dir.path().join("legion.json")).unwrap();
    let account = store.find_by_display_name("Main").unwrap();
    assert_eq!(account.username, "alice");
    assert_eq!(account.server.as_deref(), Some("StormForge"));
    assert_eq!(account.expansion.as_deref(), Some("Legion"));

    let missing_password = Command::Accounts {
        target: Target {
            server: Some("StormForge".to_string()),
            expansion: Some("Legion".to_string()),
        },
        action: AccountsAction::Add {
            username: "bob".to_string(),
            password: "   ".to_string(),
            alias: None,
        },
    };
    assert!(missing_password.run(&mut ctx).is_err());
}

#[test]
fn test_server_with_several_expansions_needs_a_choice() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);

    let result = parse(&["accounts", "-s", "StormForge", "list"]).run(&mut ctx);
    let message = result.unwrap_err().to_string();
    assert!(message.contains("Please select a specific expansion"), "{}", message);
}

#[test]
fn test_coords_reset_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);

    parse(&["coords", "-s", "StormForge", "-e", "TBC 2.4.3", "reset"])
        .run(&mut ctx)
        .unwrap();

    let written =
        fs::read_to_string(dir.path().join("login_coords_stormforge_tbc.json")).unwrap();
    assert!(written.contains("\"username_x\": 1692"));
    assert!(written.contains("\"login_button_x\""));
}

#[test]
fn test_launch_without_accounts_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);

    let args = LaunchArgs {
        target: Target {
            server: Some("StormForge".to_string()),
            expansion: Some("MoP 5.4.8".to_string()),
        },
        account: None,
        dry_run: true,
    };
    let message = Command::Launch(args).run(&mut ctx).unwrap_err().to_string();
    assert!(message.contains("No accounts"), "{}", message);
}

#[test]
fn test_launch_with_missing_game_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);

    parse(&["accounts", "-s", "StormForge", "-e", "TBC 2.4.3", "add", "alice", "secret"])
        .run(&mut ctx)
        .unwrap();
    let message = parse(&["launch", "-s", "StormForge", "-e", "TBC 2.4.3", "--dry-run"])
        .run(&mut ctx)
        .unwrap_err()
        .to_string();
    assert!(message.contains("Game executable not found"), "{}", message);

    // Nothing was launched, so nothing is remembered
    let config = AppConfig::load(&dir.path().join("config.toml")).unwrap();
    assert!(config.last_server.is_empty());
}

#[cfg(unix)]
#[test]
fn test_dry_run_launch_remembers_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);

    parse(&["expansions", "set-path", "StormForge", "MoP 5.4.8", "/bin/true"])
        .run(&mut ctx)
        .unwrap();
    parse(&["accounts", "-s", "StormForge", "-e", "MoP 5.4.8", "add", "alice", "secret"])
        .run(&mut ctx)
        .unwrap();

    parse(&["launch", "-s", "StormForge", "-e", "MoP 5.4.8", "--dry-run"])
        .run(&mut ctx)
        .unwrap();

    let config = AppConfig::load(&dir.path().join("config.toml")).unwrap();
    assert_eq!(config.last_server, "StormForge");
    assert_eq!(config.last_expansion, "MoP 5.4.8");

    // The remembered server and expansion are used when none are given
    parse(&["launch", "--dry-run", "--account", "alice"])
        .run(&mut ctx)
        .unwrap();
}

#[cfg(unix)]
#[test]
fn test_exhausted_login_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);
    ctx.config.automation.max_attempts = 0;

    parse(&["expansions", "set-path", "StormForge", "MoP 5.4.8", "/bin/true"])
        .run(&mut ctx)
        .unwrap();
    parse(&["accounts", "-s", "StormForge", "-e", "MoP 5.4.8", "add", "alice", "secret"])
        .run(&mut ctx)
        .unwrap();

    let message = parse(&["launch", "-s", "StormForge", "-e", "MoP 5.4.8", "--dry-run"])
        .run(&mut ctx)
        .unwrap_err()
        .to_string();
    assert!(message.contains("Failed to log in automatically"), "{}", message);
}
