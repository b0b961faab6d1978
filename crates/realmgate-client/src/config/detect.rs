use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::config::server_config::{Expansion, ServerCatalog};
use crate::error::StoreError;

const STORMFORGE: &str = "StormForge";

/// An expansion that already points at a different accounts file than the
/// one found on disk. Only applied when the operator agrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionConflict {
    pub server: String,
    pub expansion: String,
    pub current: String,
    pub found: String,
}

impl DetectionConflict {
    pub fn apply(&self, catalog: &mut ServerCatalog) {
        if let Some(expansion) = catalog
            .entry(&self.server)
            .expansions
            .get_mut(&self.expansion)
        {
            expansion.accounts_file = self.found.clone();
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetectionReport {
    /// (server, expansion) pairs added to the catalog
    pub added: Vec<(String, String)>,
    pub conflicts: Vec<DetectionConflict>,
}

impl DetectionReport {
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

fn expansion_for(abbreviation: &str) -> Option<&'static str> {
    match abbreviation.to_lowercase().as_str() {
        "mop" => Some("MoP 5.4.8"),
        "tbc" => Some("TBC 2.4.3"),
        "wotlk" | "wrath" => Some("WotLK 3.3.5"),
        "cata" => Some("Cataclysm 4.3.4"),
        "legion" => Some("Legion 7.3.5"),
        "classic" => Some("Classic 1.12"),
        _ => None,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Work out (server, expansion, abbreviation) from an account file name.
///
/// `sfaccounts_<exp>.json` is the old StormForge naming and only knows MoP and
/// TBC; `accounts_<server>_<exp>.json` is the current one.
fn classify(file_name: &str) -> Option<(String, &'static str, String)> {
    let stem = file_name.strip_suffix(".json")?;
    let parts: Vec<&str> = stem.split('_').collect();

    if stem.starts_with("sfaccounts_") {
        let abbreviation = parts.get(1)?.to_lowercase();
        let expansion = match abbreviation.as_str() {
            "mop" | "tbc" => expansion_for(&abbreviation)?,
            _ => return None,
        };
        Some((STORMFORGE.to_string(), expansion, abbreviation))
    } else if stem.starts_with("accounts_") {
        if parts.len() < 3 {
            return None;
        }
        let expansion = expansion_for(parts[2])?;
        Some((capitalize(parts[1]), expansion, parts[2].to_lowercase()))
    } else {
        None
    }
}

fn account_files(dir: &Path) -> Result<Vec<String>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
    let names: Vec<String> = entries
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".json"))
        .collect();

    let mut current: Vec<String> = names
        .iter()
        .filter(|n| n.starts_with("accounts_"))
        .cloned()
        .collect();
    let mut legacy: Vec<String> = names
        .iter()
        .filter(|n| n.starts_with("sfaccounts_"))
        .cloned()
        .collect();
    current.sort();
    legacy.sort();
    current.extend(legacy);
    Ok(current)
}

/// Scan `dir` for account files and register the servers and expansions they
/// belong to. Only new entries are added; the caller saves the catalog when
/// [`DetectionReport::changed`] is true.
pub fn detect_existing_accounts(
    dir: &Path,
    catalog: &mut ServerCatalog,
) -> Result<DetectionReport, StoreError> {
    let mut report = DetectionReport::default();
    let mut seen: BTreeMap<String, BTreeSet<&'static str>> = BTreeMap::new();
    // Files some expansion already uses, possibly under a differently spelled server
    let registered: BTreeSet<String> = catalog
        .servers()
        .flat_map(|(_, server)| server.expansions.values())
        .map(|expansion| expansion.accounts_file.clone())
        .collect();

    for file in account_files(dir)? {
        if registered.contains(&file) {
            continue;
        }
        let Some((server, expansion, abbreviation)) = classify(&file) else {
            debug!("Skipping unrecognized account file {}", file);
            continue;
        };

        if !seen.entry(server.clone()).or_default().insert(expansion) {
            continue;
        }

        let entry = catalog.entry(&server);
        match entry.expansions.get(expansion) {
            None => {
                entry.expansions.insert(
                    expansion.to_string(),
                    Expansion::new(
                        "",
                        file.clone(),
                        format!("login_coords_{}_{}.json", server.to_lowercase(), abbreviation),
                    ),
                );
                info!("Detected {} - {} from {}", server, expansion, file);
                report.added.push((server, expansion.to_string()));
            }
            Some(existing) if existing.accounts_file != file => {
                report.conflicts.push(DetectionConflict {
                    server,
                    expansion: expansion.to_string(),
                    current: existing.accounts_file.clone(),
                    found: file,
                });
            }
            Some(_) => {}
        }
    }

    Ok(report)
}
