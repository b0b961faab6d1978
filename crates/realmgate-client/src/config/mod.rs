pub mod account_store;
pub mod app_config;
pub mod automation_config;
pub mod coordinates;
pub mod detect;
mod json_file;
pub mod paths;
pub mod server_config;

pub use account_store::{Account, AccountStore, ImportMode};
pub use app_config::{AppConfig, ConfigLoadError};
pub use automation_config::AutomationConfig;
pub use coordinates::{LoginCoordinates, Point};
pub use detect::{detect_existing_accounts, DetectionConflict, DetectionReport};
pub use paths::{DataLayout, ProjectPaths};
pub use server_config::{Expansion, ResolvedExpansion, Server, ServerCatalog};
