//! Default locations for the config file and the store.
//!
//! - Linux: ~/.config/envar/envar.toml, ~/.local/share/envar/store.json
//! - macOS: ~/Library/Application Support/org.envar.envar/
//! - Windows: %APPDATA%/envar/envar/{config,data}/

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use directories::ProjectDirs;

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "envar";
const APP_NAME: &str = "envar";
const CONFIG_FILENAME: &str = "envar.toml";
const STORE_FILENAME: &str = "store.json";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

/// Config file to load. `None` when no explicit path was given and the
/// platform directory cannot be determined.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME)))
}

/// Store file to open.
pub fn store_path(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(STORE_FILENAME)))
        .ok_or_else(|| anyhow!("could not determine a store location, pass --store"))
}
