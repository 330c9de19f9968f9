// src/infra/paths.rs - Config path resolution
//
// ESGSIM_HOME overrides everything. Otherwise config lives in ~/.esgsim/.

use std::path::PathBuf;

/// Returns the ESGSIM_HOME override, if set.
fn esgsim_home() -> Option<PathBuf> {
    std::env::var_os("ESGSIM_HOME").map(PathBuf::from)
}

/// Configuration directory: $ESGSIM_HOME/ or ~/.esgsim/
pub fn config_dir() -> Option<PathBuf> {
    if let Some(home) = esgsim_home() {
        return Some(home);
    }
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".esgsim"))
}

/// Config file path, if a home directory can be determined.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
