//! Startup configuration.
//!
//! Each existing config file is executed as script source, in order:
//! the system file, one per `XDG_DATA_DIRS` entry, then the user's own.
//! Missing files are skipped silently.

use rz::env::Env;
use std::fs;
use std::path::PathBuf;

pub(crate) fn load_config(env: &mut Env) {
    for path in config_paths() {
        let Ok(source) = fs::read_to_string(&path) else {
            continue;
        };
        rz::exec(&source, env);
    }
}

fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/rz/config.rz")];
    if let Ok(data_dirs) = std::env::var("XDG_DATA_DIRS") {
        for dir in data_dirs.split(':').filter(|dir| !dir.is_empty()) {
            paths.push(PathBuf::from(dir).join("rz/config.rz"));
        }
    }
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(config_home) if !config_home.is_empty() => {
            paths.push(PathBuf::from(config_home).join("rz/config.rz"));
        }
        _ => {
            if let Ok(home) = std::env::var("HOME") {
                paths.push(PathBuf::from(home).join(".config/rz/config.rz"));
            }
        }
    }
    paths
}
