//! Executable lookup against `$path`
//!
//! External commands without a slash are located by scanning the shell's
//! `path` list for a regular file with an execute bit. The list is read at
//! each lookup because assignments can rewrite `$path` at any time.

use std::path::{Path, PathBuf};

/// Find `name` in `dirs`, returning the first executable match.
pub fn find_in_path(name: &str, dirs: &[String]) -> Option<PathBuf> {
    for dir in dirs {
        let candidate = Path::new(dir).join(name);
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// A regular file with any execute bit set.
pub fn is_executable_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match path.metadata() {
            Ok(metadata) => metadata.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }
    #[cfg(not(unix))]
    {
        true
    }
}
