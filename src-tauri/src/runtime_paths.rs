use std::{env, path::PathBuf};

use crate::DESKTOP_ROOT_ENV;

pub fn default_packaged_root_dir() -> Option<PathBuf> {
    if let Ok(root) = env::var(DESKTOP_ROOT_ENV) {
        let path = PathBuf::from(root.trim());
        if !path.as_os_str().is_empty() {
            return Some(path);
        }
    }

    home::home_dir().map(|home| home.join(".app-ws"))
}

/// Directory holding the crate manifest; the development web build sits next to it.
pub fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn workspace_root_dir() -> PathBuf {
    let candidate = manifest_dir().join("..");
    candidate.canonicalize().unwrap_or(candidate)
}
