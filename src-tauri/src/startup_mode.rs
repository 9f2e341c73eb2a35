use std::path::PathBuf;

use tauri::{AppHandle, Manager};

use crate::{runtime_paths, shell_config::ShellConfig};

/// Whether the shell runs from a finished bundle or from a development checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagingMode {
    Packaged { resources_dir: PathBuf },
    Development { manifest_dir: PathBuf },
}

impl PackagingMode {
    pub fn is_packaged(&self) -> bool {
        matches!(self, Self::Packaged { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagingModeKind {
    Packaged,
    Development,
}

pub(crate) fn normalize_packaging_mode(raw: &str) -> Option<PackagingModeKind> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "packaged" | "release" | "bundle" => Some(PackagingModeKind::Packaged),
        "dev" | "development" | "unpackaged" => Some(PackagingModeKind::Development),
        _ => None,
    }
}

pub(crate) fn packaging_mode_for(
    kind: PackagingModeKind,
    resources_dir: Option<PathBuf>,
    manifest_dir: PathBuf,
) -> PackagingMode {
    match (kind, resources_dir) {
        (PackagingModeKind::Packaged, Some(resources_dir)) => {
            PackagingMode::Packaged { resources_dir }
        }
        _ => PackagingMode::Development { manifest_dir },
    }
}

pub fn detect_packaging_mode<F>(app_handle: &AppHandle, config: &ShellConfig, log: F) -> PackagingMode
where
    F: Fn(&str),
{
    let kind = config.packaging_mode_override.unwrap_or(if tauri::is_dev() {
        PackagingModeKind::Development
    } else {
        PackagingModeKind::Packaged
    });

    let resources_dir = match kind {
        PackagingModeKind::Packaged => match app_handle.path().resource_dir() {
            Ok(dir) => Some(dir),
            Err(error) => {
                log(&format!(
                    "failed to resolve resource directory, falling back to development layout: {error}"
                ));
                None
            }
        },
        PackagingModeKind::Development => None,
    };

    packaging_mode_for(kind, resources_dir, runtime_paths::manifest_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_packaging_mode_accepts_aliases() {
        assert_eq!(
            normalize_packaging_mode(" Packaged "),
            Some(PackagingModeKind::Packaged)
        );
        assert_eq!(
            normalize_packaging_mode("dev"),
            Some(PackagingModeKind::Development)
        );
        assert_eq!(
            normalize_packaging_mode("unpackaged"),
            Some(PackagingModeKind::Development)
        );
        assert_eq!(normalize_packaging_mode("portable"), None);
    }

    #[test]
    fn packaging_mode_for_falls_back_to_development_without_resources_dir() {
        let manifest_dir = PathBuf::from("/src/app_ws/src-tauri");
        assert_eq!(
            packaging_mode_for(PackagingModeKind::Packaged, None, manifest_dir.clone()),
            PackagingMode::Development {
                manifest_dir: manifest_dir.clone()
            }
        );

        let mode = packaging_mode_for(
            PackagingModeKind::Packaged,
            Some(PathBuf::from("/opt/app_ws")),
            manifest_dir,
        );
        assert!(mode.is_packaged());
    }
}
