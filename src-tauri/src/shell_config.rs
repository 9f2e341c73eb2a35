use std::{env, path::PathBuf};

use crate::{
    server_pool::ServerPolicy,
    startup_mode::{self, PackagingModeKind},
    DEVTOOLS_ENV, PACKAGING_MODE_ENV, SERVER_POLICY_ENV, SOFTWARE_RENDERING_ENV, WEB_ROOT_ENV,
};

/// Runtime switches read once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub web_root_override: Option<PathBuf>,
    pub packaging_mode_override: Option<PackagingModeKind>,
    pub server_policy: ServerPolicy,
    pub software_rendering: bool,
    /// `None` leaves the decision to the packaging mode.
    pub devtools: Option<bool>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            web_root_override: None,
            packaging_mode_override: None,
            server_policy: ServerPolicy::PerWindow,
            software_rendering: true,
            devtools: None,
        }
    }
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            web_root_override: read(WEB_ROOT_ENV).map(PathBuf::from),
            packaging_mode_override: read(PACKAGING_MODE_ENV)
                .as_deref()
                .and_then(startup_mode::normalize_packaging_mode),
            server_policy: read(SERVER_POLICY_ENV)
                .as_deref()
                .and_then(ServerPolicy::parse)
                .unwrap_or(defaults.server_policy),
            software_rendering: read(SOFTWARE_RENDERING_ENV)
                .as_deref()
                .and_then(parse_flag)
                .unwrap_or(defaults.software_rendering),
            devtools: read(DEVTOOLS_ENV).as_deref().and_then(parse_flag),
        }
    }

    pub fn devtools_enabled(&self, packaged: bool) -> bool {
        self.devtools.unwrap_or(!packaged)
    }
}

pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> ShellConfig {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ShellConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn from_lookup_uses_defaults_for_empty_environment() {
        assert_eq!(config_from(&[]), ShellConfig::default());
    }

    #[test]
    fn from_lookup_reads_all_overrides() {
        let config = config_from(&[
            (WEB_ROOT_ENV, " /srv/web "),
            (PACKAGING_MODE_ENV, "packaged"),
            (SERVER_POLICY_ENV, "shared"),
            (SOFTWARE_RENDERING_ENV, "0"),
            (DEVTOOLS_ENV, "yes"),
        ]);

        assert_eq!(config.web_root_override, Some(PathBuf::from("/srv/web")));
        assert_eq!(
            config.packaging_mode_override,
            Some(PackagingModeKind::Packaged)
        );
        assert_eq!(config.server_policy, ServerPolicy::Shared);
        assert!(!config.software_rendering);
        assert_eq!(config.devtools, Some(true));
    }

    #[test]
    fn from_lookup_ignores_blank_and_unknown_values() {
        let config = config_from(&[
            (WEB_ROOT_ENV, "   "),
            (SERVER_POLICY_ENV, "pooled"),
            (SOFTWARE_RENDERING_ENV, "maybe"),
        ]);

        assert_eq!(config.web_root_override, None);
        assert_eq!(config.server_policy, ServerPolicy::PerWindow);
        assert!(config.software_rendering);
    }

    #[test]
    fn devtools_enabled_follows_packaging_mode_unless_overridden() {
        let config = ShellConfig::default();
        assert!(config.devtools_enabled(false));
        assert!(!config.devtools_enabled(true));

        let forced_off = config_from(&[(DEVTOOLS_ENV, "off")]);
        assert!(!forced_off.devtools_enabled(false));
    }
}
