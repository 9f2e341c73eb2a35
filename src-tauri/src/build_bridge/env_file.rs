use std::{collections::BTreeMap, fs, io, path::Path};

use super::BuildBridgeError;

/// Keys forwarded to the web build as compile-time defines. Anything else in
/// the env file stays on this machine.
pub const ALLOWED_DEFINE_KEYS: [&str; 3] = ["SUPABASE_URL", "SUPABASE_ANON_KEY", "OPENAI_API_KEY"];

pub const DEFINE_FLAG_PREFIX: &str = "--dart-define=";

pub fn parse_env_definitions(text: &str) -> BTreeMap<String, String> {
    let mut definitions = BTreeMap::new();
    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        definitions.insert(key.to_string(), value.trim().to_string());
    }
    definitions
}

/// A missing file yields no definitions; any other read failure is an error.
pub fn read_env_file(path: &Path) -> Result<BTreeMap<String, String>, BuildBridgeError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(parse_env_definitions(&text)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(source) => Err(BuildBridgeError::EnvFileRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn collect_defines(env: &BTreeMap<String, String>) -> Vec<String> {
    ALLOWED_DEFINE_KEYS
        .iter()
        .filter_map(|key| {
            env.get(*key)
                .filter(|value| !value.is_empty())
                .map(|value| format!("{DEFINE_FLAG_PREFIX}{key}={value}"))
        })
        .collect()
}

/// Replaces the value of a define flag so the command line can be logged.
pub fn mask_define(arg: &str) -> String {
    match arg
        .strip_prefix(DEFINE_FLAG_PREFIX)
        .and_then(|define| define.split_once('='))
    {
        Some((key, _)) => format!("{DEFINE_FLAG_PREFIX}{key}=***"),
        None => arg.to_string(),
    }
}
