//! Produces the web build the desktop shell serves.
//!
//! Reads `KEY=VALUE` pairs from an env file, forwards only the allow-listed
//! keys as `--dart-define` flags and runs the web build synchronously in the
//! project root with the parent's stdio.

mod env_file;

use std::{
    env,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use thiserror::Error;

pub use env_file::{
    collect_defines, mask_define, parse_env_definitions, read_env_file, ALLOWED_DEFINE_KEYS,
    DEFINE_FLAG_PREFIX,
};

use crate::runtime_paths;

pub const ENV_FILE_ENV: &str = "APP_WS_ENV_FILE";
pub const BUILD_COMMAND_ENV: &str = "APP_WS_FLUTTER_CMD";
pub const DEFAULT_ENV_FILE_NAME: &str = ".env";
pub const LOG_PREFIX: &str = "[build-web]";

#[cfg(windows)]
pub const DEFAULT_BUILD_PROGRAM: &str = "flutter.bat";
#[cfg(not(windows))]
pub const DEFAULT_BUILD_PROGRAM: &str = "flutter";

pub const BUILD_WEB_ARGS: [&str; 6] = [
    "build",
    "web",
    "--release",
    "--pwa-strategy=none",
    "--no-web-resources-cdn",
    "--no-tree-shake-icons",
];

#[derive(Debug, Error)]
pub enum BuildBridgeError {
    #[error("failed to read env file {}: {source}", path.display())]
    EnvFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited unsuccessfully: {status}")]
    ToolFailed { program: String, status: ExitStatus },
    #[error("invalid build command override: {0}")]
    InvalidCommand(String),
}

impl BuildBridgeError {
    /// Exit code the CLI reports; a failed tool passes its own code through.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ToolFailed { status, .. } => status
                .code()
                .and_then(|code| u8::try_from(code).ok())
                .filter(|code| *code != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    program: String,
    args: Vec<String>,
    project_dir: PathBuf,
}

impl BuildCommand {
    pub fn web(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: DEFAULT_BUILD_PROGRAM.to_string(),
            args: BUILD_WEB_ARGS.iter().map(|arg| arg.to_string()).collect(),
            project_dir: project_dir.into(),
        }
    }

    /// Replaces the program with shell-style words, e.g. `fvm flutter`. The
    /// extra words are placed before the build arguments.
    pub fn with_program_override(mut self, raw: &str) -> Result<Self, BuildBridgeError> {
        let words = shlex::split(raw)
            .ok_or_else(|| BuildBridgeError::InvalidCommand(format!("unbalanced quotes in `{raw}`")))?;
        let mut words = words.into_iter();
        let program = words
            .next()
            .ok_or_else(|| BuildBridgeError::InvalidCommand("empty command".to_string()))?;
        let mut args: Vec<String> = words.collect();
        args.append(&mut self.args);
        self.program = program;
        self.args = args;
        Ok(self)
    }

    pub fn with_defines(mut self, defines: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(defines);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Command line with define values masked, safe to print.
    pub fn masked_command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|arg| mask_define(arg)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn run(&self) -> Result<(), BuildBridgeError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.project_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| BuildBridgeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(BuildBridgeError::ToolFailed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub env_file: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
    pub command_override: Option<String>,
    pub dry_run: bool,
}

impl BuildOptions {
    /// Fills unset fields from `APP_WS_ENV_FILE` and `APP_WS_FLUTTER_CMD`.
    pub fn with_env_defaults(self) -> Self {
        self.with_lookup_defaults(|name| env::var(name).ok())
    }

    pub fn with_lookup_defaults<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        if self.env_file.is_none() {
            self.env_file = non_empty(ENV_FILE_ENV).map(PathBuf::from);
        }
        if self.command_override.is_none() {
            self.command_override = non_empty(BUILD_COMMAND_ENV);
        }
        self
    }

    pub fn resolved_project_dir(&self) -> PathBuf {
        self.project_dir
            .clone()
            .unwrap_or_else(runtime_paths::workspace_root_dir)
    }

    pub fn resolved_env_file(&self) -> PathBuf {
        self.env_file
            .clone()
            .unwrap_or_else(|| self.resolved_project_dir().join(DEFAULT_ENV_FILE_NAME))
    }
}

/// Assembles the build command without running it.
pub fn prepare_build<F>(options: &BuildOptions, log: F) -> Result<BuildCommand, BuildBridgeError>
where
    F: Fn(&str),
{
    let env_path = options.resolved_env_file();
    let env = read_env_file(&env_path)?;
    let defines = collect_defines(&env);
    log(&format!(
        "env file {}: {} entries, {} forwarded",
        env_path.display(),
        env.len(),
        defines.len()
    ));

    let mut command = BuildCommand::web(options.resolved_project_dir());
    if let Some(raw) = options.command_override.as_deref() {
        command = command.with_program_override(raw)?;
    }
    Ok(command.with_defines(defines))
}

pub fn run_build<F>(options: &BuildOptions, log: F) -> Result<(), BuildBridgeError>
where
    F: Fn(&str),
{
    let command = prepare_build(options, &log)?;
    log(&format!(
        "running in {}: {}",
        command.project_dir().display(),
        command.masked_command_line()
    ));
    if options.dry_run {
        log("dry run, build skipped");
        return Ok(());
    }

    command.run()?;
    log("web build succeeded");
    Ok(())
}
