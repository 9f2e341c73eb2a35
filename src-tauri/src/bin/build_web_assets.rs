//! Builds the web application served by the desktop shell.
//!
//! ```bash
//! cargo run --bin build-web-assets -- --dry-run
//! ```
//!
//! Only `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `OPENAI_API_KEY` are forwarded
//! from the env file to the build.

use std::path::PathBuf;
use std::process::ExitCode;

use app_ws_desktop_lib::build_bridge::{self, BuildOptions, LOG_PREFIX};
use clap::Parser;

/// Run the web build with allow-listed defines from an env file.
#[derive(Parser, Debug)]
#[command(name = "build-web-assets")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Env file to read defines from (default: <project-dir>/.env)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Project root the build runs in (default: the workspace root)
    #[arg(long)]
    project_dir: Option<PathBuf>,

    /// Print the command without running it
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = BuildOptions {
        env_file: cli.env_file,
        project_dir: cli.project_dir,
        command_override: None,
        dry_run: cli.dry_run,
    }
    .with_env_defaults();

    match build_bridge::run_build(&options, |line| println!("{LOG_PREFIX} {line}")) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{LOG_PREFIX} web build failed: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}
