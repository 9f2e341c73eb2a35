//! Desktop shell for the app_ws web build.
//!
//! The shell opens a native window, serves the pre-built web application from
//! a loopback-only static server on a kernel-assigned port and points the
//! window at it. The `build-web-assets` binary produces that web build.

mod app_constants;
mod app_runtime;
mod app_types;
pub mod build_bridge;
pub mod desktop_bridge;
mod desktop_bridge_commands;
pub mod error;
mod exit_events;
pub mod lifecycle;
pub mod logging;
mod main_window;
pub mod runtime_paths;
pub mod server_pool;
pub mod shell_config;
pub mod startup_mode;
mod startup_task;
pub mod static_server;
pub mod webui_paths;
pub mod window_host;

use std::sync::{Mutex, OnceLock};

pub use app_constants::*;
pub use error::{Result, ShellError};

static DESKTOP_LOG_WRITE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub fn run() {
    app_runtime::run();
}

pub(crate) fn append_desktop_log(message: &str) {
    append_desktop_log_with_category(logging::DesktopLogCategory::Runtime, message);
}

pub(crate) fn append_startup_log(message: &str) {
    append_desktop_log_with_category(logging::DesktopLogCategory::Startup, message);
}

pub(crate) fn append_server_log(message: &str) {
    append_desktop_log_with_category(logging::DesktopLogCategory::Server, message);
}

pub(crate) fn append_window_log(message: &str) {
    append_desktop_log_with_category(logging::DesktopLogCategory::Window, message);
}

pub(crate) fn append_console_log(message: &str) {
    append_desktop_log_with_category(logging::DesktopLogCategory::Console, message);
}

pub(crate) fn append_shutdown_log(message: &str) {
    append_desktop_log_with_category(logging::DesktopLogCategory::Shutdown, message);
}

fn append_desktop_log_with_category(category: logging::DesktopLogCategory, message: &str) {
    logging::append_desktop_log(
        category,
        message,
        runtime_paths::default_packaged_root_dir(),
        DESKTOP_LOG_FILE,
        DESKTOP_LOG_MAX_BYTES,
        LOG_BACKUP_COUNT,
        &DESKTOP_LOG_WRITE_LOCK,
    )
}
