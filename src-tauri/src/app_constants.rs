pub const APP_DISPLAY_NAME: &str = "app_ws";
pub const MAIN_WINDOW_LABEL: &str = "main";
pub const MAIN_WINDOW_WIDTH: f64 = 1200.0;
pub const MAIN_WINDOW_HEIGHT: f64 = 800.0;
pub const MAIN_WINDOW_BACKGROUND: (u8, u8, u8) = (0xff, 0xff, 0xff);

pub const WEB_ROOT_ENTRY_FILE: &str = "index.html";
pub const STARTUP_FAILURE_EXIT_CODE: i32 = 1;

pub const DESKTOP_LOG_FILE: &str = "desktop.log";
pub const DESKTOP_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const LOG_BACKUP_COUNT: usize = 5;

pub const WEB_ROOT_ENV: &str = "APP_WS_WEB_ROOT";
pub const PACKAGING_MODE_ENV: &str = "APP_WS_PACKAGING_MODE";
pub const SERVER_POLICY_ENV: &str = "APP_WS_SERVER_POLICY";
pub const SOFTWARE_RENDERING_ENV: &str = "APP_WS_SOFTWARE_RENDERING";
pub const DEVTOOLS_ENV: &str = "APP_WS_DEVTOOLS";
pub const DESKTOP_ROOT_ENV: &str = "APP_WS_ROOT";

pub const CONSOLE_BRIDGE_COMMAND: &str = "desktop_bridge_console_message";
pub const RUNTIME_PROBE_COMMAND: &str = "desktop_bridge_is_desktop_runtime";

// Chromium switches that force a software GL path; CanvasKit still needs WebGL.
pub const SOFTWARE_RENDERING_BROWSER_ARGS: &str = "--disable-features=msWebOOUI,msPdfOOUI,msSmartScreenProtection --ignore-gpu-blocklist --use-angle=swiftshader --use-gl=swiftshader";
