use crate::{append_console_log, desktop_bridge::ConsoleMessage};

#[tauri::command]
pub(crate) fn desktop_bridge_is_desktop_runtime() -> bool {
    true
}

#[tauri::command]
pub(crate) fn desktop_bridge_console_message(message: ConsoleMessage) {
    append_console_log(&crate::desktop_bridge::format_console_line(&message));
}
