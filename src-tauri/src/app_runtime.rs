use tauri::{RunEvent, WindowEvent};

use crate::{
    append_startup_log, app_types::ShellState, exit_events, lifecycle::ClosePolicy,
    lifecycle::LifecycleEvent, runtime_paths, shell_config::ShellConfig, startup_task,
    DESKTOP_LOG_FILE,
};

pub(crate) fn run() {
    append_startup_log("desktop process starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        crate::logging::resolve_desktop_log_path(
            runtime_paths::default_packaged_root_dir(),
            DESKTOP_LOG_FILE,
        )
        .display()
    ));

    let config = ShellConfig::from_env();
    let close_policy = ClosePolicy::for_current_platform();
    append_startup_log(&format!(
        "server policy: {}, close policy: {:?}",
        config.server_policy.as_str(),
        close_policy
    ));

    tauri::Builder::default()
        .manage(ShellState::new(config, close_policy))
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_is_desktop_runtime,
            crate::desktop_bridge_commands::desktop_bridge_console_message,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::Ready => {
                startup_task::dispatch(app_handle, LifecycleEvent::PlatformReady);
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen { .. } => {
                let open_windows = tauri::Manager::webview_windows(app_handle).len();
                startup_task::dispatch(app_handle, LifecycleEvent::Reactivated { open_windows });
            }
            RunEvent::WindowEvent {
                label,
                event: WindowEvent::Destroyed,
                ..
            } => {
                exit_events::handle_window_destroyed(app_handle, &label);
            }
            RunEvent::ExitRequested { code, api, .. } => {
                exit_events::handle_exit_requested(app_handle, code, &api);
            }
            RunEvent::Exit => {
                exit_events::handle_exit_event(app_handle);
            }
            _ => {}
        });
}
