use tauri::{AppHandle, Manager};

use crate::{
    append_server_log, append_shutdown_log, append_startup_log, append_window_log,
    app_types::ShellState,
    error::ShellError,
    exit_events,
    lifecycle::{LifecycleAction, LifecycleEvent},
    main_window::{self, TauriWindowFactory},
    startup_mode, webui_paths,
    window_host::{self, HostedWindow},
};

/// Carries out what the lifecycle controller decided.
pub(crate) fn apply_lifecycle_action(app_handle: &AppHandle, action: LifecycleAction) {
    match action {
        LifecycleAction::Ignore => {}
        LifecycleAction::OpenWindow { startup } => spawn_window_task(app_handle.clone(), startup),
        LifecycleAction::StopServers => {
            let stopped = app_handle.state::<ShellState>().stop_servers();
            append_server_log(&format!("stopped {stopped} local web server(s)"));
        }
        LifecycleAction::StopServersAndExit { code } => {
            let stopped = app_handle.state::<ShellState>().stop_servers();
            append_server_log(&format!("stopped {stopped} local web server(s)"));
            app_handle.exit(code);
        }
    }
}

pub(crate) fn dispatch(app_handle: &AppHandle, event: LifecycleEvent) {
    let action = app_handle.state::<ShellState>().advance(event);
    apply_lifecycle_action(app_handle, action);
}

pub(crate) fn spawn_window_task(app_handle: AppHandle, startup: bool) {
    tauri::async_runtime::spawn(async move {
        let state = app_handle.state::<ShellState>();
        if state.is_quitting() {
            append_window_log("quit in progress; skipping window creation");
            return;
        }
        let Some(creation) = state.begin_window_creation() else {
            append_window_log("window creation already in progress; skipping request");
            return;
        };

        match open_window(&app_handle, &state).await {
            Ok(hosted) => attach_hosted_window(&app_handle, &state, hosted),
            Err(error) => {
                append_startup_log(&format!("failed to create window: {error}"));
                dispatch(&app_handle, LifecycleEvent::WindowOpenFailed { startup });
            }
        }

        let exit_deferred = creation.finish();
        let open_windows = app_handle.webview_windows().len();
        if let Some(event) = exit_events::deferred_exit_event(exit_deferred, open_windows) {
            append_shutdown_log("replaying exit deferred during window creation: no windows left");
            dispatch(&app_handle, event);
        }
    });
}

/// The user may close the window while its server is still starting; such a
/// server is stopped instead of adopted.
fn attach_hosted_window(
    app_handle: &AppHandle,
    state: &ShellState,
    hosted: HostedWindow<main_window::TauriSurface>,
) {
    if app_handle.get_webview_window(&hosted.label).is_none() {
        append_window_log(&format!(
            "window {} closed before it attached; stopping its local web server",
            hosted.label
        ));
        if let Some(mut server) = hosted.server {
            server.stop();
        }
        return;
    }

    append_window_log(&format!(
        "window {} attached to {}",
        hosted.label, hosted.url
    ));
    state.adopt_server(&hosted.label, hosted.port, hosted.server);
}

async fn open_window(
    app_handle: &AppHandle,
    state: &ShellState,
) -> Result<HostedWindow<main_window::TauriSurface>, ShellError> {
    let mode = startup_mode::detect_packaging_mode(app_handle, &state.config, append_startup_log);
    let web_root =
        webui_paths::resolve_web_root_with_override(&mode, state.config.web_root_override.as_deref());
    append_startup_log(&format!("web root: {}", web_root.display()));
    if webui_paths::web_root_entry_missing(&web_root) {
        append_startup_log(&format!(
            "web root {} has no index.html; the window will fail to load",
            web_root.display()
        ));
    }

    let spec = main_window::window_spec(state.next_window_label(), mode.is_packaged(), &state.config);
    let factory = TauriWindowFactory::new(app_handle.clone(), web_root.clone());
    window_host::open_hosted_window(
        &factory,
        &spec,
        &web_root,
        state.reusable_port(),
        append_server_log,
    )
    .await
}
