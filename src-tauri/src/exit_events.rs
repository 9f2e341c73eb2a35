use tauri::{AppHandle, ExitRequestApi, Manager};

use crate::{
    append_shutdown_log,
    app_types::ShellState,
    lifecycle::{LifecycleAction, LifecycleController, LifecycleEvent},
};

/// What to do with an `ExitRequested` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitOutcome {
    Proceed,
    /// Last window gone, but the platform keeps the app alive.
    StayResident,
    /// An explicit exit with its own code is already queued.
    AwaitQuit,
    /// Replayed by the creation task once it finishes.
    AwaitWindowCreation,
}

/// `code` is `None` when the runtime wants to exit because the last window
/// closed. Only that implicit exit is ever held back; an explicit code always
/// goes through the controller.
pub(crate) fn exit_request_outcome(
    controller: &mut LifecycleController,
    code: Option<i32>,
    creating_window: bool,
) -> ExitOutcome {
    if code.is_none() {
        if controller.is_quitting() {
            return ExitOutcome::AwaitQuit;
        }
        if creating_window {
            controller.defer_exit();
            return ExitOutcome::AwaitWindowCreation;
        }
    }

    let event = match code {
        None => LifecycleEvent::AllWindowsClosed,
        Some(_) => LifecycleEvent::QuitRequested,
    };
    match controller.handle(event) {
        LifecycleAction::StopServers => ExitOutcome::StayResident,
        LifecycleAction::StopServersAndExit { .. }
        | LifecycleAction::Ignore
        | LifecycleAction::OpenWindow { .. } => ExitOutcome::Proceed,
    }
}

/// Event to replay after a window creation that swallowed an implicit exit.
pub(crate) fn deferred_exit_event(exit_deferred: bool, open_windows: usize) -> Option<LifecycleEvent> {
    (exit_deferred && open_windows == 0).then_some(LifecycleEvent::AllWindowsClosed)
}

pub(crate) fn handle_exit_requested(app_handle: &AppHandle, code: Option<i32>, api: &ExitRequestApi) {
    let state = app_handle.state::<ShellState>();

    match state.exit_request_outcome(code) {
        ExitOutcome::Proceed => {
            let stopped = state.stop_servers();
            append_shutdown_log(&format!(
                "exit requested (code {}); stopped {stopped} local web server(s)",
                code.map(|code| code.to_string())
                    .unwrap_or_else(|| "implicit".to_string())
            ));
        }
        ExitOutcome::StayResident => {
            let stopped = state.stop_servers();
            append_shutdown_log(&format!(
                "all windows closed; stopped {stopped} local web server(s), staying resident"
            ));
            api.prevent_exit();
        }
        ExitOutcome::AwaitQuit => {
            append_shutdown_log("implicit exit ignored: quit already in progress");
            api.prevent_exit();
        }
        ExitOutcome::AwaitWindowCreation => {
            append_shutdown_log("implicit exit deferred until window creation finishes");
            api.prevent_exit();
        }
    }
}

pub(crate) fn handle_window_destroyed(app_handle: &AppHandle, label: &str) {
    let state = app_handle.state::<ShellState>();
    let port = state.window_port(label);
    let stopped = state.release_window(label);
    append_shutdown_log(&format!(
        "window {label} destroyed (port {}); stopped {stopped} local web server(s)",
        port.map(|port| port.to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
}

pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    let state = app_handle.state::<ShellState>();
    let stopped = state.stop_servers();
    append_shutdown_log(&format!(
        "desktop process exiting; stopped {stopped} remaining local web server(s)"
    ));
}
