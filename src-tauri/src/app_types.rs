use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex, MutexGuard,
};

use crate::{
    append_desktop_log,
    exit_events::{self, ExitOutcome},
    lifecycle::{ClosePolicy, LifecycleAction, LifecycleController, LifecycleEvent},
    server_pool::ServerPool,
    shell_config::ShellConfig,
    static_server::StaticServerHandle,
    window_host,
};

/// Process-wide shell state managed by the Tauri app.
#[derive(Debug)]
pub(crate) struct ShellState {
    pub(crate) config: ShellConfig,
    lifecycle: Mutex<LifecycleController>,
    servers: Mutex<ServerPool>,
    window_sequence: AtomicUsize,
    is_creating_window: AtomicBool,
}

fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(error) => {
            append_desktop_log(&format!("{what} lock poisoned, recovering: {error}"));
            error.into_inner()
        }
    }
}

impl ShellState {
    pub(crate) fn new(config: ShellConfig, close_policy: ClosePolicy) -> Self {
        let servers = ServerPool::new(config.server_policy);
        Self {
            config,
            lifecycle: Mutex::new(LifecycleController::new(close_policy)),
            servers: Mutex::new(servers),
            window_sequence: AtomicUsize::new(0),
            is_creating_window: AtomicBool::new(false),
        }
    }

    pub(crate) fn advance(&self, event: LifecycleEvent) -> LifecycleAction {
        lock_or_recover(&self.lifecycle, "lifecycle").handle(event)
    }

    pub(crate) fn is_quitting(&self) -> bool {
        lock_or_recover(&self.lifecycle, "lifecycle").is_quitting()
    }

    pub(crate) fn next_window_label(&self) -> String {
        window_host::window_label(self.window_sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Admits one window creation at a time.
    pub(crate) fn begin_window_creation(&self) -> Option<WindowCreationGuard<'_>> {
        self.is_creating_window
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(WindowCreationGuard { state: Some(self) })
    }

    /// Decided under the lifecycle lock so a deferral cannot slip past
    /// [`WindowCreationGuard::finish`].
    pub(crate) fn exit_request_outcome(&self, code: Option<i32>) -> ExitOutcome {
        let mut lifecycle = lock_or_recover(&self.lifecycle, "lifecycle");
        let creating = self.is_creating_window.load(Ordering::Acquire);
        exit_events::exit_request_outcome(&mut lifecycle, code, creating)
    }

    pub(crate) fn reusable_port(&self) -> Option<u16> {
        lock_or_recover(&self.servers, "server pool").reusable_port()
    }

    pub(crate) fn adopt_server(&self, window_label: &str, port: u16, server: Option<StaticServerHandle>) {
        lock_or_recover(&self.servers, "server pool").adopt(window_label, port, server);
    }

    pub(crate) fn release_window(&self, window_label: &str) -> usize {
        lock_or_recover(&self.servers, "server pool").release(window_label)
    }

    pub(crate) fn stop_servers(&self) -> usize {
        lock_or_recover(&self.servers, "server pool").stop_all()
    }

    pub(crate) fn window_port(&self, window_label: &str) -> Option<u16> {
        lock_or_recover(&self.servers, "server pool").window_port(window_label)
    }
}

pub(crate) struct WindowCreationGuard<'a> {
    state: Option<&'a ShellState>,
}

impl WindowCreationGuard<'_> {
    /// Closes the gate and reports whether an implicit exit was parked
    /// while the creation was in flight.
    pub(crate) fn finish(mut self) -> bool {
        let Some(state) = self.state.take() else {
            return false;
        };
        let mut lifecycle = lock_or_recover(&state.lifecycle, "lifecycle");
        state.is_creating_window.store(false, Ordering::Release);
        lifecycle.take_deferred_exit()
    }
}

impl Drop for WindowCreationGuard<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            state.is_creating_window.store(false, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_pool::ServerPolicy;

    #[test]
    fn window_creation_gate_admits_one_creation_at_a_time() {
        let state = ShellState::new(ShellConfig::default(), ClosePolicy::QuitWithLastWindow);

        let creation = state
            .begin_window_creation()
            .expect("first creation should be admitted");
        assert!(state.begin_window_creation().is_none());

        assert!(!creation.finish());
        let again = state.begin_window_creation();
        assert!(again.is_some());

        drop(again);
        assert!(state.begin_window_creation().is_some());
    }

    #[test]
    fn implicit_exit_during_creation_is_returned_by_finish() {
        let state = ShellState::new(ShellConfig::default(), ClosePolicy::QuitWithLastWindow);
        state.advance(LifecycleEvent::PlatformReady);

        let creation = state.begin_window_creation().expect("creation admitted");
        assert_eq!(
            state.exit_request_outcome(None),
            ExitOutcome::AwaitWindowCreation
        );
        assert!(!state.is_quitting());

        assert!(creation.finish());
        assert_eq!(state.exit_request_outcome(None), ExitOutcome::Proceed);
        assert!(state.is_quitting());
    }

    #[test]
    fn next_window_label_counts_from_main() {
        let state = ShellState::new(ShellConfig::default(), ClosePolicy::QuitWithLastWindow);
        assert_eq!(state.next_window_label(), "main");
        assert_eq!(state.next_window_label(), "main-2");
    }

    #[test]
    fn shell_state_uses_configured_server_policy() {
        let config = ShellConfig {
            server_policy: ServerPolicy::Shared,
            ..ShellConfig::default()
        };
        let state = ShellState::new(config, ClosePolicy::StayResident);
        assert_eq!(state.reusable_port(), None);
        assert_eq!(state.stop_servers(), 0);
        assert_eq!(
            state.advance(LifecycleEvent::PlatformReady),
            LifecycleAction::OpenWindow { startup: true }
        );
        assert!(!state.is_quitting());
    }
}
