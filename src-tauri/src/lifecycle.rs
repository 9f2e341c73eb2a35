//! Application lifecycle as an explicit state machine.
//!
//! Platform callbacks are translated into [`LifecycleEvent`] values by the
//! runtime adapter; the controller answers with the [`LifecycleAction`] the
//! adapter must carry out.

use crate::STARTUP_FAILURE_EXIT_CODE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    NotReady,
    Ready,
    Quitting,
}

/// What the process does once its last window is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePolicy {
    QuitWithLastWindow,
    /// macOS convention: the app stays alive without windows.
    StayResident,
}

impl ClosePolicy {
    pub fn for_current_platform() -> Self {
        if cfg!(target_os = "macos") {
            Self::StayResident
        } else {
            Self::QuitWithLastWindow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    PlatformReady,
    Reactivated { open_windows: usize },
    WindowOpenFailed { startup: bool },
    AllWindowsClosed,
    QuitRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Ignore,
    OpenWindow { startup: bool },
    StopServers,
    StopServersAndExit { code: i32 },
}

#[derive(Debug)]
pub struct LifecycleController {
    phase: LifecyclePhase,
    close_policy: ClosePolicy,
    exit_deferred: bool,
}

impl LifecycleController {
    pub fn new(close_policy: ClosePolicy) -> Self {
        Self {
            phase: LifecyclePhase::NotReady,
            close_policy,
            exit_deferred: false,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn close_policy(&self) -> ClosePolicy {
        self.close_policy
    }

    pub fn is_quitting(&self) -> bool {
        self.phase == LifecyclePhase::Quitting
    }

    /// Parks an implicit exit until the window creation in flight finishes.
    pub fn defer_exit(&mut self) {
        self.exit_deferred = true;
    }

    pub fn take_deferred_exit(&mut self) -> bool {
        std::mem::take(&mut self.exit_deferred)
    }

    pub fn handle(&mut self, event: LifecycleEvent) -> LifecycleAction {
        use LifecycleEvent::*;
        use LifecyclePhase::*;

        match (self.phase, event) {
            (Quitting, _) => LifecycleAction::Ignore,
            (_, QuitRequested) => self.quit(0),
            (NotReady, PlatformReady) => {
                self.phase = Ready;
                LifecycleAction::OpenWindow { startup: true }
            }
            (NotReady, _) => LifecycleAction::Ignore,
            (Ready, PlatformReady) => LifecycleAction::Ignore,
            (Ready, Reactivated { open_windows: 0 }) => {
                LifecycleAction::OpenWindow { startup: false }
            }
            (Ready, Reactivated { .. }) => LifecycleAction::Ignore,
            (Ready, WindowOpenFailed { startup: true }) => self.quit(STARTUP_FAILURE_EXIT_CODE),
            (Ready, WindowOpenFailed { startup: false }) => LifecycleAction::Ignore,
            (Ready, AllWindowsClosed) => match self.close_policy {
                ClosePolicy::QuitWithLastWindow => self.quit(0),
                ClosePolicy::StayResident => LifecycleAction::StopServers,
            },
        }
    }

    fn quit(&mut self, code: i32) -> LifecycleAction {
        self.phase = LifecyclePhase::Quitting;
        LifecycleAction::StopServersAndExit { code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(policy: ClosePolicy) -> LifecycleController {
        let mut controller = LifecycleController::new(policy);
        assert_eq!(
            controller.handle(LifecycleEvent::PlatformReady),
            LifecycleAction::OpenWindow { startup: true }
        );
        controller
    }

    #[test]
    fn close_policy_matches_platform_convention() {
        let expected = if cfg!(target_os = "macos") {
            ClosePolicy::StayResident
        } else {
            ClosePolicy::QuitWithLastWindow
        };
        assert_eq!(ClosePolicy::for_current_platform(), expected);
    }

    #[test]
    fn platform_ready_opens_first_window_exactly_once() {
        let mut controller = ready(ClosePolicy::QuitWithLastWindow);
        assert_eq!(controller.phase(), LifecyclePhase::Ready);
        assert_eq!(
            controller.handle(LifecycleEvent::PlatformReady),
            LifecycleAction::Ignore
        );
    }

    #[test]
    fn events_before_ready_are_ignored() {
        let mut controller = LifecycleController::new(ClosePolicy::StayResident);
        assert_eq!(
            controller.handle(LifecycleEvent::Reactivated { open_windows: 0 }),
            LifecycleAction::Ignore
        );
        assert_eq!(
            controller.handle(LifecycleEvent::AllWindowsClosed),
            LifecycleAction::Ignore
        );
        assert_eq!(controller.phase(), LifecyclePhase::NotReady);
    }

    #[test]
    fn reactivation_opens_window_only_when_none_are_open() {
        let mut controller = ready(ClosePolicy::StayResident);
        assert_eq!(
            controller.handle(LifecycleEvent::Reactivated { open_windows: 1 }),
            LifecycleAction::Ignore
        );
        assert_eq!(
            controller.handle(LifecycleEvent::Reactivated { open_windows: 0 }),
            LifecycleAction::OpenWindow { startup: false }
        );
    }

    #[test]
    fn startup_window_failure_quits_with_failure_code() {
        let mut controller = ready(ClosePolicy::StayResident);
        assert_eq!(
            controller.handle(LifecycleEvent::WindowOpenFailed { startup: true }),
            LifecycleAction::StopServersAndExit {
                code: STARTUP_FAILURE_EXIT_CODE
            }
        );
        assert!(controller.is_quitting());
    }

    #[test]
    fn later_window_failure_keeps_running() {
        let mut controller = ready(ClosePolicy::QuitWithLastWindow);
        assert_eq!(
            controller.handle(LifecycleEvent::WindowOpenFailed { startup: false }),
            LifecycleAction::Ignore
        );
        assert_eq!(controller.phase(), LifecyclePhase::Ready);
    }

    #[test]
    fn last_window_close_quits_outside_resident_platforms() {
        let mut controller = ready(ClosePolicy::QuitWithLastWindow);
        assert_eq!(
            controller.handle(LifecycleEvent::AllWindowsClosed),
            LifecycleAction::StopServersAndExit { code: 0 }
        );
        assert!(controller.is_quitting());
        assert_eq!(
            controller.handle(LifecycleEvent::Reactivated { open_windows: 0 }),
            LifecycleAction::Ignore
        );
    }

    #[test]
    fn last_window_close_stays_resident_and_can_reopen() {
        let mut controller = ready(ClosePolicy::StayResident);
        assert_eq!(
            controller.handle(LifecycleEvent::AllWindowsClosed),
            LifecycleAction::StopServers
        );
        assert_eq!(controller.phase(), LifecyclePhase::Ready);
        assert_eq!(
            controller.handle(LifecycleEvent::Reactivated { open_windows: 0 }),
            LifecycleAction::OpenWindow { startup: false }
        );
    }

    #[test]
    fn deferred_exit_is_handed_out_once() {
        let mut controller = ready(ClosePolicy::QuitWithLastWindow);
        assert!(!controller.take_deferred_exit());

        controller.defer_exit();
        assert!(controller.take_deferred_exit());
        assert!(!controller.take_deferred_exit());
        assert_eq!(controller.phase(), LifecyclePhase::Ready);
    }

    #[test]
    fn quit_request_is_honoured_once_from_any_phase() {
        let mut controller = LifecycleController::new(ClosePolicy::StayResident);
        assert_eq!(
            controller.handle(LifecycleEvent::QuitRequested),
            LifecycleAction::StopServersAndExit { code: 0 }
        );
        assert_eq!(
            controller.handle(LifecycleEvent::QuitRequested),
            LifecycleAction::Ignore
        );
    }
}
