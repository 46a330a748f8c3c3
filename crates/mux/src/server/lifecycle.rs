//! The server state shared between the owner and the serving thread.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Where a [`Multiplexer`](crate::Multiplexer) is in its start/stop cycle.
///
/// ```text
/// Idle --start--> Running --stop--> Stopping --> Stopped --start--> Running
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Never started.
    Idle,
    Running,
    /// Shutdown requested, in-flight connections are draining.
    Stopping,
    Stopped,
}

impl ServerState {
    /// True while a serving thread exists.
    pub fn is_active(self) -> bool {
        matches!(self, ServerState::Running | ServerState::Stopping)
    }
}

#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: Mutex<ServerState>,
    changed: Condvar,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self { state: Mutex::new(ServerState::Idle), changed: Condvar::new() }
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self) -> ServerState {
        *self.lock()
    }

    pub(crate) fn set(&self, state: ServerState) {
        *self.lock() = state;
        self.changed.notify_all();
    }

    /// Moves `Running` to `Stopping`, any other state is kept.
    pub(crate) fn begin_stop(&self) {
        let mut state = self.lock();
        if *state == ServerState::Running {
            *state = ServerState::Stopping;
            self.changed.notify_all();
        }
    }

    /// Blocks until no serving thread is active.
    pub(crate) fn wait_inactive(&self) {
        let guard = self.lock();
        let _guard = self
            .changed
            .wait_while(guard, |state| state.is_active())
            .unwrap_or_else(PoisonError::into_inner);
    }
}
