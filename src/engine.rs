//! Shared HTTP engine guard
//!
//! Every builtin in the process that talks HTTP goes through this module before
//! its first request. The engine (a shared `ureq` agent and its connection
//! pool) is started at most once per process, no matter how many independent
//! callers ask for it.
//!
//! Two ways to participate:
//! - [`ensure_initialized`] / [`release_global`] for callers that coordinate
//!   shutdown themselves.
//! - [`acquire`] returns an [`EngineLease`]; the engine is torn down when the
//!   last lease is dropped, unless someone pinned it with
//!   [`ensure_initialized`]. A pinned engine only stops on [`release_global`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::error::EngineError;

struct EngineState {
    agent: Option<ureq::Agent>,
    leases: usize,
    // Set by ensure_initialized(), cleared only by release_global()
    pinned: bool,
    // Bumped on every teardown so stale leases can't touch a newer engine
    epoch: u64,
}

impl EngineState {
    const fn new() -> Self {
        Self {
            agent: None,
            leases: 0,
            pinned: false,
            epoch: 0,
        }
    }

    fn start(&mut self) {
        if self.agent.is_none() {
            trace!("starting shared http engine");
            self.agent = Some(build_agent());
        }
    }

    fn stop(&mut self) {
        if self.agent.take().is_some() {
            trace!("stopping shared http engine");
        }
        self.leases = 0;
        self.pinned = false;
        self.epoch += 1;
    }
}

static ENGINE: Mutex<EngineState> = Mutex::new(EngineState::new());

/// Build the process-wide agent
///
/// Non-2xx responses are returned as normal responses so callers can read the
/// status and the API's error body. Custom verbs are passed through as-is.
pub(crate) fn build_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .allow_non_standard_methods(true)
        .build()
        .new_agent()
}

fn lock() -> Result<MutexGuard<'static, EngineState>, EngineError> {
    ENGINE.lock().map_err(|_| EngineError::Poisoned)
}

/// Teardown must run even after a panic elsewhere poisoned the lock
fn lock_for_teardown() -> MutexGuard<'static, EngineState> {
    ENGINE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Start the engine if it is not running yet
///
/// Returns `Ok(())` when the engine was already running. The engine stays
/// up until [`release_global`], even after every lease is dropped.
pub fn ensure_initialized() -> Result<(), EngineError> {
    let mut state = lock()?;
    state.start();
    state.pinned = true;
    Ok(())
}

/// Tear the engine down and reset the guard
///
/// A later [`ensure_initialized`] starts a fresh engine. Outstanding leases are
/// forgotten. Calling this when the engine never started does nothing.
pub fn release_global() {
    lock_for_teardown().stop();
}

/// Whether the engine is currently running
pub fn is_initialized() -> bool {
    lock_for_teardown().agent.is_some()
}

/// Number of live [`EngineLease`]s
pub fn lease_count() -> usize {
    lock_for_teardown().leases
}

/// A handle onto the running engine's agent
///
/// Agents are cheap clones that share the engine's connection pool.
pub fn shared_agent() -> Result<ureq::Agent, EngineError> {
    lock()?.agent.clone().ok_or(EngineError::NotInitialized)
}

/// Reference-counted claim on the engine
///
/// Created by [`acquire`]. Dropping the last lease stops the engine unless it
/// is pinned.
#[derive(Debug)]
pub struct EngineLease {
    epoch: u64,
}

/// Start the engine if needed and register one more user
pub fn acquire() -> Result<EngineLease, EngineError> {
    let mut state = lock()?;
    state.start();
    state.leases += 1;
    trace!(leases = state.leases, "engine lease acquired");
    Ok(EngineLease { epoch: state.epoch })
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        let mut state = lock_for_teardown();
        // A release_global() in between already reset the count
        if state.epoch != self.epoch || state.leases == 0 {
            return;
        }
        state.leases -= 1;
        trace!(leases = state.leases, "engine lease released");
        if state.leases == 0 && !state.pinned {
            state.stop();
        }
    }
}
