//! Tick-level error handling.
//!
//! `aegis_common::error::SupervisorError` is the shared taxonomy; this module
//! adds only the one thing that's specific to running ticks in a loop: how a
//! single tick's result folds into the driver's continue/stop decision.

pub use aegis_common::error::SupervisorError;

/// What the tick driver should do after a tick returns.
#[derive(Debug)]
pub enum TickOutcome {
    /// Tick completed normally.
    Continue,
    /// A recoverable condition occurred (logged); keep running.
    Degraded(SupervisorError),
    /// A fatal condition occurred; stop the loop and exit non-zero.
    Fatal(SupervisorError),
}

impl TickOutcome {
    pub fn from_result(result: Result<(), SupervisorError>) -> TickOutcome {
        match result {
            Ok(()) => TickOutcome::Continue,
            Err(e) if e.is_fatal() => TickOutcome::Fatal(e),
            Err(e) => TickOutcome::Degraded(e),
        }
    }
}
