//! # Aegis Core
//!
//! Runtime safety-supervisor core: sits between a mission-level autopilot and
//! a flight controller for an aerial vehicle. Each control tick the
//! supervisor receives a proposed velocity command, evaluates a set of
//! formally-specified safety properties against a rolling trace of
//! telemetry, and — when one or more properties are violated — replaces the
//! command with one that restores safety while minimizing mission
//! disruption.
//!
//! ## Pipeline
//!
//! 1. **[`signal`]** — append-only time-indexed multi-channel trace.
//! 2. **[`sigfun`]** — pure functions from `(Signal, tick)` to normalized
//!    robustness.
//! 3. **[`stl`]** — composable temporal/boolean operators over signal
//!    functions.
//! 4. **[`enforcer`]** — binds one STL property to a candidate-action
//!    generator.
//! 5. **[`coordinator`]** — arbitrates between active enforcers' candidates.
//! 6. **[`cycle`]** — fixed-cadence tick driver tying the above together.
//!
//! ## Zero-surprise scoring
//!
//! The coordinator's synthesis strategy is the only place the signal trace
//! is mutated outside the tick driver, and it always balances its
//! append/pop before returning (see [`signal::Signal::scoped_with_frame`]).

pub mod coordinator;
pub mod cycle;
pub mod diagnostics;
pub mod enforcer;
pub mod error;
pub mod signal;
pub mod sigfun;
pub mod stl;
