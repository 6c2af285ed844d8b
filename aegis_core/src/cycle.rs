//! Tick driver: the sole writer of [`Signal`] and the only component that
//! reads wall-clock time (§5 concurrency model).
//!
//! Grounded in `evo_control_unit`'s `CycleStats` (O(1), zero-allocation
//! per-cycle timing) and its `main` loop's `Instant` + `thread::sleep`
//! pacing, generalized from a fixed-1kHz SHM loop into the five-step
//! pipeline of the Tick Driver module: read telemetry, append, propose,
//! coordinate, dispatch, sleep.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use aegis_common::config::GlobalConfig;
use aegis_common::error::SupervisorError;
use aegis_common::types::VelocityNedYaw;

use crate::coordinator::Coordinator;
use crate::diagnostics::Diagnostics;
use crate::error::TickOutcome;
use crate::signal::Signal;

/// One tick's worth of own or adversary position + velocity, already
/// converted to the NED local tangent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryFrame {
    pub pos_north_m: f64,
    pub pos_east_m: f64,
    pub pos_down_m: f64,
    pub vel_north_m_s: f64,
    pub vel_east_m_s: f64,
    pub vel_down_m_s: f64,
}

/// Telemetry proxy boundary (§6): a snapshot read of own and adversary
/// state, each call independent. A transient read failure is recoverable
/// up to a bound (§7's `TelemetryTransient`); the driver does not retry
/// within a tick.
pub trait TelemetrySource {
    fn read_own(&mut self) -> Result<TelemetryFrame, SupervisorError>;
    fn read_adversary(&mut self) -> Result<TelemetryFrame, SupervisorError>;
}

/// Command sink boundary (§6): accepts the coordinated velocity for
/// dispatch to the flight controller.
pub trait CommandSink {
    fn send(&mut self, velocity: VelocityNedYaw);
}

/// Mission-level proposed velocity, computed by an external collaborator
/// (§4.5 step 3) — out of scope for this supervisor. Exposed as a trait so
/// the tick driver doesn't need to know how it's produced.
pub trait MissionProposer {
    fn propose(&mut self, sig: &Signal) -> VelocityNedYaw;
}

/// O(1), zero-allocation per-tick timing statistics. Grounded in
/// `evo_control_unit::cycle::CycleStats`, narrowed to what a
/// cooperative-single-tick-task loop needs (no wake latency term, since
/// this driver has no RT scheduler budget of its own).
#[derive(Debug, Clone)]
pub struct CycleStats {
    pub tick_count: u64,
    pub last_ns: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    pub sum_ns: u64,
    pub sum_sq_ns: u128,
    pub overruns: u64,
}

impl CycleStats {
    pub const fn new() -> CycleStats {
        CycleStats {
            tick_count: 0,
            last_ns: 0,
            min_ns: u64::MAX,
            max_ns: 0,
            sum_ns: 0,
            sum_sq_ns: 0,
            overruns: 0,
        }
    }

    #[inline]
    pub fn record(&mut self, elapsed: Duration, overrun: bool) {
        let ns = elapsed.as_nanos() as u64;
        self.tick_count += 1;
        self.last_ns = ns;
        if ns < self.min_ns {
            self.min_ns = ns;
        }
        if ns > self.max_ns {
            self.max_ns = ns;
        }
        self.sum_ns += ns;
        self.sum_sq_ns += (ns as u128) * (ns as u128);
        if overrun {
            self.overruns += 1;
        }
    }

    pub fn avg_ns(&self) -> u64 {
        if self.tick_count == 0 {
            0
        } else {
            self.sum_ns / self.tick_count
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        CycleStats::new()
    }
}

/// Owns the Signal trace, runs the per-tick pipeline, and accumulates
/// [`CycleStats`]/[`Diagnostics`].
pub struct TickDriver {
    signal: Signal,
    coordinator: Coordinator,
    config: GlobalConfig,
    stats: CycleStats,
    stats_log_interval: u64,
    diagnostics: Diagnostics,
    tick: i64,
}

impl TickDriver {
    pub fn new(signal: Signal, coordinator: Coordinator, config: GlobalConfig) -> TickDriver {
        let diagnostics = Diagnostics::new(config.catch_distance);
        TickDriver {
            signal,
            coordinator,
            config,
            stats: CycleStats::new(),
            stats_log_interval: aegis_common::consts::DEFAULT_STATS_LOG_INTERVAL,
            diagnostics,
            tick: 0,
        }
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Run ticks until `shutdown` returns `true`. Checked once per tick,
    /// after dispatch and before sleeping — the currently executing tick
    /// always completes first (§5 cancellation semantics).
    pub fn run(
        &mut self,
        telemetry: &mut dyn TelemetrySource,
        mission: &mut dyn MissionProposer,
        sink: &mut dyn CommandSink,
        mut shutdown: impl FnMut() -> bool,
    ) -> Result<(), SupervisorError> {
        loop {
            let result = self.tick(telemetry, mission, sink);
            match TickOutcome::from_result(result) {
                TickOutcome::Fatal(e) => {
                    tracing::error!(error = %e, "fatal error, stopping tick driver");
                    return Err(e);
                }
                TickOutcome::Degraded(e) => {
                    warn!(error = %e, "tick degraded, continuing");
                }
                TickOutcome::Continue => {}
            }
            if shutdown() {
                info!(tick_count = self.stats.tick_count, "shutdown requested, exiting tick driver");
                return Ok(());
            }
        }
    }

    /// One pipeline execution: read, append, propose, coordinate, dispatch,
    /// sleep. Returns before sleeping on a fatal error so the caller can
    /// stop promptly.
    fn tick(
        &mut self,
        telemetry: &mut dyn TelemetrySource,
        mission: &mut dyn MissionProposer,
        sink: &mut dyn CommandSink,
    ) -> Result<(), SupervisorError> {
        let start = Instant::now();

        let own = telemetry.read_own()?;
        let adversary = telemetry.read_adversary()?;
        self.signal.append(vec![
            own.pos_east_m,
            own.pos_north_m,
            own.pos_down_m,
            own.vel_east_m_s,
            own.vel_north_m_s,
            own.vel_down_m_s,
            adversary.pos_east_m,
            adversary.pos_north_m,
            adversary.pos_down_m,
            adversary.vel_east_m_s,
            adversary.vel_north_m_s,
            adversary.vel_down_m_s,
        ]);

        let proposed = mission.propose(&self.signal);
        let active_names: Vec<&'static str> = self
            .coordinator
            .enforcers()
            .iter()
            .filter(|e| e.active(&self.signal))
            .map(|e| e.name())
            .collect();

        let mut dispatched = self.coordinator.coordinate(&self.signal, proposed)?;
        if !self.config.use_z_velocity {
            dispatched.down_m_s = 0.0;
        }
        sink.send(dispatched);

        self.diagnostics
            .record_tick(self.tick, &self.signal, self.coordinator.enforcers(), &active_names);

        debug!(
            tick = self.tick,
            proposed = %proposed,
            dispatched = %dispatched,
            active = active_names.len(),
            "tick dispatched"
        );

        let elapsed = start.elapsed();
        let budget = Duration::from_secs_f64(self.config.tick_duration_s);
        let overrun = elapsed > budget;
        self.stats.record(elapsed, overrun);
        if overrun {
            warn!(
                tick = self.tick,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.config.tick_duration_s * 1000.0,
                "tick overran budget, not skipping"
            );
        }
        if self.stats.tick_count % self.stats_log_interval == 0 {
            info!(
                tick_count = self.stats.tick_count,
                avg_us = self.stats.avg_ns() / 1000,
                max_us = self.stats.max_ns / 1000,
                overruns = self.stats.overruns,
                "tick driver stats"
            );
        }

        self.tick += 1;
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
        Ok(())
    }
}
