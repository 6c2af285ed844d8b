//! # Aegis Safety Supervisor
//!
//! CLI entrypoint: parses startup flags, loads configuration, wires the
//! enforcer set and coordinator strategy together, and runs the tick driver
//! until `SIGINT`.
//!
//! Telemetry ingestion, adversary simulation and mission-level velocity
//! proposal are consumed collaborators at this core's boundary (§6) and are
//! out of scope for this crate. This binary stands the supervisor up
//! end-to-end with synthetic stand-ins for those three so the coordinator
//! and tick driver can be exercised without a real flight stack attached.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};

use aegis_common::config::GlobalConfig;
use aegis_common::types::{VelocityNedYaw, SIGNAL_CHANNELS};

use aegis_core::coordinator::{Coordinator, Strategy};
use aegis_core::cycle::{CommandSink, MissionProposer, TelemetryFrame, TelemetrySource, TickDriver};
use aegis_core::enforcer::{BoundaryEnforcer, Enforcer, FlightEnforcer, RunawayEnforcer, ZoneElevationEnforcer};
use aegis_core::signal::Signal;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Simple,
    Priority,
    Conjunction,
    Weighted,
    Intersection,
    Synthesis,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Strategy {
        match arg {
            StrategyArg::Simple => Strategy::Simple,
            StrategyArg::Priority => Strategy::Priority,
            StrategyArg::Conjunction => Strategy::Conjunction,
            StrategyArg::Weighted => Strategy::Weighted,
            StrategyArg::Intersection => Strategy::Intersection,
            StrategyArg::Synthesis => Strategy::Synthesis,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "aegis", about = "Runtime safety supervisor for an aerial vehicle")]
struct Args {
    /// Coordinator strategy used to resolve conflicting enforcer candidates.
    #[arg(long, value_enum, default_value = "synthesis")]
    strategy: StrategyArg,

    /// Directory containing the `NAME VALUE` configuration file, if any.
    /// `aegis.cfg` inside this directory is loaded when present; otherwise
    /// built-in defaults are used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory diagnostics are flushed to on shutdown.
    #[arg(long, default_value = "./aegis-output")]
    output: PathBuf,

    /// Mission generator name. Mission generators live outside this crate's
    /// scope; this flag is accepted and logged only.
    #[arg(long)]
    mission: Option<String>,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    if let Some(mission) = &args.mission {
        info!(mission, "mission flag accepted (mission generation is out of scope for this supervisor)");
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "setup failed: could not load configuration");
            std::process::exit(1);
        }
    };

    let strategy: Strategy = args.strategy.into();
    info!(?strategy, "starting tick driver");

    let enforcers: Vec<Box<dyn Enforcer>> = vec![
        Box::new(BoundaryEnforcer::new(&config)),
        Box::new(RunawayEnforcer::new(&config)),
        Box::new(FlightEnforcer::new(&config)),
        Box::new(ZoneElevationEnforcer::recon(&config)),
        Box::new(ZoneElevationEnforcer::missile(&config)),
    ];
    let coordinator = Coordinator::new(enforcers, strategy, config.clone());
    let signal = Signal::new(&SIGNAL_CHANNELS);
    let mut driver = TickDriver::new(signal, coordinator, config);

    install_sigint_handler();

    let mut telemetry = SyntheticTelemetry::new();
    let mut mission = StraightAheadMission::new();
    let mut sink = LoggingSink;

    let result = driver.run(&mut telemetry, &mut mission, &mut sink, || !RUNNING.load(Ordering::Relaxed));

    if let Err(e) = driver.diagnostics().write_to_dir(&args.output) {
        warn!(error = %e, "failed to write diagnostics");
    }

    match result {
        Ok(()) => {
            info!(tick_count = driver.stats().tick_count, "shut down cleanly");
        }
        Err(e) => {
            error!(error = %e, "tick driver stopped on a fatal condition");
            std::process::exit(1);
        }
    }
}

fn load_config(dir: Option<&std::path::Path>) -> Result<GlobalConfig, aegis_common::error::SupervisorError> {
    let Some(dir) = dir else {
        return Ok(GlobalConfig::default());
    };
    let path = dir.join("aegis.cfg");
    if !path.exists() {
        warn!(path = %path.display(), "no aegis.cfg found in config dir, using defaults");
        return Ok(GlobalConfig::default());
    }
    let config = GlobalConfig::load(&path)?;
    config.validate()?;
    Ok(config)
}

/// Set to `false` by [`on_sigint`]. Grounded in the teacher's
/// `running: Arc<AtomicBool>` RT-loop-control pattern (`evo_hal::core::HalCore`);
/// a plain static replaces the `Arc` since this binary, unlike the HAL, owns
/// its own process lifecycle rather than sharing the flag with a caller.
static RUNNING: AtomicBool = AtomicBool::new(true);

fn install_sigint_handler() {
    unsafe {
        let _ = nix::sys::signal::signal(
            nix::sys::signal::Signal::SIGINT,
            nix::sys::signal::SigHandler::Handler(on_sigint),
        );
    }
}

extern "C" fn on_sigint(_signum: i32) {
    RUNNING.store(false, Ordering::SeqCst);
}

/// Synthetic telemetry stand-in: an adversary closing in at constant
/// velocity on a stationary ego drone. Exists only so this binary has
/// something to drive the tick loop with; real telemetry is supplied by the
/// flight-controller proxy described in §6, out of this crate's scope.
struct SyntheticTelemetry {
    adversary_pos_north: f64,
}

impl SyntheticTelemetry {
    fn new() -> SyntheticTelemetry {
        SyntheticTelemetry { adversary_pos_north: 8.0 }
    }
}

impl TelemetrySource for SyntheticTelemetry {
    fn read_own(&mut self) -> Result<TelemetryFrame, aegis_common::error::SupervisorError> {
        Ok(TelemetryFrame {
            pos_north_m: 0.0,
            pos_east_m: 0.0,
            pos_down_m: -2.0,
            vel_north_m_s: 0.0,
            vel_east_m_s: 0.0,
            vel_down_m_s: 0.0,
        })
    }

    fn read_adversary(&mut self) -> Result<TelemetryFrame, aegis_common::error::SupervisorError> {
        self.adversary_pos_north -= 0.05;
        Ok(TelemetryFrame {
            pos_north_m: self.adversary_pos_north,
            pos_east_m: 0.0,
            pos_down_m: -2.0,
            vel_north_m_s: -0.8,
            vel_east_m_s: 0.0,
            vel_down_m_s: 0.0,
        })
    }
}

/// Mission proposer stand-in: always proposes level flight north. Real
/// mission-level autopilot proposals are out of this crate's scope.
struct StraightAheadMission {
    speed: f64,
}

impl StraightAheadMission {
    fn new() -> StraightAheadMission {
        StraightAheadMission { speed: 0.5 }
    }
}

impl MissionProposer for StraightAheadMission {
    fn propose(&mut self, _sig: &Signal) -> VelocityNedYaw {
        VelocityNedYaw::new(self.speed, 0.0, 0.0, 0.0)
    }
}

/// Command sink stand-in: logs the dispatched velocity. A real sink forwards
/// it to the flight controller over the dispatch boundary described in §6.
struct LoggingSink;

impl CommandSink for LoggingSink {
    fn send(&mut self, velocity: VelocityNedYaw) {
        tracing::trace!(%velocity, "dispatched");
    }
}
