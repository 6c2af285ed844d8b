//! System-wide numeric constants for the Aegis workspace.
//!
//! Single source of truth for the default values used by [`crate::config::GlobalConfig`]
//! when a key is absent from the configuration file. These mirror the literal
//! defaults of the original `droneutil` configuration globals.

/// Default maximum candidate/dispatch speed, m/s.
pub const MAX_DRONE_SPEED: f64 = 2.00;
/// Default distance at which the adversary is considered "chasing", m.
pub const ENEMY_CHASE_DISTANCE: f64 = 4.00;
/// Default assumed adversary speed, m/s.
pub const ENEMY_DRONE_SPEED: f64 = 1.6;
/// Default tick duration, seconds.
pub const TICK_DURATION: f64 = 0.06;
/// Default one-step lookahead horizon (in ticks) for synthesis scoring.
pub const TICKS_TO_CORRECT: f64 = 5.0;

/// Default vertical-axis enable flag.
pub const USE_Z_VELOCITY: bool = true;

/// Default "caught" distance threshold, m.
pub const CATCH_DISTANCE: f64 = 0.1;
/// Default recon-mission target altitude, m.
pub const RECON_HEIGHT: f64 = 1.2;

/// Default boundary-property weight.
pub const BOUNDARY_WEIGHT: f64 = 2.0;
/// Default runaway-property weight.
pub const RUNAWAY_WEIGHT: f64 = 3.0;
/// Default flight-property weight.
pub const FLIGHT_WEIGHT: f64 = 10.0;
/// Default recon-property weight.
pub const RECON_WEIGHT: f64 = 1.0;
/// Default missile-avoidance-property weight.
pub const MISSILE_WEIGHT: f64 = 3.0;

/// Whether negative robustness is passed through the exaggeration curve.
pub const NONLINEAR_PENALTY: bool = true;
/// Whether the synthesis strategy samples additional candidates.
pub const SYNTHESIZE_ACTIONS: bool = true;
/// Whether a single active enforcer is resolved by least-different tie-break.
pub const CHOOSE_LEAST_DIFFERENT_ACTION: bool = true;
/// Precision constant `P` for the synthesis random search.
pub const RANDOM_SEARCH_GRANULARITY: u32 = 10;
/// Whether enforcers emit a fan/grid of candidates beyond their preferred one.
pub const SUGGEST_ACTION_RANGE: bool = true;

/// Default boundary box, m.
pub const BOUNDARY_X_MIN: f64 = -10.0;
pub const BOUNDARY_X_MAX: f64 = 10.0;
pub const BOUNDARY_Y_MIN: f64 = -10.0;
pub const BOUNDARY_Y_MAX: f64 = 10.0;
pub const BOUNDARY_Z_MIN: f64 = 0.0;
pub const BOUNDARY_Z_MAX: f64 = 6.0;

/// Default boundary safety threshold, seconds.
pub const BOUNDARY_SAFE_TTI_THRESHOLD: f64 = 1.5;

/// Fixed safe-distance used by `FlightEnforcer`'s `DistanceToGround`, m.
/// Independent of `CATCH_DISTANCE` — matches the source's own literal `1.0`.
pub const FLIGHT_SAFE_DIST: f64 = 1.0;

/// Recon enforcer's zone (north/east box), m.
pub const RECON_ZONE: (f64, f64, f64, f64) = (-5.0, -5.0, 5.0, 5.0);
/// Recon enforcer's acceptable altitude-error range, m.
pub const RECON_ACCEPTABLE_RANGE: f64 = 1.0;

/// Missile-avoidance enforcer's zone (north/east box), m.
pub const MISSILE_ZONE: (f64, f64, f64, f64) = (-10.0, -10.0, -3.0, -3.0);
/// Missile-avoidance enforcer's target altitude, m.
pub const MISSILE_ELEVATION: f64 = 7.0;
/// Missile-avoidance enforcer's acceptable altitude-error range, m.
pub const MISSILE_ACCEPTABLE_RANGE: f64 = 1.0;

/// Epsilon used for componentwise candidate-vector equality in the
/// intersection strategy. Not captured as a named config key upstream; kept
/// as an internal constant here (see DESIGN.md).
pub const INTERSECTION_EPSILON: f64 = 1e-3;

/// Acceleration bound used by the synthesis one-step motion model, m/s^2.
pub const SYNTHESIS_EST_ACCEL: f64 = 2.0;
/// Number of ticks the adversary is assumed to hold its current velocity
/// before re-aiming, during synthesis scoring.
pub const SYNTHESIS_ENEMY_HOLD_TICKS: u32 = 2;

/// Number of frames advancing tick indices beyond which a tick is logged
/// as an overrun (used by the cycle stats summary, not a hard limit).
pub const DEFAULT_STATS_LOG_INTERVAL: u64 = 100;
