//! Plain-text `NAME VALUE` configuration loading for the Aegis workspace.
//!
//! Every recognized key from the external interface table is a field on
//! [`GlobalConfig`]; unrecognized keys are logged and skipped rather than
//! rejected, matching the "MUST produce a diagnostic but NOT abort" contract.
//! This is deliberately *not* TOML — the wire format here is the one-pair-
//! per-line text format the supervisor's configuration contract specifies,
//! even though the rest of the Aegis workspace otherwise follows its
//! teacher's TOML conventions for anything that isn't this file.

use std::path::Path;

use tracing::warn;

use crate::consts;
use crate::error::SupervisorError;

/// Global, process-wide immutable configuration. Loaded once at startup and
/// passed by value/reference through the driver and coordinator rather than
/// read from module-level statics — a stale snapshot of `tick_duration_s` or
/// `ticks_to_correct` would silently corrupt synthesis scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalConfig {
    pub max_drone_speed: f64,
    pub enemy_chase_distance: f64,
    pub enemy_drone_speed: f64,
    pub tick_duration_s: f64,
    pub ticks_to_correct: f64,

    pub use_z_velocity: bool,

    pub catch_distance: f64,

    pub boundary_x_min: f64,
    pub boundary_x_max: f64,
    pub boundary_y_min: f64,
    pub boundary_y_max: f64,
    pub boundary_z_min: f64,
    pub boundary_z_max: f64,
    pub boundary_safe_tti_threshold: f64,

    pub boundary_weight: f64,
    pub runaway_weight: f64,
    pub flight_weight: f64,
    pub missile_weight: f64,
    pub recon_weight: f64,

    pub nonlinear_penalty: bool,
    pub synthesize_actions: bool,
    pub choose_least_different_action: bool,
    pub random_search_granularity: u32,
    pub suggest_action_range: bool,

    /// Epsilon for componentwise candidate equality in the intersection
    /// strategy. Not a key the original source exposed as a named global
    /// (see DESIGN.md); kept configurable here regardless.
    pub intersection_epsilon: f64,
    /// Acceleration bound for the synthesis one-step motion model, m/s^2.
    pub synthesis_est_accel: f64,
    /// Ticks the adversary holds its current velocity before re-aiming
    /// during synthesis scoring.
    pub synthesis_enemy_hold_ticks: u32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            max_drone_speed: consts::MAX_DRONE_SPEED,
            enemy_chase_distance: consts::ENEMY_CHASE_DISTANCE,
            enemy_drone_speed: consts::ENEMY_DRONE_SPEED,
            tick_duration_s: consts::TICK_DURATION,
            ticks_to_correct: consts::TICKS_TO_CORRECT,
            use_z_velocity: consts::USE_Z_VELOCITY,
            catch_distance: consts::CATCH_DISTANCE,
            boundary_x_min: consts::BOUNDARY_X_MIN,
            boundary_x_max: consts::BOUNDARY_X_MAX,
            boundary_y_min: consts::BOUNDARY_Y_MIN,
            boundary_y_max: consts::BOUNDARY_Y_MAX,
            boundary_z_min: consts::BOUNDARY_Z_MIN,
            boundary_z_max: consts::BOUNDARY_Z_MAX,
            boundary_safe_tti_threshold: consts::BOUNDARY_SAFE_TTI_THRESHOLD,
            boundary_weight: consts::BOUNDARY_WEIGHT,
            runaway_weight: consts::RUNAWAY_WEIGHT,
            flight_weight: consts::FLIGHT_WEIGHT,
            missile_weight: consts::MISSILE_WEIGHT,
            recon_weight: consts::RECON_WEIGHT,
            nonlinear_penalty: consts::NONLINEAR_PENALTY,
            synthesize_actions: consts::SYNTHESIZE_ACTIONS,
            choose_least_different_action: consts::CHOOSE_LEAST_DIFFERENT_ACTION,
            random_search_granularity: consts::RANDOM_SEARCH_GRANULARITY,
            suggest_action_range: consts::SUGGEST_ACTION_RANGE,
            intersection_epsilon: consts::INTERSECTION_EPSILON,
            synthesis_est_accel: consts::SYNTHESIS_EST_ACCEL,
            synthesis_enemy_hold_ticks: consts::SYNTHESIS_ENEMY_HOLD_TICKS,
        }
    }
}

impl GlobalConfig {
    /// Load a configuration file of whitespace-separated `NAME VALUE` lines.
    /// Blank lines and lines starting with `#` are skipped. Unknown keys and
    /// unparseable values are logged via [`tracing::warn`] and otherwise
    /// ignored — this function never fails on their account.
    pub fn load(path: &Path) -> Result<GlobalConfig, SupervisorError> {
        let text = std::fs::read_to_string(path)?;
        let mut config = GlobalConfig::default();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(name), Some(raw_value)) = (parts.next(), parts.next()) else {
                warn!(lineno, line, "malformed config line, skipping");
                continue;
            };
            config.apply(name, raw_value, lineno);
        }
        Ok(config)
    }

    /// Apply one `NAME VALUE` pair. `BOUNDARY_SIZE` is sugar that sets all
    /// six boundary bounds to `±value` — including the documented oddity
    /// that `Z_MIN` is set to `-value` rather than `0` (the source comments
    /// this isn't really wanted but keeps it; this carries the same
    /// shorthand, which is why `BOUNDARY_SIZE` is not recommended over
    /// setting the six bounds individually).
    fn apply(&mut self, name: &str, raw_value: &str, lineno: usize) {
        if name == "BOUNDARY_SIZE" {
            let Ok(value) = raw_value.parse::<f64>() else {
                warn!(lineno, name, raw_value, "unparseable config value, keeping default");
                return;
            };
            self.boundary_x_min = -value;
            self.boundary_x_max = value;
            self.boundary_y_min = -value;
            self.boundary_y_max = value;
            self.boundary_z_min = -value;
            self.boundary_z_max = value;
            return;
        }

        macro_rules! set_f64 {
            ($field:ident) => {{
                match raw_value.parse::<f64>() {
                    Ok(v) => self.$field = v,
                    Err(_) => warn!(lineno, name, raw_value, "unparseable numeric value, keeping default"),
                }
            }};
        }
        macro_rules! set_bool {
            ($field:ident) => {{
                match raw_value.parse::<f64>() {
                    Ok(v) => self.$field = v != 0.0,
                    Err(_) => warn!(lineno, name, raw_value, "unparseable boolean value, keeping default"),
                }
            }};
        }
        macro_rules! set_u32 {
            ($field:ident) => {{
                match raw_value.parse::<f64>() {
                    Ok(v) if v >= 0.0 => self.$field = v as u32,
                    _ => warn!(lineno, name, raw_value, "unparseable integer value, keeping default"),
                }
            }};
        }

        match name {
            "MAX_DRONE_SPEED" => set_f64!(max_drone_speed),
            "ENEMY_CHASE_DISTANCE" => set_f64!(enemy_chase_distance),
            "ENEMY_DRONE_SPEED" => set_f64!(enemy_drone_speed),
            "TICK_DURATION" => set_f64!(tick_duration_s),
            "TICKS_TO_CORRECT" => set_f64!(ticks_to_correct),
            "USE_Z_VELOCITY" => set_bool!(use_z_velocity),
            "CATCH_DISTANCE" => set_f64!(catch_distance),
            "BOUNDARY_X_MIN" => set_f64!(boundary_x_min),
            "BOUNDARY_X_MAX" => set_f64!(boundary_x_max),
            "BOUNDARY_Y_MIN" => set_f64!(boundary_y_min),
            "BOUNDARY_Y_MAX" => set_f64!(boundary_y_max),
            "BOUNDARY_Z_MIN" => set_f64!(boundary_z_min),
            "BOUNDARY_Z_MAX" => set_f64!(boundary_z_max),
            "BOUNDARY_SAFE_TTI_THRESHOLD" => set_f64!(boundary_safe_tti_threshold),
            "BOUNDARY_WEIGHT" => set_f64!(boundary_weight),
            "RUNAWAY_WEIGHT" => set_f64!(runaway_weight),
            "FLIGHT_WEIGHT" => set_f64!(flight_weight),
            "MISSILE_WEIGHT" => set_f64!(missile_weight),
            "RECON_WEIGHT" => set_f64!(recon_weight),
            "NONLINEAR_PENALTY" => set_bool!(nonlinear_penalty),
            "SYNTHESIZE_ACTIONS" => set_bool!(synthesize_actions),
            "CHOOSE_LEAST_DIFFERENT_ACTION" => set_bool!(choose_least_different_action),
            "RANDOM_SEARCH_GRANULARITY" => set_u32!(random_search_granularity),
            "SUGGEST_ACTION_RANGE" => set_bool!(suggest_action_range),
            "WAYPOINT_SEED" => { /* consumed by the out-of-scope mission generator only */ }
            _ => warn!(lineno, name, "unrecognized configuration key, ignoring"),
        }
    }

    /// Semantic validation: speed must be positive, boundary bounds must be
    /// ordered, weights must be non-negative.
    pub fn validate(&self) -> Result<(), SupervisorError> {
        if self.max_drone_speed <= 0.0 {
            return Err(SupervisorError::Configuration(
                "MAX_DRONE_SPEED must be > 0".into(),
            ));
        }
        if self.boundary_x_min >= self.boundary_x_max
            || self.boundary_y_min >= self.boundary_y_max
            || self.boundary_z_min >= self.boundary_z_max
        {
            return Err(SupervisorError::Configuration(
                "boundary box bounds must satisfy min < max on every axis".into(),
            ));
        }
        for (name, w) in [
            ("BOUNDARY_WEIGHT", self.boundary_weight),
            ("RUNAWAY_WEIGHT", self.runaway_weight),
            ("FLIGHT_WEIGHT", self.flight_weight),
            ("MISSILE_WEIGHT", self.missile_weight),
            ("RECON_WEIGHT", self.recon_weight),
        ] {
            if w < 0.0 {
                return Err(SupervisorError::Configuration(format!(
                    "{name} must be >= 0, got {w}"
                )));
            }
        }
        if self.tick_duration_s <= 0.0 {
            return Err(SupervisorError::Configuration(
                "TICK_DURATION must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_validate() {
        assert!(GlobalConfig::default().validate().is_ok());
    }

    #[test]
    fn loads_recognized_keys() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "MAX_DRONE_SPEED 5.0").unwrap();
        writeln!(file, "USE_Z_VELOCITY 0").unwrap();
        writeln!(file, "# a comment").unwrap();
        writeln!(file).unwrap();
        file.flush().unwrap();

        let config = GlobalConfig::load(file.path()).unwrap();
        assert_eq!(config.max_drone_speed, 5.0);
        assert!(!config.use_z_velocity);
    }

    #[test]
    fn unknown_keys_are_ignored_not_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SOME_FUTURE_KEY 42").unwrap();
        file.flush().unwrap();

        let config = GlobalConfig::load(file.path()).unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn boundary_size_sets_all_six_bounds_with_negative_z_min() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "BOUNDARY_SIZE 8").unwrap();
        file.flush().unwrap();

        let config = GlobalConfig::load(file.path()).unwrap();
        assert_eq!(config.boundary_x_min, -8.0);
        assert_eq!(config.boundary_x_max, 8.0);
        assert_eq!(config.boundary_z_min, -8.0);
        assert_eq!(config.boundary_z_max, 8.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = GlobalConfig::load(Path::new("/nonexistent/aegis.cfg"));
        assert!(matches!(result, Err(SupervisorError::Io(_))));
    }

    #[test]
    fn rejects_inverted_boundary_box() {
        let mut config = GlobalConfig::default();
        config.boundary_x_min = 5.0;
        config.boundary_x_max = -5.0;
        assert!(config.validate().is_err());
    }
}
