//! Integration tests for `GlobalConfig::load` against real files on disk.

use aegis_common::config::GlobalConfig;
use aegis_common::error::SupervisorError;
use std::fs;
use tempfile::TempDir;

#[test]
fn loads_a_realistic_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("aegis.cfg");
    fs::write(
        &path,
        r#"
# Aegis supervisor configuration
MAX_DRONE_SPEED 3.5
ENEMY_CHASE_DISTANCE 5.0
TICK_DURATION 0.05
BOUNDARY_WEIGHT 4
RUNAWAY_WEIGHT 6
SUGGEST_ACTION_RANGE 1
NONLINEAR_PENALTY 0
"#,
    )
    .unwrap();

    let config = GlobalConfig::load(&path).unwrap();
    assert_eq!(config.max_drone_speed, 3.5);
    assert_eq!(config.enemy_chase_distance, 5.0);
    assert_eq!(config.tick_duration_s, 0.05);
    assert_eq!(config.boundary_weight, 4.0);
    assert_eq!(config.runaway_weight, 6.0);
    assert!(config.suggest_action_range);
    assert!(!config.nonlinear_penalty);
    assert!(config.validate().is_ok());
}

#[test]
fn unknown_and_malformed_lines_do_not_abort_loading() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("aegis.cfg");
    fs::write(
        &path,
        "FUTURE_FEATURE 1\nnot-a-valid-line\nMAX_DRONE_SPEED 2.5\n",
    )
    .unwrap();

    let config = GlobalConfig::load(&path).unwrap();
    assert_eq!(config.max_drone_speed, 2.5);
}

#[test]
fn missing_file_surfaces_io_error() {
    let result = GlobalConfig::load(std::path::Path::new("/nonexistent/dir/aegis.cfg"));
    assert!(matches!(result, Err(SupervisorError::Io(_))));
}
