//! Enforcers: bind one STL property to a candidate-action generator.
//!
//! Each enforcer is a direct port of one of the four original `*Enforcer`
//! classes. When the bound property is satisfied, `enforce` passes the
//! proposed command through unchanged. When violated, it returns a non-empty
//! list of candidate replacement commands with the enforcer's preferred
//! candidate always at index 0 — the one normalization applied uniformly
//! over the source, which puts its preferred candidate at an inconsistent
//! position per enforcer (see module docs in `coordinator`).

use aegis_common::config::GlobalConfig;
use aegis_common::types::{VelocityNedYaw, EPSILON_DENOMINATOR};

use crate::signal::Signal;
use crate::sigfun::{
    DistanceToElevationInZone, DistanceToGround, DistanceToTarget, SignalFunction, TimeToIntercept,
};
use crate::stl::Stl;

/// Scale a translational vector to exactly `speed`, falling back to the
/// zero vector if it's too close to the origin to normalize.
fn compute_ned_to_target(
    curr_north: f64,
    curr_east: f64,
    curr_down: f64,
    target_north: f64,
    target_east: f64,
    target_down: f64,
    speed: f64,
    yaw_deg: f64,
    use_z_velocity: bool,
) -> VelocityNedYaw {
    let delta_north = target_north - curr_north;
    let delta_east = target_east - curr_east;
    let delta_down = if use_z_velocity { target_down - curr_down } else { 0.0 };
    let delta = (delta_north.powi(2) + delta_east.powi(2) + delta_down.powi(2))
        .sqrt()
        .max(EPSILON_DENOMINATOR);
    VelocityNedYaw::new(
        delta_north / delta * speed,
        delta_east / delta * speed,
        delta_down / delta * speed,
        yaw_deg,
    )
}

/// A property-bound candidate-action generator.
pub trait Enforcer {
    fn name(&self) -> &'static str;
    fn weight(&self) -> f64;
    fn property(&self) -> &Stl;

    /// True iff this enforcer's property is satisfied at the latest tick.
    fn active(&self, sig: &Signal) -> bool {
        !self.property().sat(sig, sig.length() as i64 - 1)
    }

    /// Robustness of this enforcer's property at the latest tick.
    fn robustness(&self, sig: &Signal) -> f64 {
        self.property().robustness(sig, sig.length() as i64 - 1)
    }

    /// Candidate commands: `[v_in]` if satisfied, else a non-empty,
    /// preferred-candidate-first list.
    fn enforce(&self, sig: &Signal, v_in: VelocityNedYaw) -> Vec<VelocityNedYaw>;
}

/// Keeps the drone inside a configured box by steering it back toward the
/// origin (or a grid of safe points) once time-to-intercept drops below a
/// threshold. Grounded in `BoundaryEnforcer`.
pub struct BoundaryEnforcer {
    tti: TimeToIntercept,
    property: Stl,
    weight: f64,
    max_drone_speed: f64,
    use_z_velocity: bool,
    suggest_action_range: bool,
    lower_x: f64,
    upper_x: f64,
    lower_y: f64,
    upper_y: f64,
    lower_z: f64,
    upper_z: f64,
}

impl BoundaryEnforcer {
    pub fn new(config: &GlobalConfig) -> BoundaryEnforcer {
        let tti = TimeToIntercept::new(
            config.boundary_x_min,
            config.boundary_x_max,
            config.boundary_y_min,
            config.boundary_y_max,
            config.boundary_z_min,
            config.boundary_z_max,
            config.boundary_safe_tti_threshold,
            config.max_drone_speed,
            config.nonlinear_penalty,
        );
        BoundaryEnforcer {
            tti,
            property: Stl::atom(tti),
            weight: config.boundary_weight,
            max_drone_speed: config.max_drone_speed,
            use_z_velocity: config.use_z_velocity,
            suggest_action_range: config.suggest_action_range,
            lower_x: config.boundary_x_min,
            upper_x: config.boundary_x_max,
            lower_y: config.boundary_y_min,
            upper_y: config.boundary_y_max,
            lower_z: config.boundary_z_min,
            upper_z: config.boundary_z_max,
        }
    }

    fn to_origin(&self, pos_north: f64, pos_east: f64, pos_down: f64, yaw_deg: f64) -> VelocityNedYaw {
        let diag = if self.use_z_velocity {
            (pos_north.powi(2) + pos_east.powi(2) + pos_down.powi(2)).sqrt()
        } else {
            (pos_north.powi(2) + pos_east.powi(2)).sqrt()
        };
        if diag < EPSILON_DENOMINATOR {
            // Too close to the origin to get a direction from it — climb.
            return VelocityNedYaw::new(0.0, 0.0, -self.max_drone_speed, yaw_deg)
                .with_z_policy(self.use_z_velocity);
        }
        VelocityNedYaw::new(
            -pos_north / diag * self.max_drone_speed,
            -pos_east / diag * self.max_drone_speed,
            -pos_down / diag * self.max_drone_speed,
            yaw_deg,
        )
        .with_z_policy(self.use_z_velocity)
    }
}

impl Enforcer for BoundaryEnforcer {
    fn name(&self) -> &'static str {
        "Boundary"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn property(&self) -> &Stl {
        &self.property
    }

    fn enforce(&self, sig: &Signal, v_in: VelocityNedYaw) -> Vec<VelocityNedYaw> {
        let t = sig.length() as i64 - 1;
        if self.property.sat(sig, t) {
            return vec![v_in];
        }

        let pos_east = sig.value("pos_east_m", t);
        let pos_north = sig.value("pos_north_m", t);
        let pos_down = sig.value("pos_down_m", t);
        let vel_east = sig.value("vel_east_m_s", t);
        let vel_north = sig.value("vel_north_m_s", t);
        let vel_down = sig.value("vel_down_m_s", t);
        let pos_up = -pos_down;
        let vel_up = -vel_down;

        let preferred = self.to_origin(pos_north, pos_east, pos_down, v_in.yaw_deg);
        let mut candidates = vec![preferred];

        if !self.suggest_action_range {
            return candidates;
        }

        let close_x = self.tti.close_to_x_boundary(pos_north, vel_north);
        let close_y = self.tti.close_to_y_boundary(pos_east, vel_east);
        let close_z = self.tti.close_to_z_boundary(pos_up, vel_up);

        if close_x && close_y && close_z {
            return candidates;
        }
        if close_x && close_y {
            candidates.push(VelocityNedYaw::new(preferred.north_m_s, preferred.east_m_s, 0.0, v_in.yaw_deg));
            return candidates;
        }
        if close_x && close_z {
            candidates.push(VelocityNedYaw::new(preferred.north_m_s, 0.0, preferred.down_m_s, v_in.yaw_deg));
            return candidates;
        }
        if close_y && close_z {
            candidates.push(VelocityNedYaw::new(0.0, preferred.east_m_s, preferred.down_m_s, v_in.yaw_deg));
            return candidates;
        }
        if close_x {
            for i in (self.lower_y as i64 + 1)..(self.upper_y as i64) {
                for j in (self.lower_z as i64 + 1)..(self.upper_z as i64) {
                    candidates.push(compute_ned_to_target(
                        pos_north, pos_east, pos_down, 0.0, i as f64, -(j as f64),
                        self.max_drone_speed, v_in.yaw_deg, self.use_z_velocity,
                    ));
                }
            }
            return candidates;
        }
        if close_y {
            for i in (self.lower_x as i64 + 1)..(self.upper_x as i64) {
                for j in (self.lower_z as i64 + 1)..(self.upper_z as i64) {
                    candidates.push(compute_ned_to_target(
                        pos_north, pos_east, pos_down, i as f64, 0.0, -(j as f64),
                        self.max_drone_speed, v_in.yaw_deg, self.use_z_velocity,
                    ));
                }
            }
            return candidates;
        }
        if close_z {
            for i in (self.lower_x as i64 + 1)..(self.upper_x as i64) {
                for j in (self.lower_y as i64 + 1)..(self.upper_y as i64) {
                    candidates.push(compute_ned_to_target(
                        pos_north, pos_east, pos_down, i as f64, j as f64, -2.0,
                        self.max_drone_speed, v_in.yaw_deg, self.use_z_velocity,
                    ));
                }
            }
        }
        candidates
    }
}

/// Keeps the drone away from a pursuing adversary. Grounded in
/// `RunawayEnforcer`.
pub struct RunawayEnforcer {
    property: Stl,
    weight: f64,
    max_drone_speed: f64,
    enemy_drone_speed: f64,
    use_z_velocity: bool,
    suggest_action_range: bool,
}

impl RunawayEnforcer {
    pub fn new(config: &GlobalConfig) -> RunawayEnforcer {
        let dtt = DistanceToTarget::new(
            config.enemy_chase_distance,
            config.catch_distance,
            config.nonlinear_penalty,
        );
        RunawayEnforcer {
            property: Stl::atom(dtt),
            weight: config.runaway_weight,
            max_drone_speed: config.max_drone_speed,
            enemy_drone_speed: config.enemy_drone_speed,
            use_z_velocity: config.use_z_velocity,
            suggest_action_range: config.suggest_action_range,
        }
    }
}

impl Enforcer for RunawayEnforcer {
    fn name(&self) -> &'static str {
        "Runaway"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn property(&self) -> &Stl {
        &self.property
    }

    fn enforce(&self, sig: &Signal, v_in: VelocityNedYaw) -> Vec<VelocityNedYaw> {
        let t = sig.length() as i64 - 1;
        if self.property.sat(sig, t) {
            return vec![v_in];
        }

        let enemy_pos_north = sig.value("enemy_pos_north_m", t);
        let enemy_pos_east = sig.value("enemy_pos_east_m", t);
        let enemy_pos_down = sig.value("enemy_pos_down_m", t);
        let pos_north = sig.value("pos_north_m", t);
        let pos_east = sig.value("pos_east_m", t);
        let pos_down = sig.value("pos_down_m", t);

        let mut preferred = compute_ned_to_target(
            enemy_pos_north, enemy_pos_east, enemy_pos_down,
            pos_north, pos_east, pos_down,
            self.max_drone_speed, v_in.yaw_deg, self.use_z_velocity,
        );
        if !self.use_z_velocity {
            preferred.down_m_s = 0.0;
        }

        let mut candidates = vec![preferred];

        if self.suggest_action_range {
            let acceptable_deviation =
                ((self.max_drone_speed - self.enemy_drone_speed) / self.max_drone_speed).max(0.0);
            let sqrt_dev = acceptable_deviation.sqrt();
            let num_intervals = 5;
            let step = sqrt_dev * 2.0 / num_intervals as f64;
            if step > EPSILON_DENOMINATOR {
                let mut i = -sqrt_dev;
                while i <= sqrt_dev {
                    let mut j = -sqrt_dev;
                    while j <= sqrt_dev {
                        let mut k = -sqrt_dev;
                        while k <= sqrt_dev {
                            let candidate = VelocityNedYaw::new(
                                i + preferred.north_m_s,
                                j + preferred.east_m_s,
                                k + preferred.down_m_s,
                                v_in.yaw_deg,
                            )
                            .scaled_to_speed(self.max_drone_speed);
                            candidates.push(candidate);
                            k += step;
                        }
                        j += step;
                    }
                    i += step;
                }
            }
        }

        candidates
    }
}

/// Keeps the drone above the ground. Grounded in `FlightEnforcer`, which
/// hardcodes `safeDist = 1.0` independent of the configured catch distance.
pub struct FlightEnforcer {
    property: Stl,
    weight: f64,
    max_drone_speed: f64,
    use_z_velocity: bool,
    suggest_action_range: bool,
}

impl FlightEnforcer {
    pub fn new(config: &GlobalConfig) -> FlightEnforcer {
        let dtg = DistanceToGround::new(aegis_common::consts::FLIGHT_SAFE_DIST, config.nonlinear_penalty);
        FlightEnforcer {
            property: Stl::atom(dtg),
            weight: config.flight_weight,
            max_drone_speed: config.max_drone_speed,
            use_z_velocity: config.use_z_velocity,
            suggest_action_range: config.suggest_action_range,
        }
    }
}

impl Enforcer for FlightEnforcer {
    fn name(&self) -> &'static str {
        "Flight"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn property(&self) -> &Stl {
        &self.property
    }

    fn enforce(&self, sig: &Signal, v_in: VelocityNedYaw) -> Vec<VelocityNedYaw> {
        if !self.use_z_velocity {
            return vec![v_in];
        }
        let t = sig.length() as i64 - 1;
        if self.property.sat(sig, t) {
            return vec![v_in];
        }

        let down_vel = -self.max_drone_speed;
        let preferred = VelocityNedYaw::new(0.0, 0.0, down_vel, v_in.yaw_deg);
        let mut candidates = vec![preferred];

        if self.suggest_action_range {
            let num_intervals = 5;
            let step = self.max_drone_speed / num_intervals as f64;
            let mut i = -self.max_drone_speed;
            while i < self.max_drone_speed {
                let mut j = -self.max_drone_speed;
                while j < self.max_drone_speed {
                    let candidate =
                        VelocityNedYaw::new(i, j, down_vel, v_in.yaw_deg).scaled_to_speed(self.max_drone_speed);
                    candidates.push(candidate);
                    j += step;
                }
                i += step;
            }
        }

        candidates
    }
}

/// Holds the drone at a target elevation while it's inside a configured
/// north/east zone. Grounded in `ReconEnforcer`/`MissileEnforcer`, which
/// both wrap the same `ReconFun`/`DistanceToElevationInZone` shape with
/// different construction parameters — two independent instances of this
/// struct, not one enforcer with a mode flag.
pub struct ZoneElevationEnforcer {
    name: &'static str,
    property: Stl,
    weight: f64,
    goal_z: f64,
    max_drone_speed: f64,
    suggest_action_range: bool,
}

impl ZoneElevationEnforcer {
    pub fn recon(config: &GlobalConfig) -> ZoneElevationEnforcer {
        let (lower_x, lower_y, upper_x, upper_y) = aegis_common::consts::RECON_ZONE;
        let dte = DistanceToElevationInZone::new(
            aegis_common::consts::RECON_HEIGHT,
            aegis_common::consts::RECON_ACCEPTABLE_RANGE,
            lower_x,
            lower_y,
            upper_x,
            upper_y,
            config.nonlinear_penalty,
        );
        ZoneElevationEnforcer {
            name: "Recon",
            property: Stl::atom(dte),
            weight: config.recon_weight,
            goal_z: aegis_common::consts::RECON_HEIGHT,
            max_drone_speed: config.max_drone_speed,
            suggest_action_range: config.suggest_action_range,
        }
    }

    pub fn missile(config: &GlobalConfig) -> ZoneElevationEnforcer {
        let (lower_x, lower_y, upper_x, upper_y) = aegis_common::consts::MISSILE_ZONE;
        let dte = DistanceToElevationInZone::new(
            aegis_common::consts::MISSILE_ELEVATION,
            aegis_common::consts::MISSILE_ACCEPTABLE_RANGE,
            lower_x,
            lower_y,
            upper_x,
            upper_y,
            config.nonlinear_penalty,
        );
        ZoneElevationEnforcer {
            name: "Missile",
            property: Stl::atom(dte),
            weight: config.missile_weight,
            goal_z: aegis_common::consts::MISSILE_ELEVATION,
            max_drone_speed: config.max_drone_speed,
            suggest_action_range: config.suggest_action_range,
        }
    }
}

impl Enforcer for ZoneElevationEnforcer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn property(&self) -> &Stl {
        &self.property
    }

    fn enforce(&self, sig: &Signal, v_in: VelocityNedYaw) -> Vec<VelocityNedYaw> {
        let t = sig.length() as i64 - 1;
        if self.property.sat(sig, t) {
            return vec![v_in];
        }

        let ego_elevation = -sig.value("pos_down_m", t);
        let down_vel = if ego_elevation < self.goal_z {
            -self.max_drone_speed
        } else {
            self.max_drone_speed
        };
        let preferred = VelocityNedYaw::new(0.0, 0.0, down_vel, v_in.yaw_deg);
        let mut candidates = vec![preferred];

        if self.suggest_action_range {
            let num_intervals = 5;
            let step = self.max_drone_speed / num_intervals as f64;
            let mut i = -self.max_drone_speed;
            while i < self.max_drone_speed {
                let mut j = -self.max_drone_speed;
                while j < self.max_drone_speed {
                    let candidate =
                        VelocityNedYaw::new(i, j, down_vel, v_in.yaw_deg).scaled_to_speed(self.max_drone_speed);
                    candidates.push(candidate);
                    j += step;
                }
                i += step;
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal_in_bounds() -> Signal {
        let mut sig = Signal::new(&aegis_common::types::SIGNAL_CHANNELS);
        sig.append(vec![0.0, 0.0, -2.0, 0.0, 0.0, 0.0, 8.0, 8.0, -2.0, 0.0, 0.0, 0.0]);
        sig
    }

    #[test]
    fn boundary_enforcer_passes_through_when_satisfied() {
        let config = GlobalConfig::default();
        let enforcer = BoundaryEnforcer::new(&config);
        let sig = signal_in_bounds();
        let v_in = VelocityNedYaw::new(1.0, 0.0, 0.0, 0.0);
        let out = enforcer.enforce(&sig, v_in);
        assert_eq!(out, vec![v_in]);
    }

    #[test]
    fn boundary_enforcer_returns_nonempty_candidates_when_violated() {
        let config = GlobalConfig::default();
        let enforcer = BoundaryEnforcer::new(&config);
        let mut sig = Signal::new(&aegis_common::types::SIGNAL_CHANNELS);
        sig.append(vec![0.0, 15.0, -2.0, 0.0, 1.0, 0.0, 8.0, 8.0, -2.0, 0.0, 0.0, 0.0]);
        let v_in = VelocityNedYaw::new(1.0, 0.0, 0.0, 0.0);
        let out = enforcer.enforce(&sig, v_in);
        assert!(!out.is_empty());
    }

    #[test]
    fn runaway_enforcer_preferred_candidate_flees_enemy() {
        let config = GlobalConfig::default();
        let enforcer = RunawayEnforcer::new(&config);
        let mut sig = Signal::new(&aegis_common::types::SIGNAL_CHANNELS);
        // enemy right behind (north of ego) at distance 0.5m, well under ENEMY_CHASE_DISTANCE
        sig.append(vec![0.0, 0.0, -2.0, 0.0, 0.0, 0.0, 0.0, 0.5, -2.0, 0.0, 0.0, 0.0]);
        let v_in = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let out = enforcer.enforce(&sig, v_in);
        assert!(!out.is_empty());
        // Ego should flee away from enemy (enemy is north of ego, so flee south -> negative north)
        assert!(out[0].north_m_s < 0.0);
    }

    #[test]
    fn flight_enforcer_climbs_near_ground() {
        let config = GlobalConfig::default();
        let enforcer = FlightEnforcer::new(&config);
        let mut sig = Signal::new(&aegis_common::types::SIGNAL_CHANNELS);
        sig.append(vec![0.0, 0.0, -0.1, 0.0, 0.0, 0.0, 8.0, 8.0, -2.0, 0.0, 0.0, 0.0]);
        let v_in = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let out = enforcer.enforce(&sig, v_in);
        assert!(out[0].down_m_s < 0.0);
    }

    #[test]
    fn recon_enforcer_climbs_toward_goal_altitude_inside_zone() {
        let config = GlobalConfig::default();
        let enforcer = ZoneElevationEnforcer::recon(&config);
        let mut sig = Signal::new(&aegis_common::types::SIGNAL_CHANNELS);
        // inside recon zone, elevation far below goal
        sig.append(vec![0.0, 0.0, -0.1, 0.0, 0.0, 0.0, 8.0, 8.0, -2.0, 0.0, 0.0, 0.0]);
        let v_in = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let out = enforcer.enforce(&sig, v_in);
        assert!(out[0].down_m_s < 0.0);
    }
}
