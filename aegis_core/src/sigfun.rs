//! Signal functions: pure `(Signal, tick) -> normalized robustness` mappings.
//!
//! Every concrete function here is grounded directly in one of the four
//! original `SigFun` subclasses (`TTIFun`, `DTTFun`, `DTGFun`, `ReconFun`) and
//! keeps their exact normalization contract: a function declares a
//! `min_value`/`max_value` window of "robustness values we actually care
//! about", and raw robustness is folded into `[-2, 1]` by [`normalize`].
//!
//! All positions/velocities on the wire are NED (down positive toward the
//! ground); every function here that reasons about altitude negates the
//! down-axis internally, matching the source.
//!
//! One naming quirk is carried forward deliberately: the boundary box's
//! "X axis" corresponds to the north channel and its "Y axis" to the east
//! channel (the source's `TTIFun`/`ReconFun` constructors are written this
//! way throughout). It only matters at construction time — callers always
//! pass `(north_min, north_max, east_min, east_max, ...)`.

use crate::signal::Signal;

/// A named, normalized-robustness signal property.
pub trait SignalFunction {
    /// Raw-then-normalized robustness at tick `t`. Panics if `t` is
    /// unavailable — callers MUST check `Signal::available` first.
    fn value(&self, sig: &Signal, t: i64) -> f64;

    /// Robustness at the latest tick.
    fn value_latest(&self, sig: &Signal) -> f64 {
        self.value(sig, sig.length() as i64 - 1)
    }

    /// True iff robustness at tick `t` is non-negative.
    fn prop(&self, sig: &Signal, t: i64) -> bool {
        self.value(sig, t) >= 0.0
    }

    /// True iff robustness at the latest tick is non-negative.
    fn prop_latest(&self, sig: &Signal) -> bool {
        self.prop(sig, sig.length() as i64 - 1)
    }
}

/// Exponential exaggeration curve applied to negative, already-linearly
/// normalized robustness: `-((b^-x - 1) / (b - 1)) + x`, `b = 32`. Makes
/// small violations score much closer to `0` than a pure linear mapping
/// would, so the coordinator's weighted/priority strategies favor fixing
/// the worst violation first.
fn scale_to_curve(x: f64) -> f64 {
    let base: f64 = 32.0;
    -((base.powf(-x) - 1.0) / (base - 1.0)) + x
}

/// Fold a raw robustness value into `[-2, 1]` given a function's declared
/// `[min_value, max_value]` window of values it cares about. `0` maps to
/// `0` exactly; negative values clip to `min_value` then map to `[-2, 0]`
/// (optionally through [`scale_to_curve`]); non-negative values clip to
/// `max_value` then map linearly to `[0, 1]`.
pub fn normalize(raw: f64, min_value: f64, max_value: f64, nonlinear_penalty: bool) -> f64 {
    if raw == 0.0 {
        return 0.0;
    }
    if raw < 0.0 {
        let clipped = raw.max(min_value);
        let linear = (clipped - min_value) / (0.0 - min_value) - 1.0;
        if nonlinear_penalty {
            scale_to_curve(linear)
        } else {
            2.0 * linear
        }
    } else {
        let clipped = raw.min(max_value);
        clipped / max_value
    }
}

/// Time-to-intercept a boundary box, assuming constant velocity.
///
/// Grounded in `TTIFun`. The constructor's axis names are the source's: the
/// "X" pair bounds the north channel, the "Y" pair bounds the east channel,
/// the "Z" pair bounds altitude (up, i.e. negative down).
#[derive(Debug, Clone, Copy)]
pub struct TimeToIntercept {
    pub lower_x: f64,
    pub upper_x: f64,
    pub lower_y: f64,
    pub upper_y: f64,
    pub lower_z: f64,
    pub upper_z: f64,
    pub safe_threshold: f64,
    min_value: f64,
    max_value: f64,
    nonlinear_penalty: bool,
}

impl TimeToIntercept {
    pub fn new(
        lower_x: f64,
        upper_x: f64,
        lower_y: f64,
        upper_y: f64,
        lower_z: f64,
        upper_z: f64,
        safe_threshold: f64,
        max_drone_speed: f64,
        nonlinear_penalty: bool,
    ) -> TimeToIntercept {
        let mut tti = TimeToIntercept {
            lower_x,
            upper_x,
            lower_y,
            upper_y,
            lower_z,
            upper_z,
            safe_threshold,
            min_value: 0.0,
            max_value: 0.0,
            nonlinear_penalty,
        };
        // Drone has been going past some boundary for at least 2 full
        // seconds at max speed.
        tti.min_value =
            tti.compute_tti(upper_x + max_drone_speed * 2.0, 0.0, 0.0, 0.0, 0.0, 0.0) - safe_threshold;
        tti.max_value = 2.0 * safe_threshold - safe_threshold;
        tti
    }

    /// Time-to-intercept across all three boundary axes, minimum over axes.
    /// `pos_up_m`/`vel_up_m_s` are already sign-corrected (up positive).
    fn compute_tti(
        &self,
        pos_east_m: f64,
        pos_north_m: f64,
        pos_up_m: f64,
        vel_east_m_s: f64,
        vel_north_m_s: f64,
        vel_up_m_s: f64,
    ) -> f64 {
        let mut res = 1000.0_f64;

        if pos_north_m <= self.lower_x {
            if vel_north_m_s <= 0.0 {
                res = res.min((pos_north_m - self.lower_x) + vel_north_m_s);
            }
            if vel_north_m_s > 0.0 {
                res = res.min((pos_north_m - self.lower_x) / vel_north_m_s);
            }
        } else if pos_north_m >= self.upper_x {
            if vel_north_m_s < 0.0 {
                res = res.min((self.upper_x - pos_north_m) / vel_north_m_s);
            }
            if vel_north_m_s >= 0.0 {
                res = res.min((self.upper_x - pos_north_m) - vel_north_m_s);
            }
        } else {
            if vel_north_m_s < 0.0 {
                res = res.min((self.lower_x - pos_north_m).abs() / -vel_north_m_s);
            }
            if vel_north_m_s > 0.0 {
                res = res.min((self.upper_x - pos_north_m).abs() / vel_north_m_s);
            }
        }

        if pos_east_m <= self.lower_y {
            if vel_east_m_s <= 0.0 {
                res = res.min((pos_east_m - self.lower_y) + vel_east_m_s);
            }
            if vel_east_m_s > 0.0 {
                res = res.min((pos_east_m - self.lower_y) / vel_east_m_s);
            }
        } else if pos_east_m >= self.upper_y {
            if vel_east_m_s < 0.0 {
                res = res.min((self.upper_y - pos_east_m) / vel_east_m_s);
            }
            if vel_east_m_s >= 0.0 {
                res = res.min((self.upper_y - pos_east_m) - vel_east_m_s);
            }
        } else {
            if vel_east_m_s < 0.0 {
                res = res.min((self.lower_y - pos_east_m).abs() / -vel_east_m_s);
            }
            if vel_east_m_s > 0.0 {
                res = res.min((self.upper_y - pos_east_m).abs() / vel_east_m_s);
            }
        }

        if pos_up_m <= self.lower_z {
            if vel_up_m_s <= 0.0 {
                res = res.min((pos_up_m - self.lower_z) + vel_up_m_s);
            }
            if vel_up_m_s > 0.0 {
                res = res.min((pos_up_m - self.lower_z) / vel_up_m_s);
            }
        } else if pos_up_m >= self.upper_z {
            if vel_up_m_s < 0.0 {
                res = res.min((self.upper_z - pos_up_m) / vel_up_m_s);
            }
            if vel_up_m_s >= 0.0 {
                res = res.min((self.upper_z - pos_up_m) - vel_up_m_s);
            }
        } else {
            if vel_up_m_s < 0.0 {
                res = res.min((self.lower_z - pos_up_m).abs() / -vel_up_m_s);
            }
            if vel_up_m_s > 0.0 {
                res = res.min((self.upper_z - pos_up_m).abs() / vel_up_m_s);
            }
        }

        res
    }

    pub fn close_to_lower_x(&self, pos_north_m: f64, vel_north_m_s: f64) -> bool {
        pos_north_m < self.lower_x
            || (vel_north_m_s < 0.0
                && (self.lower_x - pos_north_m).abs() / -vel_north_m_s < self.safe_threshold)
    }

    pub fn close_to_upper_x(&self, pos_north_m: f64, vel_north_m_s: f64) -> bool {
        pos_north_m > self.upper_x
            || (vel_north_m_s > 0.0
                && (self.upper_x - pos_north_m).abs() / vel_north_m_s < self.safe_threshold)
    }

    pub fn close_to_lower_y(&self, pos_east_m: f64, vel_east_m_s: f64) -> bool {
        pos_east_m < self.lower_y
            || (vel_east_m_s < 0.0
                && (self.lower_y - pos_east_m).abs() / -vel_east_m_s < self.safe_threshold)
    }

    pub fn close_to_upper_y(&self, pos_east_m: f64, vel_east_m_s: f64) -> bool {
        pos_east_m > self.upper_y
            || (vel_east_m_s > 0.0
                && (self.upper_y - pos_east_m).abs() / vel_east_m_s < self.safe_threshold)
    }

    pub fn close_to_lower_z(&self, pos_up_m: f64, vel_up_m_s: f64) -> bool {
        pos_up_m < self.lower_z
            || (vel_up_m_s < 0.0
                && (self.lower_z - pos_up_m).abs() / -vel_up_m_s < self.safe_threshold)
    }

    pub fn close_to_upper_z(&self, pos_up_m: f64, vel_up_m_s: f64) -> bool {
        pos_up_m > self.upper_z
            || (vel_up_m_s > 0.0
                && (self.upper_z - pos_up_m).abs() / vel_up_m_s < self.safe_threshold)
    }

    pub fn close_to_x_boundary(&self, pos_north_m: f64, vel_north_m_s: f64) -> bool {
        self.close_to_lower_x(pos_north_m, vel_north_m_s)
            || self.close_to_upper_x(pos_north_m, vel_north_m_s)
    }

    pub fn close_to_y_boundary(&self, pos_east_m: f64, vel_east_m_s: f64) -> bool {
        self.close_to_lower_y(pos_east_m, vel_east_m_s)
            || self.close_to_upper_y(pos_east_m, vel_east_m_s)
    }

    pub fn close_to_z_boundary(&self, pos_up_m: f64, vel_up_m_s: f64) -> bool {
        self.close_to_lower_z(pos_up_m, vel_up_m_s) || self.close_to_upper_z(pos_up_m, vel_up_m_s)
    }
}

impl SignalFunction for TimeToIntercept {
    fn value(&self, sig: &Signal, t: i64) -> f64 {
        let pos_east_m = sig.value("pos_east_m", t);
        let pos_north_m = sig.value("pos_north_m", t);
        let pos_down_m = sig.value("pos_down_m", t);
        let vel_east_m_s = sig.value("vel_east_m_s", t);
        let vel_north_m_s = sig.value("vel_north_m_s", t);
        let vel_down_m_s = sig.value("vel_down_m_s", t);
        let tti = self.compute_tti(
            pos_east_m,
            pos_north_m,
            -pos_down_m,
            vel_east_m_s,
            vel_north_m_s,
            -vel_down_m_s,
        );
        normalize(
            tti - self.safe_threshold,
            self.min_value,
            self.max_value,
            self.nonlinear_penalty,
        )
    }
}

/// Euclidean distance between own and adversary position.
///
/// Grounded in `DTTFun`.
#[derive(Debug, Clone, Copy)]
pub struct DistanceToTarget {
    pub safe_dist: f64,
    min_value: f64,
    max_value: f64,
    nonlinear_penalty: bool,
}

impl DistanceToTarget {
    pub fn new(safe_dist: f64, catch_distance: f64, nonlinear_penalty: bool) -> DistanceToTarget {
        DistanceToTarget {
            safe_dist,
            min_value: catch_distance + 0.1 - safe_dist,
            max_value: 2.0 * safe_dist - safe_dist,
            nonlinear_penalty,
        }
    }
}

impl SignalFunction for DistanceToTarget {
    fn value(&self, sig: &Signal, t: i64) -> f64 {
        let x1 = sig.value("pos_east_m", t);
        let y1 = sig.value("pos_north_m", t);
        let z1 = sig.value("pos_down_m", t);
        let x2 = sig.value("enemy_pos_east_m", t);
        let y2 = sig.value("enemy_pos_north_m", t);
        let z2 = sig.value("enemy_pos_down_m", t);
        let dtt = ((x2 - x1).powi(2) + (y2 - y1).powi(2) + (z2 - z1).powi(2)).sqrt();
        normalize(
            dtt - self.safe_dist,
            self.min_value,
            self.max_value,
            self.nonlinear_penalty,
        )
    }
}

/// Height above a flat ground plane at `z = 0`.
///
/// Grounded in `DTGFun`.
#[derive(Debug, Clone, Copy)]
pub struct DistanceToGround {
    pub safe_dist: f64,
    min_value: f64,
    max_value: f64,
    nonlinear_penalty: bool,
}

impl DistanceToGround {
    pub fn new(safe_dist: f64, nonlinear_penalty: bool) -> DistanceToGround {
        DistanceToGround {
            safe_dist,
            min_value: -safe_dist,
            max_value: safe_dist,
            nonlinear_penalty,
        }
    }
}

impl SignalFunction for DistanceToGround {
    fn value(&self, sig: &Signal, t: i64) -> f64 {
        let pos_down_m = sig.value("pos_down_m", t);
        let dtg = -pos_down_m; // ground_z = 0
        normalize(
            dtg - self.safe_dist,
            self.min_value,
            self.max_value,
            self.nonlinear_penalty,
        )
    }
}

/// Distance from a goal altitude, only evaluated while inside a
/// north/east zone; `0.0` (raw, un-normalized) outside it.
///
/// Grounded in `ReconFun`, reused for both the recon and missile-avoidance
/// enforcers with different construction parameters. The zone bounds use
/// the same north=X/east=Y convention as [`TimeToIntercept`].
#[derive(Debug, Clone, Copy)]
pub struct DistanceToElevationInZone {
    pub goal_z: f64,
    pub acceptable_range: f64,
    pub lower_x: f64,
    pub lower_y: f64,
    pub upper_x: f64,
    pub upper_y: f64,
    nonlinear_penalty: bool,
}

impl DistanceToElevationInZone {
    pub fn new(
        goal_z: f64,
        acceptable_range: f64,
        lower_x: f64,
        lower_y: f64,
        upper_x: f64,
        upper_y: f64,
        nonlinear_penalty: bool,
    ) -> DistanceToElevationInZone {
        DistanceToElevationInZone {
            goal_z,
            acceptable_range,
            lower_x,
            lower_y,
            upper_x,
            upper_y,
            nonlinear_penalty,
        }
    }

    fn min_value(&self) -> f64 {
        -self.acceptable_range
    }

    fn max_value(&self) -> f64 {
        self.acceptable_range
    }

    fn is_in_zone(&self, ego_x: f64, ego_y: f64) -> bool {
        let in_x = ego_x >= self.lower_x && ego_x <= self.upper_x;
        let in_y = ego_y >= self.lower_y && ego_y <= self.upper_y;
        in_x && in_y
    }

    fn compute_dte(&self, ego_z: f64) -> f64 {
        self.acceptable_range - (ego_z - self.goal_z).abs()
    }
}

impl SignalFunction for DistanceToElevationInZone {
    fn value(&self, sig: &Signal, t: i64) -> f64 {
        let pos_north_m = sig.value("pos_north_m", t);
        let pos_east_m = sig.value("pos_east_m", t);
        let pos_down_m = sig.value("pos_down_m", t);

        if self.is_in_zone(pos_north_m, pos_east_m) {
            normalize(
                self.compute_dte(-pos_down_m),
                self.min_value(),
                self.max_value(),
                self.nonlinear_penalty,
            )
        } else {
            // Out of zone: raw 0, bypassing normalization entirely. Matches
            // the source exactly; both paths happen to agree at the zone
            // boundary since compute_dte(goal_z) == acceptable_range there.
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal_with_frame(frame: [(&str, f64); 12]) -> Signal {
        let names: Vec<&str> = frame.iter().map(|(n, _)| *n).collect();
        let mut sig = Signal::new(&names);
        sig.append(frame.iter().map(|(_, v)| *v).collect());
        sig
    }

    fn base_frame() -> [(&'static str, f64); 12] {
        [
            ("pos_east_m", 0.0),
            ("pos_north_m", 0.0),
            ("pos_down_m", -1.0),
            ("vel_east_m_s", 0.0),
            ("vel_north_m_s", 0.0),
            ("vel_down_m_s", 0.0),
            ("enemy_pos_east_m", 5.0),
            ("enemy_pos_north_m", 5.0),
            ("enemy_pos_down_m", -1.0),
            ("enemy_vel_east_m_s", 0.0),
            ("enemy_vel_north_m_s", 0.0),
            ("enemy_vel_down_m_s", 0.0),
        ]
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(normalize(0.0, -5.0, 5.0, true), 0.0);
    }

    #[test]
    fn normalize_positive_clips_and_scales_linearly() {
        assert_eq!(normalize(2.5, -5.0, 5.0, true), 0.5);
        assert_eq!(normalize(100.0, -5.0, 5.0, true), 1.0);
    }

    #[test]
    fn normalize_negative_nonlinear_outranks_linear_for_small_violations() {
        let linear = normalize(-1.0, -5.0, 5.0, false);
        let nonlinear = normalize(-1.0, -5.0, 5.0, true);
        assert!(nonlinear > linear);
    }

    #[test]
    fn tti_prop_true_well_inside_boundary_at_rest() {
        let tti = TimeToIntercept::new(-10.0, 10.0, -10.0, 10.0, 0.0, 6.0, 1.5, 2.0, true);
        let sig = signal_with_frame(base_frame());
        assert!(tti.prop_latest(&sig));
    }

    #[test]
    fn tti_prop_false_outside_boundary() {
        let tti = TimeToIntercept::new(-10.0, 10.0, -10.0, 10.0, 0.0, 6.0, 1.5, 2.0, true);
        let mut frame = base_frame();
        frame[1].1 = 20.0; // pos_north_m far past upper_x
        let sig = signal_with_frame(frame);
        assert!(!tti.prop_latest(&sig));
    }

    #[test]
    fn dtt_prop_true_when_far_from_adversary() {
        let dtt = DistanceToTarget::new(1.0, 0.1, true);
        let sig = signal_with_frame(base_frame());
        assert!(dtt.prop_latest(&sig));
    }

    #[test]
    fn dtt_prop_false_when_within_safe_distance() {
        let dtt = DistanceToTarget::new(1.0, 0.1, true);
        let mut frame = base_frame();
        frame[6].1 = 0.2; // enemy_pos_east_m close to own position
        frame[7].1 = 0.2;
        let sig = signal_with_frame(frame);
        assert!(!dtt.prop_latest(&sig));
    }

    #[test]
    fn dtg_prop_false_when_near_ground() {
        let dtg = DistanceToGround::new(1.0, true);
        let mut frame = base_frame();
        frame[2].1 = -0.1; // pos_down_m near zero => near ground
        let sig = signal_with_frame(frame);
        assert!(!dtg.prop_latest(&sig));
    }

    #[test]
    fn dte_returns_raw_zero_outside_zone() {
        let dte = DistanceToElevationInZone::new(1.2, 1.0, -5.0, -5.0, 5.0, 5.0, true);
        let mut frame = base_frame();
        frame[1].1 = 20.0; // pos_north_m outside zone
        let sig = signal_with_frame(frame);
        assert_eq!(dte.value_latest(&sig), 0.0);
    }

    #[test]
    fn dte_prop_true_at_goal_altitude_inside_zone() {
        let dte = DistanceToElevationInZone::new(1.2, 1.0, -5.0, -5.0, 5.0, 5.0, true);
        let mut frame = base_frame();
        frame[2].1 = -1.2; // pos_down_m = -goal_z
        let sig = signal_with_frame(frame);
        assert!(dte.prop_latest(&sig));
    }
}
