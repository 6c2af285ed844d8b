//! Shared domain types used across the Aegis workspace.

use std::fmt;

/// A velocity command in the north-east-down local tangent frame, plus a
/// heading. "Down" is positive toward the ground.
///
/// This is the one type every enforcer, coordinator strategy, and the
/// command sink of §6 agree on — candidates, proposed input, and dispatched
/// output are all `VelocityNedYaw`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityNedYaw {
    pub north_m_s: f64,
    pub east_m_s: f64,
    pub down_m_s: f64,
    pub yaw_deg: f64,
}

impl VelocityNedYaw {
    pub const ZERO: VelocityNedYaw = VelocityNedYaw {
        north_m_s: 0.0,
        east_m_s: 0.0,
        down_m_s: 0.0,
        yaw_deg: 0.0,
    };

    pub fn new(north_m_s: f64, east_m_s: f64, down_m_s: f64, yaw_deg: f64) -> Self {
        VelocityNedYaw {
            north_m_s,
            east_m_s,
            down_m_s,
            yaw_deg,
        }
    }

    /// Euclidean magnitude of the translational (N/E/D) components, yaw excluded.
    pub fn magnitude(&self) -> f64 {
        (self.north_m_s.powi(2) + self.east_m_s.powi(2) + self.down_m_s.powi(2)).sqrt()
    }

    /// Rescale the translational components to exactly `speed` m/s, preserving
    /// direction and yaw. Falls back to a vertical climb if the vector is too
    /// close to zero to normalize safely (see Design Note on numeric hazards).
    pub fn scaled_to_speed(&self, speed: f64) -> VelocityNedYaw {
        let mag = self.magnitude();
        if mag < EPSILON_DENOMINATOR {
            return VelocityNedYaw {
                north_m_s: 0.0,
                east_m_s: 0.0,
                down_m_s: -speed,
                yaw_deg: self.yaw_deg,
            };
        }
        let scale = speed / mag;
        VelocityNedYaw {
            north_m_s: self.north_m_s * scale,
            east_m_s: self.east_m_s * scale,
            down_m_s: self.down_m_s * scale,
            yaw_deg: self.yaw_deg,
        }
    }

    /// Rescale the translational components to unit magnitude, preserving yaw.
    /// Falls back to the zero vector if already (near) zero.
    pub fn scaled_to_unit(&self) -> VelocityNedYaw {
        let mag = self.magnitude();
        if mag < EPSILON_DENOMINATOR {
            return *self;
        }
        VelocityNedYaw {
            north_m_s: self.north_m_s / mag,
            east_m_s: self.east_m_s / mag,
            down_m_s: self.down_m_s / mag,
            yaw_deg: self.yaw_deg,
        }
    }

    /// Raw cosine similarity against another vector, over N/E/D only. No
    /// clamping to [-1, 1] — matches the source's unclamped dot-product ratio.
    /// Returns `0.0` if either vector is (near) zero.
    pub fn cosine_similarity(&self, other: &VelocityNedYaw) -> f64 {
        let dot = self.north_m_s * other.north_m_s
            + self.east_m_s * other.east_m_s
            + self.down_m_s * other.down_m_s;
        let denom = self.magnitude() * other.magnitude();
        if denom < EPSILON_DENOMINATOR {
            return 0.0;
        }
        dot / denom
    }

    /// Componentwise epsilon-equality over the translational components only,
    /// matching `droneutil::cmp`.
    pub fn approx_eq(&self, other: &VelocityNedYaw, epsilon: f64) -> bool {
        (self.north_m_s - other.north_m_s).abs() < epsilon
            && (self.east_m_s - other.east_m_s).abs() < epsilon
            && (self.down_m_s - other.down_m_s).abs() < epsilon
    }

    /// Zero the vertical component if z-velocity is globally disabled.
    pub fn with_z_policy(mut self, use_z_velocity: bool) -> VelocityNedYaw {
        if !use_z_velocity {
            self.down_m_s = 0.0;
        }
        self
    }
}

impl fmt::Display for VelocityNedYaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.3}, yaw={:.1})",
            self.north_m_s, self.east_m_s, self.down_m_s, self.yaw_deg
        )
    }
}

/// Denominator floor used whenever a vector magnitude would otherwise divide
/// by (near) zero — numeric hazard guard per Design Note §9.
pub const EPSILON_DENOMINATOR: f64 = 1e-6;

/// Canonical twelve-channel signal layout for the drone instantiation:
/// own position, own velocity, adversary position, adversary velocity, each
/// in east/north/down order.
pub const SIGNAL_CHANNELS: [&str; 12] = [
    "pos_east_m",
    "pos_north_m",
    "pos_down_m",
    "vel_east_m_s",
    "vel_north_m_s",
    "vel_down_m_s",
    "enemy_pos_east_m",
    "enemy_pos_north_m",
    "enemy_pos_down_m",
    "enemy_vel_east_m_s",
    "enemy_vel_north_m_s",
    "enemy_vel_down_m_s",
];
