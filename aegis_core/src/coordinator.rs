//! Coordinator strategies: resolve a tick's set of active (property-violated)
//! enforcers down to a single dispatched [`VelocityNedYaw`].
//!
//! Grounded in `Coordinator` (base pass-through) and its six subclasses:
//! `SimpleCoordinator`, `PriorityCoordinator`, `ConjunctionCoordinator`,
//! `WeightedCoordinator`, `IntersectingCoordinator`, and
//! `RobustnessCoordinator` (the synthesis strategy). `Coordinator`'s own
//! `sendVelocityNed` z-velocity-zeroing side effect lives at the tick
//! driver's dispatch boundary in `cycle`, not here — this module's job ends
//! at "produce one velocity per tick".

use rand::Rng;

use aegis_common::config::GlobalConfig;
use aegis_common::error::SupervisorError;
use aegis_common::types::{VelocityNedYaw, EPSILON_DENOMINATOR, SIGNAL_CHANNELS};

use crate::enforcer::Enforcer;
use crate::signal::Signal;

/// Which of the six interchangeable strategies resolves enforcer conflicts
/// for a tick. Chosen once at startup (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Simple,
    Priority,
    Conjunction,
    Weighted,
    Intersection,
    Synthesis,
}

/// Owns the enforcer set and dispatches to the configured strategy.
pub struct Coordinator {
    enforcers: Vec<Box<dyn Enforcer>>,
    strategy: Strategy,
    config: GlobalConfig,
}

impl Coordinator {
    pub fn new(enforcers: Vec<Box<dyn Enforcer>>, strategy: Strategy, config: GlobalConfig) -> Coordinator {
        Coordinator { enforcers, strategy, config }
    }

    pub fn enforcers(&self) -> &[Box<dyn Enforcer>] {
        &self.enforcers
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Resolve `v_in` into the velocity to dispatch this tick. Preserves
    /// `v_in.yaw_deg` regardless of strategy (§4.4: "only the translational
    /// components are mutated").
    pub fn coordinate(&self, sig: &Signal, v_in: VelocityNedYaw) -> Result<VelocityNedYaw, SupervisorError> {
        let out = match self.strategy {
            Strategy::Simple => self.simple(sig, v_in)?,
            Strategy::Priority => self.priority(sig, v_in),
            Strategy::Conjunction => self.conjunction(sig, v_in),
            Strategy::Weighted => self.weighted(sig, v_in),
            Strategy::Intersection => self.intersection(sig, v_in)?,
            Strategy::Synthesis => self.synthesis(sig, v_in)?,
        };
        Ok(VelocityNedYaw::new(out.north_m_s, out.east_m_s, out.down_m_s, v_in.yaw_deg))
    }

    fn active(&self, sig: &Signal) -> Vec<&dyn Enforcer> {
        self.enforcers.iter().filter(|e| e.active(sig)).map(|e| e.as_ref()).collect()
    }

    /// §4.4.1: baseline only — always the first enforcer's preferred
    /// candidate, irrespective of whether it's active.
    fn simple(&self, sig: &Signal, v_in: VelocityNedYaw) -> Result<VelocityNedYaw, SupervisorError> {
        let first = self
            .enforcers
            .first()
            .ok_or_else(|| SupervisorError::InvariantViolation("coordinator has no enforcers".into()))?;
        Ok(first.enforce(sig, v_in)[0])
    }

    /// §4.4.2: among active enforcers, the one with the largest configured
    /// weight. A tie keeps the first-encountered enforcer (the enforcer set's
    /// construction order), not the last — `getPriorityEnforcer`'s argmax is
    /// seeded at the first active enforcer and only replaced on strict `>`,
    /// unlike `Iterator::max_by`'s last-wins tie-break.
    fn priority(&self, sig: &Signal, v_in: VelocityNedYaw) -> VelocityNedYaw {
        let mut active = self.active(sig).into_iter();
        let Some(first) = active.next() else {
            return v_in;
        };
        let chosen = active.fold(first, |best, candidate| {
            if candidate.weight() > best.weight() { candidate } else { best }
        });
        chosen.enforce(sig, v_in)[0]
    }

    /// §4.4.3: among active enforcers, the one whose property currently has
    /// the *lowest* robustness. This keeps the source's documented-wrong
    /// semantics verbatim — the "correct" conjunction would maximize joint
    /// robustness across all active properties, not defer to a single
    /// enforcer's own candidate (see DESIGN.md).
    fn conjunction(&self, sig: &Signal, v_in: VelocityNedYaw) -> VelocityNedYaw {
        let active = self.active(sig);
        let Some(chosen) = active
            .into_iter()
            .min_by(|a, b| a.robustness(sig).partial_cmp(&b.robustness(sig)).unwrap())
        else {
            return v_in;
        };
        chosen.enforce(sig, v_in)[0]
    }

    /// §4.4.4: componentwise blend of every active enforcer's first
    /// candidate, weighted by `w_i / (1 - sum of inactive weights)` so the
    /// active weights renormalize to 1.
    fn weighted(&self, sig: &Signal, v_in: VelocityNedYaw) -> VelocityNedYaw {
        let mut unused_weight = 0.0;
        let mut active = Vec::new();
        for e in &self.enforcers {
            if e.active(sig) {
                active.push(e.as_ref());
            } else {
                unused_weight += e.weight();
            }
        }
        if active.is_empty() {
            return v_in;
        }
        if active.len() == 1 {
            return active[0].enforce(sig, v_in)[0];
        }

        let denom = (1.0 - unused_weight).clamp(EPSILON_DENOMINATOR, f64::MAX);

        let mut north = 0.0;
        let mut east = 0.0;
        let mut down = 0.0;
        for e in &active {
            let action = e.enforce(sig, v_in)[0];
            let w = e.weight() / denom;
            north += action.north_m_s * w;
            east += action.east_m_s * w;
            down += action.down_m_s * w;
        }
        VelocityNedYaw::new(north, east, down, v_in.yaw_deg)
    }

    /// §4.4.x (ADDED — recovered from `IntersectingCoordinator.cpp`): among
    /// active enforcers, the candidate common to every active enforcer's
    /// list, compared with componentwise-epsilon equality. Unlike the
    /// source's adjacent-pairs-only comparison (the documented bug in §9),
    /// this checks all pairs: a candidate survives only if every *other*
    /// active enforcer's list contains something within epsilon of it.
    fn intersection(&self, sig: &Signal, v_in: VelocityNedYaw) -> Result<VelocityNedYaw, SupervisorError> {
        let active = self.active(sig);
        if active.is_empty() {
            return Ok(v_in);
        }
        if active.len() == 1 {
            return Ok(active[0].enforce(sig, v_in)[0]);
        }

        let epsilon = self.config.intersection_epsilon;
        let candidate_sets: Vec<Vec<VelocityNedYaw>> = active.iter().map(|e| e.enforce(sig, v_in)).collect();

        for candidate in &candidate_sets[0] {
            let in_every_other_set = candidate_sets[1..]
                .iter()
                .all(|set| set.iter().any(|other| candidate.approx_eq(other, epsilon)));
            if in_every_other_set {
                return Ok(*candidate);
            }
        }

        Err(SupervisorError::InvariantViolation(
            "intersection strategy: no candidate common to every active enforcer".into(),
        ))
    }

    /// §4.4.5: the robustness-maximizing synthesis strategy.
    fn synthesis(&self, sig: &Signal, v_in: VelocityNedYaw) -> Result<VelocityNedYaw, SupervisorError> {
        let active = self.active(sig);
        if active.is_empty() {
            return Ok(v_in);
        }
        if active.len() == 1 {
            let candidates = active[0].enforce(sig, v_in);
            if self.config.choose_least_different_action {
                return Ok(least_different(v_in, &candidates));
            }
            return Ok(candidates[0]);
        }

        let mut actions: Vec<VelocityNedYaw> = Vec::new();
        for e in &active {
            actions.extend(e.enforce(sig, v_in));
        }

        let mut potential_actions = if self.config.synthesize_actions {
            let mut synthesized = reasonable_actions(&actions, &self.config);
            synthesized.extend(actions.iter().copied());
            synthesized
        } else {
            actions
        };
        if potential_actions.is_empty() {
            potential_actions.push(v_in);
        }

        let t = sig.length() as i64 - 1;
        let mut best: Option<(f64, VelocityNedYaw)> = None;
        for candidate in potential_actions {
            let frame = predicted_frame(sig, candidate, t, &self.config);
            let mut sig_mut = sig.clone();
            let global_rob = sig_mut.scoped_with_frame(frame, |est_sig| {
                active
                    .iter()
                    .map(|e| e.weight() * e.property().robustness(est_sig, t + 1))
                    .sum::<f64>()
            });
            match &best {
                Some((best_rob, _)) if *best_rob >= global_rob => {}
                _ => best = Some((global_rob, candidate)),
            }
        }

        let (_, chosen) = best.ok_or_else(|| {
            SupervisorError::InvariantViolation("synthesis strategy had no candidates to score".into())
        })?;
        Ok(chosen)
    }
}

/// §4.4.5.2 tie-break: the candidate with the highest raw cosine similarity
/// to `v_in`. Ties (and the initial value) resolve to the first-seen
/// candidate — matches `get_least_different`'s linear scan, which only
/// replaces the incumbent on strict `>`.
fn least_different(v_in: VelocityNedYaw, candidates: &[VelocityNedYaw]) -> VelocityNedYaw {
    let mut best = candidates[0];
    let mut best_sim = v_in.cosine_similarity(&best);
    for &candidate in &candidates[1..] {
        let sim = candidate.cosine_similarity(&v_in);
        if sim > best_sim {
            best_sim = sim;
            best = candidate;
        }
    }
    best
}

/// §4.4.5.b: random-sample additional candidates inside the axis-aligned
/// bounding box of `actions`' components. Grounded in
/// `get_reasonable_actions`/`get_action_range`/`get_action_in_range`.
///
/// Replicates two source quirks deliberately (neither is in the documented
/// "must-fix" bug list of the design notes, only the "additional grounding"
/// detail for this strategy): only the first two entries of `actions` are
/// unit-scaled before the bounding box is computed (`get_reasonable_actions`
/// calls `scaleToUnitVector` on indices 0 and 1 only, even when more than two
/// enforcers are active), and the down-axis bound collapses to `0.0` when
/// `use_z_velocity` is disabled rather than tracking the true min/max.
fn reasonable_actions(actions: &[VelocityNedYaw], config: &GlobalConfig) -> Vec<VelocityNedYaw> {
    let mut scaled = actions.to_vec();
    for a in scaled.iter_mut().take(2) {
        *a = a.scaled_to_unit();
    }

    let mut min = scaled[0];
    let mut max = scaled[0];
    for a in &scaled {
        if a.north_m_s < min.north_m_s {
            min.north_m_s = a.north_m_s;
        }
        if a.east_m_s < min.east_m_s {
            min.east_m_s = a.east_m_s;
        }
        if a.down_m_s < min.down_m_s {
            min.down_m_s = if config.use_z_velocity { a.down_m_s } else { 0.0 };
        }
        if a.north_m_s > max.north_m_s {
            max.north_m_s = a.north_m_s;
        }
        if a.east_m_s > max.east_m_s {
            max.east_m_s = a.east_m_s;
        }
        if a.down_m_s > max.down_m_s {
            max.down_m_s = if config.use_z_velocity { a.down_m_s } else { 0.0 };
        }
    }

    let precision = config.random_search_granularity as f64;
    let span_north = (max.north_m_s - min.north_m_s).abs();
    let span_east = (max.east_m_s - min.east_m_s).abs();
    let span_down = (max.down_m_s - min.down_m_s).abs();
    let num_actions = (precision * span_north * precision * span_east * precision * span_down) as u64;

    let (lo_north, hi_north) = (min.north_m_s.min(max.north_m_s), min.north_m_s.max(max.north_m_s));
    let (lo_east, hi_east) = (min.east_m_s.min(max.east_m_s), min.east_m_s.max(max.east_m_s));
    let (lo_down, hi_down) = (min.down_m_s.min(max.down_m_s), min.down_m_s.max(max.down_m_s));

    let mut rng = rand::thread_rng();
    let mut out = Vec::with_capacity(num_actions as usize + 1);
    for _ in 0..=num_actions {
        let north = if hi_north > lo_north { rng.gen_range(lo_north..hi_north) } else { lo_north };
        let east = if hi_east > lo_east { rng.gen_range(lo_east..hi_east) } else { lo_east };
        let down = if hi_down > lo_down { rng.gen_range(lo_down..hi_down) } else { lo_down };
        let sample = VelocityNedYaw::new(north, east, down, 0.0).scaled_to_speed(config.max_drone_speed);
        out.push(sample);
    }
    out
}

/// §4.4.5.c: one-step predicted frame for scoring `candidate`. Grounded in
/// `get_est_signal`/`update_velocity`.
fn predicted_frame(sig: &Signal, candidate: VelocityNedYaw, t: i64, config: &GlobalConfig) -> Vec<f64> {
    let td = config.tick_duration_s;
    let ticks_to_correct = config.ticks_to_correct;
    let est_acc = config.synthesis_est_accel;
    let hold_ticks = config.synthesis_enemy_hold_ticks as f64;

    let own_vel = VelocityNedYaw::new(
        sig.value("vel_north_m_s", t),
        sig.value("vel_east_m_s", t),
        sig.value("vel_down_m_s", t),
        0.0,
    );
    let new_vel = bounded_step(own_vel, candidate, ticks_to_correct, est_acc, td);

    let new_pos_north = sig.value("pos_north_m", t) + new_vel.north_m_s * td * ticks_to_correct;
    let new_pos_east = sig.value("pos_east_m", t) + new_vel.east_m_s * td * ticks_to_correct;
    let new_pos_down = sig.value("pos_down_m", t) + new_vel.down_m_s * td * ticks_to_correct;

    let enemy_vel = VelocityNedYaw::new(
        sig.value("enemy_vel_north_m_s", t),
        sig.value("enemy_vel_east_m_s", t),
        sig.value("enemy_vel_down_m_s", t),
        0.0,
    );
    // The adversary holds its current velocity for `hold_ticks` before re-aiming.
    let new_enemy_pos_north = sig.value("enemy_pos_north_m", t) + enemy_vel.north_m_s * td * hold_ticks;
    let new_enemy_pos_east = sig.value("enemy_pos_east_m", t) + enemy_vel.east_m_s * td * hold_ticks;
    let new_enemy_pos_down = sig.value("enemy_pos_down_m", t) + enemy_vel.down_m_s * td * hold_ticks;

    let delta_north = new_pos_north - new_enemy_pos_north;
    let delta_east = new_pos_east - new_enemy_pos_east;
    let delta_down = new_pos_down - new_enemy_pos_down;
    let delta = (delta_north.powi(2) + delta_east.powi(2) + delta_down.powi(2))
        .sqrt()
        .max(EPSILON_DENOMINATOR);

    let enemy_speed = config.enemy_drone_speed;
    let attempted_enemy_vel = VelocityNedYaw::new(
        enemy_speed * delta_north / delta,
        enemy_speed * delta_east / delta,
        enemy_speed * delta_down / delta,
        0.0,
    );
    let remaining_ticks = (ticks_to_correct - hold_ticks).max(0.0);
    let new_enemy_vel = bounded_step(enemy_vel, attempted_enemy_vel, remaining_ticks, est_acc, td);

    // The adversary's post-hold position is not advanced further in this
    // estimate — intentional, per the source comment: it only affects
    // candidate scoring, not generation, so relative ordering still holds.
    let mut frame = vec![0.0; SIGNAL_CHANNELS.len()];
    frame[index_of("pos_east_m")] = new_pos_east;
    frame[index_of("pos_north_m")] = new_pos_north;
    frame[index_of("pos_down_m")] = new_pos_down;
    frame[index_of("vel_east_m_s")] = new_vel.east_m_s;
    frame[index_of("vel_north_m_s")] = new_vel.north_m_s;
    frame[index_of("vel_down_m_s")] = new_vel.down_m_s;
    frame[index_of("enemy_pos_east_m")] = new_enemy_pos_east;
    frame[index_of("enemy_pos_north_m")] = new_enemy_pos_north;
    frame[index_of("enemy_pos_down_m")] = new_enemy_pos_down;
    frame[index_of("enemy_vel_east_m_s")] = new_enemy_vel.east_m_s;
    frame[index_of("enemy_vel_north_m_s")] = new_enemy_vel.north_m_s;
    frame[index_of("enemy_vel_down_m_s")] = new_enemy_vel.down_m_s;
    frame
}

fn index_of(channel: &str) -> usize {
    SIGNAL_CHANNELS.iter().position(|c| *c == channel).expect("known channel")
}

/// Bounded-acceleration clamp: `old` moves toward `target` by at most
/// `est_acc * td * num_steps` per axis, never overshooting past `target`.
/// Grounded in `update_velocity`.
fn bounded_step(old: VelocityNedYaw, target: VelocityNedYaw, num_steps: f64, est_acc: f64, td: f64) -> VelocityNedYaw {
    let step = |old: f64, target: f64| -> f64 {
        let dir = if target < old { -1.0 } else { 1.0 };
        let moved = old + dir * est_acc * td * num_steps;
        if dir > 0.0 { moved.min(target) } else { moved.max(target) }
    };
    VelocityNedYaw::new(
        step(old.north_m_s, target.north_m_s),
        step(old.east_m_s, target.east_m_s),
        step(old.down_m_s, target.down_m_s),
        old.yaw_deg,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigfun::DistanceToGround;
    use crate::stl::Stl;

    struct FixedEnforcer {
        name: &'static str,
        weight: f64,
        property: Stl,
        candidates: Vec<VelocityNedYaw>,
    }

    impl Enforcer for FixedEnforcer {
        fn name(&self) -> &'static str {
            self.name
        }
        fn weight(&self) -> f64 {
            self.weight
        }
        fn property(&self) -> &Stl {
            &self.property
        }
        fn enforce(&self, _sig: &Signal, v_in: VelocityNedYaw) -> Vec<VelocityNedYaw> {
            if self.active(_sig) {
                self.candidates.clone()
            } else {
                vec![v_in]
            }
        }
    }

    fn violated_property() -> Stl {
        // DistanceToGround with a huge safe_dist is violated at height 0.
        Stl::atom(DistanceToGround::new(1000.0, true))
    }

    fn satisfied_property() -> Stl {
        Stl::atom(DistanceToGround::new(1e-9, true))
    }

    fn signal_with_one_frame() -> Signal {
        let mut sig = Signal::new(&SIGNAL_CHANNELS);
        sig.append(vec![0.0, 0.0, -2.0, 0.0, 0.0, 0.0, 8.0, 8.0, -2.0, 0.0, 0.0, 0.0]);
        sig
    }

    #[test]
    fn simple_always_uses_first_enforcer_regardless_of_activity() {
        let sig = signal_with_one_frame();
        let e1 = Box::new(FixedEnforcer {
            name: "A",
            weight: 1.0,
            property: satisfied_property(),
            candidates: vec![VelocityNedYaw::new(9.0, 9.0, 9.0, 0.0)],
        });
        let coordinator = Coordinator::new(vec![e1], Strategy::Simple, GlobalConfig::default());
        let v_in = VelocityNedYaw::new(1.0, 1.0, 1.0, 45.0);
        let out = coordinator.coordinate(&sig, v_in).unwrap();
        assert_eq!(out, v_in); // property satisfied -> passthrough [v_in]
    }

    #[test]
    fn priority_picks_highest_weight_active_enforcer() {
        let sig = signal_with_one_frame();
        let low = Box::new(FixedEnforcer {
            name: "Low",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(1.0, 0.0, 0.0, 0.0)],
        });
        let high = Box::new(FixedEnforcer {
            name: "High",
            weight: 5.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(2.0, 0.0, 0.0, 0.0)],
        });
        let coordinator = Coordinator::new(vec![low, high], Strategy::Priority, GlobalConfig::default());
        let v_in = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let out = coordinator.coordinate(&sig, v_in).unwrap();
        assert_eq!(out.north_m_s, 2.0);
    }

    #[test]
    fn priority_breaks_weight_ties_toward_first_constructed_enforcer() {
        let sig = signal_with_one_frame();
        let first = Box::new(FixedEnforcer {
            name: "First",
            weight: 3.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(1.0, 0.0, 0.0, 0.0)],
        });
        let second = Box::new(FixedEnforcer {
            name: "Second",
            weight: 3.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(2.0, 0.0, 0.0, 0.0)],
        });
        let coordinator = Coordinator::new(vec![first, second], Strategy::Priority, GlobalConfig::default());
        let v_in = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let out = coordinator.coordinate(&sig, v_in).unwrap();
        assert_eq!(out.north_m_s, 1.0); // equal weight -> first enforcer wins, not the last
    }

    #[test]
    fn conjunction_picks_least_robust_active_enforcer() {
        let sig = signal_with_one_frame();
        // Both violated; DistanceToGround robustness strictly increases with
        // safe_dist at a fixed height, so the larger safe_dist is less robust.
        let less_robust = Box::new(FixedEnforcer {
            name: "LessRobust",
            weight: 1.0,
            property: Stl::atom(DistanceToGround::new(2000.0, true)),
            candidates: vec![VelocityNedYaw::new(7.0, 0.0, 0.0, 0.0)],
        });
        let more_robust = Box::new(FixedEnforcer {
            name: "MoreRobust",
            weight: 1.0,
            property: Stl::atom(DistanceToGround::new(1001.0, true)),
            candidates: vec![VelocityNedYaw::new(3.0, 0.0, 0.0, 0.0)],
        });
        let coordinator = Coordinator::new(vec![more_robust, less_robust], Strategy::Conjunction, GlobalConfig::default());
        let v_in = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let out = coordinator.coordinate(&sig, v_in).unwrap();
        assert_eq!(out.north_m_s, 7.0);
    }

    #[test]
    fn weighted_blends_proportionally_to_renormalized_weights() {
        let sig = signal_with_one_frame();
        let a = Box::new(FixedEnforcer {
            name: "A",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(10.0, 0.0, 0.0, 0.0)],
        });
        let b = Box::new(FixedEnforcer {
            name: "B",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0)],
        });
        let coordinator = Coordinator::new(vec![a, b], Strategy::Weighted, GlobalConfig::default());
        let v_in = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let out = coordinator.coordinate(&sig, v_in).unwrap();
        assert!((out.north_m_s - 5.0).abs() < 1e-9);
    }

    #[test]
    fn intersection_returns_common_candidate_across_all_active() {
        let sig = signal_with_one_frame();
        let shared = VelocityNedYaw::new(3.0, 3.0, 0.0, 0.0);
        let a = Box::new(FixedEnforcer {
            name: "A",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(1.0, 1.0, 0.0, 0.0), shared],
        });
        let b = Box::new(FixedEnforcer {
            name: "B",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![shared, VelocityNedYaw::new(2.0, 2.0, 0.0, 0.0)],
        });
        let c = Box::new(FixedEnforcer {
            name: "C",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(9.0, 9.0, 0.0, 0.0), shared],
        });
        let coordinator = Coordinator::new(vec![a, b, c], Strategy::Intersection, GlobalConfig::default());
        let v_in = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let out = coordinator.coordinate(&sig, v_in).unwrap();
        assert_eq!(out.north_m_s, shared.north_m_s);
        assert_eq!(out.east_m_s, shared.east_m_s);
    }

    #[test]
    fn intersection_with_no_common_candidate_is_invariant_violation() {
        let sig = signal_with_one_frame();
        let a = Box::new(FixedEnforcer {
            name: "A",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(1.0, 1.0, 0.0, 0.0)],
        });
        let b = Box::new(FixedEnforcer {
            name: "B",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(-1.0, -1.0, 0.0, 0.0)],
        });
        let coordinator = Coordinator::new(vec![a, b], Strategy::Intersection, GlobalConfig::default());
        let v_in = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let result = coordinator.coordinate(&sig, v_in);
        assert!(matches!(result, Err(SupervisorError::InvariantViolation(_))));
    }

    #[test]
    fn synthesis_with_zero_active_passes_through() {
        let sig = signal_with_one_frame();
        let a = Box::new(FixedEnforcer {
            name: "A",
            weight: 1.0,
            property: satisfied_property(),
            candidates: vec![VelocityNedYaw::new(9.0, 9.0, 9.0, 0.0)],
        });
        let coordinator = Coordinator::new(vec![a], Strategy::Synthesis, GlobalConfig::default());
        let v_in = VelocityNedYaw::new(1.0, 2.0, 3.0, 17.0);
        let out = coordinator.coordinate(&sig, v_in).unwrap();
        assert_eq!(out, v_in);
    }

    #[test]
    fn synthesis_with_one_active_uses_least_different_tie_break() {
        let sig = signal_with_one_frame();
        let v_in = VelocityNedYaw::new(1.0, 0.0, 0.0, 0.0);
        let similar = VelocityNedYaw::new(1.0, 0.1, 0.0, 0.0);
        let opposite = VelocityNedYaw::new(-1.0, 0.0, 0.0, 0.0);
        let a = Box::new(FixedEnforcer {
            name: "A",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![opposite, similar],
        });
        let coordinator = Coordinator::new(vec![a], Strategy::Synthesis, GlobalConfig::default());
        let out = coordinator.coordinate(&sig, v_in).unwrap();
        assert_eq!(out.north_m_s, similar.north_m_s);
    }

    #[test]
    fn synthesis_preserves_signal_length_after_scoring() {
        let sig = signal_with_one_frame();
        let a = Box::new(FixedEnforcer {
            name: "A",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(1.0, 0.0, 0.0, 0.0)],
        });
        let b = Box::new(FixedEnforcer {
            name: "B",
            weight: 1.0,
            property: violated_property(),
            candidates: vec![VelocityNedYaw::new(0.0, 1.0, 0.0, 0.0)],
        });
        let mut config = GlobalConfig::default();
        config.synthesize_actions = false; // keep this test deterministic
        let before = sig.length();
        let coordinator = Coordinator::new(vec![a, b], Strategy::Synthesis, config);
        let v_in = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let _ = coordinator.coordinate(&sig, v_in).unwrap();
        assert_eq!(sig.length(), before);
    }

    #[test]
    fn bounded_step_never_overshoots_target() {
        let old = VelocityNedYaw::new(0.0, 0.0, 0.0, 0.0);
        let target = VelocityNedYaw::new(0.01, 0.0, 0.0, 0.0);
        let out = bounded_step(old, target, 5.0, 2.0, 0.06);
        assert_eq!(out.north_m_s, 0.01); // clamped at target, not past it
    }

    fn score(enforcers: &[&dyn Enforcer], sig: &Signal, candidate: VelocityNedYaw, config: &GlobalConfig) -> f64 {
        let t = sig.length() as i64 - 1;
        let frame = predicted_frame(sig, candidate, t, config);
        let mut sig_mut = sig.clone();
        sig_mut.scoped_with_frame(frame, |est_sig| {
            enforcers
                .iter()
                .map(|e| e.weight() * e.property().robustness(est_sig, t + 1))
                .sum::<f64>()
        })
    }

    /// Scenario S4 / law 11 (argmax correctness): with both Boundary and
    /// Runaway active and genuinely conflicting (fleeing the adversary means
    /// moving further into the boundary wall), synthesis's chosen candidate
    /// must score at least as well, on weighted robustness, as either
    /// enforcer's own standalone first candidate — since both candidates are
    /// themselves members of the pool the argmax searches over.
    #[test]
    fn synthesis_picks_candidate_no_worse_than_either_standalone_enforcer() {
        let mut config = GlobalConfig::default();
        config.synthesize_actions = true;
        let boundary = BoundaryEnforcer::new(&config);
        let runaway = RunawayEnforcer::new(&config);

        let mut sig = Signal::new(&SIGNAL_CHANNELS);
        // own close to the +10 boundary on the north axis, closing at 2 m/s;
        // adversary 0.5m south, well under ENEMY_CHASE_DISTANCE. Fleeing the
        // adversary (north) runs directly into the boundary wall.
        sig.append(vec![9.5, 9.5, -2.5, 0.0, 2.0, 0.0, 9.5, 9.0, -2.5, 0.0, 0.0, 0.0]);
        let v_in = VelocityNedYaw::new(2.0, 0.0, 0.0, 0.0);

        assert!(boundary.active(&sig));
        assert!(runaway.active(&sig));

        let enforcers: Vec<Box<dyn Enforcer>> = vec![Box::new(BoundaryEnforcer::new(&config)), Box::new(RunawayEnforcer::new(&config))];
        let refs: Vec<&dyn Enforcer> = vec![&boundary, &runaway];

        let boundary_only = score(&refs, &sig, boundary.enforce(&sig, v_in)[0], &config);
        let runaway_only = score(&refs, &sig, runaway.enforce(&sig, v_in)[0], &config);

        let coordinator = Coordinator::new(enforcers, Strategy::Synthesis, config.clone());
        let out = coordinator.coordinate(&sig, v_in).unwrap();
        let chosen = score(&refs, &sig, out, &config);

        assert!(chosen >= boundary_only);
        assert!(chosen >= runaway_only);
    }
}
