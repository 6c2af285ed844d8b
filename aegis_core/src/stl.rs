//! Signal Temporal Logic expression tree: boolean satisfaction and
//! real-valued robustness over a [`Signal`] trace.
//!
//! Grounded in `StlExpr`/`Prop`/`And`/`Not`/`Implies`/`Global`/`PastGlobal`.
//! Represented here as one sum type rather than a class hierarchy, per the
//! "STL tree should be a sum type, not inheritance" design note — the
//! operators don't grow new variants at runtime, so a `match` is simpler
//! than a vtable.
//!
//! `Globally`/`PastGlobally` check availability only at the window's two
//! endpoints (`t+begin`/`t+end`), not at every intermediate tick. This
//! matches the original `Global::robustness`/`PastGlobal::robustness`
//! exactly: a trace that's contiguous between two available endpoints is
//! assumed contiguous throughout (true for this append-only Signal, which
//! never has gaps).

use crate::signal::Signal;
use crate::sigfun::SignalFunction;

/// Satisfaction value returned when the evaluated window isn't fully
/// available yet (e.g. a future-bounded `Globally` near the start of the
/// trace). Optimistic by design — see the accepted Open Question on
/// "unknown robustness defaults to satisfied" in the design notes.
const UNKNOWN_SAT: bool = true;
/// Robustness value returned alongside [`UNKNOWN_SAT`].
const UNKNOWN_ROB: f64 = 0.0;

/// An STL expression over a [`Signal`] trace.
pub enum Stl {
    /// An atomic proposition backed by a [`SignalFunction`].
    Atom(Box<dyn SignalFunction>),
    Not(Box<Stl>),
    And(Box<Stl>, Box<Stl>),
    Implies { antecedent: Box<Stl>, consequent: Box<Stl> },
    /// `G_[t+begin, t+end]`.
    Globally { expr: Box<Stl>, begin: i64, end: i64 },
    /// `PG_[t-begin, t-end]` (expects `begin >= end`, i.e. the window runs
    /// from `t-begin` forward to `t-end`).
    PastGlobally { expr: Box<Stl>, begin: i64, end: i64 },
}

impl Stl {
    pub fn atom(fun: impl SignalFunction + 'static) -> Stl {
        Stl::Atom(Box::new(fun))
    }

    pub fn not(expr: Stl) -> Stl {
        Stl::Not(Box::new(expr))
    }

    pub fn and(left: Stl, right: Stl) -> Stl {
        Stl::And(Box::new(left), Box::new(right))
    }

    pub fn implies(antecedent: Stl, consequent: Stl) -> Stl {
        Stl::Implies {
            antecedent: Box::new(antecedent),
            consequent: Box::new(consequent),
        }
    }

    pub fn globally(expr: Stl, begin: i64, end: i64) -> Stl {
        Stl::Globally {
            expr: Box::new(expr),
            begin,
            end,
        }
    }

    pub fn past_globally(expr: Stl, begin: i64, end: i64) -> Stl {
        Stl::PastGlobally {
            expr: Box::new(expr),
            begin,
            end,
        }
    }

    /// Real-valued robustness of this expression at tick `t`.
    pub fn robustness(&self, sig: &Signal, t: i64) -> f64 {
        match self {
            Stl::Atom(fun) => {
                if !sig.available(t) {
                    return UNKNOWN_ROB;
                }
                fun.value(sig, t)
            }
            Stl::Not(expr) => {
                if !sig.available(t) {
                    return UNKNOWN_ROB;
                }
                -expr.robustness(sig, t)
            }
            Stl::And(left, right) => {
                if !sig.available(t) {
                    return UNKNOWN_ROB;
                }
                left.robustness(sig, t).min(right.robustness(sig, t))
            }
            Stl::Implies { antecedent, consequent } => {
                if !sig.available(t) {
                    return UNKNOWN_ROB;
                }
                let neg_antecedent = -antecedent.robustness(sig, t);
                neg_antecedent.max(consequent.robustness(sig, t))
            }
            Stl::Globally { expr, begin, end } => {
                if !(sig.available(t + begin) && sig.available(t + end)) {
                    return UNKNOWN_ROB;
                }
                let mut min = expr.robustness(sig, t + begin);
                let mut t2 = t + begin;
                while t2 <= t + end {
                    let r = expr.robustness(sig, t2);
                    if r < min {
                        min = r;
                    }
                    t2 += 1;
                }
                min
            }
            Stl::PastGlobally { expr, begin, end } => {
                if !(sig.available(t - begin) && sig.available(t - end)) {
                    return UNKNOWN_ROB;
                }
                let mut min = expr.robustness(sig, t - begin);
                let mut t2 = t - begin;
                while t2 <= t - end {
                    let r = expr.robustness(sig, t2);
                    if r < min {
                        min = r;
                    }
                    t2 += 1;
                }
                min
            }
        }
    }

    /// Boolean satisfaction of this expression at tick `t`.
    pub fn sat(&self, sig: &Signal, t: i64) -> bool {
        match self {
            Stl::Atom(fun) => {
                if !sig.available(t) {
                    return UNKNOWN_SAT;
                }
                fun.prop(sig, t)
            }
            Stl::Not(expr) => {
                if !sig.available(t) {
                    return UNKNOWN_SAT;
                }
                !expr.sat(sig, t)
            }
            Stl::And(left, right) => {
                if !sig.available(t) {
                    return UNKNOWN_SAT;
                }
                left.sat(sig, t) && right.sat(sig, t)
            }
            Stl::Implies { antecedent, consequent } => {
                if !sig.available(t) {
                    return UNKNOWN_SAT;
                }
                !antecedent.sat(sig, t) || consequent.sat(sig, t)
            }
            Stl::Globally { expr, begin, end } => {
                if !(sig.available(t + begin) && sig.available(t + end)) {
                    return UNKNOWN_SAT;
                }
                let mut t2 = t + begin;
                while t2 <= t + end {
                    if !expr.sat(sig, t2) {
                        return false;
                    }
                    t2 += 1;
                }
                true
            }
            Stl::PastGlobally { expr, begin, end } => {
                if !(sig.available(t - begin) && sig.available(t - end)) {
                    return UNKNOWN_SAT;
                }
                let mut t2 = t - begin;
                while t2 <= t - end {
                    if !expr.sat(sig, t2) {
                        return false;
                    }
                    t2 += 1;
                }
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigfun::DistanceToGround;

    fn signal_with_heights(downs: &[f64]) -> Signal {
        let mut sig = Signal::new(&["pos_down_m"]);
        for d in downs {
            sig.append(vec![*d]);
        }
        sig
    }

    #[test]
    fn atom_unknown_before_any_frame_is_optimistic() {
        let expr = Stl::atom(DistanceToGround::new(1.0, true));
        let sig = Signal::new(&["pos_down_m"]);
        assert!(expr.sat(&sig, 5));
        assert_eq!(expr.robustness(&sig, 5), 0.0);
    }

    #[test]
    fn not_flips_satisfaction() {
        let expr = Stl::not(Stl::atom(DistanceToGround::new(1.0, true)));
        let sig = signal_with_heights(&[-0.05]); // near ground: base prop false
        assert!(expr.sat(&sig, 1));
    }

    #[test]
    fn and_is_conjunction_of_both_sides() {
        let left = Stl::atom(DistanceToGround::new(1.0, true));
        let right = Stl::atom(DistanceToGround::new(1.0, true));
        let expr = Stl::and(left, right);
        let sig = signal_with_heights(&[-5.0]); // well above ground
        assert!(expr.sat(&sig, 1));
    }

    #[test]
    fn implies_true_when_antecedent_false() {
        let antecedent = Stl::not(Stl::atom(DistanceToGround::new(1.0, true)));
        let consequent = Stl::atom(DistanceToGround::new(1.0, true));
        let expr = Stl::implies(antecedent, consequent);
        // antecedent false (not(prop)=false since prop true), so implies holds
        let sig = signal_with_heights(&[-5.0]);
        assert!(expr.sat(&sig, 1));
    }

    #[test]
    fn globally_unknown_when_window_not_fully_available() {
        let expr = Stl::globally(Stl::atom(DistanceToGround::new(1.0, true)), 0, 3);
        let sig = signal_with_heights(&[-5.0]); // only tick 1 available, window needs up to t+3
        assert!(expr.sat(&sig, 1)); // optimistic UNKNOWN_SAT
    }

    #[test]
    fn globally_false_if_any_tick_in_window_violates() {
        let expr = Stl::globally(Stl::atom(DistanceToGround::new(1.0, true)), 0, 2);
        let sig = signal_with_heights(&[-5.0, -5.0, -0.05]); // ticks 1,2,3; tick 3 violates
        assert!(!expr.sat(&sig, 1));
    }

    #[test]
    fn globally_true_if_every_tick_in_window_satisfies() {
        let expr = Stl::globally(Stl::atom(DistanceToGround::new(1.0, true)), 0, 2);
        let sig = signal_with_heights(&[-5.0, -5.0, -5.0]);
        assert!(expr.sat(&sig, 1));
    }

    #[test]
    fn past_globally_checks_window_behind_t() {
        let expr = Stl::past_globally(Stl::atom(DistanceToGround::new(1.0, true)), 2, 0);
        let sig = signal_with_heights(&[-5.0, -5.0, -0.05]); // ticks 1,2,3
        // at t=3, window is [t-2, t-0] = [1, 3], tick 3 violates
        assert!(!expr.sat(&sig, 3));
    }
}
