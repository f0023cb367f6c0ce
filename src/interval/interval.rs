//! Closed probability intervals with clamp and contradiction-reset semantics

use std::fmt;

use serde::{Deserialize, Serialize};

/// A closed probability interval with a snapshot of its previous bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Interval {
    lower: f64,
    upper: f64,
    #[serde(rename = "static")]
    is_static: bool,
    prev_lower: f64,
    prev_upper: f64,
}

impl Interval {
    /// Builds a closed interval.
    ///
    /// `l > u` yields `[0, 1]`; otherwise both bounds are clamped into `[0, 1]`.
    /// NaN bounds are treated like an inverted pair.
    pub fn closed(lower: f64, upper: f64) -> Self {
        Self::closed_static(lower, upper, false)
    }

    /// Builds a closed interval with an explicit static flag.
    pub fn closed_static(lower: f64, upper: f64, is_static: bool) -> Self {
        let (l, u) = normalize(lower, upper);
        Self {
            lower: l,
            upper: u,
            is_static,
            prev_lower: l,
            prev_upper: u,
        }
    }

    /// The vacuous interval `[0, 1]` ("unknown").
    pub fn vacuous() -> Self {
        Self::closed(0.0, 1.0)
    }

    /// The fully-true interval `[1, 1]`.
    pub fn truth() -> Self {
        Self::closed(1.0, 1.0)
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn prev_lower(&self) -> f64 {
        self.prev_lower
    }

    pub fn prev_upper(&self) -> f64 {
        self.prev_upper
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
    }

    /// Width of the interval (`upper - lower`).
    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }

    /// Returns `(lower, upper)`.
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }

    /// True for `[0, 1]`.
    pub fn is_vacuous(&self) -> bool {
        self.lower == 0.0 && self.upper == 1.0
    }

    /// Replaces the current bounds, keeping the previous snapshot.
    pub fn set_lower_upper(&mut self, lower: f64, upper: f64) {
        let (l, u) = normalize(lower, upper);
        self.lower = l;
        self.upper = u;
    }

    /// Snapshots the current bounds into `prev_*` and resets to `[0, 1]`.
    pub fn reset(&mut self) {
        self.prev_lower = self.lower;
        self.prev_upper = self.upper;
        self.lower = 0.0;
        self.upper = 1.0;
    }

    /// True when the current bounds differ from the last snapshot.
    pub fn has_changed(&self) -> bool {
        self.lower != self.prev_lower || self.upper != self.prev_upper
    }

    /// Largest absolute bound movement relative to `other`.
    pub fn bound_delta(&self, other: &Interval) -> f64 {
        (self.lower - other.lower)
            .abs()
            .max((self.upper - other.upper).abs())
    }

    /// True when `self` lies entirely within `[lo, hi]`.
    pub fn within(&self, lo: f64, hi: f64) -> bool {
        self.lower >= lo && self.upper <= hi
    }

    /// True when the two intervals share no point.
    pub fn is_disjoint(&self, other: &Interval) -> bool {
        self.lower.max(other.lower) > self.upper.min(other.upper)
    }

    /// Interval meet.
    ///
    /// A contradiction (`max(lo) > min(hi)`) is absorbed as `[0, 1]`.
    /// The static flag is carried over from `self`.
    pub fn intersection(&self, other: &Interval) -> Interval {
        let nl = self.lower.max(other.lower);
        let nu = self.upper.min(other.upper);
        let mut out = if nl > nu {
            Interval::vacuous()
        } else {
            Interval::closed(nl, nu)
        };
        out.is_static = self.is_static;
        out
    }

    /// Bound-only equality (ignores the static flag and snapshot).
    pub fn same_bounds(&self, other: &Interval) -> bool {
        self.lower == other.lower && self.upper == other.upper
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::vacuous()
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.same_bounds(other) && self.is_static == other.is_static
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.lower, self.upper)
    }
}

fn normalize(lower: f64, upper: f64) -> (f64, f64) {
    if lower.is_nan() || upper.is_nan() || lower > upper {
        return (0.0, 1.0);
    }
    (lower.clamp(0.0, 1.0), upper.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_interval(rng: &mut StdRng) -> Interval {
        let a: f64 = rng.gen_range(0.0..=1.0);
        let b: f64 = rng.gen_range(0.0..=1.0);
        Interval::closed(a.min(b), a.max(b))
    }

    #[test]
    fn test_inverted_is_vacuous() {
        let i = Interval::closed(0.8, 0.2);
        assert_eq!(i.bounds(), (0.0, 1.0));
        assert!(i.is_vacuous());
    }

    #[test]
    fn test_clamped_into_unit_range() {
        let i = Interval::closed(-0.5, 1.5);
        assert_eq!(i.bounds(), (0.0, 1.0));

        let j = Interval::closed(0.3, 7.0);
        assert_eq!(j.bounds(), (0.3, 1.0));
    }

    #[test]
    fn test_nan_is_vacuous() {
        assert!(Interval::closed(f64::NAN, 0.5).is_vacuous());
    }

    #[test]
    fn test_intersection_narrows() {
        let a = Interval::closed(0.2, 0.8);
        let b = Interval::closed(0.5, 0.9);
        assert_eq!(a.intersection(&b).bounds(), (0.5, 0.8));
    }

    #[test]
    fn test_intersection_contradiction_resets() {
        let a = Interval::closed(0.0, 0.3);
        let b = Interval::closed(0.6, 1.0);
        assert!(a.is_disjoint(&b));
        assert!(a.intersection(&b).is_vacuous());
    }

    #[test]
    fn test_intersection_idempotent_and_commutative() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let a = random_interval(&mut rng);
            let b = random_interval(&mut rng);
            assert!(a.intersection(&a).same_bounds(&a));
            assert!(a.intersection(&b).same_bounds(&b.intersection(&a)));
        }
    }

    #[test]
    fn test_reset_snapshots_previous() {
        let mut i = Interval::closed(0.4, 0.6);
        assert!(!i.has_changed());

        i.reset();
        assert_eq!(i.bounds(), (0.0, 1.0));
        assert_eq!((i.prev_lower(), i.prev_upper()), (0.4, 0.6));
        assert!(i.has_changed());

        i.set_lower_upper(0.4, 0.6);
        assert!(!i.has_changed());
    }

    #[test]
    fn test_bound_delta() {
        let a = Interval::closed(0.2, 0.9);
        let b = Interval::closed(0.5, 1.0);
        assert!((a.bound_delta(&b) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        assert_eq!(Interval::closed(0.5, 1.0).to_string(), "[0.5,1]");
    }
}
