//! Built-in aggregators
//!
//! Inputs are `annotations[clause] = [matched intervals]` and
//! `weights[clause]`. A missing weight counts as `1.0`.

use crate::interval::Interval;

use super::errors::{AnnotationError, AnnotationResult};

/// Parameters shared by all aggregators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationContext {
    /// Adjustment magnitude for the `*_alpha` functions
    pub alpha: f64,
}

impl Default for AnnotationContext {
    fn default() -> Self {
        Self { alpha: 0.05 }
    }
}

const CIVIL_FLOOR: f64 = 0.51;
const CLEAR_FLOOR: f64 = 0.75;
const CRIMINAL_FLOOR: f64 = 0.90;

fn weight(weights: &[f64], i: usize) -> AnnotationResult<f64> {
    let w = weights.get(i).copied().unwrap_or(1.0);
    if !w.is_finite() {
        return Err(AnnotationError::NonFiniteWeight { index: i, value: w });
    }
    Ok(w)
}

/// Weighted sums over every matched interval, plus the match count
struct Totals {
    lower: f64,
    upper: f64,
    count: usize,
    max_upper: Option<f64>,
}

impl Totals {
    fn collect(annotations: &[Vec<Interval>], weights: &[f64]) -> AnnotationResult<Self> {
        let mut totals = Totals {
            lower: 0.0,
            upper: 0.0,
            count: 0,
            max_upper: None,
        };
        for (i, clause) in annotations.iter().enumerate() {
            let w = weight(weights, i)?;
            for interval in clause {
                totals.lower += w * interval.lower();
                totals.upper += w * interval.upper();
                totals.count += 1;
                totals.max_upper = Some(
                    totals
                        .max_upper
                        .map_or(interval.upper(), |m| m.max(interval.upper())),
                );
            }
        }
        Ok(totals)
    }

    fn mean(&self) -> (f64, f64) {
        let n = self.count.max(1) as f64;
        (self.lower / n, self.upper / n)
    }
}

/// Per-clause weighted sums `(Σ w·lower, Σ w·upper)`
fn clause_sums(annotations: &[Vec<Interval>], weights: &[f64]) -> AnnotationResult<Vec<(f64, f64)>> {
    annotations
        .iter()
        .enumerate()
        .map(|(i, clause)| {
            let w = weight(weights, i)?;
            Ok(clause.iter().fold((0.0, 0.0), |(l, u), iv| {
                (l + w * iv.lower(), u + w * iv.upper())
            }))
        })
        .collect()
}

fn weighted_mean(annotations: &[Vec<Interval>], weights: &[f64]) -> AnnotationResult<Option<(f64, f64)>> {
    let totals = Totals::collect(annotations, weights)?;
    if totals.count == 0 {
        return Ok(None);
    }
    Ok(Some(totals.mean()))
}

fn check_alpha(ctx: &AnnotationContext) -> AnnotationResult<f64> {
    if !ctx.alpha.is_finite() {
        return Err(AnnotationError::NonFiniteAlpha(ctx.alpha));
    }
    Ok(ctx.alpha)
}

/// Weighted mean of lower and upper bounds over all matches
pub fn average(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    _ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    Ok(match weighted_mean(annotations, weights)? {
        Some((l, u)) => Interval::closed(l, u),
        None => Interval::vacuous(),
    })
}

/// Weighted mean lower bound; upper is the largest matched upper bound
pub fn average_lower(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    _ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    let totals = Totals::collect(annotations, weights)?;
    let (lower, _) = totals.mean();
    Ok(Interval::closed(lower, totals.max_upper.unwrap_or(1.0)))
}

/// Largest per-clause weighted sum, independently for each bound
pub fn maximum(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    _ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    let sums = clause_sums(annotations, weights)?;
    if sums.is_empty() {
        return Ok(Interval::vacuous());
    }
    let lower = sums.iter().map(|s| s.0).fold(f64::NEG_INFINITY, f64::max);
    let upper = sums.iter().map(|s| s.1).fold(f64::NEG_INFINITY, f64::max);
    Ok(Interval::closed(lower, upper))
}

/// Smallest per-clause weighted sum, independently for each bound
pub fn minimum(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    _ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    let sums = clause_sums(annotations, weights)?;
    if sums.is_empty() {
        return Ok(Interval::vacuous());
    }
    let lower = sums.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
    let upper = sums.iter().map(|s| s.1).fold(f64::INFINITY, f64::min);
    Ok(Interval::closed(lower, upper))
}

/// Weighted mean with the lower bound raised to `floor`.
///
/// When the mean's upper bound is itself below `floor` the result is
/// `[floor, floor]`, so the lower bound is never under the floor.
fn burden(annotations: &[Vec<Interval>], weights: &[f64], floor: f64) -> AnnotationResult<Interval> {
    let (lower, upper) = weighted_mean(annotations, weights)?.unwrap_or((0.0, 1.0));
    let base = Interval::closed(lower, upper);
    let lower = base.lower().max(floor);
    let upper = base.upper().max(lower);
    Ok(Interval::closed(lower, upper))
}

/// Preponderance of the evidence: lower bound at least 0.51
pub fn legal_burden_civil_051(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    _ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    burden(annotations, weights, CIVIL_FLOOR)
}

/// Clear and convincing evidence: lower bound at least 0.75
pub fn legal_burden_clear_075(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    _ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    burden(annotations, weights, CLEAR_FLOOR)
}

/// Beyond a reasonable doubt: lower bound at least 0.90
pub fn legal_burden_criminal_090(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    _ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    burden(annotations, weights, CRIMINAL_FLOOR)
}

/// Lower bound from the weakest clause, upper bound from the weighted mean
pub fn legal_conservative_min(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    _ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    let sums = clause_sums(annotations, weights)?;
    let Some((_, upper)) = weighted_mean(annotations, weights)? else {
        return Ok(Interval::vacuous());
    };
    let lower = sums.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
    Ok(Interval::closed(lower, upper))
}

/// Authority-weighted mean; weights carry court authority
pub fn precedent_weighted(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    average(annotations, weights, ctx)
}

/// Mean with the upper bound pulled down by `alpha` of the span
pub fn textualism_alpha(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    let alpha = check_alpha(ctx)?;
    let base = average(annotations, weights, ctx)?;
    Ok(Interval::closed(
        base.lower(),
        base.upper() - alpha * base.span(),
    ))
}

/// Mean with the lower bound pushed up by `alpha` of the span
pub fn purposivism_alpha(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    let alpha = check_alpha(ctx)?;
    let base = average(annotations, weights, ctx)?;
    Ok(Interval::closed(
        base.lower() + alpha * base.span(),
        base.upper(),
    ))
}

/// Mean with the lower bound lowered by `alpha`
pub fn lenity_alpha(
    annotations: &[Vec<Interval>],
    weights: &[f64],
    ctx: &AnnotationContext,
) -> AnnotationResult<Interval> {
    let alpha = check_alpha(ctx)?;
    let base = average(annotations, weights, ctx)?;
    Ok(Interval::closed((base.lower() - alpha).max(0.0), base.upper()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn iv(l: f64, u: f64) -> Interval {
        Interval::closed(l, u)
    }

    fn ctx() -> AnnotationContext {
        AnnotationContext::default()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn three_clauses() -> Vec<Vec<Interval>> {
        vec![vec![iv(0.2, 0.7)], vec![iv(0.4, 0.9)], vec![iv(0.6, 0.8)]]
    }

    #[test]
    fn test_average() {
        let r = average(&three_clauses(), &[1.0, 1.0, 1.0], &ctx()).unwrap();
        assert!(close(r.lower(), 0.4));
        assert!(close(r.upper(), 0.8));
    }

    #[test]
    fn test_average_no_matches() {
        let r = average(&[vec![], vec![]], &[1.0, 1.0], &ctx()).unwrap();
        assert!(r.is_vacuous());
    }

    #[test]
    fn test_average_counts_all_matches() {
        let ann = vec![vec![iv(0.2, 0.4), iv(0.4, 0.6)], vec![iv(0.9, 1.0)]];
        let r = average(&ann, &[1.0, 1.0], &ctx()).unwrap();
        assert!(close(r.lower(), 0.5));
        assert!(close(r.upper(), 2.0 / 3.0));
    }

    #[test]
    fn test_average_lower() {
        let r = average_lower(&three_clauses(), &[1.0, 1.0, 1.0], &ctx()).unwrap();
        assert!(close(r.lower(), 0.4));
        assert!(close(r.upper(), 0.9));

        let empty = average_lower(&[vec![]], &[1.0], &ctx()).unwrap();
        assert!(empty.is_vacuous());
    }

    #[test]
    fn test_maximum_minimum_per_clause() {
        let ann = vec![vec![iv(0.1, 0.2), iv(0.1, 0.2)], vec![iv(0.3, 0.5)]];
        let max = maximum(&ann, &[1.0, 1.0], &ctx()).unwrap();
        assert!(close(max.lower(), 0.3));
        assert!(close(max.upper(), 0.5));

        let min = minimum(&ann, &[1.0, 1.0], &ctx()).unwrap();
        assert!(close(min.lower(), 0.2));
        assert!(close(min.upper(), 0.4));
    }

    #[test]
    fn test_weighted_sums_clamped() {
        let ann = vec![vec![iv(0.6, 0.9)]];
        let r = maximum(&ann, &[2.0], &ctx()).unwrap();
        assert_eq!(r.bounds(), (1.0, 1.0));
    }

    #[test]
    fn test_burden_floors() {
        let weak = vec![vec![iv(0.1, 0.6)]];
        assert!(close(legal_burden_civil_051(&weak, &[1.0], &ctx()).unwrap().lower(), 0.51));
        assert!(close(legal_burden_clear_075(&weak, &[1.0], &ctx()).unwrap().lower(), 0.75));
        let criminal = legal_burden_criminal_090(&weak, &[1.0], &ctx()).unwrap();
        assert!(close(criminal.lower(), 0.90));
        assert!(criminal.upper() >= criminal.lower());

        let strong = vec![vec![iv(0.8, 1.0)]];
        let civil = legal_burden_civil_051(&strong, &[1.0], &ctx()).unwrap();
        assert_eq!(civil.bounds(), (0.8, 1.0));
    }

    #[test]
    fn test_civil_burden_never_below_floor() {
        let mut rng = StdRng::seed_from_u64(51);
        for _ in 0..500 {
            let clauses = rng.gen_range(0..4);
            let mut ann = Vec::new();
            let mut weights = Vec::new();
            for _ in 0..clauses {
                let n = rng.gen_range(0..4);
                let clause = (0..n)
                    .map(|_| {
                        let a: f64 = rng.gen_range(0.0..=1.0);
                        let b: f64 = rng.gen_range(0.0..=1.0);
                        iv(a.min(b), a.max(b))
                    })
                    .collect();
                ann.push(clause);
                weights.push(rng.gen_range(-1.0..3.0));
            }
            let r = legal_burden_civil_051(&ann, &weights, &ctx()).unwrap();
            assert!(r.lower() >= 0.51, "lower {} below floor", r.lower());
        }
    }

    #[test]
    fn test_conservative_min() {
        let r = legal_conservative_min(&three_clauses(), &[1.0, 1.0, 1.0], &ctx()).unwrap();
        assert!(close(r.lower(), 0.2));
        assert!(close(r.upper(), 0.8));
    }

    #[test]
    fn test_precedent_weighted_matches_average() {
        let ann = three_clauses();
        let w = [0.5, 1.0, 0.8];
        assert_eq!(
            precedent_weighted(&ann, &w, &ctx()).unwrap(),
            average(&ann, &w, &ctx()).unwrap()
        );
    }

    #[test]
    fn test_alpha_adjustments() {
        let ann = vec![vec![iv(0.2, 0.8)]];
        let t = textualism_alpha(&ann, &[1.0], &ctx()).unwrap();
        assert!(close(t.upper(), 0.77));
        let p = purposivism_alpha(&ann, &[1.0], &ctx()).unwrap();
        assert!(close(p.lower(), 0.23));
        let l = lenity_alpha(&ann, &[1.0], &ctx()).unwrap();
        assert!(close(l.lower(), 0.15));

        let wide = AnnotationContext { alpha: 0.5 };
        let l = lenity_alpha(&ann, &[1.0], &wide).unwrap();
        assert_eq!(l.lower(), 0.0);
    }

    #[test]
    fn test_non_finite_inputs() {
        let err = average(&three_clauses(), &[1.0, f64::NAN, 1.0], &ctx()).unwrap_err();
        assert_eq!(err.code(), "LEX_ANNOTATION_WEIGHT");

        let bad = AnnotationContext { alpha: f64::INFINITY };
        let err = lenity_alpha(&three_clauses(), &[1.0; 3], &bad).unwrap_err();
        assert_eq!(err.code(), "LEX_ANNOTATION_ALPHA");
    }
}
