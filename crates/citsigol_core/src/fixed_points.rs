//! Exact periodic orbits of the logistic map.
//!
//! Period-`n` points are the roots of `g(x) = x - f^n(x)`, where `f^n` is the
//! `n`-fold composition of `r x (1 - x)`, a polynomial of degree `2^n`. Unlike
//! plain iteration, this finds every orbit regardless of basins, so stable
//! cycles can be drawn for any parameter value.
//!
//! Monomial coefficients of `f^n` grow like `r^(2^n)`, so the companion matrix
//! only gives trustworthy roots for small, well-scaled residuals. The main
//! search therefore brackets sign changes of `g` evaluated by iterating the
//! map, and the algebraic roots are merged in when the residual is small
//! enough to recover roots where `g` touches zero without crossing it.

use crate::error::{MapError, MapResult};
use crate::maps::LogisticMap;
use crate::polynomial::Polynomial;
use crate::traits::{Cycle, IteratedMap, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use tracing::debug;

/// Two orbit points closer than this are treated as the same point.
pub const CYCLE_REPETITION_ATOL: f64 = 1e-6;

/// Largest supported period. The scan grid grows like `4^period`.
pub const MAX_FIXED_POINT_PERIOD: usize = 8;

/// Fewest scan intervals used for any period.
const MIN_SCAN_SAMPLES: usize = 1 << 14;

/// Companion-matrix roots are only used when every residual coefficient is
/// at most this large in magnitude.
const ALGEBRAIC_COEFF_LIMIT: f64 = 1e8;

/// Largest residual degree handed to the eigenvalue solver.
const ALGEBRAIC_MAX_DEGREE: usize = 16;

/// Roots with a larger imaginary part are complex.
const IMAGINARY_ATOL: f64 = 1e-6;

/// Slack around [0, 1] for roots sitting on the interval ends.
const DOMAIN_ATOL: f64 = 1e-9;

/// An algebraic root is kept only if `|g(x)|` is this small when evaluated by iteration.
const RESIDUAL_ATOL: f64 = 1e-9;

/// Roots closer than this are the same root.
const ROOT_MERGE_ATOL: f64 = 1e-9;

/// A distinct periodic orbit and the derivative of its return map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicOrbit {
    /// Points of one minimal period, starting at the smallest root found on the orbit.
    pub points: Cycle,
    /// `d/dx f^L` at `points[0]`, where `L = points.len()`: the product of
    /// `f'` over the orbit.
    pub multiplier: f64,
    pub stable: bool,
}

/// The compositions `[f^0, f^1, ..., f^period]` of the logistic map.
pub fn logistic_iterates(r: f64, period: usize) -> Vec<Polynomial> {
    let mut iterates = Vec::with_capacity(period + 1);
    iterates.push(Polynomial::identity());
    for k in 1..=period {
        let next = iterates[k - 1].logistic_step(r);
        iterates.push(next);
    }
    iterates
}

fn check_request(r: f64, period: usize) -> MapResult<LogisticMap> {
    if period == 0 {
        return Err(MapError::InvalidPeriod(period));
    }
    if period > MAX_FIXED_POINT_PERIOD {
        return Err(MapError::PeriodTooLarge {
            period,
            max: MAX_FIXED_POINT_PERIOD,
        });
    }
    LogisticMap::new(r)
}

/// Every real root of `x - f^period(x)` in [0, 1], ascending.
///
/// Roots closer together than the scan grid near `x` can be missed when they
/// straddle no grid point, which only happens right at a saddle-node.
pub fn period_points(r: f64, period: usize) -> MapResult<Vec<Point>> {
    let map = check_request(r, period)?;
    let residual = |x: Point| x - map.advance(x, period);

    let mut roots = scan_roots(&residual, period);
    let scanned = roots.len();
    let algebraic = algebraic_roots(r, period, &residual);
    let found_algebraically = algebraic.len();
    roots.extend(algebraic);
    roots.sort_by(|a, b| a.total_cmp(b));
    roots.dedup_by(|later, kept| (*later - *kept).abs() <= ROOT_MERGE_ATOL);

    debug!(
        r,
        period,
        scanned,
        algebraic = found_algebraically,
        real_roots = roots.len(),
        "solved period equation"
    );
    Ok(roots)
}

/// Brackets sign changes of `g` on a grid uniform in `theta`, with
/// `x = sin^2(theta)`, which packs samples toward both ends of [0, 1] where
/// period points crowd together.
fn scan_roots<G: Fn(Point) -> f64>(g: &G, period: usize) -> Vec<Point> {
    let samples = 4usize.pow(period as u32 + 1).max(MIN_SCAN_SAMPLES);
    let at = |k: usize| {
        let theta = FRAC_PI_2 * k as f64 / samples as f64;
        theta.sin().powi(2)
    };

    let mut roots = Vec::new();
    let mut lo = at(0);
    let mut g_lo = g(lo);
    if g_lo == 0.0 {
        roots.push(lo);
    }
    for k in 1..=samples {
        let hi = at(k);
        let g_hi = g(hi);
        if g_hi == 0.0 {
            roots.push(hi);
        } else if g_lo * g_hi < 0.0 {
            roots.push(bisect(g, lo, hi, g_lo));
        }
        lo = hi;
        g_lo = g_hi;
    }
    roots
}

/// Halves `[lo, hi]` until no double lies strictly between its ends.
fn bisect<G: Fn(Point) -> f64>(g: &G, mut lo: Point, mut hi: Point, g_lo: f64) -> Point {
    let lo_negative = g_lo < 0.0;
    loop {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            return mid;
        }
        let g_mid = g(mid);
        if g_mid == 0.0 {
            return mid;
        }
        if (g_mid < 0.0) == lo_negative {
            lo = mid;
        } else {
            hi = mid;
        }
    }
}

/// Real roots of the residual polynomial in [0, 1], when it is small and well
/// scaled enough for the companion matrix. Each is confirmed by iteration.
fn algebraic_roots<G: Fn(Point) -> f64>(r: f64, period: usize, g: &G) -> Vec<Point> {
    if 1usize << period > ALGEBRAIC_MAX_DEGREE {
        return Vec::new();
    }
    let iterates = logistic_iterates(r, period);
    let residual = &Polynomial::identity() - &iterates[period];
    if !residual.is_finite()
        || residual
            .coeffs()
            .iter()
            .any(|c| c.abs() > ALGEBRAIC_COEFF_LIMIT)
    {
        return Vec::new();
    }
    residual
        .roots()
        .into_iter()
        .filter(|z| z.im.abs() <= IMAGINARY_ATOL)
        .map(|z| z.re)
        .filter(|x| (-DOMAIN_ATOL..=1.0 + DOMAIN_ATOL).contains(x))
        .map(|x| x.clamp(0.0, 1.0))
        .filter(|&x| g(x).abs() <= RESIDUAL_ATOL)
        .collect()
}

/// Every distinct orbit of minimal period dividing `period` inside [0, 1],
/// in ascending order of the first root found on each.
pub fn periodic_orbits(r: f64, period: usize) -> MapResult<Vec<PeriodicOrbit>> {
    let map = check_request(r, period)?;
    let mut orbits: Vec<PeriodicOrbit> = Vec::new();
    for root in period_points(r, period)? {
        let seen = orbits.iter().any(|orbit| {
            orbit
                .points
                .iter()
                .any(|&p| (p - root).abs() <= CYCLE_REPETITION_ATOL)
        });
        if seen {
            continue;
        }
        let points = minimal_cycle(&map, root, period);
        let multiplier = points.iter().map(|&x| map.derivative(x)).product::<f64>();
        orbits.push(PeriodicOrbit {
            stable: multiplier.abs() <= 1.0,
            points,
            multiplier,
        });
    }
    Ok(orbits)
}

/// The stable period-`period` cycle of the logistic map, or an empty cycle if
/// none is stable. When several are stable the one with the smallest root wins.
pub fn fixed_points(r: f64, period: usize) -> MapResult<Cycle> {
    Ok(periodic_orbits(r, period)?
        .into_iter()
        .find(|orbit| orbit.stable)
        .map(|orbit| orbit.points)
        .unwrap_or_default())
}

/// Forward orbit of `start`, cut at its first return to `start`.
fn minimal_cycle<M: IteratedMap>(map: &M, start: Point, period: usize) -> Cycle {
    let mut orbit = map.orbit(start, period);
    if let Some(len) =
        (1..orbit.len()).find(|&k| (orbit[k] - orbit[0]).abs() <= CYCLE_REPETITION_ATOL)
    {
        orbit.truncate(len);
    }
    orbit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convergence::{detect_cycle, ConvergenceSettings};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn assert_err_contains<T: std::fmt::Debug>(result: MapResult<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn two_cycle_at_three_point_two() {
        let map = LogisticMap::new(3.2).unwrap();
        let cycle = fixed_points(3.2, 2).unwrap();
        assert_eq!(cycle.len(), 2);
        assert_relative_eq!(cycle[0], 0.513_044_509_5, epsilon = 1e-8);
        assert_relative_eq!(cycle[1], 0.799_455_490_5, epsilon = 1e-8);
        assert_relative_eq!(map.advance(cycle[0], 2), cycle[0], epsilon = 1e-9);
    }

    #[test]
    fn stable_fixed_point_below_first_doubling() {
        let cycle = fixed_points(2.5, 1).unwrap();
        assert_eq!(cycle.len(), 1);
        assert_relative_eq!(cycle[0], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn period_two_request_collapses_to_fixed_point() {
        let cycle = fixed_points(2.5, 2).unwrap();
        assert_eq!(cycle.len(), 1);
        assert_relative_eq!(cycle[0], 0.6, epsilon = 1e-9);
    }

    #[test]
    fn four_cycle_round_trips_with_minimal_period() {
        let r = 3.5;
        let map = LogisticMap::new(r).unwrap();
        let cycle = fixed_points(r, 4).unwrap();
        assert_eq!(cycle.len(), 4);
        assert!((map.advance(cycle[0], 4) - cycle[0]).abs() <= CYCLE_REPETITION_ATOL);
        for k in 1..4 {
            assert!((map.advance(cycle[0], k) - cycle[0]).abs() > CYCLE_REPETITION_ATOL);
        }
    }

    #[test]
    fn chaotic_parameter_has_no_stable_fixed_point() {
        assert!(fixed_points(3.8, 1).unwrap().is_empty());
    }

    #[test]
    fn zero_parameter_collapses_onto_origin() {
        assert_eq!(fixed_points(0.0, 1).unwrap(), vec![0.0]);
    }

    #[test]
    fn periodic_orbits_lists_unstable_orbits_too() {
        let orbits = periodic_orbits(3.2, 2).unwrap();
        let lengths: Vec<usize> = orbits.iter().map(|o| o.points.len()).collect();
        assert_eq!(lengths, vec![1, 2, 1]);
        assert_eq!(
            orbits.iter().map(|o| o.stable).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert_relative_eq!(orbits[0].points[0], 0.0);
        assert_relative_eq!(orbits[0].multiplier, 3.2, epsilon = 1e-12);
        assert_relative_eq!(orbits[1].multiplier, 0.16, epsilon = 1e-8);
        assert_relative_eq!(orbits[2].points[0], 0.6875, epsilon = 1e-10);
    }

    fn assert_matches_iteration(r: f64, period: usize) {
        let map = LogisticMap::new(r).unwrap();
        let settings = ConvergenceSettings {
            max_period: 16,
            tolerance: 1e-10,
            max_steps: 60_000,
            skip_steps: 50_000,
            return_unconverged: false,
        };
        let iterated = detect_cycle(&map, 0.5, &settings).unwrap().into_points();
        assert_eq!(iterated.len(), period, "iteration at r = {r}");

        let solved = fixed_points(r, period).unwrap();
        assert_eq!(solved.len(), period, "solver at r = {r}");
        for x in &solved {
            assert!(
                iterated.iter().any(|y| (x - y).abs() <= CYCLE_REPETITION_ATOL),
                "solved point {x} is not on the iterated cycle {iterated:?}"
            );
        }
    }

    #[test]
    fn three_cycle_in_period_three_window() {
        assert_matches_iteration(3.835, 3);
    }

    #[test]
    fn five_cycle_matches_iteration() {
        assert_matches_iteration(3.74, 5);
    }

    #[test]
    fn six_cycle_matches_iteration() {
        assert_matches_iteration(3.63, 6);
    }

    #[test]
    fn eight_cycle_matches_iteration() {
        assert_matches_iteration(3.55, 8);
    }

    #[test]
    fn period_points_are_sorted_and_complete() {
        let points = period_points(3.2, 2).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], 0.0);
        assert_relative_eq!(points[1], 0.513_044_509_5, epsilon = 1e-8);
        assert_relative_eq!(points[2], 0.6875, epsilon = 1e-12);
        assert_relative_eq!(points[3], 0.799_455_490_5, epsilon = 1e-8);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn full_logistic_map_has_every_period_point(period in 1usize..=MAX_FIXED_POINT_PERIOD) {
            let map = LogisticMap::new(4.0).unwrap();
            let points = period_points(4.0, period).unwrap();
            prop_assert_eq!(points.len(), 1 << period);
            for x in points {
                prop_assert!((map.advance(x, period) - x).abs() <= 1e-6);
            }
        }
    }

    #[test]
    fn iterates_double_in_degree() {
        let iterates = logistic_iterates(3.0, 4);
        let degrees: Vec<usize> = iterates.iter().map(|p| p.degree()).collect();
        assert_eq!(degrees, vec![1, 2, 4, 8, 16]);
    }

    #[test]
    fn rejects_invalid_requests() {
        assert_err_contains(fixed_points(3.0, 0), "at least 1");
        assert_err_contains(fixed_points(3.0, 9), "supported maximum");
        assert_err_contains(fixed_points(f64::NAN, 2), "must be finite");
    }
}
