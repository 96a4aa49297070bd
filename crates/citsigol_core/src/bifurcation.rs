//! Parameter sweeps producing `(parameter, attractor points)` pairs for a
//! bifurcation diagram.
//!
//! Every parameter value is computed independently from the same settings.

use crate::convergence::{detect_cycle, ConvergenceSettings};
use crate::fixed_points::fixed_points;
use crate::maps::{AnyMap, LogisticMap, MapKind};
use crate::sequence::generate;
use crate::traits::Point;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Sweep settings for the trajectory diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BifurcationConfig {
    /// Point-set every trajectory starts from.
    pub initial_values: Vec<f64>,
    /// Point-sets discarded at the start of each trajectory (the initial one included).
    pub steps_to_skip: usize,
    /// Points kept per parameter value.
    pub n_points: usize,
    /// Points outside these bounds are not kept.
    pub x_bounds: (f64, f64),
    pub parameter_bounds: (f64, f64),
    /// Number of parameter values, spread evenly over `parameter_bounds`.
    pub resolution: usize,
    /// Map applications allowed per parameter value.
    pub max_steps: usize,
    /// Largest point-set a trajectory may reach before it is cut short.
    pub max_branches: usize,
}

impl Default for BifurcationConfig {
    fn default() -> Self {
        Self {
            initial_values: vec![0.5],
            steps_to_skip: 100,
            n_points: 100,
            x_bounds: (0.0, 1.0),
            parameter_bounds: (0.0, 4.0),
            resolution: 1000,
            max_steps: 100_000,
            max_branches: 4096,
        }
    }
}

impl BifurcationConfig {
    /// Defaults suited to each map family. Both branches of the citsigol map are
    /// followed, so its trajectories are kept short.
    pub fn for_map(kind: MapKind) -> Self {
        match kind {
            MapKind::Logistic => Self::default(),
            MapKind::Citsigol => Self {
                steps_to_skip: 0,
                n_points: 1000,
                max_steps: 12,
                ..Self::default()
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_values.is_empty() {
            bail!("initial_values must contain at least one value.");
        }
        if self.n_points == 0 {
            bail!("n_points must be greater than zero.");
        }
        if self.resolution == 0 {
            bail!("resolution must be greater than zero.");
        }
        if self.max_branches == 0 {
            bail!("max_branches must be greater than zero.");
        }
        check_bounds("x_bounds", self.x_bounds)?;
        check_bounds("parameter_bounds", self.parameter_bounds)?;
        Ok(())
    }

    pub fn parameter_values(&self) -> Vec<f64> {
        linspace(self.parameter_bounds, self.resolution)
    }
}

/// A partially specified [`BifurcationConfig`]. Fields left out keep the
/// defaults of the map family the sweep runs on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BifurcationOverrides {
    pub initial_values: Option<Vec<f64>>,
    pub steps_to_skip: Option<usize>,
    pub n_points: Option<usize>,
    pub x_bounds: Option<(f64, f64)>,
    pub parameter_bounds: Option<(f64, f64)>,
    pub resolution: Option<usize>,
    pub max_steps: Option<usize>,
    pub max_branches: Option<usize>,
}

impl BifurcationOverrides {
    /// `BifurcationConfig::for_map(kind)` with every given field replaced.
    pub fn resolve(self, kind: MapKind) -> BifurcationConfig {
        let base = BifurcationConfig::for_map(kind);
        BifurcationConfig {
            initial_values: self.initial_values.unwrap_or(base.initial_values),
            steps_to_skip: self.steps_to_skip.unwrap_or(base.steps_to_skip),
            n_points: self.n_points.unwrap_or(base.n_points),
            x_bounds: self.x_bounds.unwrap_or(base.x_bounds),
            parameter_bounds: self.parameter_bounds.unwrap_or(base.parameter_bounds),
            resolution: self.resolution.unwrap_or(base.resolution),
            max_steps: self.max_steps.unwrap_or(base.max_steps),
            max_branches: self.max_branches.unwrap_or(base.max_branches),
        }
    }
}

fn check_bounds(name: &str, (lo, hi): (f64, f64)) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() {
        bail!("{} must be finite, got ({}, {}).", name, lo, hi);
    }
    if lo > hi {
        bail!("{} are inverted: ({}, {}).", name, lo, hi);
    }
    Ok(())
}

/// `count` evenly spaced values from `lo` to `hi` inclusive.
pub fn linspace((lo, hi): (f64, f64), count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// Attractor points found for one parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractorSlice {
    pub parameter: f64,
    pub points: Vec<Point>,
}

/// Iterates `kind` with both branches kept for every parameter value of `config`.
pub fn sweep_trajectories(kind: MapKind, config: &BifurcationConfig) -> Result<Vec<AttractorSlice>> {
    config.validate()?;
    config
        .parameter_values()
        .into_iter()
        .map(|r| {
            let map = kind.instantiate(r).with_context(|| failed_at(kind, r))?;
            let points = trajectory_points(&map, config).with_context(|| failed_at(kind, r))?;
            debug!(%kind, r, points = points.len(), "trajectory sweep");
            Ok(AttractorSlice { parameter: r, points })
        })
        .collect()
}

fn trajectory_points(map: &AnyMap, config: &BifurcationConfig) -> Result<Vec<Point>> {
    let (lo, hi) = config.x_bounds;
    let mut points = Vec::with_capacity(config.n_points);
    let sequence = generate(map, &config.initial_values, Some(config.max_steps), None);
    for (step, item) in sequence.enumerate() {
        let set = item?;
        if set.len() > config.max_branches {
            warn!(
                step,
                branches = set.len(),
                max_branches = config.max_branches,
                "trajectory exceeded branch limit"
            );
            break;
        }
        if step < config.steps_to_skip {
            continue;
        }
        for x in set.into_iter().filter(|x| (lo..=hi).contains(x)) {
            points.push(x);
            if points.len() == config.n_points {
                return Ok(points);
            }
        }
    }
    Ok(points)
}

/// Runs the convergence detector on the logistic map for every parameter value.
/// Parameters without a detected cycle contribute whatever the detector returned
/// (nothing, or the raw history when `return_unconverged` is set).
pub fn sweep_cycles(
    parameters: &[f64],
    x0: Point,
    settings: &ConvergenceSettings,
) -> Result<Vec<AttractorSlice>> {
    parameters
        .iter()
        .map(|&r| {
            let map = LogisticMap::new(r).with_context(|| failed_at(MapKind::Logistic, r))?;
            let outcome =
                detect_cycle(&map, x0, settings).with_context(|| failed_at(MapKind::Logistic, r))?;
            debug!(r, period = ?outcome.period(), "cycle sweep");
            Ok(AttractorSlice {
                parameter: r,
                points: outcome.into_points(),
            })
        })
        .collect()
}

/// Solves for the stable period-`period` cycle at every parameter value.
pub fn sweep_fixed_points(parameters: &[f64], period: usize) -> Result<Vec<AttractorSlice>> {
    parameters
        .iter()
        .map(|&r| {
            let points = fixed_points(r, period).with_context(|| failed_at(MapKind::Logistic, r))?;
            debug!(r, period, found = points.len(), "fixed point sweep");
            Ok(AttractorSlice { parameter: r, points })
        })
        .collect()
}

fn failed_at(kind: MapKind, r: f64) -> String {
    format!("{} sweep failed at {} = {}", kind, kind.parameter_name(), r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use approx::assert_relative_eq;

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err:#}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    fn narrow(kind: MapKind, bounds: (f64, f64), resolution: usize) -> BifurcationConfig {
        BifurcationConfig {
            parameter_bounds: bounds,
            resolution,
            ..BifurcationConfig::for_map(kind)
        }
    }

    #[test]
    fn logistic_defaults_match_family_settings() {
        let config = BifurcationConfig::for_map(MapKind::Logistic);
        assert_eq!(config.initial_values, vec![0.5]);
        assert_eq!(config.steps_to_skip, 100);
        assert_eq!(config.n_points, 100);
        assert_eq!(config.x_bounds, (0.0, 1.0));
        assert_eq!(config.parameter_bounds, (0.0, 4.0));
        assert_eq!(config.resolution, 1000);
        assert_eq!(config.max_steps, 100_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: BifurcationConfig =
            serde_json::from_str(r#"{"resolution": 5, "parameter_bounds": [3.0, 4.0]}"#).unwrap();
        assert_eq!(config.resolution, 5);
        assert_eq!(config.parameter_bounds, (3.0, 4.0));
        assert_eq!(config.n_points, 100);
    }

    #[test]
    fn partial_citsigol_config_keeps_citsigol_defaults() {
        let overrides: BifurcationOverrides =
            serde_json::from_str(r#"{"resolution": 3, "parameter_bounds": [3.0, 4.0]}"#).unwrap();
        let config = overrides.resolve(MapKind::Citsigol);
        assert_eq!(
            config,
            BifurcationConfig {
                resolution: 3,
                parameter_bounds: (3.0, 4.0),
                ..BifurcationConfig::for_map(MapKind::Citsigol)
            }
        );
        let slices = sweep_trajectories(MapKind::Citsigol, &config).unwrap();
        assert_eq!(slices.len(), 3);
        assert!(slices.iter().all(|s| !s.points.is_empty()));
    }

    #[test]
    fn overrides_reject_unknown_fields() {
        let result = serde_json::from_str::<BifurcationOverrides>(r#"{"resolutoin": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let mut config = BifurcationConfig::default();
        config.resolution = 0;
        assert_err_contains(config.validate(), "resolution");

        let mut config = BifurcationConfig::default();
        config.parameter_bounds = (4.0, 1.0);
        assert_err_contains(config.validate(), "inverted");

        let mut config = BifurcationConfig::default();
        config.initial_values.clear();
        assert_err_contains(config.validate(), "initial_values");

        let mut config = BifurcationConfig::default();
        config.x_bounds = (0.0, f64::INFINITY);
        assert_err_contains(config.validate(), "x_bounds must be finite");
    }

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace((0.0, 4.0), 5), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(linspace((3.0, 4.0), 1), vec![3.0]);
        assert!(linspace((0.0, 1.0), 0).is_empty());
    }

    #[test]
    fn logistic_trajectories_settle_on_attractors() {
        let config = BifurcationConfig {
            n_points: 10,
            steps_to_skip: 500,
            max_steps: 1000,
            ..narrow(MapKind::Logistic, (2.0, 3.2), 2)
        };
        let slices = sweep_trajectories(MapKind::Logistic, &config).unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].parameter, 2.0);
        assert_eq!(slices[0].points.len(), 10);
        assert!(slices[0].points.iter().all(|x| (x - 0.5).abs() < 1e-9));
        let two_cycle = &slices[1].points;
        assert_relative_eq!(two_cycle[0], two_cycle[2], epsilon = 1e-9);
        assert!((two_cycle[0] - two_cycle[1]).abs() > 0.2);
    }

    #[test]
    fn citsigol_trajectories_stop_at_domain_exit() {
        let config = BifurcationConfig {
            initial_values: vec![0.2],
            n_points: 50,
            max_steps: 10,
            ..narrow(MapKind::Citsigol, (1.0, 4.0), 2)
        };
        let slices = sweep_trajectories(MapKind::Citsigol, &config).unwrap();
        // r = 1: both pre-images of 0.2 lie beyond r/4, so the walk ends after one step.
        assert_eq!(slices[0].points.len(), 3);
        // r = 4: every point keeps two pre-images and the set doubles each step.
        assert_eq!(slices[1].points.len(), 50);
    }

    #[test]
    fn branch_limit_cuts_trajectory_short() {
        let config = BifurcationConfig {
            initial_values: vec![0.2],
            max_branches: 4,
            max_steps: 20,
            ..narrow(MapKind::Citsigol, (4.0, 4.0), 1)
        };
        let slices = sweep_trajectories(MapKind::Citsigol, &config).unwrap();
        assert_eq!(slices[0].points.len(), 1 + 2 + 4);
    }

    #[test]
    fn cycle_sweep_reports_period_per_parameter() {
        let settings = ConvergenceSettings {
            max_period: 16,
            tolerance: 1e-9,
            max_steps: 3000,
            skip_steps: 1000,
            return_unconverged: false,
        };
        let slices = sweep_cycles(&[2.5, 3.2, 3.5], 0.5, &settings).unwrap();
        let periods: Vec<usize> = slices.iter().map(|s| s.points.len()).collect();
        assert_eq!(periods, vec![1, 2, 4]);
    }

    #[test]
    fn fixed_point_sweep_collects_stable_cycles() {
        let slices = sweep_fixed_points(&[2.5, 3.2], 2).unwrap();
        assert_eq!(slices[0].points.len(), 1);
        assert_eq!(slices[1].points.len(), 2);
        assert_relative_eq!(slices[1].parameter, 3.2);
    }

    #[test]
    fn sweep_errors_name_the_parameter() {
        let result = sweep_fixed_points(&[3.0], 0);
        let err = result.as_ref().expect_err("period 0 is invalid");
        assert_eq!(err.downcast_ref::<MapError>(), Some(&MapError::InvalidPeriod(0)));
        assert_err_contains(result, "logistic sweep failed at r = 3");
    }
}
