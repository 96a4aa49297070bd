//! Periodicity detection by iteration.
//!
//! After a warm-up, iterates are kept in a rolling window of at most
//! `max_period` values. The first iterate that lands within `tolerance`
//! (absolute) of a retained value closes a cycle: everything from that value to
//! the newest iterate is one period of the attractor.

use crate::error::{MapError, MapResult};
use crate::history::History;
use crate::traits::{Cycle, IteratedMap, Point};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceSettings {
    /// Longest period that can be detected; also the history capacity.
    pub max_period: usize,
    pub tolerance: f64,
    /// Total iteration budget, warm-up included.
    pub max_steps: usize,
    /// Warm-up iterations discarded before detection starts.
    pub skip_steps: usize,
    pub return_unconverged: bool,
}

impl Default for ConvergenceSettings {
    fn default() -> Self {
        Self {
            max_period: 64,
            tolerance: 1e-6,
            max_steps: 1000,
            skip_steps: 300,
            return_unconverged: false,
        }
    }
}

impl ConvergenceSettings {
    pub fn validate(&self) -> MapResult<()> {
        if self.max_period == 0 {
            return Err(MapError::InvalidPeriod(self.max_period));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MapError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "points", rename_all = "snake_case")]
pub enum ConvergenceOutcome {
    /// One period of the detected orbit, oldest first.
    Cycle(Cycle),
    /// The budget ran out; the retained history, oldest first.
    Unconverged(Vec<Point>),
    /// The budget ran out and no history was requested.
    NotConverged,
}

impl ConvergenceOutcome {
    pub fn points(&self) -> &[Point] {
        match self {
            ConvergenceOutcome::Cycle(points) | ConvergenceOutcome::Unconverged(points) => {
                points.as_slice()
            }
            ConvergenceOutcome::NotConverged => &[],
        }
    }

    pub fn into_points(self) -> Vec<Point> {
        match self {
            ConvergenceOutcome::Cycle(points) | ConvergenceOutcome::Unconverged(points) => points,
            ConvergenceOutcome::NotConverged => Vec::new(),
        }
    }

    pub fn period(&self) -> Option<usize> {
        match self {
            ConvergenceOutcome::Cycle(points) => Some(points.len()),
            _ => None,
        }
    }
}

/// Iterates `map` from `x0` until the orbit revisits a value in its recent history.
///
/// When several retained values match the newest iterate, the most recent one
/// wins, which yields the shortest period consistent with the tolerance.
pub fn detect_cycle<M: IteratedMap + ?Sized>(
    map: &M,
    x0: Point,
    settings: &ConvergenceSettings,
) -> MapResult<ConvergenceOutcome> {
    settings.validate()?;

    let budget = settings.max_steps.saturating_sub(settings.skip_steps);
    let mut x = map.advance(x0, settings.skip_steps);
    let mut history = History::with_capacity(budget.min(settings.max_period));
    history.push(x);

    for step in 0..budget {
        x = map.step(x);
        if !x.is_finite() {
            trace!(step, "orbit escaped to a non-finite value");
            break;
        }
        if let Some(index) = history.rfind_within(x, settings.tolerance) {
            let cycle = history.tail_from(index);
            trace!(step, period = cycle.len(), "cycle detected");
            return Ok(ConvergenceOutcome::Cycle(cycle));
        }
        history.push(x);
    }

    if settings.return_unconverged {
        Ok(ConvergenceOutcome::Unconverged(history.to_vec()))
    } else {
        Ok(ConvergenceOutcome::NotConverged)
    }
}
