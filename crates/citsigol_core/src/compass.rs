//! Branch-selection policies for walking the citsigol map.
//!
//! A compass is asked once per step which pre-image each live point should
//! follow. It sees only the current point-set and the step index, so the same
//! compass always steers the same initial value along the same path.

use crate::error::{MapError, MapResult};
use crate::maps::Branch;
use crate::traits::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub trait Compass {
    /// Returns one branch per point in `points`.
    fn choose(&self, points: &[Point], step: usize) -> MapResult<Vec<Branch>>;
}

impl<F> Compass for F
where
    F: Fn(&[Point], usize) -> MapResult<Vec<Branch>>,
{
    fn choose(&self, points: &[Point], step: usize) -> MapResult<Vec<Branch>> {
        self(points, step)
    }
}

/// Keeps both pre-images at every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BothBranches;

impl Compass for BothBranches {
    fn choose(&self, points: &[Point], _step: usize) -> MapResult<Vec<Branch>> {
        Ok(vec![Branch::Both; points.len()])
    }
}

/// Steers every point toward `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seeker {
    pub target: f64,
}

impl Seeker {
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl Compass for Seeker {
    fn choose(&self, points: &[Point], _step: usize) -> MapResult<Vec<Branch>> {
        Ok(points
            .iter()
            .map(|&x| Branch::toward(self.target - x))
            .collect())
    }
}

#[derive(Clone)]
enum Directions {
    Script(Vec<Branch>),
    Function(Arc<dyn Fn(usize) -> Branch + Send + Sync>),
}

/// A fixed itinerary: the branch for step `n` is taken from a script or a
/// function of `n`, and every live point follows it.
#[derive(Clone)]
pub struct Quest {
    directions: Directions,
}

impl Quest {
    pub fn new(directions: Vec<Branch>) -> Self {
        Self {
            directions: Directions::Script(directions),
        }
    }

    pub fn from_tags(tags: &[i32]) -> MapResult<Self> {
        let directions = tags
            .iter()
            .map(|&tag| Branch::from_tag(tag))
            .collect::<MapResult<Vec<_>>>()?;
        Ok(Self::new(directions))
    }

    pub fn from_fn<F>(directions: F) -> Self
    where
        F: Fn(usize) -> Branch + Send + Sync + 'static,
    {
        Self {
            directions: Directions::Function(Arc::new(directions)),
        }
    }

    fn direction(&self, step: usize) -> MapResult<Branch> {
        match &self.directions {
            Directions::Script(script) => {
                script
                    .get(step)
                    .copied()
                    .ok_or(MapError::QuestExhausted {
                        step,
                        len: script.len(),
                    })
            }
            Directions::Function(f) => Ok(f(step)),
        }
    }
}

impl fmt::Debug for Quest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.directions {
            Directions::Script(script) => f.debug_tuple("Quest").field(script).finish(),
            Directions::Function(_) => f.write_str("Quest(<fn>)"),
        }
    }
}

impl Compass for Quest {
    fn choose(&self, points: &[Point], step: usize) -> MapResult<Vec<Branch>> {
        let branch = self.direction(step)?;
        Ok(vec![branch; points.len()])
    }
}

/// Serializable description of a built-in compass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompassConfig {
    Both,
    Seeker { target: f64 },
    Quest { directions: Vec<i32> },
}

impl CompassConfig {
    pub fn build(&self) -> MapResult<Box<dyn Compass>> {
        Ok(match self {
            CompassConfig::Both => Box::new(BothBranches),
            CompassConfig::Seeker { target } => Box::new(Seeker::new(*target)),
            CompassConfig::Quest { directions } => Box::new(Quest::from_tags(directions)?),
        })
    }
}

impl Default for CompassConfig {
    fn default() -> Self {
        CompassConfig::Both
    }
}
