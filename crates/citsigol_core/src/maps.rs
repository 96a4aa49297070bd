//! The logistic map and its two-valued inverse, the citsigol map.

use crate::error::{MapError, MapResult};
use crate::traits::{DynamicalMap, IteratedMap, Point, PointSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which pre-image(s) of the citsigol map to keep.
/// Numerically encoded as -1 (lower), 0 (both), +1 (upper).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Lower,
    Upper,
    #[default]
    Both,
}

impl Branch {
    pub fn from_tag(tag: i32) -> MapResult<Self> {
        match tag {
            -1 => Ok(Branch::Lower),
            0 => Ok(Branch::Both),
            1 => Ok(Branch::Upper),
            other => Err(MapError::InvalidBranch(other)),
        }
    }

    pub fn tag(self) -> i32 {
        match self {
            Branch::Lower => -1,
            Branch::Both => 0,
            Branch::Upper => 1,
        }
    }

    /// Branch pointing in the direction of `delta`; zero (and NaN) picks the upper branch.
    pub fn toward(delta: f64) -> Self {
        if delta < 0.0 {
            Branch::Lower
        } else {
            Branch::Upper
        }
    }
}

impl TryFrom<i32> for Branch {
    type Error = MapError;

    fn try_from(tag: i32) -> MapResult<Self> {
        Branch::from_tag(tag)
    }
}

/// Branch selection for a whole point-set: one tag broadcast to every point,
/// or one tag per point.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchSpec {
    Uniform(Branch),
    PerPoint(Vec<Branch>),
}

impl BranchSpec {
    pub fn both() -> Self {
        BranchSpec::Uniform(Branch::Both)
    }

    /// Builds a spec from numeric tags, one per point.
    pub fn from_tags(tags: &[i32]) -> MapResult<Self> {
        let branches = tags
            .iter()
            .map(|&tag| Branch::from_tag(tag))
            .collect::<MapResult<Vec<_>>>()?;
        Ok(BranchSpec::PerPoint(branches))
    }

    fn check_len(&self, points: usize) -> MapResult<()> {
        match self {
            BranchSpec::PerPoint(branches) if branches.len() != points => {
                Err(MapError::InvalidInput(format!(
                    "expected {} branch tags, got {}",
                    points,
                    branches.len()
                )))
            }
            _ => Ok(()),
        }
    }

    fn at(&self, index: usize) -> Branch {
        match self {
            BranchSpec::Uniform(branch) => *branch,
            BranchSpec::PerPoint(branches) => branches[index],
        }
    }
}

impl Default for BranchSpec {
    fn default() -> Self {
        BranchSpec::both()
    }
}

impl From<Branch> for BranchSpec {
    fn from(branch: Branch) -> Self {
        BranchSpec::Uniform(branch)
    }
}

impl From<Vec<Branch>> for BranchSpec {
    fn from(branches: Vec<Branch>) -> Self {
        BranchSpec::PerPoint(branches)
    }
}

fn check_parameter(r: f64) -> MapResult<f64> {
    if r.is_finite() {
        Ok(r)
    } else {
        Err(MapError::InvalidParameter(r))
    }
}

/// `x -> r x (1 - x)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogisticMap {
    r: f64,
}

impl LogisticMap {
    pub fn new(r: f64) -> MapResult<Self> {
        Ok(Self {
            r: check_parameter(r)?,
        })
    }
}

impl IteratedMap for LogisticMap {
    fn step(&self, x: Point) -> Point {
        self.r * x * (1.0 - x)
    }

    fn derivative(&self, x: Point) -> Point {
        self.r * (1.0 - 2.0 * x)
    }
}

impl DynamicalMap for LogisticMap {
    fn parameter(&self) -> f64 {
        self.r
    }

    fn evaluate(&self, points: &[Point], _branch: &BranchSpec) -> MapResult<PointSet> {
        Ok(points.iter().map(|&x| self.step(x)).collect())
    }
}

/// The formal inverse of the logistic map.
/// Each point has two real pre-images when `1 - 4x/r >= 0` and none otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CitsigolMap {
    r: f64,
}

impl CitsigolMap {
    pub fn new(r: f64) -> MapResult<Self> {
        Ok(Self {
            r: check_parameter(r)?,
        })
    }

    /// Lower and upper pre-images of `x`, or `None` outside the domain.
    /// `r == 0` has no inverse and is always a domain exit.
    pub fn preimages(&self, x: Point) -> Option<(Point, Point)> {
        if self.r == 0.0 {
            return None;
        }
        let d_squared = 1.0 - 4.0 * x / self.r;
        // Negated comparison so NaN also exits the domain.
        if !(d_squared >= 0.0) {
            return None;
        }
        let distance = d_squared.sqrt();
        Some((0.5 * (1.0 - distance), 0.5 * (1.0 + distance)))
    }
}

impl DynamicalMap for CitsigolMap {
    fn parameter(&self) -> f64 {
        self.r
    }

    fn evaluate(&self, points: &[Point], branch: &BranchSpec) -> MapResult<PointSet> {
        branch.check_len(points.len())?;
        let mut out = Vec::with_capacity(points.len() * 2);
        for (idx, &x) in points.iter().enumerate() {
            let Some((lower, upper)) = self.preimages(x) else {
                continue;
            };
            match branch.at(idx) {
                Branch::Lower => out.push(lower),
                Branch::Upper => out.push(upper),
                Branch::Both => {
                    out.push(lower);
                    out.push(upper);
                }
            }
        }
        Ok(out)
    }
}

/// Names a family of maps indexed by the control parameter `r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    Logistic,
    Citsigol,
}

impl MapKind {
    pub fn instantiate(self, r: f64) -> MapResult<AnyMap> {
        match self {
            MapKind::Logistic => LogisticMap::new(r).map(AnyMap::Logistic),
            MapKind::Citsigol => CitsigolMap::new(r).map(AnyMap::Citsigol),
        }
    }

    pub fn parameter_name(self) -> &'static str {
        "r"
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKind::Logistic => write!(f, "logistic"),
            MapKind::Citsigol => write!(f, "citsigol"),
        }
    }
}

impl FromStr for MapKind {
    type Err = MapError;

    fn from_str(s: &str) -> MapResult<Self> {
        match s {
            "logistic" => Ok(MapKind::Logistic),
            "citsigol" => Ok(MapKind::Citsigol),
            other => Err(MapError::InvalidInput(format!("unknown map kind '{}'", other))),
        }
    }
}

/// A map instance of either family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnyMap {
    Logistic(LogisticMap),
    Citsigol(CitsigolMap),
}

impl DynamicalMap for AnyMap {
    fn parameter(&self) -> f64 {
        match self {
            AnyMap::Logistic(map) => map.parameter(),
            AnyMap::Citsigol(map) => map.parameter(),
        }
    }

    fn evaluate(&self, points: &[Point], branch: &BranchSpec) -> MapResult<PointSet> {
        match self {
            AnyMap::Logistic(map) => map.evaluate(points, branch),
            AnyMap::Citsigol(map) => map.evaluate(points, branch),
        }
    }
}
