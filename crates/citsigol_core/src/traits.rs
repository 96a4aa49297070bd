use crate::error::MapResult;
use crate::maps::BranchSpec;

/// One coordinate of a map's phase space.
pub type Point = f64;

/// All live branches of a trajectory at one iteration step.
/// Order is meaningful: branch `i` at step `n` feeds the branches it spawns at `n + 1`.
pub type PointSet = Vec<Point>;

/// One period of an orbit, oldest point first.
pub type Cycle = Vec<Point>;

/// Represents a parametrized one-dimensional map, possibly multivalued.
pub trait DynamicalMap {
    /// Returns the control parameter the map was built with.
    fn parameter(&self) -> f64;

    /// Evaluates the map on every point of `points`.
    /// points: current point-set
    /// branch: which pre-image(s) to keep, ignored by single-valued maps
    ///
    /// An empty result means every point left the map's domain.
    fn evaluate(&self, points: &[Point], branch: &BranchSpec) -> MapResult<PointSet>;
}

/// A single-valued map that can be iterated one point at a time.
pub trait IteratedMap {
    fn step(&self, x: Point) -> Point;

    /// Derivative of the map at `x`.
    fn derivative(&self, x: Point) -> Point;

    /// Forward orbit `[x0, f(x0), ..., f^{len-1}(x0)]`.
    fn orbit(&self, x0: Point, len: usize) -> Vec<Point> {
        let mut orbit = Vec::with_capacity(len);
        let mut x = x0;
        for _ in 0..len {
            orbit.push(x);
            x = self.step(x);
        }
        orbit
    }

    /// Applies the map `steps` times.
    fn advance(&self, x0: Point, steps: usize) -> Point {
        (0..steps).fold(x0, |x, _| self.step(x))
    }
}
