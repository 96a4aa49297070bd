//! Lazy iteration of a map from an initial point-set.

use crate::compass::Compass;
use crate::error::MapResult;
use crate::maps::BranchSpec;
use crate::traits::{DynamicalMap, Point, PointSet};
use std::collections::VecDeque;
use std::iter::FusedIterator;

/// Pull-based stream of point-sets.
///
/// Yields the initial point-set first, then one point-set per step. The stream
/// ends when `max_steps` steps were taken or when a step leaves every branch
/// outside the map's domain; the empty point-set itself is not yielded.
/// Errors from the compass or the map are yielded once, after which the
/// stream is exhausted. Restarting means building a new `Sequence`.
pub struct Sequence<'a, M: ?Sized> {
    map: &'a M,
    compass: Option<&'a dyn Compass>,
    current: PointSet,
    step: usize,
    max_steps: Option<usize>,
    started: bool,
    finished: bool,
}

impl<'a, M: DynamicalMap + ?Sized> Sequence<'a, M> {
    /// map: map to iterate
    /// initial: point-set at step 0
    /// max_steps: number of map applications, `None` for unbounded
    /// compass: branch policy, `None` keeps both branches
    pub fn new(
        map: &'a M,
        initial: PointSet,
        max_steps: Option<usize>,
        compass: Option<&'a dyn Compass>,
    ) -> Self {
        Self {
            map,
            compass,
            current: initial,
            step: 0,
            max_steps,
            started: false,
            finished: false,
        }
    }

    /// Number of map applications performed so far.
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    /// Drains the sequence, keeping only the last `keep` point-sets.
    pub fn last_n(self, keep: usize) -> MapResult<Vec<PointSet>> {
        let mut window = VecDeque::with_capacity(keep);
        for item in self {
            let set = item?;
            if keep == 0 {
                continue;
            }
            if window.len() == keep {
                window.pop_front();
            }
            window.push_back(set);
        }
        Ok(window.into())
    }

    fn advance(&mut self) -> MapResult<Option<PointSet>> {
        if self.max_steps.is_some_and(|max| self.step >= max) {
            return Ok(None);
        }
        let spec = match self.compass {
            Some(compass) => BranchSpec::PerPoint(compass.choose(&self.current, self.step)?),
            None => BranchSpec::both(),
        };
        let next = self.map.evaluate(&self.current, &spec)?;
        if next.is_empty() {
            return Ok(None);
        }
        self.step += 1;
        self.current = next;
        Ok(Some(self.current.clone()))
    }
}

impl<M: DynamicalMap + ?Sized> Iterator for Sequence<'_, M> {
    type Item = MapResult<PointSet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(Ok(self.current.clone()));
        }
        match self.advance() {
            Ok(Some(set)) => Some(Ok(set)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<M: DynamicalMap + ?Sized> FusedIterator for Sequence<'_, M> {}

/// Starts a [`Sequence`] of `map` from `initial`.
pub fn generate<'a, M: DynamicalMap + ?Sized>(
    map: &'a M,
    initial: &[Point],
    max_steps: Option<usize>,
    compass: Option<&'a dyn Compass>,
) -> Sequence<'a, M> {
    Sequence::new(map, initial.to_vec(), max_steps, compass)
}

/// Flattens point-sets into `(step, x)` pairs, one per live branch.
pub fn step_scatter(sets: &[PointSet]) -> Vec<(usize, Point)> {
    sets.iter()
        .enumerate()
        .flat_map(|(step, set)| set.iter().map(move |&x| (step, x)))
        .collect()
}
