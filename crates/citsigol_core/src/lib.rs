//! The `citsigol_core` crate is the numerical engine behind the citsigol explorer.
//! It iterates the logistic map and its two-branch inverse (the citsigol map),
//! detects periodic behavior, and produces the data behind bifurcation diagrams.
//!
//! Key components:
//! - **Traits**: `DynamicalMap` (point-set evaluation with branch selection), `IteratedMap` (scalar forward maps).
//! - **Maps**: `LogisticMap`, `CitsigolMap`, and the `Branch`/`BranchSpec` selectors.
//! - **Compass**: branch policies driving a citsigol walk (`BothBranches`, `Seeker`, `Quest`).
//! - **Sequence**: lazy point-set streams with a step bound.
//! - **Convergence**: cycle detection over a rolling `History`.
//! - **Fixed points**: exact periodic orbits from the roots of the composed polynomial.
//! - **Bifurcation**: parameter sweeps over all of the above.
pub mod bifurcation;
pub mod compass;
pub mod convergence;
pub mod error;
pub mod fixed_points;
pub mod history;
pub mod maps;
pub mod polynomial;
pub mod sequence;
pub mod traits;

pub use error::{MapError, MapResult};
