//! Browser bindings for `citsigol_core`.
//!
//! Map handles live in [`maps`]; whole-diagram sweeps live in [`sweep`].
pub mod maps;
pub mod sweep;

pub use maps::{fixed_points, periodic_orbits, WasmMap};
pub use sweep::{bifurcation_points, converged_diagram, cycle_diagram};
