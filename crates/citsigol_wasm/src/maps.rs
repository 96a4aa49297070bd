//! Map handles: point-set evaluation, sequences and cycle detection.

use citsigol_core::compass::{Compass, CompassConfig};
use citsigol_core::convergence::{detect_cycle, ConvergenceSettings};
use citsigol_core::fixed_points as core_fixed_points;
use citsigol_core::maps::{AnyMap, Branch, BranchSpec, MapKind};
use citsigol_core::sequence::generate;
use citsigol_core::traits::DynamicalMap;
use citsigol_core::MapResult;
use js_sys::Float64Array;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

/// Reads branch tags sent from JS: none selects both branches, a single tag is
/// broadcast to every point, anything else is one tag per point.
pub(crate) fn branch_spec(tags: &[i32]) -> MapResult<BranchSpec> {
    match tags {
        [] => Ok(BranchSpec::both()),
        [tag] => Branch::from_tag(*tag).map(BranchSpec::Uniform),
        _ => BranchSpec::from_tags(tags),
    }
}

pub(crate) fn parse_kind(kind: &str) -> Result<MapKind, JsValue> {
    kind.parse::<MapKind>()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn optional<T: serde::de::DeserializeOwned + Default>(
    value: JsValue,
    what: &str,
) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

#[wasm_bindgen]
pub struct WasmMap {
    kind: MapKind,
    map: AnyMap,
}

#[wasm_bindgen]
impl WasmMap {
    /// `kind` is `"logistic"` or `"citsigol"`.
    #[wasm_bindgen(constructor)]
    pub fn new(kind: &str, r: f64) -> Result<WasmMap, JsValue> {
        console_error_panic_hook::set_once();

        let kind = parse_kind(kind)?;
        let map = kind
            .instantiate(r)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmMap { kind, map })
    }

    pub fn kind(&self) -> String {
        self.kind.to_string()
    }

    pub fn parameter(&self) -> f64 {
        self.map.parameter()
    }

    /// Applies the map once. Branch tags are ignored by the logistic map.
    pub fn evaluate(&self, points: Vec<f64>, branches: Vec<i32>) -> Result<Float64Array, JsValue> {
        let spec = branch_spec(&branches).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let out = self
            .map
            .evaluate(&points, &spec)
            .map_err(|e| JsValue::from_str(&format!("Evaluation failed: {}", e)))?;
        Ok(Float64Array::from(out.as_slice()))
    }

    /// Point-sets of a sequence, optionally trimmed to the last `keep` sets
    /// (`0` keeps them all). `compass_val` is a compass config or `undefined`.
    pub fn sequence(
        &self,
        initial: Vec<f64>,
        max_steps: u32,
        keep: u32,
        compass_val: JsValue,
    ) -> Result<JsValue, JsValue> {
        let config: CompassConfig = optional(compass_val, "compass")?;
        let compass = config
            .build()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let compass: &dyn Compass = compass.as_ref();
        let sequence = generate(&self.map, &initial, Some(max_steps as usize), Some(compass));
        let sets = if keep == 0 {
            sequence.collect::<MapResult<Vec<_>>>()
        } else {
            sequence.last_n(keep as usize)
        }
        .map_err(|e| JsValue::from_str(&format!("Sequence failed: {}", e)))?;

        to_value(&sets).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Runs cycle detection from `x0`. Only the logistic map is iterated this way.
    pub fn converge(&self, x0: f64, settings_val: JsValue) -> Result<JsValue, JsValue> {
        let AnyMap::Logistic(map) = &self.map else {
            return Err(JsValue::from_str(
                "Cycle detection requires the logistic map.",
            ));
        };
        let settings: ConvergenceSettings = optional(settings_val, "convergence settings")?;
        let outcome = detect_cycle(map, x0, &settings)
            .map_err(|e| JsValue::from_str(&format!("Cycle detection failed: {}", e)))?;

        to_value(&outcome).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

/// Stable period-`period` cycle of the logistic map at `r`; empty when none is stable.
#[wasm_bindgen]
pub fn fixed_points(r: f64, period: u32) -> Result<Float64Array, JsValue> {
    console_error_panic_hook::set_once();

    let cycle = core_fixed_points::fixed_points(r, period as usize)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(Float64Array::from(cycle.as_slice()))
}

/// Every orbit whose period divides `period`, stable or not.
#[wasm_bindgen]
pub fn periodic_orbits(r: f64, period: u32) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let orbits = core_fixed_points::periodic_orbits(r, period as usize)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_value(&orbits).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::branch_spec;
    use citsigol_core::maps::{Branch, BranchSpec};
    use citsigol_core::MapError;

    #[test]
    fn branch_spec_from_js_tags() {
        assert_eq!(branch_spec(&[]).unwrap(), BranchSpec::both());
        assert_eq!(
            branch_spec(&[-1]).unwrap(),
            BranchSpec::Uniform(Branch::Lower)
        );
        assert_eq!(
            branch_spec(&[1, 0]).unwrap(),
            BranchSpec::PerPoint(vec![Branch::Upper, Branch::Both])
        );
        assert_eq!(branch_spec(&[2]).unwrap_err(), MapError::InvalidBranch(2));
    }
}
