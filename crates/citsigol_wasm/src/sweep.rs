//! Bifurcation diagram sweeps.

use crate::maps::parse_kind;
use citsigol_core::bifurcation::{
    linspace, sweep_cycles, sweep_fixed_points, sweep_trajectories, AttractorSlice,
    BifurcationOverrides,
};
use citsigol_core::convergence::ConvergenceSettings;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

fn sweep_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}

fn slices_to_value(slices: &[AttractorSlice]) -> Result<JsValue, JsValue> {
    to_value(slices).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Trajectory diagram of `kind`. Fields missing from `config_val` (or all of
/// them, when it is `undefined`) take the defaults of that map family.
#[wasm_bindgen]
pub fn bifurcation_points(kind: &str, config_val: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let kind = parse_kind(kind)?;
    let overrides: BifurcationOverrides = if config_val.is_undefined() || config_val.is_null() {
        BifurcationOverrides::default()
    } else {
        from_value(config_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid bifurcation config: {}", e)))?
    };
    let config = overrides.resolve(kind);
    let slices = sweep_trajectories(kind, &config).map_err(sweep_error)?;
    slices_to_value(&slices)
}

/// Stable period-`period` cycles of the logistic map over `resolution`
/// parameter values from `r_min` to `r_max`.
#[wasm_bindgen]
pub fn cycle_diagram(
    r_min: f64,
    r_max: f64,
    resolution: u32,
    period: u32,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let parameters = linspace((r_min, r_max), resolution as usize);
    let slices = sweep_fixed_points(&parameters, period as usize).map_err(sweep_error)?;
    slices_to_value(&slices)
}

/// Cycles found by iteration from `x0` over the same parameter grid as
/// [`cycle_diagram`].
#[wasm_bindgen]
pub fn converged_diagram(
    r_min: f64,
    r_max: f64,
    resolution: u32,
    x0: f64,
    settings_val: JsValue,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let settings = if settings_val.is_undefined() || settings_val.is_null() {
        ConvergenceSettings::default()
    } else {
        from_value(settings_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid convergence settings: {}", e)))?
    };
    let parameters = linspace((r_min, r_max), resolution as usize);
    let slices = sweep_cycles(&parameters, x0, &settings).map_err(sweep_error)?;
    slices_to_value(&slices)
}
