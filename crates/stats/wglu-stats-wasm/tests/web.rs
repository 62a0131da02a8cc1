#![cfg(target_arch = "wasm32")]

use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::WebGl2RenderingContext;
use wglu_stats_wasm::{abi_version, init_logging, WgluStats};

wasm_bindgen_test_configure!(run_in_browser);

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// WebGL2 context on a detached canvas, or None on runners without GPU support.
fn gl() -> Option<WebGl2RenderingContext> {
    let document = web_sys::window()?.document()?;
    let canvas = document
        .create_element("canvas")
        .ok()?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()?;
    canvas.set_width(640);
    canvas.set_height(480);
    canvas.get_context("webgl2").ok()??.dyn_into().ok()
}

fn config(value: serde_json::Value) -> JsValue {
    js_sys::JSON::parse(&value.to_string()).unwrap()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn logging_init_is_idempotent() {
    init_logging(Some("debug".into()));
    init_logging(None);
}

#[wasm_bindgen_test]
fn construct_with_defaults_and_render() {
    let Some(gl) = gl() else { return };
    let mut stats = WgluStats::new(gl.clone(), JsValue::UNDEFINED).unwrap();

    stats.begin_frame();
    stats.end_frame();
    stats.render(&IDENTITY, &IDENTITY).unwrap();
    stats.render_at(10.0, 10.0, 200.0, 100.0);
    assert_eq!(gl.get_error(), WebGl2RenderingContext::NO_ERROR);
    assert_eq!(stats.fps(), 0.0);
}

#[wasm_bindgen_test]
fn direct_updates_wrap_without_gl_errors() {
    let Some(gl) = gl() else { return };
    let mut stats = WgluStats::new(gl.clone(), config(json!({ "capacity": 4 }))).unwrap();
    for value in [10.0, 50.0, 90.0, 200.0] {
        stats.push_sample(value);
    }
    assert_eq!(stats.write_index(), 0);
    stats.render(&IDENTITY, &IDENTITY).unwrap();
    assert_eq!(gl.get_error(), WebGl2RenderingContext::NO_ERROR);
}

/// it should reject matrices that are not 4x4
#[wasm_bindgen_test]
fn render_rejects_short_matrix() {
    let Some(gl) = gl() else { return };
    let mut stats = WgluStats::new(gl, JsValue::NULL).unwrap();
    assert!(stats.render(&IDENTITY[..12], &IDENTITY).is_err());
}

/// it should error cleanly on an invalid config object
#[wasm_bindgen_test]
fn invalid_config_errors() {
    let Some(gl) = gl() else { return };
    assert!(WgluStats::new(gl.clone(), config(json!({ "capacity": 0 }))).is_err());
    assert!(WgluStats::new(gl, JsValue::from_str("not-a-config")).is_err());
}

#[wasm_bindgen_test]
fn last_sample_is_null_before_first_flush() {
    let Some(gl) = gl() else { return };
    let stats = WgluStats::new(gl, JsValue::NULL).unwrap();
    assert!(stats.last_sample().unwrap().is_null());
    let cfg = stats.config().unwrap();
    let capacity = js_sys::Reflect::get(&cfg, &JsValue::from_str("capacity")).unwrap();
    assert_eq!(capacity.as_f64(), Some(30.0));
}
