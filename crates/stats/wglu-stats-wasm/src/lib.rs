use std::sync::Once;

use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use web_sys::WebGl2RenderingContext;

use wglu_stats_core::{StatsConfig, StatsOverlay};

pub mod clock;
pub mod webgl;

pub use clock::PerformanceClock;
pub use webgl::WebGlPipeline;

static LOGGER: Once = Once::new();

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn matrix(name: &str, data: &[f32]) -> Result<[f32; 16], JsError> {
    <[f32; 16]>::try_from(data).map_err(|_| {
        JsError::new(&format!(
            "{name} must have 16 elements, got {}",
            data.len()
        ))
    })
}

/// Route `log` output to the browser console. Later calls are ignored.
/// `level` is one of "error", "warn", "info", "debug", "trace" (default "info").
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) {
    let level = level
        .as_deref()
        .and_then(|l| l.parse::<log::Level>().ok())
        .unwrap_or(log::Level::Info);
    LOGGER.call_once(|| wasm_logger::init(wasm_logger::Config::new(level)));
}

/// Frame-rate overlay drawn with WebGL2.
#[wasm_bindgen(js_name = WGLUStats)]
pub struct WgluStats {
    core: StatsOverlay<WebGlPipeline, PerformanceClock>,
}

#[wasm_bindgen(js_class = WGLUStats)]
impl WgluStats {
    /// Create an overlay on `gl`. Pass a partial config object or undefined/null for defaults.
    /// Example:
    ///   new WGLUStats(gl, { capacity: 100, cap_max: 120, min_report_interval_ms: 100 })
    #[wasm_bindgen(constructor)]
    pub fn new(gl: WebGl2RenderingContext, config: JsValue) -> Result<WgluStats, JsError> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let cfg: StatsConfig = if jsvalue_is_undefined_or_null(&config) {
            StatsConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        let core = StatsOverlay::new(WebGlPipeline::new(gl), PerformanceClock::new(), cfg)
            .map_err(|e| JsError::new(&format!("stats init error: {e}")))?;
        Ok(WgluStats { core })
    }

    /// Mark the start of a frame.
    #[wasm_bindgen(js_name = begin)]
    pub fn begin_frame(&mut self) {
        self.core.begin_frame();
    }

    /// Mark the end of a frame. Returns the new fps value when the graph advanced.
    #[wasm_bindgen(js_name = end)]
    pub fn end_frame(&mut self) -> Option<f64> {
        self.core.end_frame().map(|s| s.fps)
    }

    /// Feed a value directly into the graph, bypassing frame timing.
    #[wasm_bindgen(js_name = updateGraph)]
    pub fn push_sample(&mut self, value: f64) {
        self.core.push_sample(value);
    }

    /// Draw with column-major projection and model-view matrices (16 floats each).
    pub fn render(&mut self, projection: &[f32], model_view: &[f32]) -> Result<(), JsError> {
        let projection = matrix("projection", projection)?;
        let model_view = matrix("model_view", model_view)?;
        self.core.render(&projection, &model_view);
        Ok(())
    }

    /// Draw into a pixel rectangle measured from the canvas top-left.
    #[wasm_bindgen(js_name = renderOrtho)]
    pub fn render_at(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.core.render_at(x, y, width, height);
    }

    #[wasm_bindgen(getter)]
    pub fn fps(&self) -> f64 {
        self.core.fps()
    }

    #[wasm_bindgen(getter, js_name = frameTimeMs)]
    pub fn frame_time_ms(&self) -> f64 {
        self.core.frame_time_ms()
    }

    #[wasm_bindgen(getter, js_name = writeIndex)]
    pub fn write_index(&self) -> usize {
        self.core.write_index()
    }

    /// Most recent sample as `{ fps, timestamp_ms }`, or null before the first one.
    #[wasm_bindgen(js_name = lastSample)]
    pub fn last_sample(&self) -> Result<JsValue, JsError> {
        match self.core.last_sample() {
            Some(sample) => {
                swb::to_value(&sample).map_err(|e| JsError::new(&format!("sample error: {e}")))
            }
            None => Ok(JsValue::NULL),
        }
    }

    /// Active configuration as a plain object.
    pub fn config(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.core.config()).map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
