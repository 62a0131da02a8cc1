//! The stats overlay: timing gate, ring and GPU buffers behind one handle.
//!
//! Frame loop contract:
//! - call `begin_frame()` / `end_frame()` once per rendered frame, in order;
//! - call `render()` or `render_at()` any number of times; it always shows the
//!   latest committed ring state.

use nalgebra::{Matrix4, Vector3};

use crate::clock::Clock;
use crate::config::StatsConfig;
use crate::error::Result;
use crate::geometry::{GraphLayout, StaticGeometry, VERTEX_LAYOUT};
use crate::pipeline::{BufferKind, BufferUsage, GraphicsPipeline};
use crate::ring::{RingGraph, RingUpdate};
use crate::timing::{Sample, TimingGate};

pub const STATS_VERTEX_SHADER: &str = "\
uniform mat4 projectionMat;
uniform mat4 modelViewMat;
attribute vec3 position;
attribute vec3 color;
varying vec4 vColor;

void main() {
  vColor = vec4(color, 1.0);
  gl_Position = projectionMat * modelViewMat * vec4(position, 1.0);
}
";

pub const STATS_FRAGMENT_SHADER: &str = "\
precision mediump float;
uniform vec4 tint;
varying vec4 vColor;

void main() {
  gl_FragColor = vColor * tint;
}
";

const INDEX_SIZE_BYTES: usize = core::mem::size_of::<u16>();

/// Near/far planes used by [`StatsOverlay::render_at`].
const ORTHO_NEAR: f32 = 0.1;
const ORTHO_FAR: f32 = 1024.0;

pub struct StatsOverlay<P: GraphicsPipeline, C: Clock> {
    pipeline: P,
    clock: C,
    config: StatsConfig,

    program: P::Program,
    vertex_buffer: P::Buffer,
    index_buffer: P::Buffer,
    bar_index_count: usize,
    background_index_offset: usize,
    background_index_count: usize,

    ring: RingGraph,
    timing: TimingGate,
    last_sample: Option<Sample>,
}

impl<P: GraphicsPipeline, C: Clock> StatsOverlay<P, C> {
    /// Compile the program and upload the initial graph.
    pub fn new(mut pipeline: P, clock: C, config: StatsConfig) -> Result<Self> {
        config.validate()?;

        let layout = GraphLayout::new(config.capacity, config.cap_max);
        let geometry = StaticGeometry::build(&config, &layout);

        let program = pipeline.compile_and_link(
            STATS_VERTEX_SHADER,
            STATS_FRAGMENT_SHADER,
            VERTEX_LAYOUT.attributes,
        )?;

        let vertex_buffer = pipeline.create_buffer(BufferKind::Vertex)?;
        pipeline.upload_vertices(&vertex_buffer, &geometry.vertices, BufferUsage::Dynamic);
        let index_buffer = pipeline.create_buffer(BufferKind::Index)?;
        pipeline.upload_indices(&index_buffer, &geometry.indices);

        let ring = RingGraph::new(layout, config.color_policy, &geometry);
        let timing = TimingGate::new(config.min_report_interval_ms, clock.now_millis());

        log::debug!(
            "stats overlay ready: {} slots, cap {}, {} ms interval, {:?}",
            config.capacity,
            config.cap_max,
            config.min_report_interval_ms,
            config.color_policy
        );

        Ok(Self {
            pipeline,
            clock,
            program,
            vertex_buffer,
            index_buffer,
            bar_index_count: geometry.bar_index_count,
            background_index_offset: geometry.background_index_offset,
            background_index_count: geometry.background_index_count,
            ring,
            timing,
            last_sample: None,
            config,
        })
    }

    pub fn begin_frame(&mut self) {
        let now = self.clock.now_millis();
        self.timing.begin_frame(now);
    }

    /// Count the frame; returns the sample if this call flushed one into the graph.
    pub fn end_frame(&mut self) -> Option<Sample> {
        let now = self.clock.now_millis();
        let sample = self.timing.end_frame(now)?;
        self.push_sample(sample.fps);
        self.last_sample = Some(sample);
        Some(sample)
    }

    /// Write `value` straight into the graph, bypassing the timing gate.
    pub fn push_sample(&mut self, value: f64) -> RingUpdate {
        let update = self.ring.push(value);
        for range in update.ranges() {
            self.pipeline.upload_partial(
                &self.vertex_buffer,
                range.offset_bytes(),
                self.ring.floats(range),
            );
        }
        update
    }

    /// Draw the panel with caller-supplied transforms (column-major).
    pub fn render(&mut self, projection: &[f32; 16], model_view: &[f32; 16]) {
        let p = &mut self.pipeline;
        p.use_program(&self.program);
        p.set_uniform_matrix4(&self.program, "projectionMat", projection);
        p.set_uniform_matrix4(&self.program, "modelViewMat", model_view);
        p.set_uniform_vec4(&self.program, "tint", &self.config.tint);
        p.bind_geometry(&self.vertex_buffer, &self.index_buffer, &VERTEX_LAYOUT);

        p.draw_indexed_triangles(
            self.background_index_count,
            self.background_index_offset * INDEX_SIZE_BYTES,
        );
        p.draw_indexed_triangles(self.bar_index_count, 0);
    }

    /// Draw the panel in a pixel rectangle, `(x, y)` measured from the
    /// top-left of the canvas.
    pub fn render_at(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let (projection, model_view) =
            screen_transforms(self.pipeline.canvas_size(), x, y, width, height);
        self.render(&projection, &model_view);
    }

    /// Last reported rate, or 0 before the first flush.
    pub fn fps(&self) -> f64 {
        self.last_sample.map_or(0.0, |s| s.fps)
    }

    pub fn last_sample(&self) -> Option<Sample> {
        self.last_sample
    }

    /// Duration of the most recent `begin_frame`/`end_frame` pair.
    pub fn frame_time_ms(&self) -> f64 {
        self.timing.last_frame_ms()
    }

    pub fn write_index(&self) -> usize {
        self.ring.write_index()
    }

    pub fn ring(&self) -> &RingGraph {
        &self.ring
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut P {
        &mut self.pipeline
    }

    pub fn vertex_buffer(&self) -> &P::Buffer {
        &self.vertex_buffer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

fn to_array(m: &Matrix4<f32>) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(m.as_slice());
    out
}

/// Orthographic projection over the canvas and a model-view that maps the
/// unit panel onto the requested pixel rectangle.
///
/// A canvas that has not been laid out yet reports 0x0; each dimension is
/// clamped to 1 px so the projection stays invertible.
pub fn screen_transforms(
    canvas: (f32, f32),
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> ([f32; 16], [f32; 16]) {
    let canvas_width = canvas.0.max(1.0);
    let canvas_height = canvas.1.max(1.0);
    let projection =
        Matrix4::new_orthographic(0.0, canvas_width, 0.0, canvas_height, ORTHO_NEAR, ORTHO_FAR);
    let model_view = Matrix4::new_translation(&Vector3::new(x, canvas_height - height - y, -1.0))
        * Matrix4::new_nonuniform_scaling(&Vector3::new(width, height, 1.0))
        * Matrix4::new_translation(&Vector3::new(0.5, 0.5, 0.0));
    (to_array(&projection), to_array(&model_view))
}
