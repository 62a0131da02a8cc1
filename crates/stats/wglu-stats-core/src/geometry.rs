//! Screen-space layout, color mapping and static geometry for the graph.
//!
//! The panel lives in a unit square centred on the origin. Bars occupy the
//! band `x ∈ [-0.45, 0.45]`, `y ∈ [-0.45, 0.25]`; everything the pipeline
//! draws is interleaved `position.xyz, color.rgb` float vertices.

use crate::config::{ColorPolicy, StatsConfig};

pub const GRAPH_LEFT: f64 = -0.45;
pub const GRAPH_WIDTH: f64 = 0.9;
pub const GRAPH_BOTTOM: f64 = -0.45;
pub const GRAPH_HEIGHT: f64 = 0.7;

pub const PANEL_Z: f32 = 0.0;
pub const GRAPH_BACKGROUND_Z: f32 = 0.01;
pub const THRESHOLD_LINE_Z: f32 = 0.015;
pub const BAR_Z: f32 = 0.02;

pub const PANEL_COLOR: [f32; 3] = [0.0, 0.0, 0.125];
pub const GRAPH_BACKGROUND_COLOR: [f32; 3] = [0.0, 0.0, 0.4];
/// Color of bars that have never received a sample.
pub const EMPTY_BAR_COLOR: [f32; 3] = [0.0, 1.0, 1.0];
/// Color of the seam bar parked at slot 0 when the ring wraps.
pub const SEAM_COLOR: [f32; 3] = [0.2, 1.0, 0.2];

pub const FLOATS_PER_VERTEX: usize = 6;
pub const VERTEX_STRIDE_BYTES: usize = FLOATS_PER_VERTEX * core::mem::size_of::<f32>();
pub const VERTICES_PER_QUAD: usize = 4;
pub const INDICES_PER_QUAD: usize = 6;
pub const FLOATS_PER_QUAD: usize = VERTICES_PER_QUAD * FLOATS_PER_VERTEX;

/// One interleaved attribute inside a vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    /// Attribute slot bound before linking.
    pub location: u32,
    pub components: u32,
    pub offset_bytes: u32,
}

/// Interleaved vertex format shared by the shader and the buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride_bytes: u32,
    pub attributes: &'static [VertexAttribute],
}

pub const VERTEX_LAYOUT: VertexLayout = VertexLayout {
    stride_bytes: VERTEX_STRIDE_BYTES as u32,
    attributes: &[
        VertexAttribute {
            name: "position",
            location: 0,
            components: 3,
            offset_bytes: 0,
        },
        VertexAttribute {
            name: "color",
            location: 1,
            components: 3,
            offset_bytes: 12,
        },
    ],
};

/// Maps slot indices and sample values into panel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphLayout {
    capacity: usize,
    cap_max: f64,
}

impl GraphLayout {
    pub fn new(capacity: usize, cap_max: f64) -> Self {
        Self { capacity, cap_max }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cap_max(&self) -> f64 {
        self.cap_max
    }

    /// Left edge of slot `i`; `slot_x(i + 1)` is its right edge.
    #[inline]
    pub fn slot_x(&self, slot: usize) -> f32 {
        ((GRAPH_WIDTH / self.capacity as f64) * slot as f64 + GRAPH_LEFT) as f32
    }

    /// Sample value clamped into `[0, cap_max]`. NaN counts as zero.
    #[inline]
    pub fn clamp_value(&self, value: f64) -> f64 {
        if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, self.cap_max)
        }
    }

    /// Vertical position of a bar top for `value`.
    #[inline]
    pub fn value_y(&self, value: f64) -> f32 {
        (self.clamp_value(value) * (GRAPH_HEIGHT / self.cap_max) + GRAPH_BOTTOM) as f32
    }

    /// Baseline shared by every bar.
    #[inline]
    pub fn baseline_y(&self) -> f32 {
        self.value_y(0.0)
    }

    pub fn sample_color(&self, policy: ColorPolicy, value: f64) -> [f32; 3] {
        let v = self.clamp_value(value);
        let cap = self.cap_max;
        let rgb = match policy {
            ColorPolicy::ThresholdRamp => {
                let r = 1.0 - v / 60.0;
                let gb = if cap > 15.0 {
                    (v - 15.0) / (cap - 15.0)
                } else if v > 0.0 {
                    1.0
                } else {
                    0.0
                };
                [r, gb, gb]
            }
            ColorPolicy::LinearRamp => {
                let t = v / cap;
                [1.0 - t, t, 0.0]
            }
        };
        rgb.map(|c| c.clamp(0.0, 1.0) as f32)
    }
}

/// Axis-aligned quad in panel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub z: f32,
    pub color: [f32; 3],
}

impl Quad {
    /// Append the four vertices in top-left, top-right, bottom-left,
    /// bottom-right order.
    pub fn write_vertices(&self, out: &mut [f32]) {
        debug_assert_eq!(out.len(), FLOATS_PER_QUAD);
        let corners = [
            (self.left, self.top),
            (self.right, self.top),
            (self.left, self.bottom),
            (self.right, self.bottom),
        ];
        for (dst, (x, y)) in out.chunks_exact_mut(FLOATS_PER_VERTEX).zip(corners) {
            dst[0] = x;
            dst[1] = y;
            dst[2] = self.z;
            dst[3..6].copy_from_slice(&self.color);
        }
    }

    /// Read a quad back from vertices written by [`Quad::write_vertices`].
    pub fn read_vertices(src: &[f32]) -> Self {
        debug_assert_eq!(src.len(), FLOATS_PER_QUAD);
        let br = 3 * FLOATS_PER_VERTEX;
        Self {
            left: src[0],
            top: src[1],
            z: src[2],
            color: [src[3], src[4], src[5]],
            right: src[br],
            bottom: src[br + 1],
        }
    }
}

/// Index pattern for quad number `quad`, matching [`Quad::write_vertices`].
pub fn quad_indices(quad: usize) -> [u16; INDICES_PER_QUAD] {
    let idx = (quad * VERTICES_PER_QUAD) as u16;
    [idx, idx + 3, idx + 1, idx + 3, idx, idx + 2]
}

/// Vertex and index data uploaded once at construction.
///
/// Bars come first so that slot `i` starts at vertex `4 * i`; the background
/// quads follow.
#[derive(Clone, Debug)]
pub struct StaticGeometry {
    pub vertices: Vec<f32>,
    pub indices: Vec<u16>,
    pub bar_index_count: usize,
    pub background_index_offset: usize,
    pub background_index_count: usize,
}

impl StaticGeometry {
    pub fn build(cfg: &StatsConfig, layout: &GraphLayout) -> Self {
        let mut quads = Vec::with_capacity(cfg.capacity + 2 + cfg.threshold_lines.len());

        let baseline = layout.baseline_y();
        for slot in 0..cfg.capacity {
            quads.push(Quad {
                left: layout.slot_x(slot),
                right: layout.slot_x(slot + 1),
                top: baseline,
                bottom: baseline,
                z: BAR_Z,
                color: EMPTY_BAR_COLOR,
            });
        }

        quads.push(Quad {
            left: -0.5,
            right: 0.5,
            top: 0.5,
            bottom: -0.5,
            z: PANEL_Z,
            color: PANEL_COLOR,
        });
        quads.push(Quad {
            left: GRAPH_LEFT as f32,
            right: (GRAPH_LEFT + GRAPH_WIDTH) as f32,
            top: (GRAPH_BOTTOM + GRAPH_HEIGHT) as f32,
            bottom: GRAPH_BOTTOM as f32,
            z: GRAPH_BACKGROUND_Z,
            color: GRAPH_BACKGROUND_COLOR,
        });
        for line in &cfg.threshold_lines {
            quads.push(Quad {
                left: GRAPH_LEFT as f32,
                right: (GRAPH_LEFT + GRAPH_WIDTH) as f32,
                top: layout.value_y(line.value + line.thickness),
                bottom: layout.value_y(line.value),
                z: THRESHOLD_LINE_Z,
                color: line.color,
            });
        }

        let mut vertices = vec![0.0; quads.len() * FLOATS_PER_QUAD];
        for (quad, dst) in quads.iter().zip(vertices.chunks_exact_mut(FLOATS_PER_QUAD)) {
            quad.write_vertices(dst);
        }
        let indices: Vec<u16> = (0..quads.len()).flat_map(quad_indices).collect();

        let bar_index_count = cfg.capacity * INDICES_PER_QUAD;
        Self {
            background_index_offset: bar_index_count,
            background_index_count: indices.len() - bar_index_count,
            bar_index_count,
            vertices,
            indices,
        }
    }

    /// Floats covering the bar slots only.
    pub fn bar_vertices(&self) -> &[f32] {
        &self.vertices[..self.bar_index_count / INDICES_PER_QUAD * FLOATS_PER_QUAD]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn layout() -> GraphLayout {
        GraphLayout::new(30, 90.0)
    }

    #[test]
    fn slot_edges_span_graph_band() {
        let l = layout();
        assert_abs_diff_eq!(l.slot_x(0), -0.45, epsilon = 1e-6);
        assert_abs_diff_eq!(l.slot_x(30), 0.45, epsilon = 1e-6);
        assert_abs_diff_eq!(l.slot_x(15), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn value_maps_linearly_and_saturates() {
        let l = layout();
        assert_abs_diff_eq!(l.value_y(0.0), -0.45, epsilon = 1e-6);
        assert_abs_diff_eq!(l.value_y(45.0), -0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(l.value_y(90.0), 0.25, epsilon = 1e-6);
        assert_eq!(l.value_y(900.0), l.value_y(90.0));
        assert_eq!(l.value_y(-5.0), l.value_y(0.0));
        assert_eq!(l.value_y(f64::NAN), l.value_y(0.0));
    }

    #[test]
    fn threshold_ramp_matches_reference_points() {
        let l = layout();
        let p = ColorPolicy::ThresholdRamp;
        assert_eq!(l.sample_color(p, 0.0), [1.0, 0.0, 0.0]);
        assert_eq!(l.sample_color(p, 15.0), [0.75, 0.0, 0.0]);
        let mid = l.sample_color(p, 52.5);
        assert_abs_diff_eq!(mid[0], 0.125, epsilon = 1e-6);
        assert_abs_diff_eq!(mid[1], 0.5, epsilon = 1e-6);
        assert_eq!(mid[1], mid[2]);
        assert_eq!(l.sample_color(p, 90.0), [0.0, 1.0, 1.0]);
        assert_eq!(l.sample_color(p, 900.0), l.sample_color(p, 90.0));
    }

    #[test]
    fn threshold_ramp_with_tiny_ceiling() {
        let l = GraphLayout::new(4, 10.0);
        let p = ColorPolicy::ThresholdRamp;
        assert_eq!(l.sample_color(p, 0.0)[1], 0.0);
        assert_eq!(l.sample_color(p, 5.0)[1], 1.0);
    }

    #[test]
    fn linear_ramp_blends_red_to_green() {
        let l = GraphLayout::new(100, 120.0);
        let p = ColorPolicy::LinearRamp;
        assert_eq!(l.sample_color(p, 0.0), [1.0, 0.0, 0.0]);
        assert_eq!(l.sample_color(p, 60.0), [0.5, 0.5, 0.0]);
        assert_eq!(l.sample_color(p, 120.0), [0.0, 1.0, 0.0]);
        assert_eq!(l.sample_color(p, 1200.0), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn quad_vertices_round_trip_through_reader() {
        let quad = Quad {
            left: -0.1,
            right: 0.2,
            top: 0.3,
            bottom: -0.4,
            z: 0.02,
            color: [0.1, 0.2, 0.3],
        };
        let mut buf = [0.0; FLOATS_PER_QUAD];
        quad.write_vertices(&mut buf);
        assert_eq!(Quad::read_vertices(&buf), quad);
        // bottom-left vertex
        assert_eq!(&buf[12..15], &[-0.1, -0.4, 0.02]);
    }

    #[test]
    fn static_geometry_places_bars_before_background() {
        let cfg = StatsConfig::compact();
        let geo = StaticGeometry::build(&cfg, &layout());

        assert_eq!(geo.vertices.len(), cfg.vertex_count() * FLOATS_PER_VERTEX);
        assert_eq!(geo.bar_index_count, 30 * 6);
        assert_eq!(geo.background_index_offset, 30 * 6);
        assert_eq!(geo.background_index_count, (2 + 2) * 6);
        assert_eq!(geo.bar_vertices().len(), 30 * FLOATS_PER_QUAD);

        let first = Quad::read_vertices(&geo.vertices[..FLOATS_PER_QUAD]);
        assert_eq!(first.color, EMPTY_BAR_COLOR);
        assert_eq!(first.top, first.bottom);

        let panel_start = 30 * FLOATS_PER_QUAD;
        let panel = Quad::read_vertices(&geo.vertices[panel_start..panel_start + FLOATS_PER_QUAD]);
        assert_eq!(panel.color, PANEL_COLOR);
        assert_eq!(panel.z, PANEL_Z);

        assert_eq!(&geo.indices[..6], &[0, 3, 1, 3, 0, 2]);
        assert_eq!(*geo.indices.iter().max().unwrap() as usize, cfg.vertex_count() - 1);
    }

    #[test]
    fn layout_attributes_fit_stride() {
        let last = VERTEX_LAYOUT.attributes.last().unwrap();
        assert_eq!(
            last.offset_bytes + last.components * 4,
            VERTEX_LAYOUT.stride_bytes
        );
    }
}
