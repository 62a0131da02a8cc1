//! Rolling bar history with bounded, wrap-aware dirty ranges.
//!
//! The ring keeps a CPU mirror of the bar region of the vertex buffer. Every
//! accepted sample rewrites exactly one slot. Writing the last slot also
//! parks a full-height seam bar at slot 0, so the wrap is visible until the
//! next sample lands there; that seam goes out as a second range.

use core::ops::Range;

use crate::config::ColorPolicy;
use crate::geometry::{
    GraphLayout, Quad, StaticGeometry, BAR_Z, FLOATS_PER_QUAD, FLOATS_PER_VERTEX,
    SEAM_COLOR, VERTEX_STRIDE_BYTES, VERTICES_PER_QUAD,
};

/// A run of consecutive vertices that changed in the mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRange {
    pub first_vertex: usize,
    pub vertex_count: usize,
}

impl DirtyRange {
    fn slots(first_slot: usize, slot_count: usize) -> Self {
        Self {
            first_vertex: first_slot * VERTICES_PER_QUAD,
            vertex_count: slot_count * VERTICES_PER_QUAD,
        }
    }

    /// Byte offset into the vertex buffer.
    pub fn offset_bytes(&self) -> usize {
        self.first_vertex * VERTEX_STRIDE_BYTES
    }

    pub fn len_bytes(&self) -> usize {
        self.vertex_count * VERTEX_STRIDE_BYTES
    }

    /// Float range into the mirror.
    pub fn floats(&self) -> Range<usize> {
        let start = self.first_vertex * FLOATS_PER_VERTEX;
        start..start + self.vertex_count * FLOATS_PER_VERTEX
    }
}

/// What a single [`RingGraph::push`] changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingUpdate {
    /// Slot that received the sample.
    pub slot: usize,
    /// The written slot.
    pub primary: DirtyRange,
    /// Seam bar written at slot 0 when `slot` was the last one.
    pub seam: Option<DirtyRange>,
}

impl RingUpdate {
    /// Ranges in upload order.
    pub fn ranges(&self) -> impl Iterator<Item = DirtyRange> {
        core::iter::once(self.primary).chain(self.seam)
    }

    pub fn wrapped(&self) -> bool {
        self.seam.is_some()
    }
}

/// Fixed-capacity ring of bars backed by a vertex mirror.
#[derive(Clone, Debug)]
pub struct RingGraph {
    layout: GraphLayout,
    policy: ColorPolicy,
    write_index: usize,
    accepted: u64,
    mirror: Vec<f32>,
}

impl RingGraph {
    pub fn new(layout: GraphLayout, policy: ColorPolicy, geometry: &StaticGeometry) -> Self {
        let mirror = geometry.bar_vertices().to_vec();
        debug_assert_eq!(mirror.len(), layout.capacity() * FLOATS_PER_QUAD);
        Self {
            layout,
            policy,
            write_index: 0,
            accepted: 0,
            mirror,
        }
    }

    pub fn capacity(&self) -> usize {
        self.layout.capacity()
    }

    /// Next slot to be overwritten.
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Samples accepted since construction.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn layout(&self) -> &GraphLayout {
        &self.layout
    }

    /// Current bar geometry for `slot`.
    pub fn slot(&self, slot: usize) -> Quad {
        let start = slot * FLOATS_PER_QUAD;
        Quad::read_vertices(&self.mirror[start..start + FLOATS_PER_QUAD])
    }

    /// Mirror floats for a range returned by [`RingGraph::push`].
    pub fn floats(&self, range: DirtyRange) -> &[f32] {
        &self.mirror[range.floats()]
    }

    /// Write `value` into the current slot and advance.
    pub fn push(&mut self, value: f64) -> RingUpdate {
        let slot = self.write_index;
        let capacity = self.capacity();

        let bar = Quad {
            left: self.layout.slot_x(slot),
            right: self.layout.slot_x(slot + 1),
            top: self.layout.value_y(value),
            bottom: self.layout.baseline_y(),
            z: BAR_Z,
            color: self.layout.sample_color(self.policy, value),
        };
        self.write_quad(slot, &bar);

        // A single-slot ring has nowhere to put the seam without erasing the sample.
        let seam = if slot == capacity - 1 && capacity > 1 {
            let bar = self.seam_bar();
            self.write_quad(0, &bar);
            Some(DirtyRange::slots(0, 1))
        } else {
            None
        };
        let update = RingUpdate {
            slot,
            primary: DirtyRange::slots(slot, 1),
            seam,
        };

        let next = (slot + 1) % capacity;
        self.write_index = next;
        self.accepted += 1;
        if next == 0 {
            log::debug!(
                "stats ring wrapped after {} samples (capacity {})",
                self.accepted,
                capacity
            );
        }
        log::trace!("stats ring slot {slot} <- {value}");

        update
    }

    fn seam_bar(&self) -> Quad {
        Quad {
            left: self.layout.slot_x(0),
            right: self.layout.slot_x(1),
            top: self.layout.value_y(self.layout.cap_max()),
            bottom: self.layout.baseline_y(),
            z: BAR_Z,
            color: SEAM_COLOR,
        }
    }

    fn write_quad(&mut self, slot: usize, quad: &Quad) {
        let start = slot * FLOATS_PER_QUAD;
        quad.write_vertices(&mut self.mirror[start..start + FLOATS_PER_QUAD]);
    }
}
