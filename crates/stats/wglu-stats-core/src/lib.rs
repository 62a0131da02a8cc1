//! WGLU Stats core (backend-agnostic)
//!
//! A rolling frame-rate graph for WebGL sample pages. Frames are coalesced by a
//! timing gate into samples; each sample overwrites one slot of a fixed ring of
//! bars and only the touched vertices are re-uploaded. Rendering goes through
//! the [`GraphicsPipeline`] trait so the same core drives WebGL in the browser
//! and the [`HeadlessPipeline`] in tests.

pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod pipeline;
pub mod ring;
pub mod timing;

// Re-exports for consumers (adapters)
pub use clock::{Clock, ManualClock};
pub use config::{ColorPolicy, StatsConfig, ThresholdLine};
pub use error::{PipelineError, Result, StatsError};
pub use geometry::{GraphLayout, Quad, VertexAttribute, VertexLayout, VERTEX_LAYOUT};
pub use overlay::{screen_transforms, StatsOverlay};
pub use pipeline::{BufferKind, BufferUsage, GraphicsPipeline, HeadlessPipeline};
pub use ring::{DirtyRange, RingGraph, RingUpdate};
pub use timing::{Sample, TimingGate};
