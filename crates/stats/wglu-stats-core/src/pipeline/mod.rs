//! Graphics pipeline capability consumed by the overlay.
//!
//! Adapters (WebGL, headless) implement [`GraphicsPipeline`] and hand it to
//! [`StatsOverlay::new`](crate::overlay::StatsOverlay::new). The overlay owns
//! the handle; nothing is looked up from ambient state.

pub mod headless;

use crate::error::PipelineError;
use crate::geometry::{VertexAttribute, VertexLayout};

pub use headless::{BufferId, Command, HeadlessPipeline, ProgramId};

/// Which binding point a buffer serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Upload frequency hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferUsage {
    Static,
    Dynamic,
}

pub trait GraphicsPipeline {
    type Program;
    type Buffer;

    /// Compile both stages, bind `attributes` to their locations and link.
    fn compile_and_link(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
        attributes: &[VertexAttribute],
    ) -> Result<Self::Program, PipelineError>;

    fn use_program(&mut self, program: &Self::Program);

    /// Column-major 4x4 matrix uniform. Unknown names are ignored.
    fn set_uniform_matrix4(&mut self, program: &Self::Program, name: &str, value: &[f32; 16]);

    /// vec4 uniform. Unknown names are ignored.
    fn set_uniform_vec4(&mut self, program: &Self::Program, name: &str, value: &[f32; 4]);

    fn create_buffer(&mut self, kind: BufferKind) -> Result<Self::Buffer, PipelineError>;

    /// Replace the whole contents of a vertex buffer.
    fn upload_vertices(&mut self, buffer: &Self::Buffer, data: &[f32], usage: BufferUsage);

    /// Replace the whole contents of an index buffer.
    fn upload_indices(&mut self, buffer: &Self::Buffer, data: &[u16]);

    /// Overwrite `data.len()` floats of a vertex buffer starting at `offset_bytes`.
    fn upload_partial(&mut self, buffer: &Self::Buffer, offset_bytes: usize, data: &[f32]);

    /// Bind buffers and point the layout's attributes into the vertex buffer.
    fn bind_geometry(
        &mut self,
        vertex_buffer: &Self::Buffer,
        index_buffer: &Self::Buffer,
        layout: &VertexLayout,
    );

    /// Draw `count` 16-bit indices as triangles, starting `offset_bytes` into
    /// the bound index buffer.
    fn draw_indexed_triangles(&mut self, count: usize, offset_bytes: usize);

    /// Drawing surface size in pixels.
    fn canvas_size(&self) -> (f32, f32);
}
