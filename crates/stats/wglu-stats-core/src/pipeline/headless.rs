//! CPU-only pipeline that mirrors buffer contents and records every call.
//!
//! Used for host-side tests, benches and replaying recorded frame pacing
//! without a GPU.

use crate::error::PipelineError;
use crate::geometry::{VertexAttribute, VertexLayout};

use super::{BufferKind, BufferUsage, GraphicsPipeline};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BufferId(pub u32);

/// One recorded pipeline call.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CompileAndLink {
        program: ProgramId,
        attributes: Vec<(String, u32)>,
    },
    UseProgram(ProgramId),
    SetUniformMatrix4 {
        name: String,
        value: [f32; 16],
    },
    SetUniformVec4 {
        name: String,
        value: [f32; 4],
    },
    CreateBuffer {
        buffer: BufferId,
        kind: BufferKind,
    },
    UploadVertices {
        buffer: BufferId,
        len_bytes: usize,
        usage: BufferUsage,
    },
    UploadIndices {
        buffer: BufferId,
        len_bytes: usize,
    },
    UploadPartial {
        buffer: BufferId,
        offset_bytes: usize,
        len_bytes: usize,
    },
    BindGeometry {
        vertex: BufferId,
        index: BufferId,
    },
    DrawIndexedTriangles {
        count: usize,
        offset_bytes: usize,
    },
}

#[derive(Debug)]
enum BufferStore {
    Vertices(Vec<f32>),
    Indices(Vec<u16>),
}

#[derive(Debug)]
pub struct HeadlessPipeline {
    canvas: (f32, f32),
    commands: Vec<Command>,
    buffers: Vec<BufferStore>,
    programs: u32,
    link_failure: Option<String>,
}

impl HeadlessPipeline {
    pub fn new(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            canvas: (canvas_width, canvas_height),
            commands: Vec::new(),
            buffers: Vec::new(),
            programs: 0,
            link_failure: None,
        }
    }

    /// A pipeline whose program link always fails with `log`.
    pub fn failing_link(log: impl Into<String>) -> Self {
        Self {
            link_failure: Some(log.into()),
            ..Self::new(1.0, 1.0)
        }
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.canvas = (width, height);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drain the command log, keeping buffer contents.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Current contents of a vertex buffer.
    pub fn vertex_data(&self, buffer: BufferId) -> Option<&[f32]> {
        match self.buffers.get(buffer.0 as usize)? {
            BufferStore::Vertices(data) => Some(data),
            BufferStore::Indices(_) => None,
        }
    }

    /// Current contents of an index buffer.
    pub fn index_data(&self, buffer: BufferId) -> Option<&[u16]> {
        match self.buffers.get(buffer.0 as usize)? {
            BufferStore::Indices(data) => Some(data),
            BufferStore::Vertices(_) => None,
        }
    }

    fn vertices_mut(&mut self, buffer: BufferId) -> Option<&mut Vec<f32>> {
        match self.buffers.get_mut(buffer.0 as usize)? {
            BufferStore::Vertices(data) => Some(data),
            BufferStore::Indices(_) => None,
        }
    }
}

impl Default for HeadlessPipeline {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl GraphicsPipeline for HeadlessPipeline {
    type Program = ProgramId;
    type Buffer = BufferId;

    fn compile_and_link(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
        attributes: &[VertexAttribute],
    ) -> Result<ProgramId, PipelineError> {
        if vertex_source.trim().is_empty() {
            return Err(PipelineError::compile("vertex", "empty shader source"));
        }
        if fragment_source.trim().is_empty() {
            return Err(PipelineError::compile("fragment", "empty shader source"));
        }
        if let Some(log) = &self.link_failure {
            return Err(PipelineError::link(log.clone()));
        }

        let program = ProgramId(self.programs);
        self.programs += 1;
        self.commands.push(Command::CompileAndLink {
            program,
            attributes: attributes
                .iter()
                .map(|a| (a.name.to_string(), a.location))
                .collect(),
        });
        Ok(program)
    }

    fn use_program(&mut self, program: &ProgramId) {
        self.commands.push(Command::UseProgram(*program));
    }

    fn set_uniform_matrix4(&mut self, _program: &ProgramId, name: &str, value: &[f32; 16]) {
        self.commands.push(Command::SetUniformMatrix4 {
            name: name.to_string(),
            value: *value,
        });
    }

    fn set_uniform_vec4(&mut self, _program: &ProgramId, name: &str, value: &[f32; 4]) {
        self.commands.push(Command::SetUniformVec4 {
            name: name.to_string(),
            value: *value,
        });
    }

    fn create_buffer(&mut self, kind: BufferKind) -> Result<BufferId, PipelineError> {
        let buffer = BufferId(self.buffers.len() as u32);
        self.buffers.push(match kind {
            BufferKind::Vertex => BufferStore::Vertices(Vec::new()),
            BufferKind::Index => BufferStore::Indices(Vec::new()),
        });
        self.commands.push(Command::CreateBuffer { buffer, kind });
        Ok(buffer)
    }

    fn upload_vertices(&mut self, buffer: &BufferId, data: &[f32], usage: BufferUsage) {
        match self.vertices_mut(*buffer) {
            Some(store) => {
                store.clear();
                store.extend_from_slice(data);
            }
            None => {
                log::error!("upload_vertices: {buffer:?} is not a vertex buffer");
                return;
            }
        }
        self.commands.push(Command::UploadVertices {
            buffer: *buffer,
            len_bytes: std::mem::size_of_val(data),
            usage,
        });
    }

    fn upload_indices(&mut self, buffer: &BufferId, data: &[u16]) {
        match self.buffers.get_mut(buffer.0 as usize) {
            Some(BufferStore::Indices(store)) => {
                store.clear();
                store.extend_from_slice(data);
            }
            _ => {
                log::error!("upload_indices: {buffer:?} is not an index buffer");
                return;
            }
        }
        self.commands.push(Command::UploadIndices {
            buffer: *buffer,
            len_bytes: std::mem::size_of_val(data),
        });
    }

    fn upload_partial(&mut self, buffer: &BufferId, offset_bytes: usize, data: &[f32]) {
        let float_size = std::mem::size_of::<f32>();
        let Some(store) = self.vertices_mut(*buffer) else {
            log::error!("upload_partial: {buffer:?} is not a vertex buffer");
            return;
        };
        let start = offset_bytes / float_size;
        let end = start + data.len();
        if offset_bytes % float_size != 0 || end > store.len() {
            // Mirrors GL_INVALID_VALUE: the write is dropped.
            log::error!(
                "upload_partial: {} bytes at {} overruns {:?} ({} bytes)",
                std::mem::size_of_val(data),
                offset_bytes,
                buffer,
                store.len() * float_size
            );
            return;
        }
        store[start..end].copy_from_slice(data);
        self.commands.push(Command::UploadPartial {
            buffer: *buffer,
            offset_bytes,
            len_bytes: std::mem::size_of_val(data),
        });
    }

    fn bind_geometry(
        &mut self,
        vertex_buffer: &BufferId,
        index_buffer: &BufferId,
        _layout: &VertexLayout,
    ) {
        self.commands.push(Command::BindGeometry {
            vertex: *vertex_buffer,
            index: *index_buffer,
        });
    }

    fn draw_indexed_triangles(&mut self, count: usize, offset_bytes: usize) {
        self.commands.push(Command::DrawIndexedTriangles {
            count,
            offset_bytes,
        });
    }

    fn canvas_size(&self) -> (f32, f32) {
        self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::VERTEX_LAYOUT;

    #[test]
    fn partial_upload_patches_in_place() {
        let mut p = HeadlessPipeline::default();
        let vb = p.create_buffer(BufferKind::Vertex).unwrap();
        p.upload_vertices(&vb, &[0.0; 8], BufferUsage::Dynamic);
        p.upload_partial(&vb, 8, &[1.0, 2.0]);
        assert_eq!(
            p.vertex_data(vb).unwrap(),
            &[0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(
            p.commands().last(),
            Some(&Command::UploadPartial {
                buffer: vb,
                offset_bytes: 8,
                len_bytes: 8
            })
        );
    }

    #[test]
    fn overrunning_partial_upload_is_dropped() {
        let mut p = HeadlessPipeline::default();
        let vb = p.create_buffer(BufferKind::Vertex).unwrap();
        p.upload_vertices(&vb, &[0.0; 4], BufferUsage::Dynamic);
        let before = p.commands().len();
        p.upload_partial(&vb, 12, &[1.0, 2.0]);
        assert_eq!(p.commands().len(), before);
        assert_eq!(p.vertex_data(vb).unwrap(), &[0.0; 4]);
    }

    #[test]
    fn index_and_vertex_buffers_are_distinct() {
        let mut p = HeadlessPipeline::default();
        let ib = p.create_buffer(BufferKind::Index).unwrap();
        p.upload_indices(&ib, &[0, 1, 2]);
        assert_eq!(p.index_data(ib), Some(&[0u16, 1, 2][..]));
        assert!(p.vertex_data(ib).is_none());
    }

    #[test]
    fn link_failure_is_reported() {
        let mut p = HeadlessPipeline::failing_link("too many varyings");
        let err = p
            .compile_and_link("void main(){}", "void main(){}", VERTEX_LAYOUT.attributes)
            .unwrap_err();
        assert_eq!(err, PipelineError::link("too many varyings"));
    }
}
