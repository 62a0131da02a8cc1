//! WebGL2 implementation of the graphics pipeline capability.

use std::collections::HashMap;

use js_sys::{Float32Array, Uint16Array};
use web_sys::{
    WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation,
};
use wglu_stats_core::geometry::{VertexAttribute, VertexLayout};
use wglu_stats_core::pipeline::{BufferKind, BufferUsage, GraphicsPipeline};
use wglu_stats_core::PipelineError;

/// Linked program plus its active uniform locations.
pub struct WebGlStatsProgram {
    program: WebGlProgram,
    uniforms: HashMap<String, WebGlUniformLocation>,
}

impl WebGlStatsProgram {
    fn uniform(&self, name: &str) -> Option<&WebGlUniformLocation> {
        self.uniforms.get(name)
    }
}

pub struct WebGlStatsBuffer {
    buffer: WebGlBuffer,
    kind: BufferKind,
}

/// Thin wrapper over a WebGL2 context. Clones of the context share GL state.
#[derive(Clone)]
pub struct WebGlPipeline {
    gl: GL,
}

impl WebGlPipeline {
    pub fn new(gl: GL) -> Self {
        Self { gl }
    }

    pub fn context(&self) -> &GL {
        &self.gl
    }

    fn compile_shader(
        &self,
        stage: u32,
        label: &'static str,
        source: &str,
    ) -> Result<WebGlShader, PipelineError> {
        let gl = &self.gl;
        let shader = gl
            .create_shader(stage)
            .ok_or(PipelineError::Allocation { object: "shader" })?;
        gl.shader_source(&shader, source);
        gl.compile_shader(&shader);

        if gl
            .get_shader_parameter(&shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(shader)
        } else {
            let log = gl
                .get_shader_info_log(&shader)
                .unwrap_or_else(|| "unknown error".to_string());
            gl.delete_shader(Some(&shader));
            Err(PipelineError::compile(label, log))
        }
    }

    fn active_uniforms(&self, program: &WebGlProgram) -> HashMap<String, WebGlUniformLocation> {
        let gl = &self.gl;
        let count = gl
            .get_program_parameter(program, GL::ACTIVE_UNIFORMS)
            .as_f64()
            .unwrap_or(0.0) as u32;

        let mut uniforms = HashMap::new();
        for i in 0..count {
            let Some(info) = gl.get_active_uniform(program, i) else {
                continue;
            };
            let name = info.name();
            if let Some(location) = gl.get_uniform_location(program, &name) {
                uniforms.insert(name, location);
            }
        }
        uniforms
    }

    fn bind(&self, buffer: &WebGlStatsBuffer) -> u32 {
        let target = match buffer.kind {
            BufferKind::Vertex => GL::ARRAY_BUFFER,
            BufferKind::Index => GL::ELEMENT_ARRAY_BUFFER,
        };
        self.gl.bind_buffer(target, Some(&buffer.buffer));
        target
    }
}

impl GraphicsPipeline for WebGlPipeline {
    type Program = WebGlStatsProgram;
    type Buffer = WebGlStatsBuffer;

    fn compile_and_link(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
        attributes: &[VertexAttribute],
    ) -> Result<WebGlStatsProgram, PipelineError> {
        let vs = self.compile_shader(GL::VERTEX_SHADER, "vertex", vertex_source)?;
        let fs = match self.compile_shader(GL::FRAGMENT_SHADER, "fragment", fragment_source) {
            Ok(fs) => fs,
            Err(e) => {
                self.gl.delete_shader(Some(&vs));
                return Err(e);
            }
        };

        let gl = &self.gl;
        let program = gl
            .create_program()
            .ok_or(PipelineError::Allocation { object: "program" })?;
        gl.attach_shader(&program, &vs);
        gl.attach_shader(&program, &fs);
        for attr in attributes {
            gl.bind_attrib_location(&program, attr.location, attr.name);
        }
        gl.link_program(&program);

        // Shaders are no longer needed once linking has been attempted.
        gl.delete_shader(Some(&vs));
        gl.delete_shader(Some(&fs));

        if !gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            let log = gl
                .get_program_info_log(&program)
                .unwrap_or_else(|| "unknown error".to_string());
            gl.delete_program(Some(&program));
            return Err(PipelineError::link(log));
        }

        let uniforms = self.active_uniforms(&program);
        log::debug!("stats program linked with uniforms {:?}", uniforms.keys());
        Ok(WebGlStatsProgram { program, uniforms })
    }

    fn use_program(&mut self, program: &WebGlStatsProgram) {
        self.gl.use_program(Some(&program.program));
    }

    fn set_uniform_matrix4(&mut self, program: &WebGlStatsProgram, name: &str, value: &[f32; 16]) {
        if let Some(location) = program.uniform(name) {
            self.gl
                .uniform_matrix4fv_with_f32_array(Some(location), false, value);
        }
    }

    fn set_uniform_vec4(&mut self, program: &WebGlStatsProgram, name: &str, value: &[f32; 4]) {
        if let Some(location) = program.uniform(name) {
            self.gl.uniform4fv_with_f32_array(Some(location), value);
        }
    }

    fn create_buffer(&mut self, kind: BufferKind) -> Result<WebGlStatsBuffer, PipelineError> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or(PipelineError::Allocation { object: "buffer" })?;
        Ok(WebGlStatsBuffer { buffer, kind })
    }

    fn upload_vertices(&mut self, buffer: &WebGlStatsBuffer, data: &[f32], usage: BufferUsage) {
        let target = self.bind(buffer);
        let usage = match usage {
            BufferUsage::Static => GL::STATIC_DRAW,
            BufferUsage::Dynamic => GL::DYNAMIC_DRAW,
        };
        self.gl
            .buffer_data_with_array_buffer_view(target, &Float32Array::from(data), usage);
    }

    fn upload_indices(&mut self, buffer: &WebGlStatsBuffer, data: &[u16]) {
        let target = self.bind(buffer);
        self.gl
            .buffer_data_with_array_buffer_view(target, &Uint16Array::from(data), GL::STATIC_DRAW);
    }

    fn upload_partial(&mut self, buffer: &WebGlStatsBuffer, offset_bytes: usize, data: &[f32]) {
        let target = self.bind(buffer);
        self.gl.buffer_sub_data_with_i32_and_array_buffer_view(
            target,
            offset_bytes as i32,
            &Float32Array::from(data),
        );
    }

    fn bind_geometry(
        &mut self,
        vertex_buffer: &WebGlStatsBuffer,
        index_buffer: &WebGlStatsBuffer,
        layout: &VertexLayout,
    ) {
        self.bind(vertex_buffer);
        self.bind(index_buffer);
        for attr in layout.attributes {
            self.gl.enable_vertex_attrib_array(attr.location);
            self.gl.vertex_attrib_pointer_with_i32(
                attr.location,
                attr.components as i32,
                GL::FLOAT,
                false,
                layout.stride_bytes as i32,
                attr.offset_bytes as i32,
            );
        }
    }

    fn draw_indexed_triangles(&mut self, count: usize, offset_bytes: usize) {
        self.gl.draw_elements_with_i32(
            GL::TRIANGLES,
            count as i32,
            GL::UNSIGNED_SHORT,
            offset_bytes as i32,
        );
    }

    fn canvas_size(&self) -> (f32, f32) {
        (
            self.gl.drawing_buffer_width() as f32,
            self.gl.drawing_buffer_height() as f32,
        )
    }
}
