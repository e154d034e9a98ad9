// Recording stand-in for the GL backend. Handles are plain counters.
use super::{Color, GlError, Gpu, ShaderStage, Viewport};
use crate::utils::matrix::Mat4;
use std::collections::{HashMap, VecDeque};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FakeUniform {
    pub program: u32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage, u32),
    CompileShader { shader: u32, source: String },
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(u32),
    CreateVertexBuffer(Vec<f32>),
    VertexAttribPointer { index: u32, components: i32, stride: i32, offset: i32 },
    UniformMatrix4 { location: FakeUniform, m: Mat4 },
    UniformVec4 { location: FakeUniform, color: Color },
    Viewport(Viewport),
    Clear(Color),
    EnableAlphaBlend,
    DrawTriangleFan { first: i32, count: i32 },
    Flush,
}

#[derive(Default)]
pub struct RecordingGpu {
    pub calls: Vec<Call>,
    next_handle: u32,
    stages: HashMap<u32, ShaderStage>,
    errors: VecDeque<GlError>,
    /// Compile of this stage fails with the given log.
    pub fail_compile: Option<(ShaderStage, String)>,
    /// Link fails with the given log.
    pub fail_link: Option<String>,
    /// `create_program` fails with the given message.
    pub fail_create_program: Option<String>,
    /// Locations reported as absent.
    pub missing_locations: Vec<&'static str>,
    /// Queue `InvalidOperation` right after every attach.
    pub error_on_attach: bool,
}

impl RecordingGpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_error(&mut self, error: GlError) {
        self.errors.push_back(error);
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::DrawTriangleFan { .. }))
            .count()
    }

    pub fn matrices_for(&self, name: &str) -> Vec<Mat4> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::UniformMatrix4 { location, m } if location.name == name => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub fn colors(&self) -> Vec<Color> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::UniformVec4 { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }
}

impl Gpu for RecordingGpu {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = FakeUniform;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<u32, String> {
        let id = self.handle();
        self.stages.insert(id, stage);
        self.calls.push(Call::CreateShader(stage, id));
        Ok(id)
    }

    fn compile_shader(&mut self, shader: u32, source: &str) -> bool {
        self.calls.push(Call::CompileShader { shader, source: source.to_string() });
        match (&self.fail_compile, self.stages.get(&shader)) {
            (Some((stage, _)), Some(actual)) => stage != actual,
            _ => true,
        }
    }

    fn shader_info_log(&mut self, _shader: u32) -> String {
        self.fail_compile.as_ref().map(|(_, log)| log.clone()).unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: u32) {
        self.calls.push(Call::DeleteShader(shader));
    }

    fn create_program(&mut self) -> Result<u32, String> {
        if let Some(msg) = &self.fail_create_program {
            return Err(msg.clone());
        }
        let id = self.handle();
        self.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        self.calls.push(Call::AttachShader { program, shader });
        if self.error_on_attach {
            self.errors.push_back(GlError::InvalidOperation);
        }
    }

    fn link_program(&mut self, program: u32) -> bool {
        self.calls.push(Call::LinkProgram(program));
        self.fail_link.is_none()
    }

    fn program_info_log(&mut self, _program: u32) -> String {
        self.fail_link.clone().unwrap_or_default()
    }

    fn delete_program(&mut self, program: u32) {
        self.calls.push(Call::DeleteProgram(program));
    }

    fn attrib_location(&mut self, _program: u32, name: &str) -> Option<u32> {
        if self.missing_locations.contains(&name) { None } else { Some(0) }
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<FakeUniform> {
        if self.missing_locations.contains(&name) {
            None
        } else {
            Some(FakeUniform { program, name: name.to_string() })
        }
    }

    fn use_program(&mut self, program: u32) {
        self.calls.push(Call::UseProgram(program));
    }

    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> Result<u32, String> {
        self.calls.push(Call::CreateVertexBuffer(vertices.to_vec()));
        Ok(self.handle())
    }

    fn vertex_attrib_pointer(&mut self, index: u32, components: i32, stride: i32, offset: i32) {
        self.calls.push(Call::VertexAttribPointer { index, components, stride, offset });
    }

    fn set_uniform_matrix4(&mut self, location: &FakeUniform, m: &Mat4) {
        self.calls.push(Call::UniformMatrix4 { location: location.clone(), m: *m });
    }

    fn set_uniform_vec4(&mut self, location: &FakeUniform, color: Color) {
        self.calls.push(Call::UniformVec4 { location: location.clone(), color });
    }

    fn viewport(&mut self, viewport: Viewport) {
        self.calls.push(Call::Viewport(viewport));
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(Call::Clear(color));
    }

    fn enable_alpha_blend(&mut self) {
        self.calls.push(Call::EnableAlphaBlend);
    }

    fn draw_triangle_fan(&mut self, first: i32, count: i32) {
        self.calls.push(Call::DrawTriangleFan { first, count });
    }

    fn flush(&mut self) {
        self.calls.push(Call::Flush);
    }

    fn get_error(&mut self) -> Option<GlError> {
        self.errors.pop_front()
    }
}
