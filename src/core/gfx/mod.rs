pub mod backends;
pub mod compositor;
pub mod shader;
#[cfg(test)]
pub mod testing;

use crate::utils::matrix::Mat4;
use log::warn;
use std::fmt;

// --- Public Data Contract ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Opaque color; alpha is implied.
    #[inline(always)]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[inline(always)]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline(always)]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Current drawable size in physical pixels. Re-read every frame; never cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline(always)]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height. Callers must skip empty viewports first.
    #[inline(always)]
    pub fn ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Codes surfaced by the GPU error query. Diagnostic only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlError {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
    Unknown(u32),
}

impl GlError {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            glow::NO_ERROR => None,
            glow::INVALID_ENUM => Some(Self::InvalidEnum),
            glow::INVALID_VALUE => Some(Self::InvalidValue),
            glow::INVALID_OPERATION => Some(Self::InvalidOperation),
            glow::INVALID_FRAMEBUFFER_OPERATION => Some(Self::InvalidFramebufferOperation),
            glow::OUT_OF_MEMORY => Some(Self::OutOfMemory),
            other => Some(Self::Unknown(other)),
        }
    }
}

/// The GPU operations the demo needs, and nothing else.
///
/// Handles are backend-defined. The real implementation lives in
/// [`backends::opengl`]; tests drive the same code through a recording fake.
pub trait Gpu {
    type Shader: Copy + fmt::Debug;
    type Program: Copy + fmt::Debug;
    type Buffer: Copy + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Uploads `source` and compiles it. Returns the compile status.
    fn compile_shader(&mut self, shader: Self::Shader, source: &str) -> bool;
    fn shader_info_log(&mut self, shader: Self::Shader) -> String;
    fn delete_shader(&mut self, shader: Self::Shader);

    fn create_program(&mut self) -> Result<Self::Program, String>;
    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader);
    /// Links and returns the link status.
    fn link_program(&mut self, program: Self::Program) -> bool;
    fn program_info_log(&mut self, program: Self::Program) -> String;
    fn delete_program(&mut self, program: Self::Program);

    fn attrib_location(&mut self, program: Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&mut self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;
    fn use_program(&mut self, program: Self::Program);

    /// Creates a static array buffer, uploads `vertices` and leaves it bound.
    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> Result<Self::Buffer, String>;
    /// Points attribute `index` at the bound array buffer and enables it.
    /// Stride and offset are in floats.
    fn vertex_attrib_pointer(&mut self, index: u32, components: i32, stride: i32, offset: i32);

    fn set_uniform_matrix4(&mut self, location: &Self::UniformLocation, m: &Mat4);
    fn set_uniform_vec4(&mut self, location: &Self::UniformLocation, color: Color);

    fn viewport(&mut self, viewport: Viewport);
    fn clear(&mut self, color: Color);
    fn enable_alpha_blend(&mut self);
    fn draw_triangle_fan(&mut self, first: i32, count: i32);
    fn flush(&mut self);

    /// Pops one entry off the error queue.
    fn get_error(&mut self) -> Option<GlError>;
}

/// Drains the GPU error queue, logging each entry against `op`.
/// Returns how many errors were pending; never changes control flow.
pub fn check_gl_error<G: Gpu + ?Sized>(gpu: &mut G, op: &str) -> usize {
    let mut count = 0;
    while let Some(error) = gpu.get_error() {
        warn!("after {} glError {}", op, error);
        count += 1;
    }
    count
}

// -- Boilerplate impls --
impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnum => write!(f, "GL_INVALID_ENUM"),
            Self::InvalidValue => write!(f, "GL_INVALID_VALUE"),
            Self::InvalidOperation => write!(f, "GL_INVALID_OPERATION"),
            Self::InvalidFramebufferOperation => write!(f, "GL_INVALID_FRAMEBUFFER_OPERATION"),
            Self::OutOfMemory => write!(f, "GL_OUT_OF_MEMORY"),
            Self::Unknown(code) => write!(f, "unknown (0x{:04X})", code),
        }
    }
}
