use crate::core::gfx::compositor::{POSITION_COMPONENTS, VERTEX_STRIDE};
use crate::core::gfx::{check_gl_error, Gpu, ShaderStage};
use log::debug;
use std::{error::Error, fmt};

/// First line of every built-in fragment shader. GLSL ES requires it; some
/// desktop drivers reject it, which is what the fragment offset is for.
pub const PRECISION_HEADER: &str = "precision highp float;\n";

#[derive(Debug)]
pub enum ShaderError {
    /// The driver refused to hand out a shader or program object.
    Create(String),
    Compile {
        stage: ShaderStage,
        log: String,
        source: String,
    },
    Link {
        log: String,
        vertex_source: String,
        fragment_source: String,
    },
    /// The fragment offset does not land inside the source text.
    SourceOffset {
        offset: usize,
        len: usize,
    },
    MissingLocation {
        name: &'static str,
    },
}

/// Compiles and links a vertex/fragment pair.
///
/// Every object created along a failing path is deleted before returning. On
/// success the intermediate shaders stay attached to the program for its whole
/// lifetime.
pub fn load_program<G: Gpu + ?Sized>(
    gpu: &mut G,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<G::Program, ShaderError> {
    let vs = compile_stage(gpu, ShaderStage::Vertex, vertex_source)?;
    let fs = match compile_stage(gpu, ShaderStage::Fragment, fragment_source) {
        Ok(fs) => fs,
        Err(e) => {
            gpu.delete_shader(vs);
            return Err(e);
        }
    };

    let program = match gpu.create_program() {
        Ok(program) => program,
        Err(e) => {
            gpu.delete_shader(vs);
            gpu.delete_shader(fs);
            return Err(ShaderError::Create(e));
        }
    };
    gpu.attach_shader(program, vs);
    check_gl_error(gpu, "Attach vertex shader");
    gpu.attach_shader(program, fs);
    check_gl_error(gpu, "Attach fragment shader");

    if !gpu.link_program(program) {
        let log = gpu.program_info_log(program);
        gpu.delete_program(program);
        gpu.delete_shader(vs);
        gpu.delete_shader(fs);
        return Err(ShaderError::Link {
            log,
            vertex_source: vertex_source.to_string(),
            fragment_source: fragment_source.to_string(),
        });
    }

    debug!("Linked program {:?}", program);
    Ok(program)
}

fn compile_stage<G: Gpu + ?Sized>(
    gpu: &mut G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, ShaderError> {
    let shader = gpu.create_shader(stage).map_err(ShaderError::Create)?;
    if !gpu.compile_shader(shader, source) {
        let log = gpu.shader_info_log(shader);
        gpu.delete_shader(shader);
        return Err(ShaderError::Compile {
            stage,
            log,
            source: source.to_string(),
        });
    }
    Ok(shader)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgramKind {
    /// Solid color quads.
    Background,
    /// Blue channel follows `abs(y)` of the quad vertex.
    Sprite,
}

impl ProgramKind {
    fn sources(self) -> (&'static str, &'static str) {
        match self {
            Self::Background => (
                include_str!("shaders/background.vert"),
                include_str!("shaders/background.frag"),
            ),
            Self::Sprite => (
                include_str!("shaders/sprite.vert"),
                include_str!("shaders/sprite.frag"),
            ),
        }
    }
}

/// A linked program plus the locations the demo uploads to.
pub struct ShaderProgram<G: Gpu + ?Sized> {
    pub id: G::Program,
    pub mv: G::UniformLocation,
    pub color: G::UniformLocation,
    pub pos: u32,
}

impl<G: Gpu + ?Sized> ShaderProgram<G> {
    /// Loads one of the built-in programs. `fragment_offset` skips that many
    /// bytes at the start of the fragment source.
    pub fn load(gpu: &mut G, kind: ProgramKind, fragment_offset: usize) -> Result<Self, ShaderError> {
        let (vertex_source, fragment_source) = kind.sources();
        let fragment_source = fragment_source
            .get(fragment_offset..)
            .ok_or(ShaderError::SourceOffset {
                offset: fragment_offset,
                len: fragment_source.len(),
            })?;

        let id = load_program(gpu, vertex_source, fragment_source)?;
        let pos = gpu
            .attrib_location(id, "pos")
            .ok_or(ShaderError::MissingLocation { name: "pos" })?;
        let mv = gpu
            .uniform_location(id, "MV")
            .ok_or(ShaderError::MissingLocation { name: "MV" })?;
        let color = gpu
            .uniform_location(id, "col")
            .ok_or(ShaderError::MissingLocation { name: "col" })?;

        debug!("{:?} program ready (pos attribute {})", kind, pos);
        Ok(Self { id, mv, color, pos })
    }

    /// Points `pos` at the shared quad buffer and makes the program current.
    pub fn bind(&self, gpu: &mut G) {
        gpu.vertex_attrib_pointer(self.pos, POSITION_COMPONENTS, VERTEX_STRIDE, 0);
        gpu.use_program(self.id);
    }
}

// -- Boilerplate impls --
impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(msg) => write!(f, "failed to create GL object: {}", msg),
            Self::Compile { stage, log, .. } => write!(f, "error compiling {} shader:\n{}", stage, log),
            Self::Link { log, .. } => write!(f, "error linking program:\n{}", log),
            Self::SourceOffset { offset, len } => write!(
                f,
                "fragment source offset {} is outside the {}-byte source",
                offset, len
            ),
            Self::MissingLocation { name } => write!(f, "shader location '{}' not found", name),
        }
    }
}

impl Error for ShaderError {}
