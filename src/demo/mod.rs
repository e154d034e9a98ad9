pub mod grid;
pub mod motion;

use crate::core::gfx::compositor::{Compositor, DEFAULT_TARGET_RATIO, QUAD_VERTICES};
use crate::core::gfx::shader::{ProgramKind, ShaderError, ShaderProgram};
use crate::core::gfx::{check_gl_error, Color, Gpu, Viewport};
use crate::utils::fps::FPSCounter;
use crate::utils::matrix::{self, Mat4};
use log::{debug, info, trace};
use motion::{Direction, Motion};
use std::{error::Error, fmt, str::FromStr, time::Instant};

/* -------------------- look & feel constants -------------------- */
const CLEAR_COLOR: Color = Color::rgb(0.0, 0.0, 1.0);
const BACKGROUND_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);
const SPRITE_COLOR: Color = Color::rgb(1.0, 1.0, 0.0);
/// Half-width of the sprite quad in clip units, before correction.
const SPRITE_LENGTH: f32 = 0.1;
/// Per-frame sweep speed at the 60 fps reference rate.
const SWEEP_SPEED: f32 = 0.01 * 2.0;
const REFERENCE_FPS: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// One solid background quad, sprite sweeping along a sine.
    Sweep,
    /// Gradient grid background, sprite sweeping along a sine.
    Gradient,
    /// Gradient grid background, sprite moved by directional commands.
    Interactive,
}

impl Variant {
    #[inline(always)]
    fn has_grid(self) -> bool {
        !matches!(self, Variant::Sweep)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DemoSettings {
    pub variant: Variant,
    /// Bytes skipped at the start of every fragment shader source.
    pub fragment_offset: usize,
    /// Frame rate the animation speed is normalised against.
    pub target_fps: u32,
    pub target_ratio: f32,
    pub grid_cell_width: f32,
    pub grid_cell_height: f32,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            variant: Variant::Interactive,
            fragment_offset: 0,
            target_fps: 60,
            target_ratio: DEFAULT_TARGET_RATIO,
            grid_cell_width: 0.25,
            grid_cell_height: 0.25,
        }
    }
}

#[derive(Debug)]
pub enum SetupError {
    InvalidTargetFps(u32),
    InvalidTargetRatio(f32),
    InvalidGridCell { width: f32, height: f32 },
    Buffer(String),
    Shader(ShaderError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
}

/// Everything the frame driver mutates between frames.
pub struct Demo<G: Gpu> {
    variant: Variant,
    fps_factor: f32,
    grid_cell: (f32, f32),
    compositor: Compositor,
    sprite_program: ShaderProgram<G>,
    background_program: ShaderProgram<G>,
    _quad: G::Buffer,
    sprite: Sprite,
    motion: Motion,
    fps: FPSCounter,
}

impl<G: Gpu> Demo<G> {
    /// One-time GPU setup: shared quad, both programs, alpha blending.
    pub fn setup(gpu: &mut G, settings: &DemoSettings) -> Result<Self, SetupError> {
        if settings.target_fps == 0 {
            return Err(SetupError::InvalidTargetFps(settings.target_fps));
        }
        if !(settings.target_ratio.is_finite() && settings.target_ratio > 0.0) {
            return Err(SetupError::InvalidTargetRatio(settings.target_ratio));
        }
        let (cell_w, cell_h) = (settings.grid_cell_width, settings.grid_cell_height);
        if !(grid::is_valid_cell(cell_w) && grid::is_valid_cell(cell_h)) {
            return Err(SetupError::InvalidGridCell { width: cell_w, height: cell_h });
        }
        let fps_factor = REFERENCE_FPS / settings.target_fps as f32;

        let quad = gpu.create_vertex_buffer(&QUAD_VERTICES).map_err(SetupError::Buffer)?;
        check_gl_error(gpu, "bind buffer");

        let sprite_program = ShaderProgram::load(gpu, ProgramKind::Sprite, settings.fragment_offset)?;
        let background_program = ShaderProgram::load(gpu, ProgramKind::Background, settings.fragment_offset)?;

        gpu.enable_alpha_blend();

        let sprite = match settings.variant {
            Variant::Interactive => Sprite { x: 0.0, y: 0.0 },
            Variant::Sweep | Variant::Gradient => Sprite { x: -1.0, y: -1.0 },
        };

        let demo = Self {
            variant: settings.variant,
            fps_factor,
            grid_cell: (settings.grid_cell_width, settings.grid_cell_height),
            compositor: Compositor::new(settings.target_ratio),
            sprite_program,
            background_program,
            _quad: quad,
            sprite,
            motion: Motion::Idle,
            fps: FPSCounter::new(),
        };

        info!(
            "Demo '{}' ready (target {} fps, factor {:.3}, ratio {:.4}).",
            demo.variant, settings.target_fps, fps_factor, settings.target_ratio
        );
        debug!("Initial sprite model-view:\n{}", matrix::format(&demo.sprite_modelview()));
        Ok(demo)
    }

    /// Renders one frame into a `width` x `height` viewport.
    pub fn update_frame(&mut self, gpu: &mut G, width: u32, height: u32) {
        self.render(gpu, Viewport::new(width, height));
        if let Some(fps) = self.fps.tick(Instant::now()) {
            debug!("FPS {}", fps);
        }
    }

    fn render(&mut self, gpu: &mut G, viewport: Viewport) {
        if viewport.is_empty() {
            trace!("Skipping frame for empty viewport {:?}", viewport);
            return;
        }

        gpu.viewport(viewport);
        gpu.clear(CLEAR_COLOR);

        self.background_program.bind(gpu);
        if self.variant.has_grid() {
            let (cell_w, cell_h) = self.grid_cell;
            let (compositor, program) = (&self.compositor, &self.background_program);
            grid::for_each_cell(cell_w, cell_h, |modelview, color| {
                compositor.draw(gpu, program, color, modelview, viewport);
            });
        } else {
            self.compositor
                .draw(gpu, &self.background_program, BACKGROUND_COLOR, &matrix::identity(), viewport);
        }

        self.advance_sprite();

        self.sprite_program.bind(gpu);
        let modelview = self.sprite_modelview();
        self.compositor
            .draw(gpu, &self.sprite_program, SPRITE_COLOR, &modelview, viewport);

        gpu.flush();
        check_gl_error(gpu, "frame");
    }

    fn advance_sprite(&mut self) {
        match self.variant {
            Variant::Interactive => {
                if let Some((dx, dy)) = self.motion.step() {
                    self.sprite.x += dx;
                    self.sprite.y += dy;
                }
            }
            Variant::Sweep | Variant::Gradient => {
                self.sprite.x += SWEEP_SPEED * self.fps_factor;
            }
        }
    }

    fn sprite_modelview(&self) -> Mat4 {
        let ratio = self.compositor.target_ratio;
        let mut m = matrix::identity();
        match self.variant {
            Variant::Interactive => matrix::translate(&mut m, self.sprite.x, self.sprite.y),
            Variant::Sweep | Variant::Gradient => matrix::translate(
                &mut m,
                self.sprite.x.sin(),
                self.sprite.y + SPRITE_LENGTH * ratio,
            ),
        }
        matrix::scale(&mut m, SPRITE_LENGTH, SPRITE_LENGTH * ratio);
        m
    }

    /// Starts a discrete move. Dropped while a move is in progress, and
    /// ignored outright by the continuously animated variants.
    pub fn command(&mut self, direction: Direction) -> bool {
        if self.variant != Variant::Interactive {
            trace!("Ignoring {:?}: variant '{}' is not interactive", direction, self.variant);
            return false;
        }
        let accepted = self.motion.start(direction);
        if accepted {
            debug!("Moving {:?}", direction);
        } else {
            trace!("Dropped {:?}: move in progress", direction);
        }
        accepted
    }

    #[inline(always)]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[inline(always)]
    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    #[inline(always)]
    pub fn sprite(&self) -> Sprite {
        self.sprite
    }
}

// The host dispatches through `command`; these name each direction.
#[allow(dead_code)]
impl<G: Gpu> Demo<G> {
    pub fn move_up(&mut self) -> bool {
        self.command(Direction::Up)
    }

    pub fn move_down(&mut self) -> bool {
        self.command(Direction::Down)
    }

    pub fn move_left(&mut self) -> bool {
        self.command(Direction::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.command(Direction::Right)
    }
}

// -- Boilerplate impls --
impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sweep => write!(f, "sweep"),
            Self::Gradient => write!(f, "gradient"),
            Self::Interactive => write!(f, "interactive"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sweep" => Ok(Variant::Sweep),
            "gradient" => Ok(Variant::Gradient),
            "interactive" => Ok(Variant::Interactive),
            _ => Err(format!("'{}' is not a valid demo variant", s)),
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTargetFps(fps) => write!(f, "target fps must be positive (got {})", fps),
            Self::InvalidTargetRatio(ratio) => {
                write!(f, "target ratio must be finite and positive (got {})", ratio)
            }
            Self::InvalidGridCell { width, height } => write!(
                f,
                "grid cells must be finite and at least {} (got {} x {})",
                grid::MIN_CELL_SIZE, width, height
            ),
            Self::Buffer(msg) => write!(f, "failed to create quad buffer: {}", msg),
            Self::Shader(e) => write!(f, "{}", e),
        }
    }
}

impl Error for SetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Shader(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShaderError> for SetupError {
    fn from(e: ShaderError) -> Self {
        Self::Shader(e)
    }
}
