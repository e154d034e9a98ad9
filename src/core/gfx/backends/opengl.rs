// src/core/gfx/backends/opengl.rs
use crate::core::gfx::{Color, GlError, Gpu, ShaderStage, Viewport};
use crate::utils::matrix::Mat4;
use glow::HasContext;
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version},
    display::{Display, DisplayApiPreference},
    prelude::*,
    surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface},
};
use log::{debug, info, warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::{error::Error, mem, num::NonZeroU32};
use winit::window::Window;

pub struct State {
    pub gl: glow::Context,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    is_gles: bool,
    // Only created on desktop 3.x+ contexts, where attribute state needs one.
    _vao: Option<glow::VertexArray>,
}

pub fn init(window: &Window, vsync_enabled: bool) -> Result<State, Box<dyn Error>> {
    info!("Initializing OpenGL backend...");

    let (gl_surface, gl_context, gl, is_gles) = create_opengl_context(window, vsync_enabled)?;

    let version = gl.version();
    info!(
        "GL version {}.{} ({}) {}",
        version.major,
        version.minor,
        if version.is_embedded { "ES" } else { "desktop" },
        version.vendor_info
    );

    let _vao = if !version.is_embedded && version.major >= 3 {
        unsafe {
            let vao = gl.create_vertex_array()?;
            gl.bind_vertex_array(Some(vao));
            Some(vao)
        }
    } else {
        None
    };

    let size = window.inner_size();
    unsafe {
        gl.viewport(0, 0, size.width as i32, size.height as i32);
    }

    info!("OpenGL backend initialized successfully.");
    Ok(State { gl, gl_surface, gl_context, is_gles, _vao })
}

impl State {
    /// True when the driver gave us the requested GL ES context rather than the desktop fallback.
    #[inline(always)]
    pub fn is_gles(&self) -> bool {
        self.is_gles
    }

    pub fn present(&self) -> Result<(), Box<dyn Error>> {
        self.gl_surface.swap_buffers(&self.gl_context)?;
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let (Some(width_nz), Some(height_nz)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.gl_surface.resize(&self.gl_context, width_nz, height_nz);
        } else {
            warn!("Ignoring resize to zero dimensions.");
        }
    }
}

impl Gpu for State {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<glow::Shader, String> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { self.gl.create_shader(shader_type) }
    }

    fn compile_shader(&mut self, shader: glow::Shader, source: &str) -> bool {
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            self.gl.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&mut self, shader: glow::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&mut self, shader: glow::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&mut self) -> Result<glow::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&mut self, program: glow::Program, shader: glow::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn link_program(&mut self, program: glow::Program) -> bool {
        unsafe {
            self.gl.link_program(program);
            self.gl.get_program_link_status(program)
        }
    }

    fn program_info_log(&mut self, program: glow::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&mut self, program: glow::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn attrib_location(&mut self, program: glow::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(&mut self, program: glow::Program, name: &str) -> Option<glow::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn use_program(&mut self, program: glow::Program) {
        unsafe { self.gl.use_program(Some(program)) }
    }

    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> Result<glow::Buffer, String> {
        unsafe {
            let buffer = self.gl.create_buffer()?;
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STATIC_DRAW,
            );
            debug!("Uploaded {} floats to vertex buffer {:?}", vertices.len(), buffer);
            Ok(buffer)
        }
    }

    fn vertex_attrib_pointer(&mut self, index: u32, components: i32, stride: i32, offset: i32) {
        let float = mem::size_of::<f32>() as i32;
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, stride * float, offset * float);
            self.gl.enable_vertex_attrib_array(index);
        }
    }

    fn set_uniform_matrix4(&mut self, location: &glow::UniformLocation, m: &Mat4) {
        unsafe { self.gl.uniform_matrix_4_f32_slice(Some(location), false, m) }
    }

    fn set_uniform_vec4(&mut self, location: &glow::UniformLocation, color: Color) {
        unsafe { self.gl.uniform_4_f32_slice(Some(location), &color.to_array()) }
    }

    fn viewport(&mut self, viewport: Viewport) {
        unsafe { self.gl.viewport(0, 0, viewport.width as i32, viewport.height as i32) }
    }

    fn clear(&mut self, color: Color) {
        unsafe {
            self.gl.clear_color(color.r, color.g, color.b, color.a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn enable_alpha_blend(&mut self) {
        unsafe {
            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
    }

    fn draw_triangle_fan(&mut self, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLE_FAN, first, count) }
    }

    fn flush(&mut self) {
        unsafe { self.gl.flush() }
    }

    fn get_error(&mut self) -> Option<GlError> {
        GlError::from_code(unsafe { self.gl.get_error() })
    }
}

fn create_opengl_context(
    window: &Window,
    vsync_enabled: bool,
) -> Result<(Surface<WindowSurface>, PossiblyCurrentContext, glow::Context, bool), Box<dyn Error>> {
    let display_handle = window.display_handle()?.as_raw();
    let raw_window_handle = window.window_handle()?.as_raw();

    #[cfg(target_os = "windows")]
    let preference = DisplayApiPreference::Wgl(Some(raw_window_handle));
    #[cfg(target_os = "macos")]
    let preference = DisplayApiPreference::Cgl;
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let preference = DisplayApiPreference::Egl;

    let display = unsafe { Display::new(display_handle, preference)? };

    let template = ConfigTemplateBuilder::new().with_alpha_size(8).build();
    let config = unsafe { display.find_configs(template)?.next() }
        .ok_or("Failed to find a suitable GL config")?;

    let (width, height): (u32, u32) = window.inner_size().into();
    let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        NonZeroU32::new(width).unwrap_or(NonZeroU32::MIN),
        NonZeroU32::new(height).unwrap_or(NonZeroU32::MIN),
    );
    let surface = unsafe { display.create_window_surface(&config, &surface_attributes)? };

    let gles_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(Some(Version::new(2, 0))))
        .build(Some(raw_window_handle));
    let (context, is_gles) = match unsafe { display.create_context(&config, &gles_attributes) } {
        Ok(context) => (context, true),
        Err(e) => {
            warn!("OpenGL ES 2.0 context unavailable ({}); falling back to desktop GL.", e);
            let desktop_attributes = ContextAttributesBuilder::new().build(Some(raw_window_handle));
            (unsafe { display.create_context(&config, &desktop_attributes)? }, false)
        }
    };
    let context = context.make_current(&surface)?;

    let interval = if vsync_enabled {
        SwapInterval::Wait(NonZeroU32::MIN)
    } else {
        SwapInterval::DontWait
    };
    match surface.set_swap_interval(&context, interval) {
        Ok(()) => info!("VSync {}", if vsync_enabled { "on" } else { "off" }),
        Err(e) => warn!("Failed to set swap interval: {}. VSync state may not be as requested.", e),
    }

    let gl = unsafe { glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s)) };
    Ok((surface, context, gl, is_gles))
}
