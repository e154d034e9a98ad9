use crate::config::{Config, WINDOW_TITLE};
use crate::core::gfx::backends::opengl;
use crate::core::gfx::shader::{ShaderError, PRECISION_HEADER};
use crate::core::input;
use crate::demo::{Demo, SetupError};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use log::{debug, error, info, warn};
use std::{error::Error, sync::Arc};

pub struct App {
    config: Config,
    window: Option<Arc<Window>>,
    backend: Option<opengl::State>,
    demo: Option<Demo<opengl::State>>,
    shown_fps: u32,
    // Set when the loop was stopped by a failure rather than by the user.
    fatal: Option<Box<dyn Error>>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            window: None,
            backend: None,
            demo: None,
            shown_fps: 0,
            fatal: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let window_attributes = Window::default_attributes()
            .with_title(format!("{} - {}", WINDOW_TITLE, self.config.demo.variant))
            .with_inner_size(PhysicalSize::new(self.config.display_width, self.config.display_height))
            .with_resizable(true);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let mut backend = opengl::init(&window, self.config.vsync)?;

        if !backend.is_gles() && self.config.demo.fragment_offset == 0 {
            warn!(
                "Running on desktop GL; if shaders fail to compile set [Demo] FragmentOffset={} to skip the precision header.",
                PRECISION_HEADER.len()
            );
        }

        let demo = Demo::setup(&mut backend, &self.config.demo).inspect_err(log_setup_error)?;

        self.window = Some(window);
        self.backend = Some(backend);
        self.demo = Some(demo);
        info!("Starting event loop...");
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: Box<dyn Error>) {
        error!("{}", e);
        self.fatal = Some(e);
        event_loop.exit();
    }

    #[inline(always)]
    fn update_fps_title(&mut self) {
        let (Some(window), Some(demo)) = (&self.window, &self.demo) else { return; };
        let fps = demo.fps();
        if fps != self.shown_fps {
            self.shown_fps = fps;
            window.set_title(&format!("{} - {} | {} FPS", WINDOW_TITLE, demo.variant(), fps));
        }
    }
}

fn log_setup_error(e: &SetupError) {
    match e {
        SetupError::Shader(ShaderError::Compile { stage, source, .. }) => {
            debug!("Rejected {} shader source:\n{}", stage, source);
        }
        SetupError::Shader(ShaderError::Link { vertex_source, fragment_source, .. }) => {
            debug!("Unlinked vertex shader source:\n{}", vertex_source);
            debug!("Unlinked fragment shader source:\n{}", fragment_source);
        }
        _ => {}
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_graphics(event_loop) {
                error!("Failed to initialize graphics.");
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref().cloned() else { return; };
        if window_id != window.id() { return; }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested. Shutting down.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(backend) = &mut self.backend {
                    backend.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.state != ElementState::Pressed || key_event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = key_event.physical_key else { return; };
                if code == KeyCode::Escape {
                    info!("Escape pressed. Shutting down.");
                    event_loop.exit();
                    return;
                }
                if let (Some(direction), Some(demo)) = (input::direction_from_keycode(code), self.demo.as_mut()) {
                    if demo.command(direction) {
                        debug!("Sprite at {:?}", demo.sprite());
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let size = window.inner_size();
                let (Some(backend), Some(demo)) = (self.backend.as_mut(), self.demo.as_mut()) else { return; };
                demo.update_frame(backend, size.width, size.height);
                if let Err(e) = backend.present() {
                    error!("Failed to present frame.");
                    self.fail(event_loop, e);
                    return;
                }
                self.update_fps_title();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

pub fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
