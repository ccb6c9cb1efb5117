use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use winit::application::ApplicationHandler;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::args::{Args, ViewOptions};
use crate::view::ViewSystem;

pub struct App {
    event_loop_proxy: EventLoopProxy<UserEvent>,
    args: Args,
    view_system: Option<ViewSystem>,
    is_initializing: bool,
    start_time: Instant,
}

impl App {
    pub fn new(event_loop: &EventLoop<UserEvent>, args: Args) -> Self {
        App {
            event_loop_proxy: event_loop.create_proxy(),
            args,
            view_system: None,
            is_initializing: false,
            start_time: Instant::now(),
        }
    }

    pub fn create_event_loop() -> Result<EventLoop<UserEvent>, EventLoopError> {
        EventLoop::<UserEvent>::with_user_event().build()
    }

    fn create_window(event_loop: &ActiveEventLoop) -> Result<Window, OsError> {
        let window_attributes = Window::default_attributes().with_title("GLB Viewer");

        cfg_if::cfg_if! {
            if #[cfg(target_arch="wasm32")] {
                use winit::platform::web::WindowAttributesExtWebSys;
                event_loop.create_window(window_attributes.with_append(true))
            } else {
                event_loop.create_window(window_attributes)
            }
        }
    }

    async fn initialize_view_system(
        event_loop_proxy: EventLoopProxy<UserEvent>,
        window: Window,
        options: ViewOptions,
        glb_path: Option<PathBuf>,
    ) {
        let result = async {
            let mut view_system = ViewSystem::from_window(window, options).await?;

            if let Some(glb_path) = &glb_path {
                view_system
                    .load_glb(glb_path)
                    .await
                    .with_context(|| format!("Failed to load GLB file: {}", glb_path.display()))?;
            }

            anyhow::Ok(view_system)
        }
        .await;

        let event = match result {
            Ok(view_system) => UserEvent::ViewSystemReady(view_system),
            Err(error) => UserEvent::ViewSystemFailed(format!("{error:#}")),
        };

        if event_loop_proxy.send_event(event).is_err() {
            log::warn!("The event loop closed before the view system was ready");
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        log::info!("Application resumed");

        if self.view_system.is_some() || self.is_initializing {
            return;
        }

        let window = match App::create_window(event_loop) {
            Ok(window) => window,
            Err(error) => {
                log::error!("Failed to create a window: {error}");
                event_loop.exit();
                return;
            }
        };

        self.is_initializing = true;

        let future = App::initialize_view_system(
            self.event_loop_proxy.clone(),
            window,
            self.args.view,
            self.args.glb.clone(),
        );

        cfg_if::cfg_if! {
            if #[cfg(target_arch="wasm32")] {
                wasm_bindgen_futures::spawn_local(future);
            } else {
                pollster::block_on(future);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let view_system = match &mut self.view_system {
            Some(view_system) => view_system,
            None => return,
        };

        if view_system.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                view_system.render_system.set_view_dimensions(new_size)
            }
            WindowEvent::RedrawRequested => {
                let elapsed = Instant::now() - self.start_time;

                if let Err(error) = view_system.update_view(elapsed) {
                    match error.downcast_ref::<wgpu::SurfaceError>() {
                        Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            view_system.render_system.sync_view_dimensions()
                        }
                        Some(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("OutOfMemory");
                            event_loop.exit();
                        }
                        Some(wgpu::SurfaceError::Timeout) => {
                            log::warn!("Surface timeout");
                        }
                        None => log::error!("Failed to render: {error:#}"),
                    }
                }

                view_system.window.request_redraw();
            }
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        self.is_initializing = false;

        match event {
            UserEvent::ViewSystemReady(view_system) => {
                log::info!("View system created");

                view_system.window.request_redraw();
                self.view_system = Some(view_system);
                self.start_time = Instant::now();
            }
            UserEvent::ViewSystemFailed(message) => {
                log::error!("{message}");
                event_loop.exit();
            }
        }
    }
}

pub enum UserEvent {
    ViewSystemReady(ViewSystem),
    ViewSystemFailed(String),
}
