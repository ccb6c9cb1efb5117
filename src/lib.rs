use crate::app::App;
use crate::args::Args;

mod app;
pub mod args;
pub mod error;
pub mod render;
pub mod resource;
#[cfg(test)]
mod testing;
mod view;

pub fn run(args: Args) {
    cfg_if::cfg_if! {
        if #[cfg(target_arch="wasm32")] {
            console_error_panic_hook::set_once();
            // Without a logger there is nowhere to report the failure.
            let _ = console_log::init_with_level(log::Level::Info);
        } else {
            env_logger::init();
        }
    }

    let event_loop = match App::create_event_loop() {
        Ok(event_loop) => event_loop,
        Err(error) => {
            log::error!("Failed to create the event loop: {error}");
            return;
        }
    };
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = App::new(&event_loop, args);

    cfg_if::cfg_if! {
        if #[cfg(target_arch="wasm32")] {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
        } else {
            if let Err(error) = event_loop.run_app(&mut app) {
                log::error!("The event loop stopped with an error: {error}");
            }
        }
    }
}
