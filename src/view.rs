use std::path::Path;

use anyhow::Result;

use crate::args::ViewOptions;
use crate::render::RenderSystem;
use crate::resource::glb::GlbContainer;

pub struct ViewSystem {
    pub window: std::sync::Arc<winit::window::Window>,
    pub render_system: RenderSystem,
}

impl ViewSystem {
    pub async fn from_window(window: winit::window::Window, options: ViewOptions) -> Result<Self> {
        let window = std::sync::Arc::new(window);

        let render_system = RenderSystem::from_window(
            window.clone(),
            options.camera_distance,
            cgmath::Deg(options.rotation_speed),
        )
        .await?;

        Ok(Self {
            window,
            render_system,
        })
    }

    pub async fn load_glb(&mut self, glb_path: &Path) -> Result<()> {
        let container = GlbContainer::from_path(glb_path)?;
        self.render_system.load_scene(&container).await
    }

    pub fn update_view(&mut self, elapsed: std::time::Duration) -> Result<()> {
        self.render_system.render(elapsed)
    }
}
