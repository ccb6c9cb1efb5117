use std::collections::HashMap;
use std::ops::Range;

use anyhow::Result;

use crate::render::camera::TurntableCamera;
use crate::render::device::{RenderPassEncoder, WgpuDevice};
use crate::render::material::MaterialBindGroups;
use crate::render::pipeline::{RenderPipeline, RenderPipelineConfiguration};
use crate::render::primitive::Primitive;
use crate::render::scene::GlbScene;
use crate::render::state::RenderSystemState;
use crate::resource::glb::GlbContainer;

pub mod buffer;
mod camera;
pub mod device;
mod material;
pub mod mesh;
mod pipeline;
pub mod primitive;
pub mod scene;
mod shader;
mod state;
pub mod texture;

struct LoadedScene {
    scene: GlbScene<WgpuDevice>,
    materials: MaterialBindGroups,
}

pub struct RenderSystem {
    state: RenderSystemState,
    camera: TurntableCamera,
    loaded_scene: Option<LoadedScene>,
}

impl RenderSystem {
    pub async fn from_window(
        window: std::sync::Arc<winit::window::Window>,
        camera_distance: f32,
        rotation_speed: cgmath::Deg<f32>,
    ) -> Result<Self> {
        let state = RenderSystemState::from_window(window).await?;

        Ok(Self {
            state,
            camera: TurntableCamera::new(camera_distance, rotation_speed),
            loaded_scene: None,
        })
    }

    pub fn sync_view_dimensions(&mut self) {
        self.set_view_dimensions(self.state.view_dimensions);
    }

    pub fn set_view_dimensions(&mut self, view_dimensions: winit::dpi::PhysicalSize<u32>) {
        if view_dimensions.width == 0 || view_dimensions.height == 0 {
            return;
        }

        self.state.set_view_dimensions(view_dimensions);
    }

    /// Replaces the displayed scene. On failure the previous scene stays.
    pub async fn load_scene(&mut self, container: &GlbContainer) -> Result<()> {
        let scene = GlbScene::load(&self.state.gpu_device, container).await?;

        let materials = MaterialBindGroups::from_scene(
            &self.state.device,
            &self.state.material_bind_group_layout,
            &self.state.default_sampler,
            &self.state.default_texture,
            &scene,
        );

        log::info!(
            "Loaded GLB scene with {} meshes and {} textures",
            scene.meshes().len(),
            scene.textures().len()
        );

        self.loaded_scene = Some(LoadedScene { scene, materials });

        Ok(())
    }

    pub fn render(&mut self, elapsed: std::time::Duration) -> Result<()> {
        let view_uniform = self.camera.view_uniform(self.state.aspect_ratio(), elapsed);
        self.state.queue.write_buffer(
            &self.state.gpu_view_uniform_buffer,
            0,
            bytemuck::cast_slice(&[view_uniform]),
        );

        let output = self.state.surface.get_current_texture()?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.state
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("RENDER_SYSTEM_COMMAND_ENCODER"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("RENDER_SYSTEM_RENDER_PASS"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.state.depth_texture.gpu_texture_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(loaded_scene) = &self.loaded_scene {
                render_pass.set_bind_group(0, &self.state.gpu_view_bind_group, &[]);

                let mut scene_pass = ScenePass {
                    render_pass: &mut render_pass,
                    render_pipeline_registry: &self.state.render_pipeline_registry,
                    materials: &loaded_scene.materials,
                };
                loaded_scene.scene.draw(&mut scene_pass);
            }
        }

        self.state.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Draws loaded primitives into a wgpu render pass, selecting the pipeline
/// and material for each one as it is bound.
struct ScenePass<'a, 'encoder> {
    render_pass: &'a mut wgpu::RenderPass<'encoder>,
    render_pipeline_registry: &'a HashMap<RenderPipelineConfiguration, RenderPipeline>,
    materials: &'a MaterialBindGroups,
}

impl<'a, 'encoder> RenderPassEncoder<WgpuDevice> for ScenePass<'a, 'encoder> {
    fn bind_primitive(&mut self, primitive: &Primitive<WgpuDevice>) {
        let config = RenderPipelineConfiguration::from_primitive(primitive);

        if let Some(render_pipeline) = self.render_pipeline_registry.get(&config) {
            self.render_pass.set_pipeline(&render_pipeline.gpu_pipeline);
        }

        self.render_pass
            .set_bind_group(1, self.materials.for_primitive(primitive), &[]);
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &wgpu::Buffer) {
        self.render_pass.set_vertex_buffer(slot, buffer.slice(..));
    }

    fn set_index_buffer(&mut self, buffer: &wgpu::Buffer, format: wgpu::IndexFormat) {
        self.render_pass.set_index_buffer(buffer.slice(..), format);
    }

    fn draw(&mut self, vertices: Range<u32>) {
        self.render_pass.draw(vertices, 0..1);
    }

    fn draw_indexed(&mut self, indices: Range<u32>) {
        self.render_pass.draw_indexed(indices, 0, 0..1);
    }
}
