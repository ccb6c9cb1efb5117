use std::collections::HashMap;

use anyhow::Result;

use crate::error::Error;
use crate::render::camera::ViewUniform;
use crate::render::device::WgpuDevice;
use crate::render::pipeline::{RenderPipeline, RenderPipelineConfiguration};
use crate::render::shader::{create_shader_templates, ShaderModulePackage, ShaderTemplateConfiguration};
use crate::render::texture::{DepthTexture2DPackage, Texture};
use crate::resource::glb::image::Bitmap;

pub struct RenderSystemState {
    #[allow(dead_code)]
    pub instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    #[allow(dead_code)]
    pub adapter: wgpu::Adapter,
    pub device: std::rc::Rc<wgpu::Device>,
    pub queue: std::rc::Rc<wgpu::Queue>,
    pub gpu_device: WgpuDevice,
    pub material_bind_group_layout: wgpu::BindGroupLayout,
    pub depth_texture: DepthTexture2DPackage,
    pub render_pipeline_registry: HashMap<RenderPipelineConfiguration, RenderPipeline>,
    pub default_sampler: wgpu::Sampler,
    pub default_texture: Texture<WgpuDevice>,
    pub gpu_view_uniform_buffer: wgpu::Buffer,
    pub gpu_view_bind_group: wgpu::BindGroup,
    pub view_dimensions: winit::dpi::PhysicalSize<u32>,
}

impl RenderSystemState {
    pub async fn from_window(window: std::sync::Arc<winit::window::Window>) -> Result<Self> {
        let view_dimensions = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Some(adapter) => adapter,
            None => return Err(Error::new(String::from("Failed to retrieve adapter.")).into()),
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: if cfg!(target_arch = "wasm32") {
                        wgpu::Limits::downlevel_webgl2_defaults()
                    } else {
                        wgpu::Limits::default()
                    },
                    label: None,
                    ..Default::default()
                },
                None,
            )
            .await?;

        let device = std::rc::Rc::new(device);
        let queue = std::rc::Rc::new(queue);
        let gpu_device = WgpuDevice::new(device.clone(), queue.clone());

        let surface_caps = surface.get_capabilities(&adapter);

        // Base color texels are stored as Rgba8Unorm and pass through
        // unconverted, so the surface must not apply an sRGB encode.
        let surface_format = match surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
        {
            Some(format) => *format,
            None => {
                return Err(
                    Error::new(String::from("The surface supports no texture formats.")).into(),
                )
            }
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: view_dimensions.width.max(1),
            height: view_dimensions.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        let view_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("VIEW_BIND_GROUP_LAYOUT"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("MATERIAL_BIND_GROUP_LAYOUT"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let gpu_view_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("VIEW_UNIFORM_BUFFER"),
            size: std::mem::size_of::<ViewUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let gpu_view_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("VIEW_BIND_GROUP"),
            layout: &view_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: gpu_view_uniform_buffer.as_entire_binding(),
            }],
        });

        let depth_texture = DepthTexture2DPackage::from_device(
            &device,
            surface_config.width,
            surface_config.height,
        );

        let tera = create_shader_templates()?;

        let mut render_pipeline_registry = HashMap::new();
        for (index, config) in RenderPipelineConfiguration::ALL.into_iter().enumerate() {
            let name = format!("RENDER_PIPELINE_{index}");

            log::debug!("Creating render pipeline for config: {config:?}");

            let shader_module_package = ShaderModulePackage::from_templates(
                &name,
                &device,
                &tera,
                &ShaderTemplateConfiguration::from_render_pipeline_config(&config),
            )?;

            render_pipeline_registry.insert(
                config,
                RenderPipeline::from_config(
                    config,
                    name,
                    &device,
                    &[&view_bind_group_layout, &material_bind_group_layout],
                    &shader_module_package.vertex_shader_module,
                    &shader_module_package.fragment_shader_module,
                    surface_format,
                ),
            );
        }

        let default_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("DEFAULT_SAMPLER"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let default_texture = Texture::from_bitmap(
            &gpu_device,
            &Bitmap::from_rgba_image(image::RgbaImage::from_pixel(
                1,
                1,
                image::Rgba([255, 255, 255, 255]),
            )),
            "DEFAULT_TEXTURE",
        )
        .await?;

        Ok(Self {
            instance,
            surface,
            surface_config,
            adapter,
            device,
            queue,
            gpu_device,
            material_bind_group_layout,
            depth_texture,
            render_pipeline_registry,
            default_sampler,
            default_texture,
            gpu_view_uniform_buffer,
            gpu_view_bind_group,
            view_dimensions,
        })
    }

    pub fn set_view_dimensions(&mut self, view_dimensions: winit::dpi::PhysicalSize<u32>) {
        self.view_dimensions = view_dimensions;
        self.surface_config.width = view_dimensions.width;
        self.surface_config.height = view_dimensions.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_texture = DepthTexture2DPackage::from_device(
            &self.device,
            view_dimensions.width,
            view_dimensions.height,
        );
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }
}
