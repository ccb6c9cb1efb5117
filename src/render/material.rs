use crate::render::device::WgpuDevice;
use crate::render::primitive::Primitive;
use crate::render::scene::GlbScene;
use crate::render::texture::Texture;

/// One base color bind group per scene texture, plus the fallback.
pub struct MaterialBindGroups {
    default_bind_group: wgpu::BindGroup,
    texture_bind_groups: Vec<wgpu::BindGroup>,
}

impl MaterialBindGroups {
    pub fn from_scene(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        default_texture: &Texture<WgpuDevice>,
        scene: &GlbScene<WgpuDevice>,
    ) -> Self {
        let default_bind_group =
            Self::create_bind_group(device, layout, sampler, default_texture, "DEFAULT");

        let texture_bind_groups = scene
            .textures()
            .iter()
            .enumerate()
            .map(|(texture_index, texture)| {
                Self::create_bind_group(
                    device,
                    layout,
                    sampler,
                    texture,
                    &format!("TEXTURE_{texture_index}"),
                )
            })
            .collect();

        Self {
            default_bind_group,
            texture_bind_groups,
        }
    }

    /// Untextured primitives and primitives without texture coordinates
    /// sample the white fallback.
    pub fn for_primitive(&self, primitive: &Primitive<WgpuDevice>) -> &wgpu::BindGroup {
        if !primitive.has_tex_coord_0() {
            return &self.default_bind_group;
        }

        primitive
            .base_color_texture()
            .and_then(|texture_index| self.texture_bind_groups.get(texture_index))
            .unwrap_or(&self.default_bind_group)
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        texture: &Texture<WgpuDevice>,
        name: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{name}_MATERIAL_BIND_GROUP")),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.gpu_texture_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }
}
