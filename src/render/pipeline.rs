use crate::render::device::WgpuDevice;
use crate::render::primitive::Primitive;
use crate::render::texture::DepthTexture2DPackage;

pub struct RenderPipeline {
    pub gpu_pipeline: wgpu::RenderPipeline,
}

impl RenderPipeline {
    pub fn from_config(
        config: RenderPipelineConfiguration,
        name: String,
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        vertex_shader_module: &wgpu::ShaderModule,
        fragment_shader_module: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
    ) -> Self {
        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{name}_RENDER_PIPELINE_LAYOUT")),
                bind_group_layouts,
                push_constant_ranges: &[],
            });

        let vertex_attributes = config.vertex_attributes();
        let vertex_buffer_layouts: Vec<wgpu::VertexBufferLayout> = vertex_attributes
            .iter()
            .map(|attribute| wgpu::VertexBufferLayout {
                array_stride: attribute.format.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: std::slice::from_ref(attribute),
            })
            .collect();

        let gpu_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{name}_RENDER_PIPELINE")),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: vertex_shader_module,
                entry_point: "vs_main",
                buffers: &vertex_buffer_layouts,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment_shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent::REPLACE,
                        alpha: wgpu::BlendComponent::REPLACE,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Materials are not read, so doubleSided is unknown.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthTexture2DPackage::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Self { gpu_pipeline }
    }
}

/// The vertex inputs a pipeline is compiled for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RenderPipelineConfiguration {
    pub has_tex_coord_0: bool,
}

impl RenderPipelineConfiguration {
    pub const ALL: [RenderPipelineConfiguration; 2] = [
        RenderPipelineConfiguration {
            has_tex_coord_0: false,
        },
        RenderPipelineConfiguration {
            has_tex_coord_0: true,
        },
    ];

    pub fn from_primitive(primitive: &Primitive<WgpuDevice>) -> Self {
        Self {
            has_tex_coord_0: primitive.has_tex_coord_0(),
        }
    }

    pub fn get_tex_coord_0_location(&self) -> u32 {
        match self.has_tex_coord_0 {
            true => 1,
            false => 0,
        }
    }

    /// One attribute per vertex buffer slot, in slot order.
    pub fn vertex_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        let mut attributes = vec![wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }];

        if self.has_tex_coord_0 {
            attributes.push(wgpu::VertexAttribute {
                offset: 0,
                shader_location: self.get_tex_coord_0_location(),
                format: wgpu::VertexFormat::Float32x2,
            });
        }

        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_attributes_match_draw_slots() {
        let untextured = RenderPipelineConfiguration {
            has_tex_coord_0: false,
        };
        let attributes = untextured.vertex_attributes();
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].format.size(), 12);

        let textured = RenderPipelineConfiguration {
            has_tex_coord_0: true,
        };
        let attributes = textured.vertex_attributes();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[1].shader_location, 1);
        assert_eq!(attributes[1].format.size(), 8);
    }
}
