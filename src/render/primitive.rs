use crate::error::LoadError;
use crate::render::buffer::{build_buffer, build_index_buffer, BufferKind, GeometryBuffer, IndexBuffer};
use crate::render::device::{GpuDevice, RenderPassEncoder};
use crate::resource::glb::accessor::{resolve_accessor, ComponentType, ElementType};
use crate::resource::glb::document;
use crate::resource::glb::GlbContainer;

/// One draw-ready unit of geometry.
pub struct Primitive<D: GpuDevice> {
    label: String,
    position_buffer: GeometryBuffer<D::Buffer>,
    tex_coord_0_buffer: Option<GeometryBuffer<D::Buffer>>,
    index_buffer: Option<IndexBuffer<D::Buffer>>,
    vertex_count: u32,
    base_color_texture: Option<usize>,
}

impl<D: GpuDevice> Primitive<D> {
    /// Resolves every accessor the primitive uses, then uploads them.
    ///
    /// Nothing is allocated on the device unless all accessors resolve.
    pub async fn build(
        device: &D,
        container: &GlbContainer,
        mesh_index: usize,
        primitive_index: usize,
        descriptor: &document::Primitive,
        label: String,
    ) -> Result<Self, LoadError> {
        let document = container.document();

        if descriptor.mode() != document::Primitive::MODE_TRIANGLES {
            return Err(LoadError::UnsupportedTopology {
                mesh: mesh_index,
                primitive: primitive_index,
                mode: descriptor.mode(),
            });
        }

        let position_index = descriptor.position().ok_or(LoadError::MissingPosition {
            mesh: mesh_index,
            primitive: primitive_index,
        })?;
        let position = resolve_accessor(document, position_index)?;
        position.expect_layout(ElementType::Vec3, ComponentType::Float, "VEC3 FLOAT positions")?;

        let vertex_count = u32::try_from(position.count).map_err(|_| {
            LoadError::overflow(format!("the vertex count of accessor {position_index}"))
        })?;

        let tex_coord_0 = match descriptor.tex_coord_0() {
            Some(tex_coord_0_index) => {
                let tex_coord_0 = resolve_accessor(document, tex_coord_0_index)?;
                tex_coord_0.expect_layout(
                    ElementType::Vec2,
                    ComponentType::Float,
                    "VEC2 FLOAT texture coordinates",
                )?;

                if tex_coord_0.count != position.count {
                    return Err(LoadError::UnexpectedAccessorLayout {
                        accessor: tex_coord_0_index,
                        expected: "one texture coordinate per position",
                        found: format!(
                            "{} texture coordinates for {} positions",
                            tex_coord_0.count, position.count
                        ),
                    });
                }

                Some(tex_coord_0)
            }
            None => None,
        };

        let indices = match descriptor.indices {
            Some(indices_index) => Some(resolve_accessor(document, indices_index)?),
            None => None,
        };

        let base_color_texture = match descriptor.material {
            Some(material_index) => match document.material(material_index)?.base_color_texture() {
                Some(texture_index) => {
                    document.texture(texture_index)?;
                    Some(texture_index)
                }
                None => None,
            },
            None => None,
        };

        let position_buffer = build_buffer(
            device,
            container,
            position.range,
            BufferKind::Vertex,
            &format!("{label}_POSITION_BUFFER"),
        )
        .await?;

        let tex_coord_0_buffer = match tex_coord_0 {
            Some(tex_coord_0) => Some(build_buffer(
                device,
                container,
                tex_coord_0.range,
                BufferKind::Vertex,
                &format!("{label}_TEXCOORD_0_BUFFER"),
            )
            .await?),
            None => None,
        };

        let index_buffer = match indices {
            Some(indices) => Some(build_index_buffer(
                device,
                container,
                &indices,
                &format!("{label}_INDEX_BUFFER"),
            )
            .await?),
            None => None,
        };

        Ok(Self {
            label,
            position_buffer,
            tex_coord_0_buffer,
            index_buffer,
            vertex_count,
            base_color_texture,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn position_buffer(&self) -> &GeometryBuffer<D::Buffer> {
        &self.position_buffer
    }

    pub fn tex_coord_0_buffer(&self) -> Option<&GeometryBuffer<D::Buffer>> {
        self.tex_coord_0_buffer.as_ref()
    }

    pub fn has_tex_coord_0(&self) -> bool {
        self.tex_coord_0_buffer.is_some()
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer<D::Buffer>> {
        self.index_buffer.as_ref()
    }

    /// Index of the texture sampled for the base color, if the material has one.
    pub fn base_color_texture(&self) -> Option<usize> {
        self.base_color_texture
    }

    /// Positions go to slot 0 and texture coordinates to slot 1.
    pub fn draw<P: RenderPassEncoder<D>>(&self, pass: &mut P) {
        pass.bind_primitive(self);

        pass.set_vertex_buffer(0, self.position_buffer.gpu_buffer());
        if let Some(tex_coord_0_buffer) = &self.tex_coord_0_buffer {
            pass.set_vertex_buffer(1, tex_coord_0_buffer.gpu_buffer());
        }

        match &self.index_buffer {
            Some(index_buffer) => {
                pass.set_index_buffer(index_buffer.buffer().gpu_buffer(), index_buffer.format());
                pass.draw_indexed(0..index_buffer.count());
            }
            None => pass.draw(0..self.vertex_count),
        }
    }
}
