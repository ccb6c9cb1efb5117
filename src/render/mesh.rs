use crate::error::LoadError;
use crate::render::device::{GpuDevice, RenderPassEncoder};
use crate::render::primitive::Primitive;
use crate::resource::glb::GlbContainer;

/// The primitives of one mesh, in declaration order.
pub struct Mesh<D: GpuDevice> {
    name: Option<String>,
    primitives: Vec<Primitive<D>>,
}

impl<D: GpuDevice> Mesh<D> {
    pub async fn build(
        device: &D,
        container: &GlbContainer,
        mesh_index: usize,
    ) -> Result<Self, LoadError> {
        let mesh = container.document().mesh(mesh_index)?;

        let mesh_log_name = format!("{} - [{mesh_index}]", mesh.name.as_deref().unwrap_or("<UNNAMED>"));
        log::debug!("Loading glTF mesh: {mesh_log_name}");

        let mesh_label_prefix = format!(
            "MESH_{}_{mesh_index}",
            mesh.name.as_deref().unwrap_or("<UNNAMED>")
        );

        let mut primitives = Vec::with_capacity(mesh.primitives.len());

        for (primitive_index, descriptor) in mesh.primitives.iter().enumerate() {
            log::debug!("Loading glTF primitive {primitive_index} for glTF mesh: {mesh_log_name}");

            primitives.push(Primitive::build(
                device,
                container,
                mesh_index,
                primitive_index,
                descriptor,
                format!("{mesh_label_prefix}_PRIMITIVE_{primitive_index}"),
            )
            .await?);
        }

        Ok(Self {
            name: mesh.name.clone(),
            primitives,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn primitives(&self) -> &[Primitive<D>] {
        &self.primitives
    }

    pub fn draw<P: RenderPassEncoder<D>>(&self, pass: &mut P) {
        for primitive in &self.primitives {
            primitive.draw(pass);
        }
    }
}
