use std::collections::BTreeMap;
use std::future::Future;

use futures::stream::{self, StreamExt};

use crate::error::LoadError;
use crate::render::device::{GpuDevice, RenderPassEncoder};
use crate::render::mesh::Mesh;
use crate::render::texture::Texture;
use crate::resource::glb::image::{decode_image_async, Bitmap};
use crate::resource::glb::GlbContainer;

/// Upper bound on images being decoded at the same time.
pub const MAX_CONCURRENT_DECODES: usize = 4;

/// Every mesh and texture of a GLB container, resident on the device.
pub struct GlbScene<D: GpuDevice> {
    meshes: Vec<Mesh<D>>,
    textures: Vec<Texture<D>>,
}

impl<D: GpuDevice> GlbScene<D> {
    /// Loads the whole container, or fails without exposing any of it.
    ///
    /// Each referenced image is decoded once, at most
    /// [`MAX_CONCURRENT_DECODES`] at a time, and the textures sampling it are
    /// built as soon as its bitmap is ready.
    pub async fn load(device: &D, container: &GlbContainer) -> Result<Self, LoadError> {
        Self::load_with(device, container, |image_index| {
            decode_image_async(container, image_index)
        })
        .await
    }

    pub(crate) async fn load_with<F, Fut>(
        device: &D,
        container: &GlbContainer,
        decode: F,
    ) -> Result<Self, LoadError>
    where
        F: Fn(usize) -> Fut,
        Fut: Future<Output = Result<Bitmap, LoadError>>,
    {
        let document = container.document();

        log::debug!(
            "Loading GLB scene: {} meshes, {} textures, {} images",
            document.meshes.len(),
            document.textures.len(),
            document.images.len(),
        );

        let mut textures_by_image: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (texture_index, texture) in document.textures.iter().enumerate() {
            let image_index = texture.source.ok_or(LoadError::MissingTextureSource {
                texture: texture_index,
            })?;

            textures_by_image
                .entry(image_index)
                .or_default()
                .push(texture_index);
        }

        let mut pending_bitmaps = stream::iter(textures_by_image)
            .map(|(image_index, texture_indices)| {
                let bitmap = decode(image_index);
                async move { (texture_indices, bitmap.await) }
            })
            .buffer_unordered(MAX_CONCURRENT_DECODES);

        let mut textures: Vec<Option<Texture<D>>> =
            document.textures.iter().map(|_| None).collect();

        while let Some((texture_indices, bitmap)) = pending_bitmaps.next().await {
            let bitmap = bitmap?;

            for texture_index in texture_indices {
                let texture_name = document.textures[texture_index]
                    .name
                    .as_deref()
                    .unwrap_or("<UNNAMED>");
                log::debug!("Loading glTF texture: {texture_name} - [{texture_index}]");

                textures[texture_index] = Some(
                    Texture::from_bitmap(
                        device,
                        &bitmap,
                        &format!("TEXTURE_{texture_name}_{texture_index}"),
                    )
                    .await?,
                );
            }
        }

        let textures: Vec<Texture<D>> = textures.into_iter().flatten().collect();

        let mut meshes = Vec::with_capacity(document.meshes.len());
        for mesh_index in 0..document.meshes.len() {
            meshes.push(Mesh::build(device, container, mesh_index).await?);
        }

        Ok(Self { meshes, textures })
    }

    pub fn meshes(&self) -> &[Mesh<D>] {
        &self.meshes
    }

    /// Textures in declaration order.
    pub fn textures(&self) -> &[Texture<D>] {
        &self.textures
    }

    pub fn draw<P: RenderPassEncoder<D>>(&self, pass: &mut P) {
        for mesh in &self.meshes {
            mesh.draw(pass);
        }
    }
}
