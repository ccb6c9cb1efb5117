//! The subset of the glTF JSON document the loader consumes.
//!
//! Numeric type fields are kept as raw codes here; they are checked against
//! the closed tables in [`crate::resource::glb::accessor`] when resolved.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::LoadError;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub accessors: Vec<Accessor>,
    #[serde(default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub textures: Vec<Texture>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
}

impl Document {
    pub fn accessor(&self, index: usize) -> Result<&Accessor, LoadError> {
        self.accessors
            .get(index)
            .ok_or_else(|| LoadError::missing("accessor", index))
    }

    pub fn buffer_view(&self, index: usize) -> Result<&BufferView, LoadError> {
        self.buffer_views
            .get(index)
            .ok_or_else(|| LoadError::missing("buffer view", index))
    }

    pub fn image(&self, index: usize) -> Result<&Image, LoadError> {
        self.images
            .get(index)
            .ok_or_else(|| LoadError::missing("image", index))
    }

    pub fn texture(&self, index: usize) -> Result<&Texture, LoadError> {
        self.textures
            .get(index)
            .ok_or_else(|| LoadError::missing("texture", index))
    }

    pub fn material(&self, index: usize) -> Result<&Material, LoadError> {
        self.materials
            .get(index)
            .ok_or_else(|| LoadError::missing("material", index))
    }

    pub fn mesh(&self, index: usize) -> Result<&Mesh, LoadError> {
        self.meshes
            .get(index)
            .ok_or_else(|| LoadError::missing("mesh", index))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
    #[serde(rename = "type")]
    pub type_: String,
    pub count: usize,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    #[serde(default)]
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
}

impl BufferView {
    /// The only buffer a GLB can hold: the container's binary chunk.
    pub const EMBEDDED_BUFFER: usize = 0;
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub buffer_view: Option<usize>,
    pub mime_type: Option<String>,
    pub uri: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Texture {
    pub source: Option<usize>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
}

impl Material {
    pub fn base_color_texture(&self) -> Option<usize> {
        self.pbr_metallic_roughness
            .as_ref()
            .and_then(|pbr| pbr.base_color_texture.as_ref())
            .map(|info| info.index)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    pub base_color_texture: Option<TextureInfo>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TextureInfo {
    pub index: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Mesh {
    pub primitives: Vec<Primitive>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Primitive {
    pub attributes: BTreeMap<String, usize>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    pub mode: Option<u32>,
}

impl Primitive {
    pub const POSITION: &'static str = "POSITION";
    pub const TEX_COORD_0: &'static str = "TEXCOORD_0";
    pub const MODE_TRIANGLES: u32 = 4;

    pub fn position(&self) -> Option<usize> {
        self.attributes.get(Self::POSITION).copied()
    }

    pub fn tex_coord_0(&self) -> Option<usize> {
        self.attributes.get(Self::TEX_COORD_0).copied()
    }

    /// The topology code, triangles when absent.
    pub fn mode(&self) -> u32 {
        self.mode.unwrap_or(Self::MODE_TRIANGLES)
    }
}
