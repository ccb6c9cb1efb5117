//! In-memory fixtures and a recording device for the loader's tests.

use std::cell::{Cell, RefCell};
use std::ops::Range;

use serde_json::{json, Value};

use crate::error::LoadError;
use crate::render::device::{GpuDevice, RenderPassEncoder};
use crate::render::primitive::Primitive;
use crate::resource::glb::{CHUNK_TYPE_BIN, CHUNK_TYPE_JSON, MAGIC, VERSION};

pub const TRIANGLE_JSON: &str = r#"{"accessors":[{"bufferView":0,"componentType":5126,"type":"VEC3","count":3}],"bufferViews":[{"buffer":0,"byteLength":36}],"meshes":[{"primitives":[{"attributes":{"POSITION":0}}]}]}"#;

pub const TRIANGLE_POSITIONS: [[f32; 3]; 3] = [[0.0, 0.5, 0.0], [-0.5, -0.5, 0.0], [0.5, -0.5, 0.0]];

/// One mesh with a single non-indexed triangle.
pub fn triangle_glb() -> Vec<u8> {
    encode_glb(TRIANGLE_JSON, bytemuck::cast_slice(&TRIANGLE_POSITIONS))
}

pub fn encode_glb(json: &str, bin: &[u8]) -> Vec<u8> {
    encode_glb_with(MAGIC, VERSION, CHUNK_TYPE_JSON, CHUNK_TYPE_BIN, json, bin)
}

/// Writes the chunks exactly as given, without padding.
pub fn encode_glb_with(
    magic: u32,
    version: u32,
    json_type: u32,
    bin_type: u32,
    json: &str,
    bin: &[u8],
) -> Vec<u8> {
    let total_length = 12 + 8 + json.len() + 8 + bin.len();

    let mut bytes = Vec::with_capacity(total_length);
    bytes.extend_from_slice(&magic.to_le_bytes());
    bytes.extend_from_slice(&version.to_le_bytes());
    bytes.extend_from_slice(&(total_length as u32).to_le_bytes());

    bytes.extend_from_slice(&(json.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&json_type.to_le_bytes());
    bytes.extend_from_slice(json.as_bytes());

    bytes.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&bin_type.to_le_bytes());
    bytes.extend_from_slice(bin);

    bytes
}

/// A solid-color PNG.
pub fn encode_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));

    let mut cursor = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// Builds a GLB from typed pieces; every piece gets its own buffer view.
#[derive(Default)]
pub struct GlbBuilder {
    payload: Vec<u8>,
    accessors: Vec<Value>,
    buffer_views: Vec<Value>,
    images: Vec<Value>,
    textures: Vec<Value>,
    materials: Vec<Value>,
    meshes: Vec<Value>,
}

impl GlbBuilder {
    fn buffer_view(&mut self, data: &[u8]) -> usize {
        while self.payload.len() % 4 != 0 {
            self.payload.push(0);
        }

        self.buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": self.payload.len(),
            "byteLength": data.len(),
        }));
        self.payload.extend_from_slice(data);

        self.buffer_views.len() - 1
    }

    pub fn accessor(
        &mut self,
        data: &[u8],
        component_type: u32,
        type_: &str,
        count: usize,
    ) -> usize {
        let buffer_view = self.buffer_view(data);

        self.accessors.push(json!({
            "bufferView": buffer_view,
            "componentType": component_type,
            "type": type_,
            "count": count,
        }));

        self.accessors.len() - 1
    }

    pub fn positions(&mut self, positions: &[[f32; 3]]) -> usize {
        self.accessor(bytemuck::cast_slice(positions), 5126, "VEC3", positions.len())
    }

    pub fn tex_coords(&mut self, tex_coords: &[[f32; 2]]) -> usize {
        self.accessor(bytemuck::cast_slice(tex_coords), 5126, "VEC2", tex_coords.len())
    }

    pub fn indices_u16(&mut self, indices: &[u16]) -> usize {
        self.accessor(bytemuck::cast_slice(indices), 5123, "SCALAR", indices.len())
    }

    pub fn indices_u32(&mut self, indices: &[u32]) -> usize {
        self.accessor(bytemuck::cast_slice(indices), 5125, "SCALAR", indices.len())
    }

    pub fn image(&mut self, data: &[u8], mime_type: Option<&str>) -> usize {
        let buffer_view = self.buffer_view(data);

        self.images.push(match mime_type {
            Some(mime_type) => json!({ "bufferView": buffer_view, "mimeType": mime_type }),
            None => json!({ "bufferView": buffer_view }),
        });

        self.images.len() - 1
    }

    /// A texture sourcing a new solid-color PNG image.
    pub fn png_texture(&mut self, width: u32, height: u32, rgba: [u8; 4]) -> usize {
        let image = self.image(&encode_png(width, height, rgba), Some("image/png"));
        self.texture(Some(image))
    }

    pub fn texture(&mut self, source: Option<usize>) -> usize {
        self.textures.push(match source {
            Some(source) => json!({ "source": source }),
            None => json!({}),
        });

        self.textures.len() - 1
    }

    pub fn material(&mut self, base_color_texture: Option<usize>) -> usize {
        self.materials.push(match base_color_texture {
            Some(index) => json!({
                "pbrMetallicRoughness": { "baseColorTexture": { "index": index } }
            }),
            None => json!({ "pbrMetallicRoughness": {} }),
        });

        self.materials.len() - 1
    }

    pub fn mesh(&mut self, name: Option<&str>, primitives: Vec<Value>) -> usize {
        self.meshes.push(match name {
            Some(name) => json!({ "name": name, "primitives": primitives }),
            None => json!({ "primitives": primitives }),
        });

        self.meshes.len() - 1
    }

    pub fn json(&self) -> String {
        json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": self.payload.len() }],
            "accessors": self.accessors,
            "bufferViews": self.buffer_views,
            "images": self.images,
            "textures": self.textures,
            "materials": self.materials,
            "meshes": self.meshes,
        })
        .to_string()
    }

    pub fn build(&self) -> Vec<u8> {
        encode_glb(&self.json(), &self.payload)
    }
}

/// A primitive entry for [`GlbBuilder::mesh`].
pub fn primitive_json(
    position: usize,
    tex_coord_0: Option<usize>,
    indices: Option<usize>,
    material: Option<usize>,
) -> Value {
    let mut attributes = json!({ "POSITION": position });
    if let Some(tex_coord_0) = tex_coord_0 {
        attributes["TEXCOORD_0"] = json!(tex_coord_0);
    }

    let mut primitive = json!({ "attributes": attributes });
    if let Some(indices) = indices {
        primitive["indices"] = json!(indices);
    }
    if let Some(material) = material {
        primitive["material"] = json!(material);
    }

    primitive
}

#[derive(Debug)]
pub struct MockBuffer {
    pub label: String,
    pub contents: Vec<u8>,
    pub usage: wgpu::BufferUsages,
}

#[derive(Debug)]
pub struct MockTexture {
    pub id: usize,
    pub label: String,
    pub size: wgpu::Extent3d,
    pub format: wgpu::TextureFormat,
}

#[derive(Debug)]
pub struct MockTextureView {
    pub texture: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextureWrite {
    pub texture: usize,
    pub byte_length: usize,
    pub bytes_per_row: u32,
    pub size: wgpu::Extent3d,
}

/// A [`GpuDevice`] that keeps every allocation in host memory.
///
/// With an allocation limit, allocations past the limit are rejected the way
/// an exhausted device would reject them.
#[derive(Default)]
pub struct RecordingDevice {
    allocation_limit: Option<usize>,
    allocations: Cell<usize>,
    texture_writes: RefCell<Vec<TextureWrite>>,
}

impl RecordingDevice {
    pub fn with_allocation_limit(allocation_limit: usize) -> Self {
        Self {
            allocation_limit: Some(allocation_limit),
            ..Default::default()
        }
    }

    pub fn allocation_count(&self) -> usize {
        self.allocations.get()
    }

    pub fn texture_writes(&self) -> Vec<TextureWrite> {
        self.texture_writes.borrow().clone()
    }

    fn allocate(&self, label: &str) -> Result<usize, LoadError> {
        let id = self.allocations.get();

        if let Some(limit) = self.allocation_limit {
            if id >= limit {
                return Err(LoadError::DeviceResource {
                    label: label.to_string(),
                    message: String::from("out of memory"),
                });
            }
        }

        self.allocations.set(id + 1);
        Ok(id)
    }
}

impl GpuDevice for RecordingDevice {
    type Buffer = MockBuffer;
    type Texture = MockTexture;
    type TextureView = MockTextureView;

    async fn create_buffer_init(
        &self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Result<Self::Buffer, LoadError> {
        self.allocate(label)?;

        Ok(MockBuffer {
            label: label.to_string(),
            contents: contents.to_vec(),
            usage,
        })
    }

    async fn create_texture(
        &self,
        label: &str,
        size: wgpu::Extent3d,
        format: wgpu::TextureFormat,
    ) -> Result<Self::Texture, LoadError> {
        Ok(MockTexture {
            id: self.allocate(label)?,
            label: label.to_string(),
            size,
            format,
        })
    }

    async fn write_texture(
        &self,
        texture: &Self::Texture,
        data: &[u8],
        bytes_per_row: u32,
        size: wgpu::Extent3d,
    ) -> Result<(), LoadError> {
        self.texture_writes.borrow_mut().push(TextureWrite {
            texture: texture.id,
            byte_length: data.len(),
            bytes_per_row,
            size,
        });

        Ok(())
    }

    fn create_texture_view(&self, texture: &Self::Texture) -> Self::TextureView {
        MockTextureView {
            texture: texture.id,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DrawCommand {
    BindPrimitive(String),
    SetVertexBuffer { slot: u32, label: String },
    SetIndexBuffer { label: String, format: wgpu::IndexFormat },
    Draw(Range<u32>),
    DrawIndexed(Range<u32>),
}

/// A render pass that records what it is asked to do.
#[derive(Default)]
pub struct RecordingPass {
    pub commands: Vec<DrawCommand>,
}

impl RecordingPass {
    /// The labels of the primitives bound so far, in order.
    pub fn bound_primitives(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::BindPrimitive(label) => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl RenderPassEncoder<RecordingDevice> for RecordingPass {
    fn bind_primitive(&mut self, primitive: &Primitive<RecordingDevice>) {
        self.commands
            .push(DrawCommand::BindPrimitive(primitive.label().to_string()));
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &MockBuffer) {
        self.commands.push(DrawCommand::SetVertexBuffer {
            slot,
            label: buffer.label.clone(),
        });
    }

    fn set_index_buffer(&mut self, buffer: &MockBuffer, format: wgpu::IndexFormat) {
        self.commands.push(DrawCommand::SetIndexBuffer {
            label: buffer.label.clone(),
            format,
        });
    }

    fn draw(&mut self, vertices: Range<u32>) {
        self.commands.push(DrawCommand::Draw(vertices));
    }

    fn draw_indexed(&mut self, indices: Range<u32>) {
        self.commands.push(DrawCommand::DrawIndexed(indices));
    }
}
