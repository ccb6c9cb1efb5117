use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::error::LoadError;
use crate::render::primitive::Primitive;

/// The graphics device operations the asset loader needs.
///
/// Handles are opaque to the loader; they are created once and never
/// mutated afterwards. Fallible operations are async so that device errors
/// can be collected on every target, including the browser.
#[allow(async_fn_in_trait)]
pub trait GpuDevice {
    type Buffer;
    type Texture;
    type TextureView;

    /// Allocates a buffer whose initial contents are exactly `contents`.
    async fn create_buffer_init(
        &self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Result<Self::Buffer, LoadError>;

    async fn create_texture(
        &self,
        label: &str,
        size: wgpu::Extent3d,
        format: wgpu::TextureFormat,
    ) -> Result<Self::Texture, LoadError>;

    /// Submits a host-to-device copy into mip level 0 of `texture`.
    ///
    /// `data` may be reused as soon as this returns.
    async fn write_texture(
        &self,
        texture: &Self::Texture,
        data: &[u8],
        bytes_per_row: u32,
        size: wgpu::Extent3d,
    ) -> Result<(), LoadError>;

    fn create_texture_view(&self, texture: &Self::Texture) -> Self::TextureView;
}

/// An active render pass that loaded geometry can be drawn into.
pub trait RenderPassEncoder<D: GpuDevice> {
    /// Called before a primitive binds its buffers, so the pass can select
    /// pipeline state for it.
    fn bind_primitive(&mut self, _primitive: &Primitive<D>) {}

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &D::Buffer);

    fn set_index_buffer(&mut self, buffer: &D::Buffer, format: wgpu::IndexFormat);

    fn draw(&mut self, vertices: Range<u32>);

    fn draw_indexed(&mut self, indices: Range<u32>);
}

/// [`GpuDevice`] backed by a wgpu device and its queue.
pub struct WgpuDevice {
    device: std::rc::Rc<wgpu::Device>,
    queue: std::rc::Rc<wgpu::Queue>,
}

impl WgpuDevice {
    pub fn new(device: std::rc::Rc<wgpu::Device>, queue: std::rc::Rc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    /// Runs `create` and reports any out-of-memory or validation error the
    /// device raised while it ran.
    async fn capture_errors<T>(
        &self,
        label: &str,
        create: impl FnOnce() -> T,
    ) -> Result<T, LoadError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let resource = create();

        let validation_error = self.device.pop_error_scope();
        let out_of_memory_error = self.device.pop_error_scope();

        let error = match out_of_memory_error.await {
            Some(error) => Some(error),
            None => validation_error.await,
        };

        match error {
            Some(error) => Err(LoadError::DeviceResource {
                label: label.to_string(),
                message: error.to_string(),
            }),
            None => Ok(resource),
        }
    }
}

impl GpuDevice for WgpuDevice {
    type Buffer = wgpu::Buffer;
    type Texture = wgpu::Texture;
    type TextureView = wgpu::TextureView;

    async fn create_buffer_init(
        &self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Result<Self::Buffer, LoadError> {
        let max_buffer_size = self.device.limits().max_buffer_size;
        if contents.len() as u64 > max_buffer_size {
            return Err(LoadError::DeviceResource {
                label: label.to_string(),
                message: format!(
                    "{} bytes exceeds the maximum buffer size of {max_buffer_size} bytes",
                    contents.len()
                ),
            });
        }

        self.capture_errors(label, || {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage,
                })
        })
        .await
    }

    async fn create_texture(
        &self,
        label: &str,
        size: wgpu::Extent3d,
        format: wgpu::TextureFormat,
    ) -> Result<Self::Texture, LoadError> {
        let max_dimension = self.device.limits().max_texture_dimension_2d;
        if size.width > max_dimension || size.height > max_dimension {
            return Err(LoadError::DeviceResource {
                label: label.to_string(),
                message: format!(
                    "{}x{} exceeds the maximum texture dimension of {max_dimension}",
                    size.width, size.height
                ),
            });
        }

        self.capture_errors(label, || {
            self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_DST
                    | wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        })
        .await
    }

    async fn write_texture(
        &self,
        texture: &Self::Texture,
        data: &[u8],
        bytes_per_row: u32,
        size: wgpu::Extent3d,
    ) -> Result<(), LoadError> {
        self.capture_errors("texture upload", || {
            self.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                data,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(size.height),
                },
                size,
            );
            self.queue.submit([]);
        })
        .await
    }

    fn create_texture_view(&self, texture: &Self::Texture) -> Self::TextureView {
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}
