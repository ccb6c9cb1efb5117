use crate::error::LoadError;
use crate::render::device::GpuDevice;
use crate::resource::glb::image::Bitmap;

/// A sampled RGBA8 texture built from a decoded bitmap.
pub struct Texture<D: GpuDevice> {
    gpu_texture: D::Texture,
    gpu_texture_view: D::TextureView,
    dimensions: (u32, u32),
}

impl<D: GpuDevice> Texture<D> {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Allocates a texture sized from `bitmap` and uploads its pixels.
    ///
    /// The bitmap is only borrowed for the duration of the call.
    pub async fn from_bitmap(device: &D, bitmap: &Bitmap, label: &str) -> Result<Self, LoadError> {
        let (width, height) = bitmap.dimensions();

        let bytes_per_row = width
            .checked_mul(4)
            .ok_or_else(|| LoadError::overflow(format!("the row size of {label}")))?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let gpu_texture = device.create_texture(label, size, Self::FORMAT).await?;
        device
            .write_texture(&gpu_texture, bitmap.data().as_raw(), bytes_per_row, size)
            .await?;
        let gpu_texture_view = device.create_texture_view(&gpu_texture);

        Ok(Self {
            gpu_texture,
            gpu_texture_view,
            dimensions: (width, height),
        })
    }

    pub fn gpu_texture(&self) -> &D::Texture {
        &self.gpu_texture
    }

    pub fn gpu_texture_view(&self) -> &D::TextureView {
        &self.gpu_texture_view
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}

pub struct DepthTexture2DPackage {
    gpu_texture: wgpu::Texture,
    gpu_texture_view: wgpu::TextureView,
}

impl DepthTexture2DPackage {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn from_device(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let gpu_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("DEPTH_TEXTURE"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let gpu_texture_view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            gpu_texture,
            gpu_texture_view,
        }
    }

    pub fn gpu_texture(&self) -> &wgpu::Texture {
        &self.gpu_texture
    }

    pub fn gpu_texture_view(&self) -> &wgpu::TextureView {
        &self.gpu_texture_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{RecordingDevice, TextureWrite};

    fn bitmap(width: u32, height: u32) -> Bitmap {
        Bitmap::from_rgba_image(image::RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([255, 0, 0, 255]),
        ))
    }

    #[test]
    fn test_upload_matches_bitmap() {
        let device = RecordingDevice::default();
        let bitmap = bitmap(4, 2);

        let texture =
            pollster::block_on(Texture::from_bitmap(&device, &bitmap, "TEXTURE_0")).unwrap();

        assert_eq!(texture.dimensions(), (4, 2));
        assert_eq!(texture.gpu_texture().format, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(texture.gpu_texture().size.width, 4);
        assert_eq!(texture.gpu_texture().size.height, 2);
        assert_eq!(texture.gpu_texture_view().texture, texture.gpu_texture().id);

        assert_eq!(
            device.texture_writes(),
            vec![TextureWrite {
                texture: texture.gpu_texture().id,
                byte_length: 32,
                bytes_per_row: 16,
                size: texture.gpu_texture().size,
            }]
        );

        // Still usable after the upload.
        assert_eq!(bitmap.data().get_pixel(3, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_allocation_failure() {
        let device = RecordingDevice::with_allocation_limit(0);

        let error = pollster::block_on(Texture::from_bitmap(&device, &bitmap(1, 1), "TEXTURE_0"))
            .err()
            .unwrap();
        assert_eq!(error.kind(), ErrorKind::DeviceResource);
        assert!(device.texture_writes().is_empty());
    }
}
