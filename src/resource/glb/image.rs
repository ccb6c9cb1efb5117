use crate::error::LoadError;
use crate::resource::glb::accessor::resolve_buffer_view;
use crate::resource::glb::range::ByteRange;
use crate::resource::glb::GlbContainer;

/// A decoded RGBA8 image ready for upload.
pub struct Bitmap {
    data: image::RgbaImage,
}

impl Bitmap {
    pub fn from_rgba_image(rgba_image: image::RgbaImage) -> Self {
        Self { data: rgba_image }
    }

    pub fn data(&self) -> &image::RgbaImage {
        &self.data
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.data.dimensions()
    }
}

/// Decodes the given image on the calling thread.
pub fn decode_image(container: &GlbContainer, image_index: usize) -> Result<Bitmap, LoadError> {
    ImageSource::resolve(container, image_index)?.decode(container.bytes())
}

/// Decodes the given image, completing independently of any other decode.
///
/// Natively the work runs on its own thread, reading the container's shared
/// arena; on wasm32, or when no thread can be started, it runs inline.
pub async fn decode_image_async(
    container: &GlbContainer,
    image_index: usize,
) -> Result<Bitmap, LoadError> {
    let source = ImageSource::resolve(container, image_index)?;

    #[cfg(target_arch = "wasm32")]
    {
        source.decode(container.bytes())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let bytes = container.shared_bytes();
        let worker_source = source.clone();
        let (sender, receiver) = futures::channel::oneshot::channel();

        let spawned = std::thread::Builder::new()
            .name(format!("glb-image-{image_index}"))
            .spawn(move || {
                // The receiver only disappears if the load was abandoned.
                let _ = sender.send(worker_source.decode(&bytes));
            });

        if let Err(error) = spawned {
            log::warn!("Decoding image {image_index} inline, no worker thread: {error}");
            return source.decode(container.bytes());
        }

        match receiver.await {
            Ok(result) => result,
            // The worker panicked inside the codec.
            Err(_) => Err(LoadError::DecoderStopped { image: image_index }),
        }
    }
}

/// Everything needed to decode an image, detached from the document.
#[derive(Clone)]
struct ImageSource {
    image: usize,
    range: ByteRange,
    mime_type: Option<String>,
    format: Option<image::ImageFormat>,
}

impl ImageSource {
    fn resolve(container: &GlbContainer, image_index: usize) -> Result<Self, LoadError> {
        let document = container.document();
        let image = document.image(image_index)?;

        let invalid = |reason: String| LoadError::InvalidImageSource {
            image: image_index,
            reason,
        };

        let buffer_view = match image.buffer_view {
            Some(buffer_view) => buffer_view,
            None => {
                return Err(invalid(match &image.uri {
                    Some(uri) => format!("external images are not supported: {uri}"),
                    None => String::from("the image has no buffer view"),
                }))
            }
        };

        let view_range =
            resolve_buffer_view(document, buffer_view).map_err(|error| invalid(error.to_string()))?;

        let range = container
            .payload_range()
            .sub_range(view_range)
            .ok_or_else(|| {
                invalid(format!(
                    "buffer view {buffer_view} ({}+{}) exceeds the {} byte payload",
                    view_range.offset,
                    view_range.length,
                    container.payload_range().length
                ))
            })?;

        let format = match &image.mime_type {
            Some(mime_type) => match image::ImageFormat::from_mime_type(mime_type) {
                Some(format) => Some(format),
                None => {
                    return Err(LoadError::UnsupportedMimeType {
                        image: image_index,
                        mime_type: mime_type.clone(),
                    })
                }
            },
            None => None,
        };

        Ok(Self {
            image: image_index,
            range,
            mime_type: image.mime_type.clone(),
            format,
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<Bitmap, LoadError> {
        let data = &bytes[std::ops::Range::from(self.range)];

        let loaded_image = match self.format {
            Some(format) => image::load_from_memory_with_format(data, format),
            None => image::load_from_memory(data),
        }
        .map_err(|source| LoadError::ImageDecode {
            image: self.image,
            mime_type: self
                .mime_type
                .clone()
                .unwrap_or_else(|| String::from("<UNDECLARED>")),
            source,
        })?;

        let bitmap = Bitmap::from_rgba_image(loaded_image.to_rgba8());

        log::debug!(
            "Decoded image {} into a {}x{} bitmap",
            self.image,
            bitmap.dimensions().0,
            bitmap.dimensions().1
        );

        Ok(bitmap)
    }
}
