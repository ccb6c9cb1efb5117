use crate::resource::glb::accessor::ComponentType;

/// Message error for failures of the application shell.
#[derive(Debug)]
pub struct Error {
    message: String,
}

impl Error {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// Broad classification of a [`LoadError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Malformed or unsupported container structure.
    Format,
    /// A byte range runs past the data it addresses.
    Bounds,
    /// An embedded image could not be decoded.
    Decode,
    /// The graphics device rejected an allocation or copy.
    DeviceResource,
}

/// Every way loading a GLB asset can fail.
///
/// All variants are fatal for the asset being loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("The container is truncated: {needed} bytes needed at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Invalid GLB magic number 0x{found:08X}")]
    InvalidMagic { found: u32 },

    #[error("Invalid GLB version {found}")]
    UnsupportedVersion { found: u32 },

    #[error("Chunk {chunk} has type 0x{found:08X}, expected 0x{expected:08X}")]
    UnexpectedChunkType {
        chunk: usize,
        expected: u32,
        found: u32,
    },

    #[error("The metadata chunk is not valid UTF-8: {0}")]
    MetadataEncoding(#[source] std::str::Utf8Error),

    #[error("The metadata chunk is not a valid document: {0}")]
    MetadataSyntax(#[source] serde_json::Error),

    #[error("No {kind} exists with the given index: {index}")]
    MissingEntry { kind: &'static str, index: usize },

    #[error("Accessor {accessor} has no buffer view")]
    MissingBufferView { accessor: usize },

    #[error("Accessor {accessor} uses an unknown component type: {code}")]
    UnknownComponentType { accessor: usize, code: u32 },

    #[error("Accessor {accessor} uses an unknown element type: {name}")]
    UnknownElementType { accessor: usize, name: String },

    #[error("Accessor {accessor} cannot be used as index data: {component_type:?} components")]
    InvalidIndexComponentType {
        accessor: usize,
        component_type: ComponentType,
    },

    #[error("Accessor {accessor} holds {found}, expected {expected}")]
    UnexpectedAccessorLayout {
        accessor: usize,
        expected: &'static str,
        found: String,
    },

    #[error("Buffer view {buffer_view} has a byte stride of {stride}, only tightly packed {element_size} byte elements are supported")]
    UnsupportedByteStride {
        buffer_view: usize,
        stride: usize,
        element_size: usize,
    },

    #[error("Buffer view {buffer_view} reads buffer {buffer}, only the binary chunk (buffer 0) is supported")]
    UnsupportedBuffer { buffer_view: usize, buffer: usize },

    #[error("Primitive {primitive} of mesh {mesh} has no POSITION attribute")]
    MissingPosition { mesh: usize, primitive: usize },

    #[error("Primitive {primitive} of mesh {mesh} uses an unsupported topology: {mode}")]
    UnsupportedTopology {
        mesh: usize,
        primitive: usize,
        mode: u32,
    },

    #[error("Texture {texture} has no source image")]
    MissingTextureSource { texture: usize },

    #[error("Arithmetic overflow while computing {context}")]
    Overflow { context: String },

    #[error("Byte range {offset}+{length} of {context} exceeds the {limit} available bytes")]
    OutOfBounds {
        context: String,
        offset: usize,
        length: usize,
        limit: usize,
    },

    #[error("Image {image} does not reference a usable byte range: {reason}")]
    InvalidImageSource { image: usize, reason: String },

    #[error("Image {image} declares an unsupported MIME type: {mime_type}")]
    UnsupportedMimeType { image: usize, mime_type: String },

    #[error("Image {image} could not be decoded as {mime_type}: {source}")]
    ImageDecode {
        image: usize,
        mime_type: String,
        #[source]
        source: image::ImageError,
    },

    #[error("The decoder for image {image} stopped before producing a bitmap")]
    DecoderStopped { image: usize },

    #[error("The device rejected {label}: {message}")]
    DeviceResource { label: String, message: String },
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Truncated { .. }
            | LoadError::InvalidMagic { .. }
            | LoadError::UnsupportedVersion { .. }
            | LoadError::UnexpectedChunkType { .. }
            | LoadError::MetadataEncoding(_)
            | LoadError::MetadataSyntax(_)
            | LoadError::MissingEntry { .. }
            | LoadError::MissingBufferView { .. }
            | LoadError::UnknownComponentType { .. }
            | LoadError::UnknownElementType { .. }
            | LoadError::InvalidIndexComponentType { .. }
            | LoadError::UnexpectedAccessorLayout { .. }
            | LoadError::UnsupportedByteStride { .. }
            | LoadError::UnsupportedBuffer { .. }
            | LoadError::MissingPosition { .. }
            | LoadError::UnsupportedTopology { .. }
            | LoadError::MissingTextureSource { .. }
            | LoadError::Overflow { .. } => ErrorKind::Format,
            LoadError::OutOfBounds { .. } => ErrorKind::Bounds,
            LoadError::InvalidImageSource { .. }
            | LoadError::UnsupportedMimeType { .. }
            | LoadError::ImageDecode { .. }
            | LoadError::DecoderStopped { .. } => ErrorKind::Decode,
            LoadError::DeviceResource { .. } => ErrorKind::DeviceResource,
        }
    }

    pub(crate) fn missing(kind: &'static str, index: usize) -> Self {
        LoadError::MissingEntry { kind, index }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        LoadError::Overflow {
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_follow_taxonomy() {
        assert_eq!(LoadError::InvalidMagic { found: 0 }.kind(), ErrorKind::Format);
        assert_eq!(
            LoadError::OutOfBounds {
                context: String::from("payload"),
                offset: 0,
                length: 4,
                limit: 2,
            }
            .kind(),
            ErrorKind::Bounds
        );
        assert_eq!(LoadError::DecoderStopped { image: 0 }.kind(), ErrorKind::Decode);
        assert_eq!(
            LoadError::DeviceResource {
                label: String::from("buffer"),
                message: String::from("out of memory"),
            }
            .kind(),
            ErrorKind::DeviceResource
        );
    }

    #[test]
    fn test_message_names_offending_index() {
        let error = LoadError::UnknownComponentType {
            accessor: 7,
            code: 5124,
        };

        let message = error.to_string();
        assert!(message.contains('7'));
        assert!(message.contains("5124"));
    }
}
