use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::error::LoadError;
use crate::resource::glb::document::Document;
use crate::resource::glb::range::ByteRange;

pub mod accessor;
pub mod document;
pub mod image;
pub mod range;

/// `"glTF"` read as a little-endian word.
pub const MAGIC: u32 = 0x46546C67;
pub const VERSION: u32 = 2;
/// `"JSON"` read as a little-endian word.
pub const CHUNK_TYPE_JSON: u32 = 0x4E4F534A;
/// `"BIN\0"` read as a little-endian word.
pub const CHUNK_TYPE_BIN: u32 = 0x004E4942;

const HEADER_BYTE_LENGTH: usize = 12;
const CHUNK_HEADER_BYTE_LENGTH: usize = 8;

/// A parsed binary glTF container.
///
/// The whole file is kept in a single shared arena. The metadata chunk is
/// parsed into a [`Document`]; the binary chunk is only ever addressed as a
/// [`ByteRange`] into the arena.
pub struct GlbContainer {
    bytes: Arc<[u8]>,
    declared_length: u32,
    document: Document,
    metadata: ByteRange,
    payload: ByteRange,
}

impl GlbContainer {
    pub fn from_path(glb_path: &Path) -> Result<Self> {
        if !glb_path.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("The given path is not a file: {}", glb_path.display()),
            )
            .into());
        }

        let data = std::fs::read(glb_path)?;

        log::info!(
            "Read {} bytes from GLB file: {}",
            data.len(),
            glb_path.display()
        );

        Ok(Self::parse(data)?)
    }

    pub fn parse(bytes: impl Into<Arc<[u8]>>) -> Result<Self, LoadError> {
        let bytes: Arc<[u8]> = bytes.into();

        let magic = read_u32(&bytes, 0)?;
        if magic != MAGIC {
            return Err(LoadError::InvalidMagic { found: magic });
        }

        let version = read_u32(&bytes, 4)?;
        if version != VERSION {
            return Err(LoadError::UnsupportedVersion { found: version });
        }

        let declared_length = read_u32(&bytes, 8)?;
        if declared_length as usize != bytes.len() {
            log::warn!(
                "GLB header declares {declared_length} bytes but {} were provided",
                bytes.len()
            );
        }

        let metadata = read_chunk(&bytes, HEADER_BYTE_LENGTH, 0, CHUNK_TYPE_JSON)?;

        let text = std::str::from_utf8(&bytes[std::ops::Range::from(metadata)])
            .map_err(LoadError::MetadataEncoding)?;
        let document: Document = serde_json::from_str(text).map_err(LoadError::MetadataSyntax)?;

        let payload = read_chunk(&bytes, metadata.offset + metadata.length, 1, CHUNK_TYPE_BIN)?;

        let trailing = bytes.len() - (payload.offset + payload.length);
        if trailing > 0 {
            log::debug!("Ignoring {trailing} bytes following the binary chunk");
        }

        log::debug!(
            "Parsed GLB container: {} metadata bytes, {} payload bytes, {} accessors, {} meshes, {} textures",
            metadata.length,
            payload.length,
            document.accessors.len(),
            document.meshes.len(),
            document.textures.len(),
        );

        Ok(Self {
            bytes,
            declared_length,
            document,
            metadata,
            payload,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The binary chunk's data.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[std::ops::Range::from(self.payload)]
    }

    /// Location of the binary chunk's data within [`Self::bytes`].
    pub fn payload_range(&self) -> ByteRange {
        self.payload
    }

    /// Location of the metadata chunk's data within [`Self::bytes`].
    pub fn metadata_range(&self) -> ByteRange {
        self.metadata
    }

    /// The complete container as it was parsed.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn declared_length(&self) -> u32 {
        self.declared_length
    }

    /// A payload-relative range, failing rather than clamping.
    pub fn payload_slice(&self, range: ByteRange, context: &str) -> Result<&[u8], LoadError> {
        range.slice(self.payload(), context)
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        self.bytes.clone()
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, LoadError> {
    let word = offset
        .checked_add(4)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(LoadError::Truncated {
            offset,
            needed: 4,
            available: bytes.len().saturating_sub(offset),
        })?;

    Ok(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

/// Reads the chunk header at `offset` and returns the range of its data.
fn read_chunk(
    bytes: &[u8],
    offset: usize,
    chunk: usize,
    expected_type: u32,
) -> Result<ByteRange, LoadError> {
    let length = read_u32(bytes, offset)? as usize;
    let type_ = read_u32(bytes, offset + 4)?;

    if type_ != expected_type {
        return Err(LoadError::UnexpectedChunkType {
            chunk,
            expected: expected_type,
            found: type_,
        });
    }

    let data = ByteRange::new(offset + CHUNK_HEADER_BYTE_LENGTH, length);
    match data.end() {
        Some(end) if end <= bytes.len() => Ok(data),
        _ => Err(LoadError::Truncated {
            offset: data.offset,
            needed: length,
            available: bytes.len().saturating_sub(data.offset),
        }),
    }
}
